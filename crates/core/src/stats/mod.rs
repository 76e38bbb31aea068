pub mod sequence_stats;
