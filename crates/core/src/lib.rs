//! Face identity tracking over landmark sequences: a persisted data
//! model of per-frame face detections, trackers that assign stable
//! identity labels across frames, and statistics for picking the main
//! face of a sequence.

pub mod sequence;
pub mod shared;
pub mod stats;
pub mod tracking;
