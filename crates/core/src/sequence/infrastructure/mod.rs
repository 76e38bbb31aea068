pub mod binary_store;
