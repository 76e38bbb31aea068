#[cfg(feature = "appearance")]
pub mod appearance_tracker;
pub mod descriptor_tracker;
pub mod keypoints;
#[cfg(feature = "appearance")]
pub mod lbp;
pub mod parallel_runner;
pub mod tracker_factory;
