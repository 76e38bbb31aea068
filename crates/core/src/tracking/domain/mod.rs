pub mod anchor;
pub mod assignment;
pub mod face_tracker;
