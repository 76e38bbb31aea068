/// Frames a tracked identity may go unmatched before it moves to the lost pool.
pub const DEFAULT_LOOKBACK_FRAMES: u32 = 10;

/// Acceptance threshold for the descriptor strategy's combined distance.
pub const DESCRIPTOR_ACCEPT_DIST: f64 = 250.0;

/// Acceptance threshold for the appearance strategy's distance.
pub const APPEARANCE_ACCEPT_DIST: f64 = 128.0;

/// Spatial radius (pixels) within which appearance and spatial distance
/// are blended for identities that are not lost.
pub const NEAR_FIELD_RADIUS: f64 = 30.0;

/// Canonical square side for appearance-model face crops.
pub const MODEL_CROP_SIZE: u32 = 128;

/// Keypoint scale used when no corners are detected inside a face region.
pub const FALLBACK_KEYPOINT_SCALE: f64 = 10.0;

/// FAST corner detection threshold for keypoint scale estimation.
pub const FAST_CORNER_THRESHOLD: u8 = 20;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
