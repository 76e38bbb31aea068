use thiserror::Error;

use crate::tracking::domain::face_tracker::FaceTracker;

use super::descriptor_tracker::DescriptorTracker;

/// Tracking strategy, chosen once at tracker construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerStrategy {
    /// Binary keypoint descriptors, single pool, no lost/recovered split.
    Descriptor,
    /// Holistic texture model with a lost pool and a recovery window.
    Appearance,
}

impl std::fmt::Display for TrackerStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerStrategy::Descriptor => write!(f, "descriptor"),
            TrackerStrategy::Appearance => write!(f, "appearance"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("tracker strategy '{0}' is not available in this build")]
    UnsupportedStrategy(TrackerStrategy),
}

/// Creates a tracker for the requested strategy.
///
/// `lookback_frames` bounds how long the appearance strategy keeps an
/// unmatched identity in the tracked pool; the descriptor strategy has
/// no lost pool and ignores it.
///
/// Fails immediately with `UnsupportedStrategy` when the appearance
/// backend is compiled out, rather than deferring the error to first use.
pub fn create_tracker(
    strategy: TrackerStrategy,
    lookback_frames: u32,
) -> Result<Box<dyn FaceTracker>, TrackerError> {
    match strategy {
        TrackerStrategy::Descriptor => {
            log::info!("Using descriptor face tracker");
            Ok(Box::new(DescriptorTracker::new()))
        }
        TrackerStrategy::Appearance => {
            #[cfg(feature = "appearance")]
            {
                log::info!("Using appearance face tracker (lookback={lookback_frames} frames)");
                Ok(Box::new(super::appearance_tracker::AppearanceTracker::new(
                    lookback_frames,
                )))
            }
            #[cfg(not(feature = "appearance"))]
            {
                let _ = lookback_frames;
                Err(TrackerError::UnsupportedStrategy(strategy))
            }
        }
    }
}
