//! Runs several tracking strategies over the same sequence in parallel.
//!
//! Each strategy gets its own thread, its own tracker, and its own copy
//! of the base sequence, so runs never observe each other's identity
//! assignments. Results come back in the order the strategies were
//! requested.

use thiserror::Error;

use crate::sequence::domain::sequence::Sequence;
use crate::shared::gray_frame::GrayFrame;
use crate::stats::sequence_stats::{sequence_stats, FaceStats};

use super::tracker_factory::{create_tracker, TrackerError, TrackerStrategy};

/// One strategy's tracked sequence and its per-identity statistics.
#[derive(Clone, Debug)]
pub struct StrategyRun {
    pub strategy: TrackerStrategy,
    pub sequence: Sequence,
    pub stats: Vec<FaceStats>,
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("sequence has {frames} frames but only {images} images were provided")]
    MissingImages { frames: usize, images: usize },
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Tracks `base` under every requested strategy concurrently.
///
/// `images` must supply at least one image per frame of `base`, in
/// frame order. The base sequence is cloned per strategy; the caller's
/// copy is untouched.
pub fn run_strategies(
    base: &Sequence,
    images: &[GrayFrame],
    strategies: &[TrackerStrategy],
    lookback_frames: u32,
) -> Result<Vec<StrategyRun>, RunnerError> {
    if images.len() < base.frames.len() {
        return Err(RunnerError::MissingImages {
            frames: base.frames.len(),
            images: images.len(),
        });
    }

    let (tx, rx) = crossbeam_channel::unbounded::<(usize, Result<StrategyRun, TrackerError>)>();

    std::thread::scope(|scope| {
        for (slot, &strategy) in strategies.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let result = run_one(base, images, strategy, lookback_frames);
                // The receiver outlives the scope; send cannot fail.
                let _ = tx.send((slot, result));
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<StrategyRun>> = (0..strategies.len()).map(|_| None).collect();
    for (slot, result) in rx {
        slots[slot] = Some(result?);
    }

    // Every worker sent exactly once, so every slot is filled.
    Ok(slots.into_iter().flatten().collect())
}

fn run_one(
    base: &Sequence,
    images: &[GrayFrame],
    strategy: TrackerStrategy,
    lookback_frames: u32,
) -> Result<StrategyRun, TrackerError> {
    let mut tracker = create_tracker(strategy, lookback_frames)?;
    let mut sequence = base.clone();

    for (frame, image) in sequence.frames.iter_mut().zip(images) {
        tracker.track_frame(image, frame);
    }

    let stats = sequence_stats(&sequence);
    log::info!(
        "strategy {}: {} frames tracked, {} identities",
        strategy,
        sequence.len(),
        stats.len()
    );

    Ok(StrategyRun {
        strategy,
        sequence,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::domain::face::{BoundingBox, Face, Point};
    use crate::sequence::domain::frame::Frame;

    fn speckle_image(width: u32, height: u32) -> GrayFrame {
        let data: Vec<u8> = (0..width as u64 * height as u64)
            .map(|i| (i.wrapping_mul(2654435761) >> 3) as u8)
            .collect();
        GrayFrame::new(data, width, height)
    }

    fn face_at(cx: i32, cy: i32) -> Face {
        let landmarks = vec![
            Point { x: cx - 5, y: cy - 5 },
            Point { x: cx + 5, y: cy - 5 },
            Point { x: cx, y: cy },
            Point { x: cx - 4, y: cy + 6 },
            Point { x: cx + 4, y: cy + 6 },
        ];
        Face::new(
            BoundingBox {
                left: cx - 12,
                top: cy - 12,
                width: 25,
                height: 25,
            },
            landmarks,
        )
    }

    fn base_sequence(frames: u32) -> Sequence {
        let mut seq = Sequence::new("clip.mp4");
        for i in 0..frames {
            let mut frame = Frame::new(i, 240, 240);
            frame.faces.push(face_at(100, 100));
            seq.frames.push(frame);
        }
        seq
    }

    #[test]
    fn test_missing_images_is_an_error() {
        let base = base_sequence(3);
        let images = vec![speckle_image(240, 240); 2];
        let result = run_strategies(&base, &images, &[TrackerStrategy::Descriptor], 10);
        assert!(matches!(
            result,
            Err(RunnerError::MissingImages { frames: 3, images: 2 })
        ));
    }

    #[test]
    fn test_no_strategies_yields_no_runs() {
        let base = base_sequence(2);
        let images = vec![speckle_image(240, 240); 2];
        let runs = run_strategies(&base, &images, &[], 10).unwrap();
        assert!(runs.is_empty());
    }

    #[test]
    fn test_descriptor_run_tracks_and_reports_stats() {
        let base = base_sequence(3);
        let images = vec![speckle_image(240, 240); 3];
        let runs = run_strategies(&base, &images, &[TrackerStrategy::Descriptor], 10).unwrap();

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].strategy, TrackerStrategy::Descriptor);
        assert_eq!(runs[0].sequence.len(), 3);
        // A static face keeps one identity across the whole run.
        assert_eq!(runs[0].stats.len(), 1);
        assert_eq!(runs[0].stats[0].frame_count, 3);
        for frame in &runs[0].sequence.frames {
            assert_eq!(frame.faces[0].id, 0);
        }
    }

    #[test]
    fn test_base_sequence_is_untouched() {
        let base = base_sequence(2);
        let images = vec![speckle_image(240, 240); 2];
        let before = base.clone();
        run_strategies(&base, &images, &[TrackerStrategy::Descriptor], 10).unwrap();
        assert_eq!(base, before);
    }

    #[cfg(feature = "appearance")]
    #[test]
    fn test_runs_come_back_in_request_order() {
        let base = base_sequence(2);
        let images = vec![speckle_image(240, 240); 2];
        let strategies = [TrackerStrategy::Appearance, TrackerStrategy::Descriptor];
        let runs = run_strategies(&base, &images, &strategies, 10).unwrap();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].strategy, TrackerStrategy::Appearance);
        assert_eq!(runs[1].strategy, TrackerStrategy::Descriptor);
    }

    #[test]
    fn test_duplicate_strategies_run_independently() {
        let base = base_sequence(2);
        let images = vec![speckle_image(240, 240); 2];
        let strategies = [TrackerStrategy::Descriptor, TrackerStrategy::Descriptor];
        let runs = run_strategies(&base, &images, &strategies, 10).unwrap();

        assert_eq!(runs.len(), 2);
        // Each run allocates identities from zero.
        assert_eq!(runs[0].sequence.frames[0].faces[0].id, 0);
        assert_eq!(runs[1].sequence.frames[0].faces[0].id, 0);
    }

    #[cfg(not(feature = "appearance"))]
    #[test]
    fn test_unavailable_strategy_surfaces_tracker_error() {
        let base = base_sequence(1);
        let images = vec![speckle_image(240, 240); 1];
        let result = run_strategies(&base, &images, &[TrackerStrategy::Appearance], 10);
        assert!(matches!(result, Err(RunnerError::Tracker(_))));
    }
}
