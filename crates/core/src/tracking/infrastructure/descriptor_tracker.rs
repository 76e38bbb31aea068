//! Descriptor-based face tracker.
//!
//! Matches frame candidates against tracked identities by blending mean
//! Hamming distance between per-landmark binary descriptors with the
//! Euclidean distance between landmark centroids. This variant keeps a
//! single pool: identities unmatched for any stretch of frames are
//! carried forward indefinitely rather than moved to a lost pool.

use ndarray::Array2;

use crate::sequence::domain::frame::Frame;
use crate::shared::constants::DESCRIPTOR_ACCEPT_DIST;
use crate::shared::gray_frame::GrayFrame;
use crate::tracking::domain::anchor::{euclidean, landmark_centroid};
use crate::tracking::domain::assignment::greedy_assign;
use crate::tracking::domain::face_tracker::FaceTracker;

use super::keypoints::{compute_descriptors, hamming_mean, keypoint_scale, DescriptorSet};

#[derive(Clone, Debug)]
struct TrackedFace {
    id: u32,
    anchor: (f64, f64),
    descriptors: DescriptorSet,
}

struct Candidate {
    anchor: (f64, f64),
    descriptors: DescriptorSet,
}

#[derive(Clone, Default)]
pub struct DescriptorTracker {
    next_id: u32,
    tracked: Vec<TrackedFace>,
}

impl DescriptorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_candidates(&self, image: &GrayFrame, frame: &Frame) -> Vec<Candidate> {
        frame
            .faces
            .iter()
            .map(|face| {
                let scale = keypoint_scale(image, &face.bbox);
                Candidate {
                    anchor: landmark_centroid(&face.landmarks),
                    descriptors: compute_descriptors(image, &face.landmarks, scale),
                }
            })
            .collect()
    }

    fn distance(tracked: &TrackedFace, candidate: &Candidate) -> f64 {
        // No shared descriptor indices means no appearance confidence:
        // the term pins to the acceptance threshold, so such a pair can
        // only be committed through close spatial proximity.
        let appearance = hamming_mean(&tracked.descriptors, &candidate.descriptors)
            .unwrap_or(DESCRIPTOR_ACCEPT_DIST);
        let spatial = euclidean(tracked.anchor, candidate.anchor);
        0.5 * appearance + 0.5 * spatial
    }
}

impl FaceTracker for DescriptorTracker {
    fn track_frame(&mut self, image: &GrayFrame, frame: &mut Frame) {
        let candidates = self.build_candidates(image, frame);

        let distances = Array2::from_shape_fn(
            (self.tracked.len(), candidates.len()),
            |(r, c)| Self::distance(&self.tracked[r], &candidates[c]),
        );

        let mut matched = vec![false; candidates.len()];
        for (row, col) in greedy_assign(&distances, DESCRIPTOR_ACCEPT_DIST) {
            let tracked = &mut self.tracked[row];
            let candidate = &candidates[col];
            tracked.descriptors = candidate.descriptors.clone();
            tracked.anchor = candidate.anchor;
            frame.faces[col].id = tracked.id;
            matched[col] = true;
            log::debug!("frame {}: face {} matched identity {}", frame.id, col, tracked.id);
        }

        for (col, candidate) in candidates.into_iter().enumerate() {
            if matched[col] {
                continue;
            }
            let id = self.next_id;
            self.next_id += 1;
            log::debug!("frame {}: new identity {}", frame.id, id);
            self.tracked.push(TrackedFace {
                id,
                anchor: candidate.anchor,
                descriptors: candidate.descriptors,
            });
            frame.faces[col].id = id;
        }
    }

    fn clear(&mut self) {
        self.next_id = 0;
        self.tracked.clear();
    }

    fn clone_box(&self) -> Box<dyn FaceTracker> {
        Box::new(self.clone())
    }
}
