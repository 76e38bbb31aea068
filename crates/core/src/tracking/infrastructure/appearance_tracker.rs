//! Appearance-based face tracker.
//!
//! Each identity carries an incremental LBP texture model. Candidates
//! are matched against the tracked pool first, with a spatial blend for
//! nearby pairs, then against the lost pool on appearance alone so an
//! identity that left the frame can be recovered under its original id.
//! Tracked identities unmatched for `lookback_frames` frames move to
//! the lost pool, where they remain indefinitely.

use ndarray::{Array1, Array2};

use crate::sequence::domain::face::{BoundingBox, Face};
use crate::sequence::domain::frame::Frame;
use crate::shared::constants::{APPEARANCE_ACCEPT_DIST, MODEL_CROP_SIZE, NEAR_FIELD_RADIUS};
use crate::shared::gray_frame::GrayFrame;
use crate::tracking::domain::anchor::{euclidean, landmark_centroid};
use crate::tracking::domain::assignment::greedy_assign;
use crate::tracking::domain::face_tracker::FaceTracker;

use super::lbp::{lbp_histogram, LbpModel};

#[derive(Clone, Debug)]
struct TrackedFace {
    id: u32,
    last_seen_frame: u32,
    anchor: (f64, f64),
    model: LbpModel,
}

struct Candidate {
    anchor: (f64, f64),
    histogram: Array1<f64>,
}

#[derive(Clone)]
pub struct AppearanceTracker {
    next_id: u32,
    lookback_frames: u32,
    tracked: Vec<TrackedFace>,
    lost: Vec<TrackedFace>,
}

impl AppearanceTracker {
    pub fn new(lookback_frames: u32) -> Self {
        Self {
            next_id: 0,
            lookback_frames,
            tracked: Vec::new(),
            lost: Vec::new(),
        }
    }

    /// Model crops come from the landmark hull rather than the detector
    /// box: the hull hugs the face and is steadier across detections.
    fn crop_box(face: &Face) -> BoundingBox {
        let hull = BoundingBox::from_points(&face.landmarks);
        if hull.width < 1 || hull.height < 1 {
            face.bbox
        } else {
            hull
        }
    }

    fn build_candidates(image: &GrayFrame, frame: &Frame) -> Vec<Candidate> {
        frame
            .faces
            .iter()
            .map(|face| {
                let crop = image.crop_resized(&Self::crop_box(face), MODEL_CROP_SIZE);
                Candidate {
                    anchor: landmark_centroid(&face.landmarks),
                    histogram: lbp_histogram(&crop),
                }
            })
            .collect()
    }

    /// Distance to a tracked identity: appearance, averaged with the
    /// anchor distance when the candidate is close enough for position
    /// to be evidence.
    fn tracked_distance(tracked: &TrackedFace, candidate: &Candidate) -> f64 {
        let appearance = tracked.model.predict(&candidate.histogram);
        let spatial = euclidean(tracked.anchor, candidate.anchor);
        if spatial <= NEAR_FIELD_RADIUS {
            0.5 * (appearance + spatial)
        } else {
            appearance
        }
    }
}

impl FaceTracker for AppearanceTracker {
    fn track_frame(&mut self, image: &GrayFrame, frame: &mut Frame) {
        let candidates = Self::build_candidates(image, frame);
        let mut matched = vec![false; candidates.len()];

        // Pass 1: tracked pool, appearance blended with position.
        let distances = Array2::from_shape_fn(
            (self.tracked.len(), candidates.len()),
            |(r, c)| Self::tracked_distance(&self.tracked[r], &candidates[c]),
        );
        for (row, col) in greedy_assign(&distances, APPEARANCE_ACCEPT_DIST) {
            let tracked = &mut self.tracked[row];
            let candidate = &candidates[col];
            tracked.model.update(candidate.histogram.clone());
            tracked.anchor = candidate.anchor;
            tracked.last_seen_frame = frame.id;
            frame.faces[col].id = tracked.id;
            matched[col] = true;
            log::debug!("frame {}: face {} matched identity {}", frame.id, col, tracked.id);
        }

        // Pass 2: lost pool, appearance only. Position is meaningless
        // for an identity that has been gone for a while.
        let remaining: Vec<usize> = (0..candidates.len()).filter(|&c| !matched[c]).collect();
        let lost_distances = Array2::from_shape_fn(
            (self.lost.len(), remaining.len()),
            |(r, k)| self.lost[r].model.predict(&candidates[remaining[k]].histogram),
        );
        let mut recoveries = greedy_assign(&lost_distances, APPEARANCE_ACCEPT_DIST);
        recoveries.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        for (row, k) in recoveries {
            let mut recovered = self.lost.remove(row);
            let col = remaining[k];
            recovered.model.update(candidates[col].histogram.clone());
            recovered.anchor = candidates[col].anchor;
            recovered.last_seen_frame = frame.id;
            frame.faces[col].id = recovered.id;
            matched[col] = true;
            log::debug!("frame {}: recovered identity {}", frame.id, recovered.id);
            self.tracked.push(recovered);
        }

        // Everything still unmatched starts a fresh identity.
        for (col, candidate) in candidates.into_iter().enumerate() {
            if matched[col] {
                continue;
            }
            let id = self.next_id;
            self.next_id += 1;
            log::debug!("frame {}: new identity {}", frame.id, id);
            self.tracked.push(TrackedFace {
                id,
                last_seen_frame: frame.id,
                anchor: candidate.anchor,
                model: LbpModel::train(id, candidate.histogram),
            });
            frame.faces[col].id = id;
        }

        // Age out tracked identities that have gone unseen too long.
        let mut i = 0;
        while i < self.tracked.len() {
            if frame.id.saturating_sub(self.tracked[i].last_seen_frame) >= self.lookback_frames {
                let stale = self.tracked.remove(i);
                log::debug!("frame {}: identity {} lost", frame.id, stale.id);
                self.lost.push(stale);
            } else {
                i += 1;
            }
        }
    }

    fn clear(&mut self) {
        self.next_id = 0;
        self.tracked.clear();
        self.lost.clear();
    }

    fn clone_box(&self) -> Box<dyn FaceTracker> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::domain::face::Point;
    use crate::shared::constants::DEFAULT_LOOKBACK_FRAMES;

    /// A frame image with a distinctive speckle patch at each requested
    /// center. Patches are larger than the landmark hull so the model
    /// crop is fully textured.
    fn frame_image(width: u32, height: u32, patches: &[(i32, i32, u64)]) -> GrayFrame {
        let mut data = vec![16u8; (width * height) as usize];
        for &(cx, cy, seed) in patches {
            for dy in -12i32..=12 {
                for dx in -12i32..=12 {
                    let x = cx + dx;
                    let y = cy + dy;
                    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                        continue;
                    }
                    let h = (seed
                        .wrapping_mul(31)
                        .wrapping_add((dx * 37 + dy * 17) as u64)
                        .wrapping_mul(2654435761))
                        >> 7;
                    data[(y as u32 * width + x as u32) as usize] = (h % 256) as u8;
                }
            }
        }
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

    fn frame_with_faces(id: u32, width: i32, height: i32, centers: &[(i32, i32)]) -> Frame {
        let mut frame = Frame::new(id, width, height);
        for &(cx, cy) in centers {
            frame.faces.push(face_at(cx, cy));
        }
        frame
    }

    #[test]
    fn test_identity_stable_across_frames() {
        let mut tracker = AppearanceTracker::new(DEFAULT_LOOKBACK_FRAMES);
        let image = frame_image(240, 240, &[(100, 100, 7)]);
        for i in 0..5u32 {
            let mut frame = frame_with_faces(i, 240, 240, &[(100, 100)]);
            tracker.track_frame(&image, &mut frame);
            assert_eq!(frame.faces[0].id, 0, "frame {i}");
        }
    }

    #[test]
    fn test_identity_stable_under_small_motion() {
        // Translating the patch with the landmarks keeps the crop
        // content identical, so the model distance stays at zero.
        let mut tracker = AppearanceTracker::new(DEFAULT_LOOKBACK_FRAMES);
        for i in 0..5u32 {
            let cx = 100 + i as i32 * 2;
            let image = frame_image(240, 240, &[(cx, 100, 7)]);
            let mut frame = frame_with_faces(i, 240, 240, &[(cx, 100)]);
            tracker.track_frame(&image, &mut frame);
            assert_eq!(frame.faces[0].id, 0, "frame {i}");
        }
    }

    #[test]
    fn test_new_identities_allocated_in_increasing_order() {
        let mut tracker = AppearanceTracker::new(DEFAULT_LOOKBACK_FRAMES);
        let image = frame_image(720, 240, &[(100, 100, 1), (360, 100, 2), (620, 100, 3)]);
        let mut frame = frame_with_faces(0, 720, 240, &[(100, 100), (360, 100), (620, 100)]);
        tracker.track_frame(&image, &mut frame);
        let ids: Vec<u32> = frame.faces.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_exclusive_assignment_within_frame() {
        let mut tracker = AppearanceTracker::new(DEFAULT_LOOKBACK_FRAMES);
        let image0 = frame_image(480, 240, &[(100, 100, 5), (380, 100, 6)]);
        let mut frame0 = frame_with_faces(0, 480, 240, &[(100, 100), (380, 100)]);
        tracker.track_frame(&image0, &mut frame0);

        let image1 = frame_image(480, 240, &[(104, 100, 5), (376, 100, 6)]);
        let mut frame1 = frame_with_faces(1, 480, 240, &[(104, 100), (376, 100)]);
        tracker.track_frame(&image1, &mut frame1);

        assert_ne!(frame1.faces[0].id, frame1.faces[1].id);
        let mut ids: Vec<u32> = frame1.faces.iter().map(|f| f.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_lost_identity_recovered_with_original_id() {
        let lookback = 10;
        let mut tracker = AppearanceTracker::new(lookback);
        let image = frame_image(240, 240, &[(100, 100, 7)]);
        let mut frame0 = frame_with_faces(0, 240, 240, &[(100, 100)]);
        tracker.track_frame(&image, &mut frame0);
        assert_eq!(frame0.faces[0].id, 0);

        // The identity drops out of the tracked pool exactly when the
        // unseen span reaches the lookback window.
        let empty_image = frame_image(240, 240, &[]);
        for i in 1..=lookback {
            let mut empty = Frame::new(i, 240, 240);
            tracker.track_frame(&empty_image, &mut empty);
        }
        assert!(tracker.tracked.is_empty());
        assert_eq!(tracker.lost.len(), 1);

        // Same appearance again: recovered from the lost pool.
        let mut frame11 = frame_with_faces(lookback + 1, 240, 240, &[(100, 100)]);
        tracker.track_frame(&image, &mut frame11);
        assert_eq!(frame11.faces[0].id, 0);
        assert_eq!(tracker.tracked.len(), 1);
        assert!(tracker.lost.is_empty());
    }

    #[test]
    fn test_identity_survives_short_absence_in_tracked_pool() {
        let mut tracker = AppearanceTracker::new(DEFAULT_LOOKBACK_FRAMES);
        let image = frame_image(240, 240, &[(100, 100, 7)]);
        let mut frame0 = frame_with_faces(0, 240, 240, &[(100, 100)]);
        tracker.track_frame(&image, &mut frame0);

        let empty_image = frame_image(240, 240, &[]);
        for i in 1..5u32 {
            let mut empty = Frame::new(i, 240, 240);
            tracker.track_frame(&empty_image, &mut empty);
        }
        assert_eq!(tracker.tracked.len(), 1);
        assert!(tracker.lost.is_empty());

        let mut frame5 = frame_with_faces(5, 240, 240, &[(100, 100)]);
        tracker.track_frame(&image, &mut frame5);
        assert_eq!(frame5.faces[0].id, 0);
    }

    #[test]
    fn test_crop_box_falls_back_to_detector_bbox() {
        // Without landmarks the hull is degenerate; the detector box
        // drives the crop and the anchor defaults to the zero vector.
        let mut tracker = AppearanceTracker::new(DEFAULT_LOOKBACK_FRAMES);
        let image = frame_image(240, 240, &[(20, 20, 7)]);

        let bare_face = || {
            Face::new(
                BoundingBox {
                    left: 8,
                    top: 8,
                    width: 25,
                    height: 25,
                },
                Vec::new(),
            )
        };

        let mut frame0 = Frame::new(0, 240, 240);
        frame0.faces.push(bare_face());
        tracker.track_frame(&image, &mut frame0);
        assert_eq!(frame0.faces[0].id, 0);

        let mut frame1 = Frame::new(1, 240, 240);
        frame1.faces.push(bare_face());
        tracker.track_frame(&image, &mut frame1);
        assert_eq!(frame1.faces[0].id, 0);
    }

    #[test]
    fn test_clear_resets_pools_and_allocator() {
        let mut tracker = AppearanceTracker::new(1);
        let image = frame_image(240, 240, &[(100, 100, 7)]);
        let mut frame0 = frame_with_faces(0, 240, 240, &[(100, 100)]);
        tracker.track_frame(&image, &mut frame0);

        // Push the identity into the lost pool before clearing.
        let empty_image = frame_image(240, 240, &[]);
        let mut empty = Frame::new(1, 240, 240);
        tracker.track_frame(&empty_image, &mut empty);
        assert_eq!(tracker.lost.len(), 1);

        tracker.clear();
        assert!(tracker.tracked.is_empty());
        assert!(tracker.lost.is_empty());

        let mut frame2 = frame_with_faces(0, 240, 240, &[(100, 100)]);
        tracker.track_frame(&image, &mut frame2);
        assert_eq!(frame2.faces[0].id, 0);
    }

    #[test]
    fn test_clone_box_diverges_independently() {
        let mut tracker = AppearanceTracker::new(DEFAULT_LOOKBACK_FRAMES);
        let image = frame_image(480, 240, &[(100, 100, 5)]);
        let mut frame0 = frame_with_faces(0, 480, 240, &[(100, 100)]);
        tracker.track_frame(&image, &mut frame0);

        let mut fork = tracker.clone_box();

        // The fork meets a second face; the original never does.
        let image1 = frame_image(480, 240, &[(100, 100, 5), (380, 100, 6)]);
        let mut frame1 = frame_with_faces(1, 480, 240, &[(100, 100), (380, 100)]);
        fork.track_frame(&image1, &mut frame1);
        assert_eq!(frame1.faces[1].id, 1);

        // The original allocator still hands out id 1 next.
        let image2 = frame_image(480, 240, &[(100, 100, 5), (380, 100, 9)]);
        let mut frame2 = frame_with_faces(1, 480, 240, &[(100, 100), (380, 100)]);
        tracker.track_frame(&image2, &mut frame2);
        assert_eq!(frame2.faces[1].id, 1);
    }

    #[test]
    fn test_empty_frame_is_a_no_op() {
        let mut tracker = AppearanceTracker::new(DEFAULT_LOOKBACK_FRAMES);
        let image = frame_image(240, 240, &[]);
        let mut frame = Frame::new(0, 240, 240);
        tracker.track_frame(&image, &mut frame);
        assert!(frame.faces.is_empty());
    }
}
