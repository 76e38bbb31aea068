//! Per-identity sequence statistics and main-face selection.
//!
//! Frames without faces are ignored throughout: an identity's frame
//! ratio is measured against the frames where tracking had anything to
//! work with, not against dead air.

use std::collections::HashMap;

use crate::sequence::domain::sequence::Sequence;

const EPSILON: f64 = 1e-6;

/// Aggregate statistics for one tracked identity.
#[derive(Clone, Debug)]
pub struct FaceStats {
    pub id: u32,
    /// Frames in which this identity appears.
    pub frame_count: usize,
    /// Mean distance from the face center to the frame center, pixels.
    pub avg_center_dist: f64,
    /// Mean of the face box's width/height average, pixels.
    pub avg_size: f64,
    /// 1 at the frame center, falling to 0 at a quarter of the frame
    /// diagonal.
    pub central_ratio: f64,
    /// Fraction of face-bearing frames this identity appears in.
    pub frame_ratio: f64,
    /// Face size against a quarter of the mean frame extent, capped at 1.
    pub size_ratio: f64,
}

/// Computes per-identity statistics, ordered by first encounter.
pub fn sequence_stats(sequence: &Sequence) -> Vec<FaceStats> {
    struct Accum {
        id: u32,
        frame_count: usize,
        center_dist_sum: f64,
        size_sum: f64,
    }

    let mut order: Vec<Accum> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();
    let mut total_frames = 0usize;
    let mut frame_w_sum = 0.0;
    let mut frame_h_sum = 0.0;

    for frame in &sequence.frames {
        if frame.faces.is_empty() {
            continue;
        }
        total_frames += 1;
        frame_w_sum += frame.width as f64;
        frame_h_sum += frame.height as f64;
        let frame_center = (frame.width as f64 / 2.0, frame.height as f64 / 2.0);

        for face in &frame.faces {
            let slot = *index.entry(face.id).or_insert_with(|| {
                order.push(Accum {
                    id: face.id,
                    frame_count: 0,
                    center_dist_sum: 0.0,
                    size_sum: 0.0,
                });
                order.len() - 1
            });
            let accum = &mut order[slot];
            let (cx, cy) = face.bbox.center();
            let dx = cx - frame_center.0;
            let dy = cy - frame_center.1;
            accum.frame_count += 1;
            accum.center_dist_sum += (dx * dx + dy * dy).sqrt();
            accum.size_sum += face.bbox.mean_extent();
        }
    }

    if total_frames == 0 {
        return Vec::new();
    }

    let avg_w = frame_w_sum / total_frames as f64;
    let avg_h = frame_h_sum / total_frames as f64;
    // Normalizers: a quarter of the frame diagonal for centrality, a
    // quarter of the mean frame extent for size.
    let max_dist = 0.25 * (avg_w * avg_w + avg_h * avg_h).sqrt();
    let max_size = 0.25 * (avg_w + avg_h);

    order
        .into_iter()
        .map(|accum| {
            let avg_center_dist = accum.center_dist_sum / accum.frame_count as f64;
            let avg_size = accum.size_sum / accum.frame_count as f64;

            let central_ratio = if max_dist < EPSILON {
                1.0
            } else {
                (1.0 - avg_center_dist / max_dist).clamp(0.0, 1.0)
            };
            let size_ratio = if max_size < EPSILON {
                1.0
            } else {
                (avg_size / max_size).clamp(0.0, 1.0)
            };

            FaceStats {
                id: accum.id,
                frame_count: accum.frame_count,
                avg_center_dist,
                avg_size,
                central_ratio,
                frame_ratio: accum.frame_count as f64 / total_frames as f64,
                size_ratio,
            }
        })
        .collect()
}

/// The identity with the highest mean of the three ratios. The first
/// encountered identity wins ties. `None` when no face was ever seen.
pub fn main_face_from_stats(stats: &[FaceStats]) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for face in stats {
        let score = (face.central_ratio + face.frame_ratio + face.size_ratio) / 3.0;
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((face.id, score)),
        }
    }
    best.map(|(id, _)| id)
}

pub fn main_face_id(sequence: &Sequence) -> Option<u32> {
    main_face_from_stats(&sequence_stats(sequence))
}
