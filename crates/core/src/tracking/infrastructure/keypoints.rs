//! Keypoint scale estimation and binary descriptor extraction.
//!
//! One 256-bit descriptor is computed per landmark by comparing pixel
//! pairs from a fixed pseudo-random sampling pattern, scaled to the
//! face's keypoint scale. Landmarks whose sampling window leaves the
//! image are dropped; `DescriptorSet::indices` maps each retained
//! descriptor back to its landmark index.

use std::sync::OnceLock;

use imageproc::corners::corners_fast9;

use crate::sequence::domain::face::{BoundingBox, Point};
use crate::shared::constants::{FALLBACK_KEYPOINT_SCALE, FAST_CORNER_THRESHOLD};
use crate::shared::gray_frame::GrayFrame;

pub const DESCRIPTOR_BITS: usize = 256;
pub const DESCRIPTOR_BYTES: usize = DESCRIPTOR_BITS / 8;

/// Patch radius bounds for descriptor sampling.
const MIN_SCALE: f64 = 2.0;
const MAX_SCALE: f64 = 32.0;

#[derive(Clone, Debug, Default)]
pub struct DescriptorSet {
    /// One packed 256-bit descriptor per retained landmark.
    pub descriptors: Vec<[u8; DESCRIPTOR_BYTES]>,
    /// Ascending landmark indices, parallel to `descriptors`.
    pub indices: Vec<usize>,
}

impl DescriptorSet {
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Estimates a uniform keypoint scale for a face region.
///
/// FAST corners carry no intrinsic size, so each detected corner's size
/// is estimated from detection density (`sqrt(area / corners)`); the
/// scale is the average of those sizes, clamped to a usable patch
/// radius. Falls back to a fixed constant when no corners are detected.
pub fn keypoint_scale(image: &GrayFrame, bbox: &BoundingBox) -> f64 {
    let clamped = bbox.clamped(image.width() as i32, image.height() as i32);
    if clamped.width < 1 || clamped.height < 1 {
        return FALLBACK_KEYPOINT_SCALE;
    }

    let roi = image.roi_image(&clamped);
    let corners = corners_fast9(&roi, FAST_CORNER_THRESHOLD);
    if corners.is_empty() {
        return FALLBACK_KEYPOINT_SCALE;
    }

    let area = clamped.width as f64 * clamped.height as f64;
    let size = (area / corners.len() as f64).sqrt();
    size.clamp(MIN_SCALE, MAX_SCALE)
}

/// Computes one binary descriptor per landmark at the given scale.
pub fn compute_descriptors(image: &GrayFrame, landmarks: &[Point], scale: f64) -> DescriptorSet {
    let pattern = sampling_pattern();
    let width = image.width() as i64;
    let height = image.height() as i64;
    let radius = scale.ceil() as i64;

    let mut set = DescriptorSet::default();
    for (index, lm) in landmarks.iter().enumerate() {
        let cx = lm.x as i64;
        let cy = lm.y as i64;
        // Descriptors are only computed where the whole sampling window
        // fits; landmarks near the image border are dropped.
        if cx - radius < 0 || cy - radius < 0 || cx + radius >= width || cy + radius >= height {
            continue;
        }

        let mut descriptor = [0u8; DESCRIPTOR_BYTES];
        for (bit, (ax, ay, bx, by)) in pattern.iter().enumerate() {
            let pa = sample(image, cx, cy, *ax, *ay, scale);
            let pb = sample(image, cx, cy, *bx, *by, scale);
            if pa < pb {
                descriptor[bit / 8] |= 1 << (bit % 8);
            }
        }
        set.descriptors.push(descriptor);
        set.indices.push(index);
    }
    set
}

/// Mean Hamming distance over the landmark indices retained by both
/// sets. `None` when the intersection is empty: the caller decides what
/// "no confidence" means for its distance blend.
pub fn hamming_mean(a: &DescriptorSet, b: &DescriptorSet) -> Option<f64> {
    let mut total = 0u64;
    let mut count = 0u64;

    let mut i = 0;
    let mut j = 0;
    while i < a.indices.len() && j < b.indices.len() {
        match a.indices[i].cmp(&b.indices[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                total += hamming(&a.descriptors[i], &b.descriptors[j]);
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    Some(total as f64 / count as f64)
}

fn hamming(a: &[u8; DESCRIPTOR_BYTES], b: &[u8; DESCRIPTOR_BYTES]) -> u64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones() as u64)
        .sum()
}

fn sample(image: &GrayFrame, cx: i64, cy: i64, ox: f32, oy: f32, scale: f64) -> u8 {
    let x = (cx as f64 + ox as f64 * scale).round() as u32;
    let y = (cy as f64 + oy as f64 * scale).round() as u32;
    image.get(x, y)
}

/// Fixed pairwise sampling pattern in the unit square, generated once
/// from a deterministic generator so descriptors are reproducible
/// across runs and processes.
fn sampling_pattern() -> &'static [(f32, f32, f32, f32); DESCRIPTOR_BITS] {
    static PATTERN: OnceLock<[(f32, f32, f32, f32); DESCRIPTOR_BITS]> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            // Top 24 bits mapped into [-1, 1).
            ((state >> 40) as f32 / (1u32 << 23) as f32) - 1.0
        };
        std::array::from_fn(|_| (next(), next(), next(), next()))
    })
}
