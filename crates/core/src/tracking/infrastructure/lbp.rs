//! Local binary pattern histograms and the incremental appearance model.
//!
//! A crop is encoded as LBP codes (8 neighbors on a radius-3 ring),
//! histogrammed per cell of an 8x8 spatial grid, and the per-cell
//! histograms are concatenated. The model keeps one histogram per
//! training observation and answers queries with the minimum chi-square
//! distance over its observations, so updates refine rather than
//! replace what the identity has looked like so far.

use ndarray::Array1;

use crate::shared::gray_frame::GrayFrame;

const GRID_CELLS: usize = 8;
const BINS: usize = 256;
const EPSILON: f64 = 1e-12;

/// Neighbor offsets on a radius-3 ring, 45 degree steps.
const NEIGHBORS: [(i32, i32); 8] = [
    (3, 0),
    (2, 2),
    (0, 3),
    (-2, 2),
    (-3, 0),
    (-2, -2),
    (0, -3),
    (2, -2),
];

/// Spatial LBP histogram of a crop: `GRID_CELLS^2 * BINS` entries, each
/// cell's histogram normalized by its sample count.
pub fn lbp_histogram(crop: &GrayFrame) -> Array1<f64> {
    let width = crop.width() as i32;
    let height = crop.height() as i32;
    let cell_w = (width as f64 / GRID_CELLS as f64).max(1.0);
    let cell_h = (height as f64 / GRID_CELLS as f64).max(1.0);

    let mut hist = Array1::<f64>::zeros(GRID_CELLS * GRID_CELLS * BINS);
    let mut counts = [0u32; GRID_CELLS * GRID_CELLS];

    // The ring must fit; a 3-pixel margin is skipped on every side.
    for y in 3..height - 3 {
        for x in 3..width - 3 {
            let center = crop.get(x as u32, y as u32);
            let mut code = 0usize;
            for (bit, (dx, dy)) in NEIGHBORS.iter().enumerate() {
                if crop.get((x + dx) as u32, (y + dy) as u32) >= center {
                    code |= 1 << bit;
                }
            }

            let cell_x = ((x as f64 / cell_w) as usize).min(GRID_CELLS - 1);
            let cell_y = ((y as f64 / cell_h) as usize).min(GRID_CELLS - 1);
            let cell = cell_y * GRID_CELLS + cell_x;
            hist[cell * BINS + code] += 1.0;
            counts[cell] += 1;
        }
    }

    for cell in 0..GRID_CELLS * GRID_CELLS {
        if counts[cell] > 0 {
            let total = counts[cell] as f64;
            for bin in 0..BINS {
                hist[cell * BINS + bin] /= total;
            }
        }
    }

    hist
}

/// Asymmetric chi-square distance between a stored histogram and a
/// query, the comparison the appearance tracker thresholds against.
fn chi_square(stored: &Array1<f64>, query: &Array1<f64>) -> f64 {
    let mut dist = 0.0;
    for (a, b) in stored.iter().zip(query.iter()) {
        if *a > EPSILON {
            let d = a - b;
            dist += d * d / a;
        }
    }
    dist
}

/// Incremental appearance model for one identity.
#[derive(Clone, Debug)]
pub struct LbpModel {
    label: u32,
    observations: Vec<Array1<f64>>,
}

impl LbpModel {
    /// Creates the model and trains it on its first observation.
    pub fn train(label: u32, histogram: Array1<f64>) -> Self {
        Self {
            label,
            observations: vec![histogram],
        }
    }

    pub fn label(&self) -> u32 {
        self.label
    }

    /// Adds an observation without discarding earlier ones.
    pub fn update(&mut self, histogram: Array1<f64>) {
        self.observations.push(histogram);
    }

    /// Distance from the query to the nearest stored observation.
    pub fn predict(&self, query: &Array1<f64>) -> f64 {
        self.observations
            .iter()
            .map(|obs| chi_square(obs, query))
            .fold(f64::MAX, f64::min)
    }
}
