use serde::{Deserialize, Serialize};

/// A landmark point in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (
            self.left as f64 + self.width as f64 / 2.0,
            self.top as f64 + self.height as f64 / 2.0,
        )
    }

    /// Mean of width and height, the face-size measure used by statistics.
    pub fn mean_extent(&self) -> f64 {
        (self.width + self.height) as f64 / 2.0
    }

    /// Axis-aligned bounding box of a point set. Zero box for no points.
    pub fn from_points(points: &[Point]) -> BoundingBox {
        if points.is_empty() {
            return BoundingBox {
                left: 0,
                top: 0,
                width: 0,
                height: 0,
            };
        }
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        BoundingBox {
            left: min_x,
            top: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Clamps the box into `[0, frame_width) x [0, frame_height)`.
    ///
    /// A box with no overlap collapses to zero size at the nearest corner.
    pub fn clamped(&self, frame_width: i32, frame_height: i32) -> BoundingBox {
        let lo_x = self.left.max(0);
        let hi_x = (self.left + self.width).min(frame_width);
        let lo_y = self.top.max(0);
        let hi_y = (self.top + self.height).min(frame_height);
        BoundingBox {
            left: lo_x.min((frame_width - 1).max(0)),
            top: lo_y.min((frame_height - 1).max(0)),
            width: (hi_x - lo_x).max(0),
            height: (hi_y - lo_y).max(0),
        }
    }
}

/// One detected face in a frame.
///
/// Everything except `id` is immutable after detection; `id` is written
/// by the active tracker during a tracking pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub id: u32,
    pub bbox: BoundingBox,
    pub landmarks: Vec<Point>,
}

impl Face {
    pub fn new(bbox: BoundingBox, landmarks: Vec<Point>) -> Self {
        Self {
            id: 0,
            bbox,
            landmarks,
        }
    }
}
