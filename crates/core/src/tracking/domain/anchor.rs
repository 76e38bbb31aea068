use crate::sequence::domain::face::Point;

/// Unweighted centroid of a landmark set, the anchor position used for
/// spatial distances. An empty set yields the zero vector rather than a
/// division by zero; such a candidate can still match on appearance.
pub fn landmark_centroid(landmarks: &[Point]) -> (f64, f64) {
    if landmarks.is_empty() {
        return (0.0, 0.0);
    }
    let mut sx = 0.0;
    let mut sy = 0.0;
    for p in landmarks {
        sx += p.x as f64;
        sy += p.y as f64;
    }
    let n = landmarks.len() as f64;
    (sx / n, sy / n)
}

pub fn euclidean(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}
