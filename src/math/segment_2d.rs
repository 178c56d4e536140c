use super::{Point2, Vector2, TOLERANCE};

/// Returns the clamped projection parameter of `p` onto the segment `a → b`.
///
/// `0` maps to `a`, `1` maps to `b`. A zero-length segment always yields `0`.
#[must_use]
pub fn segment_parameter(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < TOLERANCE * TOLERANCE {
        return 0.0;
    }

    ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0)
}

/// Returns the point of the segment `a → b` closest to `p`.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let t = segment_parameter(p, a, b);
    a + (b - a) * t
}

/// Returns the minimum distance from `p` to the segment `a → b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    (p - closest_point_on_segment(p, a, b)).norm()
}

/// Whether two points are the same within `tolerance` (plus [`TOLERANCE`]).
#[must_use]
pub fn points_coincide(a: &Point2, b: &Point2, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance + TOLERANCE
}

/// Whether a vector is zero within [`TOLERANCE`].
#[must_use]
pub fn is_null_vector(v: &Vector2) -> bool {
    v.x.abs() < TOLERANCE && v.y.abs() < TOLERANCE
}
