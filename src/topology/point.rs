use crate::math::segment_2d::points_coincide;
use crate::math::Point2;

/// A single vertex of a wire polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WirePoint {
    /// Scene position of the point.
    pub position: Point2,
    /// `true` if the point is bonded to the geometry of another wire.
    pub is_junction: bool,
}

impl WirePoint {
    /// Creates a plain (non-junction) point.
    #[must_use]
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            is_junction: false,
        }
    }

    /// Creates a point flagged as a junction.
    #[must_use]
    pub fn junction(position: Point2) -> Self {
        Self {
            position,
            is_junction: true,
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Geometric equality, ignoring the junction flag.
    #[must_use]
    pub fn coincides_with(&self, other: &WirePoint, tolerance: f64) -> bool {
        points_coincide(&self.position, &other.position, tolerance)
    }
}

impl From<Point2> for WirePoint {
    fn from(position: Point2) -> Self {
        Self::new(position)
    }
}
