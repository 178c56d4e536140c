use crate::math::segment_2d::{
    closest_point_on_segment, point_to_segment_dist, points_coincide, segment_parameter,
};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Axis classification of a non-degenerate line segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Both end points share the same y coordinate.
    Horizontal,
    /// Both end points share the same x coordinate.
    Vertical,
    /// Neither axis-aligned nor degenerate.
    Diagonal,
}

/// A bounded line segment from `p1` to `p2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    p1: Point2,
    p2: Point2,
}

impl Line {
    /// Creates a new segment between two points.
    #[must_use]
    pub fn new(p1: Point2, p2: Point2) -> Self {
        Self { p1, p2 }
    }

    /// Returns the start point.
    #[must_use]
    pub fn p1(&self) -> Point2 {
        self.p1
    }

    /// Returns the end point.
    #[must_use]
    pub fn p2(&self) -> Point2 {
        self.p2
    }

    /// Returns the (unnormalized) direction `p2 - p1`.
    #[must_use]
    pub fn direction(&self) -> Vector2 {
        self.p2 - self.p1
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Whether both end points coincide.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.length() < TOLERANCE
    }

    /// Whether the segment is horizontal. A null segment counts as both
    /// horizontal and vertical.
    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        (self.p2.y - self.p1.y).abs() < TOLERANCE
    }

    /// Whether the segment is vertical. A null segment counts as both
    /// horizontal and vertical.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        (self.p2.x - self.p1.x).abs() < TOLERANCE
    }

    /// Classifies the segment, or `None` if it is null.
    #[must_use]
    pub fn orientation(&self) -> Option<Orientation> {
        if self.is_null() {
            None
        } else if self.is_horizontal() {
            Some(Orientation::Horizontal)
        } else if self.is_vertical() {
            Some(Orientation::Vertical)
        } else {
            Some(Orientation::Diagonal)
        }
    }

    /// Whether `point` lies on the segment within `tolerance`.
    #[must_use]
    pub fn contains_point(&self, point: &Point2, tolerance: f64) -> bool {
        point_to_segment_dist(point, &self.p1, &self.p2) <= tolerance + TOLERANCE
    }

    /// Whether `point` coincides with one of the two end points.
    #[must_use]
    pub fn has_end_point(&self, point: &Point2, tolerance: f64) -> bool {
        points_coincide(&self.p1, point, tolerance) || points_coincide(&self.p2, point, tolerance)
    }

    /// Returns the point of the segment closest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: &Point2) -> Point2 {
        closest_point_on_segment(point, &self.p1, &self.p2)
    }

    /// Returns the clamped parameter of the projection of `point`.
    #[must_use]
    pub fn parameter_of(&self, point: &Point2) -> f64 {
        segment_parameter(point, &self.p1, &self.p2)
    }

    /// Evaluates the segment at parameter `t`: `p1 + t * (p2 - p1)`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        self.p1 + self.direction() * t
    }

    /// Maps a point lying on this segment to the point at the same parameter
    /// on `target`.
    #[must_use]
    pub fn map_onto(&self, point: &Point2, target: &Line) -> Point2 {
        target.point_at(self.parameter_of(point))
    }
}
