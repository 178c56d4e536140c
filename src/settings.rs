use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::math::{Point2, Vector2};

/// Default grid spacing in scene units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Runtime options of the wire engine.
///
/// Every field has a default, so a partial TOML document is valid:
///
/// ```toml
/// grid_size = 10.0
/// preserve_straight_angles = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Grid spacing used by [`Settings::snap_to_grid`].
    pub grid_size: f64,
    /// Keep wire segments axis-aligned while points are dragged.
    pub preserve_straight_angles: bool,
    /// Extra distance accepted when testing whether a point lies on a wire.
    pub tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            preserve_straight_angles: true,
            tolerance: 0.0,
        }
    }
}

impl Settings {
    /// Parses settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or a field has the
    /// wrong type.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e).into())
    }

    /// Rounds a point to the nearest grid intersection.
    #[must_use]
    pub fn snap_to_grid(&self, point: Point2) -> Point2 {
        Point2::new(self.snap_scalar(point.x), self.snap_scalar(point.y))
    }

    /// Rounds each component of a vector to a multiple of the grid size.
    #[must_use]
    pub fn snap_vector(&self, vector: Vector2) -> Vector2 {
        Vector2::new(self.snap_scalar(vector.x), self.snap_scalar(vector.y))
    }

    fn snap_scalar(&self, value: f64) -> f64 {
        if self.grid_size <= 0.0 {
            return value;
        }
        (value / self.grid_size).round() * self.grid_size
    }
}
