//! Storage layout of a wire network, independent of the file format.
//!
//! Each wire stores its points with an explicit index, so a codec may hand
//! them back in any order. Nets and junctions are not stored: they are
//! rebuilt from geometry when the wires are loaded.

use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};
use crate::manager::WireManager;
use crate::math::Point2;
use crate::topology::{WireData, WireId};

/// One stored wire point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

/// One stored wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    pub points: Vec<PointRecord>,
}

impl WireRecord {
    /// Snapshots the geometry of a wire.
    #[must_use]
    pub fn from_wire(wire: &WireData) -> Self {
        Self {
            points: wire
                .points()
                .iter()
                .enumerate()
                .map(|(index, point)| PointRecord {
                    index,
                    x: point.x(),
                    y: point.y(),
                })
                .collect(),
        }
    }

    /// Returns the points in index order.
    ///
    /// # Errors
    ///
    /// Returns an error if an index repeats or the indices skip a value.
    pub fn into_points(mut self) -> std::result::Result<Vec<Point2>, PersistError> {
        self.points.sort_by_key(|record| record.index);
        for (expected, pair) in self.points.windows(2).enumerate() {
            if pair[0].index == pair[1].index {
                return Err(PersistError::DuplicatePointIndex(pair[0].index));
            }
            if pair[0].index != expected {
                return Err(PersistError::GapInPointIndices {
                    expected,
                    found: pair[0].index,
                });
            }
        }
        if let Some(last) = self.points.last() {
            let expected = self.points.len() - 1;
            if last.index != expected {
                return Err(PersistError::GapInPointIndices {
                    expected,
                    found: last.index,
                });
            }
        }
        Ok(self
            .points
            .into_iter()
            .map(|record| Point2::new(record.x, record.y))
            .collect())
    }

    /// Rebuilds an unconnected wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the point indices are inconsistent.
    pub fn into_wire(self) -> std::result::Result<WireData, PersistError> {
        Ok(WireData::from_points(self.into_points()?))
    }
}

/// A stored wire network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub wires: Vec<WireRecord>,
}

impl WireManager {
    /// Adds every stored wire, then rebuilds junctions and nets.
    ///
    /// Nothing is added if any record is invalid. Returns the new wire ids in
    /// record order.
    ///
    /// # Errors
    ///
    /// Returns an error if a record has inconsistent point indices.
    pub fn load(&mut self, record: NetworkRecord) -> Result<Vec<WireId>> {
        let wires = record
            .wires
            .into_iter()
            .map(WireRecord::into_wire)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let ids: Vec<WireId> = wires.into_iter().map(|wire| self.add_wire(wire)).collect();
        let links = self.generate_junctions()?;
        tracing::debug!("loaded {} wires with {} links", ids.len(), links);
        Ok(ids)
    }

    /// Snapshots the geometry of every wire.
    #[must_use]
    pub fn to_record(&self) -> NetworkRecord {
        NetworkRecord {
            wires: self
                .wires()
                .map(|(_, wire)| WireRecord::from_wire(wire))
                .collect(),
        }
    }
}
