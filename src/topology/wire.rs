use crate::error::EditError;
use crate::geometry::Line;
use crate::math::{Point2, Vector2};

use super::event::WireEvent;
use super::net::NetId;
use super::point::WirePoint;

slotmap::new_key_type! {
    /// Unique identifier for a wire in the wire store.
    pub struct WireId;
}

/// Data associated with a wire.
///
/// A wire is an ordered polyline of [`WirePoint`]s. It also lists the wires
/// whose junction points sit on its geometry (its *attached* wires) and keeps a
/// back-reference to its owning net.
///
/// The methods here only touch the wire itself. Structural edits queue
/// [`WireEvent`]s that the manager drains; edits that must drag the junctions
/// of other wires live on [`WireManager`](crate::manager::WireManager).
#[derive(Debug, Clone, Default)]
pub struct WireData {
    points: Vec<WirePoint>,
    connected_wires: Vec<WireId>,
    net: Option<NetId>,
    events: Vec<WireEvent>,
}

impl WireData {
    /// Creates an empty wire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a wire from a sequence of plain points.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        Self {
            points: points.into_iter().map(WirePoint::new).collect(),
            ..Self::default()
        }
    }

    // --- Geometry queries ---

    #[must_use]
    pub fn points(&self) -> &[WirePoint] {
        &self.points
    }

    /// Returns the point at `index`, if any.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<&WirePoint> {
        self.points.get(index)
    }

    /// Returns the positions of all points.
    #[must_use]
    pub fn positions(&self) -> Vec<Point2> {
        self.points.iter().map(|p| p.position).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether `index` is the first or the last point.
    #[must_use]
    pub fn is_endpoint(&self, index: usize) -> bool {
        !self.points.is_empty() && (index == 0 || index + 1 == self.points.len())
    }

    /// Number of line segments (`len - 1`, or `0` for fewer than two points).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Returns the segment from point `index` to point `index + 1`.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<Line> {
        let a = self.points.get(index)?;
        let b = self.points.get(index + 1)?;
        Some(Line::new(a.position, b.position))
    }

    /// Returns the `N - 1` segments formed by `N` points.
    #[must_use]
    pub fn line_segments(&self) -> Vec<Line> {
        self.points
            .windows(2)
            .map(|w| Line::new(w[0].position, w[1].position))
            .collect()
    }

    /// Indices of the points flagged as junctions.
    #[must_use]
    pub fn junctions(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_junction)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether `point` lies on one of the segments within `tolerance`.
    #[must_use]
    pub fn point_is_on_wire(&self, point: &Point2, tolerance: f64) -> bool {
        self.line_segments()
            .iter()
            .any(|segment| segment.contains_point(point, tolerance))
    }

    /// Returns `Ok` if `index` addresses an existing point.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::PointIndexOutOfRange`] otherwise.
    pub fn check_index(&self, index: usize) -> Result<(), EditError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(EditError::PointIndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }

    // --- Connections ---

    /// Wires whose junctions sit on this wire.
    #[must_use]
    pub fn connected_wires(&self) -> &[WireId] {
        &self.connected_wires
    }

    /// Records `wire` as attached; returns `false` if it already was.
    pub fn connect_wire(&mut self, wire: WireId) -> bool {
        if self.connected_wires.contains(&wire) {
            return false;
        }
        self.connected_wires.push(wire);
        true
    }

    /// Forgets `wire`; returns `false` if it was not attached.
    pub fn disconnect_wire(&mut self, wire: WireId) -> bool {
        let before = self.connected_wires.len();
        self.connected_wires.retain(|w| *w != wire);
        self.connected_wires.len() < before
    }

    /// The net owning this wire, once registered with a manager.
    #[must_use]
    pub fn net(&self) -> Option<NetId> {
        self.net
    }

    pub(crate) fn set_net(&mut self, net: Option<NetId>) {
        self.net = net;
    }

    /// Drops references that only make sense inside a particular store.
    ///
    /// An unlinked wire touches nothing, so its junction flags go as well.
    pub(crate) fn reset_links(&mut self) {
        self.connected_wires.clear();
        self.net = None;
        self.events.clear();
        for point in &mut self.points {
            point.is_junction = false;
        }
    }

    // --- Point mutation ---

    /// Sets or clears the junction flag of a point.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn set_point_is_junction(
        &mut self,
        index: usize,
        is_junction: bool,
    ) -> Result<(), EditError> {
        self.check_index(index)?;
        self.points[index].is_junction = is_junction;
        Ok(())
    }

    /// Adds a new first point.
    ///
    /// Junction marking lives on the outermost point: if the wire already had
    /// two or more points, the old first point hands its flag to the new one.
    pub fn prepend(&mut self, point: Point2) {
        let had_segment = self.points.len() >= 2;
        self.points.insert(0, WirePoint::new(point));
        if had_segment {
            self.points[0].is_junction = self.points[1].is_junction;
            self.points[1].is_junction = false;
        }
        self.events.push(WireEvent::PointInserted { index: 0 });
        self.events.push(WireEvent::PointMoved {
            index: 0,
            position: point,
        });
    }

    /// Adds a new last point, moving the junction flag like [`prepend`](Self::prepend).
    pub fn append(&mut self, point: Point2) {
        let had_segment = self.points.len() >= 2;
        self.points.push(WirePoint::new(point));
        let last = self.points.len() - 1;
        if had_segment {
            self.points[last].is_junction = self.points[last - 1].is_junction;
            self.points[last - 1].is_junction = false;
        }
        self.events.push(WireEvent::PointInserted { index: last });
        self.events.push(WireEvent::PointMoved {
            index: last,
            position: point,
        });
    }

    /// Inserts a point between two existing ones.
    ///
    /// `index` must lie in `1..=len - 1`; the end points can only be extended
    /// with [`prepend`](Self::prepend) and [`append`](Self::append).
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InsertPosition`] for any other index.
    pub fn insert_point(&mut self, index: usize, point: Point2) -> Result<(), EditError> {
        let len = self.points.len();
        if index == 0 || index >= len {
            return Err(EditError::InsertPosition { index, len });
        }
        self.points.insert(index, WirePoint::new(point));
        self.events.push(WireEvent::PointInserted { index });
        self.events.push(WireEvent::PointMoved {
            index,
            position: point,
        });
        Ok(())
    }

    /// Removes a point.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn remove_point(&mut self, index: usize) -> Result<WirePoint, EditError> {
        self.check_index(index)?;
        let removed = self.points.remove(index);
        self.events.push(WireEvent::PointRemoved { index });
        Ok(removed)
    }

    /// Moves a point, keeping its junction flag.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn set_point_position(&mut self, index: usize, position: Point2) -> Result<(), EditError> {
        self.check_index(index)?;
        self.points[index].position = position;
        self.events.push(WireEvent::PointMoved { index, position });
        Ok(())
    }

    /// Translates every point.
    pub fn translate(&mut self, delta: Vector2) {
        for (index, point) in self.points.iter_mut().enumerate() {
            point.position += delta;
            self.events.push(WireEvent::PointMoved {
                index,
                position: point.position,
            });
        }
    }

    /// Records that an interactive edit moved the point at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn mark_moved_by_user(&mut self, index: usize) -> Result<(), EditError> {
        self.check_index(index)?;
        self.events.push(WireEvent::UserMovedEndpoint { index });
        Ok(())
    }

    /// Removes redundant points and returns how many were dropped.
    ///
    /// First collapses consecutive duplicates, then prunes interior points
    /// lying on the segment between their neighbours. Junction points are kept
    /// and the wire never drops below two points.
    pub fn simplify(&mut self) -> usize {
        self.simplify_keeping(&[])
    }

    /// Like [`simplify`](Self::simplify), but the points at the `kept`
    /// indices are never pruned as collinear.
    ///
    /// A kept point dropped as a duplicate hands its status to the
    /// coinciding point that survives.
    pub fn simplify_keeping(&mut self, kept: &[usize]) -> usize {
        let mut held: Vec<bool> = (0..self.points.len()).map(|i| kept.contains(&i)).collect();
        self.remove_duplicate_points(&mut held) + self.remove_obsolete_points(&mut held)
    }

    fn remove_duplicate_points(&mut self, held: &mut Vec<bool>) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i + 1 < self.points.len() && self.points.len() > 2 {
            if self.points[i].coincides_with(&self.points[i + 1], 0.0) {
                // The surviving point inherits the flag of its duplicate.
                if !self.points[i].is_junction {
                    self.points[i].is_junction = self.points[i + 1].is_junction;
                }
                held[i] |= held[i + 1];
                held.remove(i + 1);
                self.points.remove(i + 1);
                self.events.push(WireEvent::PointRemoved { index: i + 1 });
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    fn remove_obsolete_points(&mut self, held: &mut Vec<bool>) -> usize {
        let mut removed = 0;
        // After a removal the window is re-tested from the point before the
        // removed one, so `i` stays put.
        let mut i = 2;
        while i < self.points.len() {
            let (a, b, c) = (self.points[i - 2], self.points[i - 1], self.points[i]);
            let required = b.is_junction || held[i - 1];
            if !required && Line::new(a.position, c.position).contains_point(&b.position, 0.0) {
                held.remove(i - 1);
                self.points.remove(i - 1);
                self.events.push(WireEvent::PointRemoved { index: i - 1 });
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    /// Drains the queued events.
    pub(crate) fn take_events(&mut self) -> Vec<WireEvent> {
        std::mem::take(&mut self.events)
    }
}
