use crate::error::{EditError, Result};
use crate::geometry::{Line, Orientation};
use crate::math::segment_2d::{is_null_vector, points_coincide};
use crate::math::{Point2, Vector2, TOLERANCE};
use crate::topology::{NetId, WireId, WirePoint};

use super::WireManager;

/// Closest distance a dragged point may come to its neighbour before the
/// whole segment is pushed along instead.
const MIN_POINT_SPACING: f64 = 2.0;

/// A junction of another wire that has to follow an edit.
#[derive(Debug, Clone, Copy)]
struct Relocation {
    wire: WireId,
    from: Point2,
    to: Point2,
}

impl WireManager {
    // --- Relocation of attached junctions ---

    /// Collects where the junctions of the wires attached to `wire` must go.
    ///
    /// Wires currently being edited further up the call chain are skipped.
    fn plan_relocations<F>(&self, wire: WireId, target: F) -> Result<Vec<Relocation>>
    where
        F: Fn(&Point2) -> Option<Point2>,
    {
        let mut plan = Vec::new();
        for &other in self.wire(wire)?.connected_wires() {
            if self.moving.contains(&other) {
                continue;
            }
            let Some(data) = self.wires.get(other) else {
                continue;
            };
            for point in data.points().iter().filter(|p| p.is_junction) {
                if let Some(to) = target(&point.position) {
                    if !points_coincide(&point.position, &to, 0.0) {
                        plan.push(Relocation {
                            wire: other,
                            from: point.position,
                            to,
                        });
                    }
                }
            }
        }
        Ok(plan)
    }

    fn apply_relocations(&mut self, wire: WireId, plan: Vec<Relocation>) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }
        self.moving.push(wire);
        let outcome = self.follow(plan);
        self.moving.pop();
        outcome
    }

    fn follow(&mut self, plan: Vec<Relocation>) -> Result<()> {
        for relocation in plan {
            // Earlier moves may have shifted indices, so look the junction up again.
            let Some(index) = self.junction_index_at(relocation.wire, &relocation.from) else {
                tracing::warn!(
                    "junction of wire {:?} at {:?} vanished before it could follow",
                    relocation.wire,
                    relocation.from
                );
                continue;
            };
            tracing::trace!(
                "junction {} of wire {:?} follows to {:?}",
                index,
                relocation.wire,
                relocation.to
            );
            self.move_point_by(relocation.wire, index, relocation.to - relocation.from)?;
        }
        Ok(())
    }

    fn junction_index_at(&self, wire: WireId, position: &Point2) -> Option<usize> {
        self.wires
            .get(wire)?
            .points()
            .iter()
            .position(|p| p.is_junction && points_coincide(&p.position, position, 0.0))
    }

    /// Moves several points of one wire at once, carrying attached
    /// junctions along.
    ///
    /// A junction sitting on a moved point goes with it, unless an unmoved
    /// point of the wire stays at the same spot. A junction on a segment
    /// touching a moved point keeps its relative position on that segment.
    fn reshape(&mut self, wire: WireId, moves: &[(usize, Point2)]) -> Result<()> {
        let data = self.wire(wire)?;
        for &(index, _) in moves {
            data.check_index(index)?;
        }
        let before = data.positions();
        let mut after = before.clone();
        for &(index, position) in moves {
            after[index] = position;
        }
        if before == after {
            return Ok(());
        }

        let tolerance = self.settings.tolerance;
        let moved: Vec<usize> = moves.iter().map(|&(index, _)| index).collect();
        let touched: Vec<usize> = (0..data.segment_count())
            .filter(|s| moved.contains(s) || moved.contains(&(s + 1)))
            .collect();

        let plan = self.plan_relocations(wire, |position| {
            if let Some(&i) = moved
                .iter()
                .find(|&&i| points_coincide(position, &before[i], tolerance))
            {
                let held = (0..before.len()).any(|j| {
                    !moved.contains(&j) && points_coincide(&before[j], &before[i], tolerance)
                });
                return (!held).then_some(after[i]);
            }
            touched.iter().find_map(|&s| {
                let old = Line::new(before[s], before[s + 1]);
                old.contains_point(position, tolerance)
                    .then(|| old.map_onto(position, &Line::new(after[s], after[s + 1])))
            })
        })?;
        self.apply_relocations(wire, plan)?;

        let data = self.wire_mut(wire)?;
        for &(index, position) in moves {
            data.set_point_position(index, position)?;
        }
        self.dispatch(wire)
    }

    // --- Point edits ---

    /// Adds a new first point to a wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found.
    pub fn prepend_point(&mut self, wire: WireId, point: Point2) -> Result<()> {
        self.wire_mut(wire)?.prepend(point);
        self.dispatch(wire)
    }

    /// Adds a new last point to a wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found.
    pub fn append_point(&mut self, wire: WireId, point: Point2) -> Result<()> {
        self.wire_mut(wire)?.append(point);
        self.dispatch(wire)
    }

    /// Inserts `point` before the point at `index`, splitting segment
    /// `index - 1`.
    ///
    /// If `point` lies off that segment, junctions on it are carried onto the
    /// two new segments. The point is taken as given; snap it beforehand with
    /// [`Settings::snap_to_grid`](crate::settings::Settings::snap_to_grid)
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or `index` is not in
    /// `1..=len - 1`.
    pub fn insert_point(&mut self, wire: WireId, index: usize, point: Point2) -> Result<()> {
        let data = self.wire(wire)?;
        let len = data.len();
        let segment = match index.checked_sub(1).and_then(|s| data.segment(s)) {
            Some(segment) if index < len => segment,
            _ => return Err(EditError::InsertPosition { index, len }.into()),
        };

        let tolerance = self.settings.tolerance;
        if !segment.contains_point(&point, tolerance) {
            let split = segment.closest_point(&point);
            let first = Line::new(segment.p1(), split);
            let second = Line::new(split, segment.p2());
            let first_new = Line::new(segment.p1(), point);
            let second_new = Line::new(point, segment.p2());
            let plan = self.plan_relocations(wire, |position| {
                if first.contains_point(position, tolerance) {
                    Some(first.map_onto(position, &first_new))
                } else if second.contains_point(position, tolerance) {
                    Some(second.map_onto(position, &second_new))
                } else {
                    None
                }
            })?;
            self.apply_relocations(wire, plan)?;
        }

        self.wire_mut(wire)?.insert_point(index, point)?;
        self.dispatch(wire)
    }

    /// Removes a point, carrying attached junctions onto what remains.
    ///
    /// Junctions on the two segments around an interior point are projected
    /// onto the segment that replaces them. Junctions on a removed end
    /// segment move to the new end point.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or `index` is out of range.
    pub fn remove_point(&mut self, wire: WireId, index: usize) -> Result<WirePoint> {
        let data = self.wire(wire)?;
        data.check_index(index)?;
        let points = data.positions();
        let len = points.len();
        let tolerance = self.settings.tolerance;

        let plan = if index > 0 && index + 1 < len {
            let replacement = Line::new(points[index - 1], points[index + 1]);
            let previous = Line::new(points[index - 1], points[index]);
            let next = Line::new(points[index], points[index + 1]);
            self.plan_relocations(wire, |position| {
                (previous.contains_point(position, tolerance)
                    || next.contains_point(position, tolerance))
                .then(|| replacement.closest_point(position))
            })?
        } else if len >= 2 {
            let (end, new_end) = if index == 0 {
                (Line::new(points[0], points[1]), points[1])
            } else {
                (Line::new(points[len - 2], points[len - 1]), points[len - 2])
            };
            self.plan_relocations(wire, |position| {
                end.contains_point(position, tolerance).then_some(new_end)
            })?
        } else {
            Vec::new()
        };
        self.apply_relocations(wire, plan)?;

        let removed = self.wire_mut(wire)?.remove_point(index)?;
        self.dispatch(wire)?;
        Ok(removed)
    }

    /// Removes the first point.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or has no points.
    pub fn remove_first_point(&mut self, wire: WireId) -> Result<WirePoint> {
        self.remove_point(wire, 0)
    }

    /// Removes the last point.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or has no points.
    pub fn remove_last_point(&mut self, wire: WireId) -> Result<WirePoint> {
        let last = self
            .wire(wire)?
            .len()
            .checked_sub(1)
            .ok_or(EditError::PointIndexOutOfRange { index: 0, len: 0 })?;
        self.remove_point(wire, last)
    }

    /// Moves one point to `position`, carrying attached junctions along.
    /// Does nothing if the point is already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or `index` is out of range.
    pub fn move_point_to(&mut self, wire: WireId, index: usize, position: Point2) -> Result<()> {
        self.reshape(wire, &[(index, position)])
    }

    /// Moves one point by `delta`.
    ///
    /// With straight angles preserved, the neighbours are dragged along the
    /// axis of their segment so the wire stays orthogonal, and a single
    /// straight segment moved off its axis first grows a kink in the middle.
    /// Returns the index of the moved point afterwards, which differs from
    /// `index` when points were inserted before it.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or `index` is out of range.
    pub fn move_point_by(&mut self, wire: WireId, index: usize, delta: Vector2) -> Result<usize> {
        self.wire(wire)?.check_index(index)?;
        if is_null_vector(&delta) {
            return Ok(index);
        }
        let preserve = self.settings.preserve_straight_angles;
        let mut index = index;
        if preserve {
            index = self.insert_straight_stub(wire, index, &delta)?;
        }
        let current = self.point_position(wire, index)?;

        if preserve {
            if index >= 1 {
                let len = self.wire(wire)?.len();
                let previous = self.point_position(wire, index - 1)?;
                if len > 3
                    && index >= 2
                    && (current + delta - previous).norm() <= MIN_POINT_SPACING
                {
                    let segment = self.move_line_segment_by(wire, index - 2, delta)?;
                    index = segment + 2;
                } else {
                    self.drag_neighbor(wire, index, index - 1, &delta)?;
                }
            }
            let len = self.wire(wire)?.len();
            if index + 1 < len {
                let next = self.point_position(wire, index + 1)?;
                if len > 3
                    && index + 2 < len
                    && (current + delta - next).norm() <= MIN_POINT_SPACING
                {
                    self.move_line_segment_by(wire, index + 1, delta)?;
                } else {
                    self.drag_neighbor(wire, index, index + 1, &delta)?;
                }
            }
        }

        self.move_point_to(wire, index, current + delta)?;
        Ok(index)
    }

    /// Splits a lone straight segment in two at its middle when `delta`
    /// leaves its axis, so the move produces a kink instead of a slant.
    fn insert_straight_stub(
        &mut self,
        wire: WireId,
        index: usize,
        delta: &Vector2,
    ) -> Result<usize> {
        let data = self.wire(wire)?;
        let Some(line) = data.segment(0).filter(|_| data.len() == 2) else {
            return Ok(index);
        };
        let off_axis = (line.is_horizontal() && delta.y.abs() >= TOLERANCE)
            || (line.is_vertical() && delta.x.abs() >= TOLERANCE);
        if line.is_null() || !off_axis {
            return Ok(index);
        }

        let midpoint = nalgebra::center(&line.p1(), &line.p2());
        self.insert_point(wire, 1, midpoint)?;
        self.insert_point(wire, 1, midpoint)?;
        tracing::trace!("wire {:?} grew a stub at {:?}", wire, midpoint);

        Ok(if index == 1 { 3 } else { index })
    }

    /// Drags `neighbor` along with `index` so their shared segment keeps
    /// its axis. Junctions inside the segment move with it.
    fn drag_neighbor(
        &mut self,
        wire: WireId,
        index: usize,
        neighbor: usize,
        delta: &Vector2,
    ) -> Result<()> {
        let line = Line::new(
            self.point_position(wire, neighbor)?,
            self.point_position(wire, index)?,
        );
        let constrained = match line.orientation() {
            Some(Orientation::Horizontal) => Vector2::new(0.0, delta.y),
            Some(Orientation::Vertical) => Vector2::new(delta.x, 0.0),
            Some(Orientation::Diagonal) | None => return Ok(()),
        };
        if is_null_vector(&constrained) {
            return Ok(());
        }

        let tolerance = self.settings.tolerance;
        let plan = self.plan_relocations(wire, |position| {
            (line.contains_point(position, tolerance) && !line.has_end_point(position, tolerance))
                .then(|| *position + constrained)
        })?;
        self.apply_relocations(wire, plan)?;

        self.move_point_to(wire, neighbor, line.p1() + constrained)
    }

    /// Moves both points of a segment by `delta`.
    ///
    /// If the segment is the first or the last one and its outer point is
    /// anchored (pinned to a connector or a junction), a point is added at
    /// the anchor first so the wire grows a segment rather than leaving it.
    /// Returns the index of the moved segment afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or `segment` is out of range.
    pub fn move_line_segment_by(
        &mut self,
        wire: WireId,
        segment: usize,
        delta: Vector2,
    ) -> Result<usize> {
        let count = self.wire(wire)?.segment_count();
        if segment >= count {
            return Err(EditError::SegmentIndexOutOfRange {
                index: segment,
                count,
            }
            .into());
        }
        if is_null_vector(&delta) {
            return Ok(segment);
        }

        let mut segment = segment;
        if segment + 1 == count && self.endpoint_is_anchored(wire, count)? {
            let last = self.point_position(wire, count)?;
            self.append_point(wire, last)?;
        }
        if segment == 0 && self.endpoint_is_anchored(wire, 0)? {
            let first = self.point_position(wire, 0)?;
            self.prepend_point(wire, first)?;
            segment += 1;
        }

        let start = self.point_position(wire, segment)? + delta;
        let end = self.point_position(wire, segment + 1)? + delta;
        self.reshape(wire, &[(segment, start), (segment + 1, end)])?;
        Ok(segment)
    }

    fn endpoint_is_anchored(&self, wire: WireId, index: usize) -> Result<bool> {
        let is_junction = self.wire(wire)?.point(index).is_some_and(|p| p.is_junction);
        Ok(is_junction || self.wire_point_is_attached(wire, index))
    }

    /// Translates a whole wire.
    ///
    /// Junctions of attached wires lying on it move along. Its own junctions
    /// that sat on other wires are pulled back so the links survive the move.
    /// Connector pins are left behind; see
    /// [`realign_attached_points`](Self::realign_attached_points).
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found.
    pub fn move_wire_by(&mut self, wire: WireId, delta: Vector2) -> Result<()> {
        if is_null_vector(&delta) {
            self.wire(wire)?;
            return Ok(());
        }
        let tolerance = self.settings.tolerance;
        let data = self.wire(wire)?;
        let segments = data.line_segments();
        let held: Vec<Point2> = data
            .points()
            .iter()
            .filter(|p| p.is_junction)
            .filter(|p| {
                self.wires.iter().any(|(id, other)| {
                    id != wire
                        && other.connected_wires().contains(&wire)
                        && other.point_is_on_wire(&p.position, tolerance)
                })
            })
            .map(|p| p.position)
            .collect();

        let plan = self.plan_relocations(wire, |position| {
            segments
                .iter()
                .any(|s| s.contains_point(position, tolerance))
                .then(|| *position + delta)
        })?;
        self.apply_relocations(wire, plan)?;

        self.wire_mut(wire)?.translate(delta);
        self.dispatch(wire)?;

        for position in held {
            if let Some(index) = self.junction_index_at(wire, &(position + delta)) {
                self.move_point_by(wire, index, -delta)?;
            }
        }
        tracing::debug!("moved wire {:?} by {:?}", wire, delta);
        Ok(())
    }

    /// Interactive counterpart of [`move_point_to`](Self::move_point_to):
    /// moves the point, then re-evaluates what its end point touches.
    ///
    /// Returns the index of the moved point afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or `index` is out of range.
    pub fn user_move_point_to(
        &mut self,
        wire: WireId,
        index: usize,
        position: Point2,
    ) -> Result<usize> {
        let current = self.point_position(wire, index)?;
        let index = self.move_point_by(wire, index, position - current)?;
        self.wire_mut(wire)?.mark_moved_by_user(index)?;
        self.dispatch(wire)?;
        Ok(index)
    }

    // --- Cleanup ---

    /// Drops duplicate and collinear points of one wire.
    ///
    /// Points pinned to a connector are kept like junctions.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found.
    pub fn simplify_wire(&mut self, wire: WireId) -> Result<usize> {
        let pinned: Vec<usize> = self
            .attachments
            .values()
            .filter(|attachment| attachment.wire == wire)
            .map(|attachment| attachment.index)
            .collect();
        let removed = self.wire_mut(wire)?.simplify_keeping(&pinned);
        self.dispatch(wire)?;
        Ok(removed)
    }

    /// Simplifies every wire of a net.
    ///
    /// # Errors
    ///
    /// Returns an error if the net is not found.
    pub fn simplify_net(&mut self, net: NetId) -> Result<usize> {
        let members = self.net(net)?.wires().to_vec();
        let mut removed = 0;
        for wire in members {
            removed += self.simplify_wire(wire)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use slotmap::SlotMap;

    use super::super::testing::{init_tracing, p, wire};
    use super::*;
    use crate::error::WirenetError;
    use crate::settings::Settings;
    use crate::topology::{ChangeEvent, ConnectorId};
    use approx::assert_relative_eq;

    fn free_manager() -> WireManager {
        WireManager::with_settings(Settings {
            preserve_straight_angles: false,
            ..Settings::default()
        })
    }

    fn on_wire(manager: &WireManager, wire: WireId, point: Point2) -> bool {
        manager.wire(wire).unwrap().point_is_on_wire(&point, 0.0)
    }

    #[test]
    fn off_segment_insert_carries_junction() {
        init_tracing();
        let mut manager = free_manager();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        let w2 = manager.add_wire(wire(&[(25.0, 0.0), (25.0, 100.0)]));
        manager.generate_junctions().unwrap();

        manager.insert_point(w1, 1, p(50.0, -20.0)).unwrap();

        let junction = manager.point_position(w2, 0).unwrap();
        assert_relative_eq!(junction, p(25.0, -10.0));
        assert!(on_wire(&manager, w1, junction));
        assert!(manager.are_connected(w1, w2));
    }

    #[test]
    fn insert_rejects_outer_positions() {
        let mut manager = free_manager();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        let err = manager.insert_point(w, 0, p(5.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            WirenetError::Edit(EditError::InsertPosition { index: 0, len: 2 })
        ));
        assert!(manager.insert_point(w, 2, p(5.0, 0.0)).is_err());
        assert_eq!(manager.wire(w).unwrap().len(), 2);
    }

    #[test]
    fn removing_corner_projects_junction() {
        let mut manager = free_manager();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]));
        let w2 = manager.add_wire(wire(&[(25.0, 0.0), (25.0, -100.0)]));
        manager.generate_junctions().unwrap();

        let removed = manager.remove_point(w1, 1).unwrap();
        assert_relative_eq!(removed.position, p(50.0, 0.0));

        let junction = manager.point_position(w2, 0).unwrap();
        assert_relative_eq!(junction, p(12.5, 12.5));
        assert!(on_wire(&manager, w1, junction));
    }

    #[test]
    fn removing_end_moves_junction_to_new_end() {
        let mut manager = free_manager();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]));
        let w2 = manager.add_wire(wire(&[(50.0, 0.0), (50.0, -50.0)]));
        manager.generate_junctions().unwrap();

        manager.remove_first_point(w1).unwrap();

        assert_relative_eq!(manager.point_position(w2, 0).unwrap(), p(100.0, 0.0));
        assert!(on_wire(&manager, w1, p(100.0, 0.0)));
        assert_eq!(manager.wire(w1).unwrap().len(), 2);
    }

    #[test]
    fn invalid_removal_leaves_wire_alone() {
        let mut manager = free_manager();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        assert!(manager.remove_point(w, 2).is_err());
        assert_eq!(manager.wire(w).unwrap().len(), 2);
        manager.remove_last_point(w).unwrap();
        manager.remove_last_point(w).unwrap();
        assert!(manager.remove_last_point(w).is_err());
    }

    #[test]
    fn junction_on_moved_point_follows() {
        let mut manager = free_manager();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        let w2 = manager.add_wire(wire(&[(100.0, 0.0), (100.0, 100.0)]));
        manager.generate_junctions().unwrap();

        manager.move_point_to(w1, 1, p(100.0, 20.0)).unwrap();

        assert_relative_eq!(manager.point_position(w1, 1).unwrap(), p(100.0, 20.0));
        assert_relative_eq!(manager.point_position(w2, 0).unwrap(), p(100.0, 20.0));
    }

    #[test]
    fn junction_on_stretched_segment_keeps_parameter() {
        let mut manager = free_manager();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        let w2 = manager.add_wire(wire(&[(50.0, 0.0), (50.0, 100.0)]));
        manager.generate_junctions().unwrap();

        manager.move_point_to(w1, 1, p(100.0, 40.0)).unwrap();

        assert_relative_eq!(manager.point_position(w2, 0).unwrap(), p(50.0, 20.0));
        assert!(on_wire(&manager, w1, p(50.0, 20.0)));
    }

    #[test]
    fn unchanged_move_publishes_nothing() {
        let mut manager = free_manager();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        manager.move_point_to(w, 1, p(100.0, 0.0)).unwrap();
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn off_axis_move_of_single_segment_grows_stub() {
        let mut manager = WireManager::new();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));

        let index = manager.move_point_by(w, 1, Vector2::new(0.0, 40.0)).unwrap();

        assert_eq!(index, 3);
        assert_eq!(
            manager.wire(w).unwrap().positions(),
            vec![p(0.0, 0.0), p(50.0, 0.0), p(50.0, 40.0), p(100.0, 40.0)]
        );
    }

    #[test]
    fn short_segment_stub_sits_between_its_ends() {
        let mut manager = WireManager::new();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (1.0, 0.0)]));

        manager.move_point_by(w, 1, Vector2::new(0.0, 10.0)).unwrap();

        assert_eq!(
            manager.wire(w).unwrap().positions(),
            vec![p(0.0, 0.0), p(0.5, 0.0), p(0.5, 10.0), p(1.0, 10.0)]
        );
    }

    #[test]
    fn on_axis_move_of_single_segment_stays_straight() {
        let mut manager = WireManager::new();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        assert_eq!(manager.move_point_by(w, 1, Vector2::new(30.0, 0.0)).unwrap(), 1);
        assert_eq!(manager.wire(w).unwrap().positions(), vec![p(0.0, 0.0), p(130.0, 0.0)]);
    }

    #[test]
    fn dragging_keeps_segments_orthogonal() {
        let mut manager = WireManager::new();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (0.0, 50.0), (100.0, 50.0), (100.0, 100.0)]));

        manager.move_point_by(w, 1, Vector2::new(0.0, 10.0)).unwrap();

        assert_eq!(
            manager.wire(w).unwrap().positions(),
            vec![p(0.0, 0.0), p(0.0, 60.0), p(100.0, 60.0), p(100.0, 100.0)]
        );
        for segment in manager.wire(w).unwrap().line_segments() {
            assert!(segment.is_horizontal() || segment.is_vertical());
        }
    }

    #[test]
    fn dragging_carries_junction_on_segment() {
        let mut manager = WireManager::new();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (0.0, 50.0), (100.0, 50.0), (100.0, 100.0)]));
        let branch = manager.add_wire(wire(&[(50.0, 50.0), (50.0, -50.0)]));
        manager.generate_junctions().unwrap();

        manager.move_point_by(w, 1, Vector2::new(0.0, 10.0)).unwrap();

        let junction = manager.point_position(branch, 0).unwrap();
        assert_relative_eq!(junction, p(50.0, 60.0));
        assert!(on_wire(&manager, w, junction));
        assert_relative_eq!(manager.point_position(branch, 1).unwrap(), p(50.0, -50.0));
    }

    #[test]
    fn colliding_neighbour_pushes_segment() {
        let mut manager = WireManager::new();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (0.0, 50.0), (50.0, 50.0), (50.0, 100.0)]));

        let index = manager.move_point_by(w, 2, Vector2::new(-49.0, 0.0)).unwrap();

        assert_eq!(index, 2);
        assert_eq!(
            manager.wire(w).unwrap().positions(),
            vec![p(-49.0, 0.0), p(-49.0, 50.0), p(1.0, 50.0), p(1.0, 100.0)]
        );
    }

    #[test]
    fn anchored_segment_grows_instead_of_leaving() {
        let mut manager = free_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(0.0, 0.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (0.0, 50.0), (100.0, 50.0)]));
        manager.attach_wire_to_connector(w, 0, c).unwrap();

        let segment = manager.move_line_segment_by(w, 0, Vector2::new(20.0, 0.0)).unwrap();

        assert_eq!(segment, 1);
        assert_eq!(
            manager.wire(w).unwrap().positions(),
            vec![p(0.0, 0.0), p(20.0, 0.0), p(20.0, 50.0), p(100.0, 50.0)]
        );
        assert_eq!(manager.attached_wire_point(c), Some(0));
    }

    #[test]
    fn anchored_junction_end_grows_segment() {
        let mut manager = free_manager();
        let trunk = manager.add_wire(wire(&[(0.0, 100.0), (200.0, 100.0)]));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]));
        manager.generate_junctions().unwrap();
        assert_eq!(manager.wire(w).unwrap().junctions(), vec![2]);

        let segment = manager.move_line_segment_by(w, 1, Vector2::new(30.0, 0.0)).unwrap();

        assert_eq!(segment, 1);
        let data = manager.wire(w).unwrap();
        assert_eq!(
            data.positions(),
            vec![p(0.0, 0.0), p(130.0, 0.0), p(130.0, 100.0), p(100.0, 100.0)]
        );
        assert_eq!(data.junctions(), vec![3]);
        assert!(manager.are_connected(trunk, w));
    }

    #[test]
    fn free_segment_just_moves() {
        let mut manager = free_manager();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (0.0, 50.0), (100.0, 50.0)]));
        assert_eq!(manager.move_line_segment_by(w, 0, Vector2::new(20.0, 0.0)).unwrap(), 0);
        assert_eq!(
            manager.wire(w).unwrap().positions(),
            vec![p(20.0, 0.0), p(20.0, 50.0), p(100.0, 50.0)]
        );
        assert!(matches!(
            manager.move_line_segment_by(w, 2, Vector2::new(1.0, 0.0)),
            Err(WirenetError::Edit(EditError::SegmentIndexOutOfRange { index: 2, count: 2 }))
        ));
    }

    #[test]
    fn moving_wire_carries_attached_junctions() {
        let mut manager = WireManager::new();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        let w2 = manager.add_wire(wire(&[(50.0, 0.0), (50.0, 100.0)]));
        manager.generate_junctions().unwrap();

        manager.move_wire_by(w1, Vector2::new(0.0, 20.0)).unwrap();

        assert_eq!(manager.wire(w1).unwrap().positions(), vec![p(0.0, 20.0), p(100.0, 20.0)]);
        assert_relative_eq!(manager.point_position(w2, 0).unwrap(), p(50.0, 20.0));
        assert!(manager.are_connected(w1, w2));
    }

    #[test]
    fn moving_wire_keeps_its_own_junctions_in_place() {
        let mut manager = WireManager::new();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        let w2 = manager.add_wire(wire(&[(50.0, 0.0), (50.0, 100.0)]));
        manager.generate_junctions().unwrap();

        manager.move_wire_by(w2, Vector2::new(10.0, 0.0)).unwrap();

        let data = manager.wire(w2).unwrap();
        assert_eq!(
            data.positions(),
            vec![p(50.0, 0.0), p(50.0, 50.0), p(60.0, 50.0), p(60.0, 100.0)]
        );
        assert!(data.points()[0].is_junction);
        assert!(manager.are_connected(w1, w2));
    }

    #[test]
    fn user_drop_onto_wire_connects() {
        let mut manager = WireManager::new();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        let w2 = manager.add_wire(wire(&[(50.0, 30.0), (50.0, 100.0)]));

        let index = manager.user_move_point_to(w2, 0, p(50.0, 0.0)).unwrap();

        assert_eq!(index, 0);
        assert!(manager.are_connected(w1, w2));
        assert_eq!(manager.net_of(w1), manager.net_of(w2));
        assert!(manager.wire(w2).unwrap().points()[0].is_junction);
        let events = manager.drain_events();
        assert!(events.contains(&ChangeEvent::PointMovedByUser { wire: w2, index: 0 }));
        assert!(events.contains(&ChangeEvent::PointMoved {
            wire: w2,
            index: 0,
            position: p(50.0, 0.0)
        }));
    }

    #[test]
    fn user_drag_away_disconnects() {
        let mut manager = WireManager::new();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        let w2 = manager.add_wire(wire(&[(50.0, 0.0), (50.0, 100.0)]));
        manager.generate_junctions().unwrap();

        manager.user_move_point_to(w2, 0, p(50.0, 40.0)).unwrap();

        assert!(!manager.are_connected(w1, w2));
        assert_ne!(manager.net_of(w1), manager.net_of(w2));
        assert!(manager.wire(w2).unwrap().junctions().is_empty());
    }

    #[test]
    fn simplify_net_cleans_every_member() {
        let mut manager = free_manager();
        let w1 = manager.add_wire(wire(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)]));
        let w2 = manager.add_wire(wire(&[(0.0, 0.0), (0.0, 10.0), (0.0, 10.0), (0.0, 20.0)]));
        manager.connect_wire(w1, w2).unwrap();
        let net = manager.net_of(w1).unwrap();

        assert_eq!(manager.simplify_net(net).unwrap(), 3);
        assert_eq!(manager.wire(w1).unwrap().len(), 2);
        assert_eq!(manager.wire(w2).unwrap().len(), 2);
        assert_eq!(manager.simplify_net(net).unwrap(), 0);
    }

    #[test]
    fn prepend_and_append_publish_events() {
        let mut manager = free_manager();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (10.0, 0.0)]));
        manager.prepend_point(w, p(-10.0, 0.0)).unwrap();
        manager.append_point(w, p(20.0, 0.0)).unwrap();
        let events = manager.drain_events();
        assert_eq!(events[0], ChangeEvent::PointInserted { wire: w, index: 0 });
        assert_eq!(events[2], ChangeEvent::PointInserted { wire: w, index: 3 });
        assert_eq!(manager.wire(w).unwrap().len(), 4);
    }
}
