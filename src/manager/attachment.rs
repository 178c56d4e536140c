use crate::error::{EditError, Result, TopologyError};
use crate::math::segment_2d::{is_null_vector, points_coincide};
use crate::math::Point2;
use crate::topology::{Attachment, ConnectorId, ConnectorRegistry, WireId};

use super::WireManager;

impl WireManager {
    /// Pins `connector` to the point `index` of `wire`.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is unknown, `index` is out of range, or
    /// the connector is already pinned somewhere.
    pub fn attach_wire_to_connector(
        &mut self,
        wire: WireId,
        index: usize,
        connector: ConnectorId,
    ) -> Result<()> {
        self.wire(wire)?.check_index(index)?;
        if self.attachments.contains_key(&connector) {
            return Err(TopologyError::ConnectorAlreadyAttached.into());
        }
        self.attachments.insert(connector, Attachment { wire, index });
        tracing::debug!("attached connector {:?} to wire {:?} point {}", connector, wire, index);
        Ok(())
    }

    /// Pins `connector` to whichever end of `wire` sits at `position`.
    ///
    /// Returns `false` without attaching if neither end is there.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is unknown or the connector is already
    /// pinned.
    pub fn attach_wire_endpoint_to_connector(
        &mut self,
        wire: WireId,
        connector: ConnectorId,
        position: Point2,
    ) -> Result<bool> {
        let tolerance = self.settings.tolerance;
        let points = self.wire(wire)?.points();
        let index = match (points.first(), points.last()) {
            (Some(first), _) if points_coincide(&first.position, &position, tolerance) => 0,
            (_, Some(last)) if points_coincide(&last.position, &position, tolerance) => {
                points.len() - 1
            }
            _ => return Ok(false),
        };
        self.attach_wire_to_connector(wire, index, connector)?;
        Ok(true)
    }

    /// Pins every free connector of `registry` that sits on a wire end.
    ///
    /// Returns the number of new attachments.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn attach_connectors(&mut self, registry: &impl ConnectorRegistry) -> Result<usize> {
        let wires: Vec<WireId> = self.wires.keys().collect();
        let mut attached = 0;
        for connector in registry.connectors() {
            if self.attachments.contains_key(&connector) {
                continue;
            }
            let Some(position) = registry.connector_position(connector) else {
                continue;
            };
            for &wire in &wires {
                if self.attach_wire_endpoint_to_connector(wire, connector, position)? {
                    attached += 1;
                    break;
                }
            }
        }
        Ok(attached)
    }

    /// Releases a connector, returning the pin it held.
    pub fn detach_wire(&mut self, connector: ConnectorId) -> Option<Attachment> {
        let removed = self.attachments.remove(&connector);
        if removed.is_some() {
            tracing::debug!("detached connector {:?}", connector);
        }
        removed
    }

    /// Releases every connector pinned to `wire`.
    pub fn detach_wire_from_all(&mut self, wire: WireId) -> usize {
        let before = self.attachments.len();
        self.attachments.retain(|_, attachment| attachment.wire != wire);
        before - self.attachments.len()
    }

    /// Connectors pinned to `wire`.
    #[must_use]
    pub fn connectors_attached_to_wire(&self, wire: WireId) -> Vec<ConnectorId> {
        self.attachments
            .iter()
            .filter(|(_, attachment)| attachment.wire == wire)
            .map(|(connector, _)| *connector)
            .collect()
    }

    #[must_use]
    pub fn attachment(&self, connector: ConnectorId) -> Option<Attachment> {
        self.attachments.get(&connector).copied()
    }

    /// The wire a connector is pinned to.
    #[must_use]
    pub fn attached_wire(&self, connector: ConnectorId) -> Option<WireId> {
        self.attachment(connector).map(|attachment| attachment.wire)
    }

    /// The point index a connector is pinned to.
    #[must_use]
    pub fn attached_wire_point(&self, connector: ConnectorId) -> Option<usize> {
        self.attachment(connector).map(|attachment| attachment.index)
    }

    /// Whether any connector is pinned to the point `index` of `wire`.
    #[must_use]
    pub fn wire_point_is_attached(&self, wire: WireId, index: usize) -> bool {
        self.attachments
            .values()
            .any(|attachment| attachment.wire == wire && attachment.index == index)
    }

    /// Keeps pins on the same logical point after a point was inserted at
    /// `index`.
    ///
    /// A pin on the first point never moves. A pin on the former last point
    /// follows it to the new end.
    pub(crate) fn point_inserted(&mut self, wire: WireId, index: usize) {
        let len = self.wires.get(wire).map_or(0, |data| data.len());
        for attachment in self.attachments.values_mut().filter(|a| a.wire == wire) {
            if attachment.index == 0 {
                continue;
            }
            if attachment.index >= index || attachment.index + 2 == len {
                attachment.index += 1;
                tracing::trace!("pin on wire {:?} shifted to {}", wire, attachment.index);
            }
        }
    }

    /// Keeps pins on the same logical point after the point at `index` was
    /// removed. Pins of a wire left without points are released.
    pub(crate) fn point_removed(&mut self, wire: WireId, index: usize) {
        if self.wires.get(wire).map_or(true, |data| data.is_empty()) {
            self.detach_wire_from_all(wire);
            return;
        }
        for attachment in self.attachments.values_mut().filter(|a| a.wire == wire) {
            if attachment.index >= index && attachment.index > 0 {
                attachment.index -= 1;
                tracing::trace!("pin on wire {:?} shifted to {}", wire, attachment.index);
            }
        }
    }

    /// Drags the pinned wire point onto the connector's live position.
    ///
    /// Does nothing if the connector is not pinned, is not live in
    /// `registry`, or already sits on its point. Returns whether the wire
    /// moved.
    ///
    /// # Errors
    ///
    /// Returns an error if the pinned wire is gone or the stored index no
    /// longer fits the wire.
    pub fn connector_moved(
        &mut self,
        connector: ConnectorId,
        registry: &impl ConnectorRegistry,
    ) -> Result<bool> {
        let Some(attachment) = self.attachment(connector) else {
            return Ok(false);
        };
        let Some(target) = registry.connector_position(connector) else {
            tracing::trace!("connector {:?} is not live here, ignoring move", connector);
            return Ok(false);
        };
        let data = self.wire(attachment.wire)?;
        debug_assert!(
            attachment.index < data.len(),
            "pin index {} out of range for wire of {} points",
            attachment.index,
            data.len()
        );
        let Some(point) = data.point(attachment.index) else {
            tracing::error!(
                "connector {:?} pinned to missing point {} of wire {:?}",
                connector,
                attachment.index,
                attachment.wire
            );
            return Err(EditError::PointIndexOutOfRange {
                index: attachment.index,
                len: data.len(),
            }
            .into());
        };
        let delta = target - point.position;
        if is_null_vector(&delta) {
            return Ok(false);
        }
        tracing::debug!(
            "connector {:?} drags wire {:?} by {:?}",
            connector,
            attachment.wire,
            delta
        );
        self.move_point_by(attachment.wire, attachment.index, delta)?;
        Ok(true)
    }

    /// Pulls every pinned point of `wire` back onto its connector.
    ///
    /// Returns how many points moved.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin no longer fits the wire.
    pub fn realign_attached_points(
        &mut self,
        wire: WireId,
        registry: &impl ConnectorRegistry,
    ) -> Result<usize> {
        let mut moved = 0;
        for connector in self.connectors_attached_to_wire(wire) {
            if self.connector_moved(connector, registry)? {
                moved += 1;
            }
        }
        Ok(moved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use slotmap::SlotMap;

    use super::super::testing::{init_tracing, p, wire};
    use super::*;
    use crate::settings::Settings;
    use approx::assert_relative_eq;

    fn straight_manager() -> WireManager {
        WireManager::with_settings(Settings {
            preserve_straight_angles: false,
            ..Settings::default()
        })
    }

    #[test]
    fn pin_on_last_point_follows_inner_insert() {
        init_tracing();
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(100.0, 50.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0), (100.0, 50.0)]));
        manager.attach_wire_to_connector(w, 2, c).unwrap();

        manager.insert_point(w, 1, p(50.0, 0.0)).unwrap();

        assert_eq!(manager.attached_wire_point(c), Some(3));
        assert_relative_eq!(manager.point_position(w, 3).unwrap(), p(100.0, 50.0));
    }

    #[test]
    fn pin_shifts_with_insert_and_remove_before_it() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(50.0, 0.0));
        let w = manager.add_wire(wire(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (50.0, 0.0),
            (50.0, 40.0),
            (90.0, 40.0),
        ]));
        manager.attach_wire_to_connector(w, 2, c).unwrap();
        let pinned = manager.point_position(w, 2).unwrap();

        manager.insert_point(w, 1, p(10.0, 0.0)).unwrap();
        assert_eq!(manager.attached_wire_point(c), Some(3));
        assert_relative_eq!(manager.point_position(w, 3).unwrap(), pinned);

        manager.remove_point(w, 1).unwrap();
        assert_eq!(manager.attached_wire_point(c), Some(2));
        assert_relative_eq!(manager.point_position(w, 2).unwrap(), pinned);

        // Edits after the pin leave it alone.
        manager.insert_point(w, 4, p(70.0, 40.0)).unwrap();
        assert_eq!(manager.attached_wire_point(c), Some(2));
    }

    #[test]
    fn pin_on_first_point_never_shifts() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(0.0, 0.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        manager.attach_wire_to_connector(w, 0, c).unwrap();
        manager.insert_point(w, 1, p(50.0, 0.0)).unwrap();
        assert_eq!(manager.attached_wire_point(c), Some(0));
    }

    #[test]
    fn endpoint_attach_picks_matching_end() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let start = connectors.insert(p(0.0, 0.0));
        let end = connectors.insert(p(100.0, 0.0));
        let nowhere = connectors.insert(p(40.0, 40.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)]));

        assert!(manager.attach_wire_endpoint_to_connector(w, start, p(0.0, 0.0)).unwrap());
        assert!(manager.attach_wire_endpoint_to_connector(w, end, p(100.0, 0.0)).unwrap());
        assert!(!manager.attach_wire_endpoint_to_connector(w, nowhere, p(40.0, 40.0)).unwrap());

        assert_eq!(manager.attached_wire_point(start), Some(0));
        assert_eq!(manager.attached_wire_point(end), Some(2));
        assert_eq!(manager.attached_wire(nowhere), None);
        assert!(manager.wire_point_is_attached(w, 2));
        assert!(!manager.wire_point_is_attached(w, 1));
    }

    #[test]
    fn connector_pins_only_once() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(0.0, 0.0));
        let a = manager.add_wire(wire(&[(0.0, 0.0), (10.0, 0.0)]));
        let b = manager.add_wire(wire(&[(0.0, 0.0), (0.0, 10.0)]));
        manager.attach_wire_to_connector(a, 0, c).unwrap();
        assert!(manager.attach_wire_to_connector(b, 0, c).is_err());
        assert!(manager.attach_wire_to_connector(a, 7, connectors.insert(p(1.0, 1.0))).is_err());
        assert_eq!(manager.attached_wire(c), Some(a));
    }

    #[test]
    fn batch_attach_uses_registry() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c1 = connectors.insert(p(0.0, 0.0));
        let c2 = connectors.insert(p(100.0, 0.0));
        connectors.insert(p(500.0, 500.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));

        assert_eq!(manager.attach_connectors(&connectors).unwrap(), 2);
        assert_eq!(manager.connectors_attached_to_wire(w).len(), 2);
        assert_eq!(manager.attachment(c2).unwrap().index, 1);
        assert_eq!(manager.attached_wire(c1), Some(w));
        assert_eq!(manager.attach_connectors(&connectors).unwrap(), 0);
    }

    #[test]
    fn detach_releases_pins() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c1 = connectors.insert(p(0.0, 0.0));
        let c2 = connectors.insert(p(10.0, 0.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (10.0, 0.0)]));
        manager.attach_wire_to_connector(w, 0, c1).unwrap();
        manager.attach_wire_to_connector(w, 1, c2).unwrap();

        assert_eq!(manager.detach_wire(c1), Some(Attachment { wire: w, index: 0 }));
        assert_eq!(manager.detach_wire(c1), None);
        assert_eq!(manager.detach_wire_from_all(w), 1);
        assert!(manager.connectors_attached_to_wire(w).is_empty());
    }

    #[test]
    fn removing_wire_releases_pins() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(0.0, 0.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (10.0, 0.0)]));
        manager.attach_wire_to_connector(w, 0, c).unwrap();
        manager.remove_wire(w).unwrap();
        assert_eq!(manager.attached_wire(c), None);
    }

    #[test]
    fn moving_connector_drags_pinned_point() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(100.0, 0.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        manager.attach_wire_to_connector(w, 1, c).unwrap();

        assert!(!manager.connector_moved(c, &connectors).unwrap());

        connectors[c] = p(120.0, 0.0);
        assert!(manager.connector_moved(c, &connectors).unwrap());
        assert_relative_eq!(manager.point_position(w, 1).unwrap(), p(120.0, 0.0));
    }

    #[test]
    fn moving_connector_off_axis_grows_stub() {
        let mut manager = WireManager::new();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(100.0, 0.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (100.0, 0.0)]));
        manager.attach_wire_to_connector(w, 1, c).unwrap();

        connectors[c] = p(100.0, 40.0);
        assert!(manager.connector_moved(c, &connectors).unwrap());

        assert_eq!(
            manager.wire(w).unwrap().positions(),
            vec![p(0.0, 0.0), p(50.0, 0.0), p(50.0, 40.0), p(100.0, 40.0)]
        );
        assert_eq!(manager.attached_wire_point(c), Some(3));
    }

    #[test]
    fn connector_from_other_scene_is_ignored() {
        let mut manager = straight_manager();
        let mut here: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = here.insert(p(0.0, 0.0));
        let elsewhere: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let w = manager.add_wire(wire(&[(0.0, 0.0), (10.0, 0.0)]));
        manager.attach_wire_to_connector(w, 0, c).unwrap();
        assert!(!manager.connector_moved(c, &elsewhere).unwrap());
    }

    #[test]
    fn realign_pulls_pins_back() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(0.0, 0.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (0.0, 50.0), (80.0, 50.0)]));
        manager.attach_wire_to_connector(w, 0, c).unwrap();

        manager.move_wire_by(w, crate::math::Vector2::new(10.0, 0.0)).unwrap();
        assert_relative_eq!(manager.point_position(w, 0).unwrap(), p(10.0, 0.0));

        assert_eq!(manager.realign_attached_points(w, &connectors).unwrap(), 1);
        assert_relative_eq!(manager.point_position(w, 0).unwrap(), p(0.0, 0.0));
    }

    #[test]
    fn simplify_keeps_pinned_point() {
        let mut manager = straight_manager();
        let mut connectors: SlotMap<ConnectorId, Point2> = SlotMap::with_key();
        let c = connectors.insert(p(50.0, 0.0));
        let w = manager.add_wire(wire(&[(0.0, 0.0), (20.0, 0.0), (50.0, 0.0), (100.0, 0.0)]));
        manager.attach_wire_to_connector(w, 2, c).unwrap();

        assert_eq!(manager.simplify_wire(w).unwrap(), 1);
        assert_eq!(
            manager.wire(w).unwrap().positions(),
            vec![p(0.0, 0.0), p(50.0, 0.0), p(100.0, 0.0)]
        );
        assert_eq!(manager.attached_wire_point(c), Some(1));
        assert_relative_eq!(manager.point_position(w, 1).unwrap(), p(50.0, 0.0));

        // The connector never moved, so the wire must not follow it.
        assert!(!manager.connector_moved(c, &connectors).unwrap());
        assert_eq!(manager.simplify_wire(w).unwrap(), 0);
    }
}
