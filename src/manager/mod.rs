mod attachment;
mod connectivity;
mod editing;
pub mod validate;

pub use validate::InvariantViolation;

use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::error::{Result, TopologyError};
use crate::geometry::Line;
use crate::math::segment_2d::points_coincide;
use crate::math::Point2;
use crate::settings::Settings;
use crate::topology::{
    same_global_net, Attachment, ChangeEvent, ConnectorId, NetData, NetId, WireData, WireEvent,
    WireId, WirePoint,
};

/// Owner of every wire and net of one schematic, and of the table pinning
/// external connectors to wire points.
///
/// All cross-entity edits go through the manager: point edits that drag the
/// junctions of neighbouring wires, net merge and split, attachment index
/// bookkeeping. After every primitive edit the manager drains the wire's
/// [`WireEvent`] outbox, reacts to it and republishes it as a
/// [`ChangeEvent`] for hosts to pick up with [`drain_events`](Self::drain_events).
#[derive(Debug, Default)]
pub struct WireManager {
    wires: SlotMap<WireId, WireData>,
    nets: SlotMap<NetId, NetData>,
    attachments: BTreeMap<ConnectorId, Attachment>,
    settings: Settings,
    changes: Vec<ChangeEvent>,
    // Wires whose edit is currently relocating the junctions of others.
    moving: Vec<WireId>,
}

impl WireManager {
    /// Creates an empty manager with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    // --- Wire operations ---

    /// Takes ownership of a wire and wraps it in a new singleton net.
    ///
    /// No contact search happens here; run
    /// [`generate_junctions`](Self::generate_junctions) after bulk inserts.
    pub fn add_wire(&mut self, mut data: WireData) -> WireId {
        data.reset_links();
        let net = self.nets.insert(NetData::new());
        let wire = self.wires.insert(data);
        if let (Some(net_data), Some(wire_data)) =
            (self.nets.get_mut(net), self.wires.get_mut(wire))
        {
            net_data.add_wire(wire);
            wire_data.set_net(Some(net));
        }
        tracing::debug!("added wire {:?} in new net {:?}", wire, net);
        wire
    }

    /// Returns a reference to the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire(&self, id: WireId) -> std::result::Result<&WireData, TopologyError> {
        self.wires
            .get(id)
            .ok_or(TopologyError::EntityNotFound("wire"))
    }

    pub(crate) fn wire_mut(
        &mut self,
        id: WireId,
    ) -> std::result::Result<&mut WireData, TopologyError> {
        self.wires
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("wire"))
    }

    /// Iterates over all wires.
    pub fn wires(&self) -> impl Iterator<Item = (WireId, &WireData)> {
        self.wires.iter()
    }

    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Position of a wire point.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is unknown or `index` is out of range.
    pub fn point_position(&self, wire: WireId, index: usize) -> Result<Point2> {
        let data = self.wire(wire)?;
        data.check_index(index)?;
        Ok(data.points()[index].position)
    }

    /// First wire having one of its points at `point`.
    #[must_use]
    pub fn wire_with_extremity_at(&self, point: &Point2) -> Option<WireId> {
        let tolerance = self.settings.tolerance;
        self.wires
            .iter()
            .find(|(_, data)| {
                data.points()
                    .iter()
                    .any(|p| points_coincide(&p.position, point, tolerance))
            })
            .map(|(id, _)| id)
    }

    // --- Net operations ---

    /// Returns a reference to the net data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn net(&self, id: NetId) -> std::result::Result<&NetData, TopologyError> {
        self.nets
            .get(id)
            .ok_or(TopologyError::EntityNotFound("net"))
    }

    pub(crate) fn net_mut(
        &mut self,
        id: NetId,
    ) -> std::result::Result<&mut NetData, TopologyError> {
        self.nets
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("net"))
    }

    /// Iterates over all nets.
    pub fn nets(&self) -> impl Iterator<Item = (NetId, &NetData)> {
        self.nets.iter()
    }

    #[must_use]
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// The net owning `wire`, if the wire is known.
    #[must_use]
    pub fn net_of(&self, wire: WireId) -> Option<NetId> {
        self.wires.get(wire).and_then(WireData::net)
    }

    pub(crate) fn owning_net(&self, wire: WireId) -> std::result::Result<NetId, TopologyError> {
        self.wire(wire)?
            .net()
            .ok_or(TopologyError::EntityNotFound("net"))
    }

    /// Moves `wire` from its current net into `net`, keeping both sides of
    /// the membership in sync. The old net is left in place even if empty.
    pub(crate) fn move_wire_to_net(&mut self, wire: WireId, net: NetId) -> Result<()> {
        let previous = self.wire(wire)?.net();
        if previous == Some(net) {
            return Ok(());
        }
        self.net_mut(net)?.add_wire(wire);
        if let Some(old) = previous.and_then(|old| self.nets.get_mut(old)) {
            old.remove_wire(wire);
        }
        self.wire_mut(wire)?.set_net(Some(net));
        Ok(())
    }

    /// Drops `net` if it has no wires left.
    pub(crate) fn remove_net_if_empty(&mut self, net: NetId) -> bool {
        if self.nets.get(net).is_some_and(NetData::is_empty) {
            self.nets.remove(net);
            tracing::trace!("dropped empty net {:?}", net);
            return true;
        }
        false
    }

    /// Relabels a net.
    ///
    /// # Errors
    ///
    /// Returns an error if the net is not found.
    pub fn set_net_name(&mut self, net: NetId, name: impl Into<String>) -> Result<()> {
        self.net_mut(net)?.set_name(name);
        Ok(())
    }

    /// Whether two nets share a global net label.
    ///
    /// # Errors
    ///
    /// Returns an error if either net is not found.
    pub fn same_global_net(&self, a: NetId, b: NetId) -> Result<bool> {
        Ok(same_global_net(self.net(a)?, self.net(b)?))
    }

    /// All nets in the same global net as `net`, `net` included. An unnamed
    /// net belongs to no global net and yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the net is not found.
    pub fn nets_in_global_net(&self, net: NetId) -> Result<Vec<NetId>> {
        let data = self.net(net)?;
        Ok(self
            .nets
            .iter()
            .filter(|(_, other)| same_global_net(data, other))
            .map(|(id, _)| id)
            .collect())
    }

    /// Highlights or clears a net together with every net of its global net.
    ///
    /// Emits one [`ChangeEvent::HighlightChanged`] per net whose state changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the net is not found.
    pub fn set_net_highlighted(&mut self, net: NetId, highlighted: bool) -> Result<()> {
        let mut targets = self.nets_in_global_net(net)?;
        if !targets.contains(&net) {
            targets.push(net);
        }
        for id in targets {
            if let Some(data) = self.nets.get_mut(id) {
                if data.is_highlighted() != highlighted {
                    data.set_highlighted(highlighted);
                    self.changes.push(ChangeEvent::HighlightChanged { net: id, highlighted });
                }
            }
        }
        Ok(())
    }

    /// All line segments of the net's wires.
    ///
    /// # Errors
    ///
    /// Returns an error if the net is not found.
    pub fn net_line_segments(&self, net: NetId) -> Result<Vec<Line>> {
        let mut segments = Vec::new();
        for &wire in self.net(net)?.wires() {
            segments.extend(self.wire(wire)?.line_segments());
        }
        Ok(segments)
    }

    /// All points of the net's wires.
    ///
    /// # Errors
    ///
    /// Returns an error if the net is not found.
    pub fn net_points(&self, net: NetId) -> Result<Vec<WirePoint>> {
        let mut points = Vec::new();
        for &wire in self.net(net)?.wires() {
            points.extend_from_slice(self.wire(wire)?.points());
        }
        Ok(points)
    }

    /// Removes every wire, net and attachment. Settings are kept.
    pub fn clear(&mut self) {
        self.wires.clear();
        self.nets.clear();
        self.attachments.clear();
        self.changes.clear();
        self.moving.clear();
    }

    // --- Events ---

    /// Hands over the change notifications queued since the last call.
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.changes)
    }

    /// Reacts to everything `wire` queued in its outbox.
    pub(crate) fn dispatch(&mut self, wire: WireId) -> Result<()> {
        loop {
            let events = self.wire_mut(wire)?.take_events();
            if events.is_empty() {
                return Ok(());
            }
            for event in events {
                match event {
                    WireEvent::PointInserted { index } => self.point_inserted(wire, index),
                    WireEvent::PointRemoved { index } => self.point_removed(wire, index),
                    WireEvent::PointMoved { .. } => {}
                    WireEvent::UserMovedEndpoint { index } => {
                        self.wire_point_moved_by_user(wire, index)?;
                    }
                }
                self.changes.push(ChangeEvent::from_wire(wire, event));
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use tracing_subscriber::EnvFilter;

    use crate::math::Point2;
    use crate::topology::WireData;

    /// Routes log output through the test harness; `RUST_LOG` picks the level.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    pub fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    pub fn wire(points: &[(f64, f64)]) -> WireData {
        WireData::from_points(points.iter().map(|&(x, y)| p(x, y)))
    }
}
