use slotmap::SlotMap;

use crate::math::Point2;

use super::wire::WireId;

slotmap::new_key_type! {
    /// Identifier of an external connector (for example a component pin).
    ///
    /// Connectors are owned by the host; it allocates these keys from its own
    /// `SlotMap` and reports positions through [`ConnectorRegistry`].
    pub struct ConnectorId;
}

/// The wire point a connector is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub wire: WireId,
    pub index: usize,
}

/// Read access to the live connectors of the scene the wires belong to.
pub trait ConnectorRegistry {
    /// All connectors currently live in this scene.
    fn connectors(&self) -> Vec<ConnectorId>;

    /// Current scene position of a connector, or `None` if the connector is
    /// not live in this scene.
    fn connector_position(&self, connector: ConnectorId) -> Option<Point2>;
}

impl ConnectorRegistry for SlotMap<ConnectorId, Point2> {
    fn connectors(&self) -> Vec<ConnectorId> {
        self.keys().collect()
    }

    fn connector_position(&self, connector: ConnectorId) -> Option<Point2> {
        self.get(connector).copied()
    }
}
