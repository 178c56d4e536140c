use crate::math::Point2;

use super::{NetId, WireId};

/// Structural notification raised by a wire about its own points.
///
/// Wires queue these in an outbox; the [`WireManager`](crate::manager::WireManager)
/// drains the outbox after every primitive edit and reacts before the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireEvent {
    /// A point was inserted; former indices `>= index` shifted up by one.
    PointInserted { index: usize },
    /// A point was removed; former indices `> index` shifted down by one.
    PointRemoved { index: usize },
    /// A point now sits at `position`.
    PointMoved { index: usize, position: Point2 },
    /// An interactive edit moved this point; connectivity must be re-evaluated.
    UserMovedEndpoint { index: usize },
}

/// Notification published by the manager to hosts (renderers, undo recorders,
/// label placement).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeEvent {
    PointInserted { wire: WireId, index: usize },
    PointRemoved { wire: WireId, index: usize },
    PointMoved { wire: WireId, index: usize, position: Point2 },
    PointMovedByUser { wire: WireId, index: usize },
    HighlightChanged { net: NetId, highlighted: bool },
}

impl ChangeEvent {
    /// Tags a wire-local event with the wire it came from.
    #[must_use]
    pub fn from_wire(wire: WireId, event: WireEvent) -> Self {
        match event {
            WireEvent::PointInserted { index } => Self::PointInserted { wire, index },
            WireEvent::PointRemoved { index } => Self::PointRemoved { wire, index },
            WireEvent::PointMoved { index, position } => Self::PointMoved {
                wire,
                index,
                position,
            },
            WireEvent::UserMovedEndpoint { index } => Self::PointMovedByUser { wire, index },
        }
    }
}
