//! Wire connectivity and net management for schematic editors.
//!
//! Wires are polylines owned by a [`WireManager`]. Wires whose endpoints land
//! on other wires are linked through junctions, linked wires share a net, and
//! editing operations keep junctions and connector pins attached as geometry
//! changes.

pub mod error;
pub mod geometry;
pub mod manager;
pub mod math;
pub mod persist;
pub mod settings;
pub mod topology;

pub use error::{Result, WirenetError};
pub use manager::{InvariantViolation, WireManager};
pub use settings::Settings;
pub use topology::{
    Attachment, ChangeEvent, ConnectorId, ConnectorRegistry, NetData, NetId, WireData, WireId,
    WirePoint,
};
