pub mod connector;
pub mod event;
pub mod net;
pub mod point;
pub mod wire;

pub use connector::{Attachment, ConnectorId, ConnectorRegistry};
pub use event::{ChangeEvent, WireEvent};
pub use net::{same_global_net, NetData, NetId};
pub use point::WirePoint;
pub use wire::{WireData, WireId};
