use thiserror::Error;

/// Top-level error type for the wirenet engine.
#[derive(Debug, Error)]
pub enum WirenetError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Errors related to entity lookup in the wire store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("connector is already attached to a wire")]
    ConnectorAlreadyAttached,
}

/// Errors raised by index-based wire edits.
///
/// An edit that fails with one of these leaves the wire untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("point index {index} is out of range for a wire with {len} points")]
    PointIndexOutOfRange { index: usize, len: usize },

    #[error("segment index {index} is out of range for a wire with {count} segments")]
    SegmentIndexOutOfRange { index: usize, count: usize },

    #[error("cannot insert at {index} into a wire of {len} points: only inner indices accepted")]
    InsertPosition { index: usize, len: usize },
}

/// Errors related to loading [`Settings`](crate::settings::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors related to rebuilding wires from persisted records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PersistError {
    #[error("point index {0} appears more than once")]
    DuplicatePointIndex(usize),

    #[error("point indices are not contiguous: expected {expected}, found {found}")]
    GapInPointIndices { expected: usize, found: usize },
}

/// Convenience type alias for results using [`WirenetError`].
pub type Result<T> = std::result::Result<T, WirenetError>;
