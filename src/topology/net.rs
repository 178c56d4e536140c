use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a net in the wire store.
    pub struct NetId;
}

/// A group of wires that are electrically identical.
///
/// The net only records membership; the [`WireManager`](crate::manager::WireManager)
/// keeps each wire's back-reference in sync and discards nets that run empty.
#[derive(Debug, Clone, Default)]
pub struct NetData {
    name: String,
    wires: Vec<WireId>,
    highlighted: bool,
}

impl NetData {
    /// Creates an empty, unnamed net.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty net with a label.
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the label, possibly empty.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Member wires, in insertion order.
    #[must_use]
    pub fn wires(&self) -> &[WireId] {
        &self.wires
    }

    #[must_use]
    pub fn contains(&self, wire: WireId) -> bool {
        self.wires.contains(&wire)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wires.len()
    }

    /// An empty net is garbage and must be dropped by its owner.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub(crate) fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Adds a wire; returns `false` if it already was a member.
    pub(crate) fn add_wire(&mut self, wire: WireId) -> bool {
        if self.wires.contains(&wire) {
            return false;
        }
        self.wires.push(wire);
        true
    }

    /// Removes a wire; returns `false` if it was not a member.
    pub(crate) fn remove_wire(&mut self, wire: WireId) -> bool {
        let before = self.wires.len();
        self.wires.retain(|w| *w != wire);
        self.wires.len() < before
    }
}

/// Whether two nets belong to the same global net.
///
/// Global nets group unrelated nets by label for highlighting only: the names
/// must match case-insensitively and must not be empty. This never implies
/// electrical connectivity.
#[must_use]
pub fn same_global_net(a: &NetData, b: &NetData) -> bool {
    !a.name.is_empty() && a.name.to_lowercase() == b.name.to_lowercase()
}
