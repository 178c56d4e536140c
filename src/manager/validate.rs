use std::collections::BTreeSet;

use crate::topology::{ConnectorId, NetId, WireId};

use super::WireManager;

/// A broken invariant found by [`WireManager::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A junction point lies on none of the wires its wire is linked to.
    DanglingJunction { wire: WireId, index: usize },
    /// A wire lists a link to a wire that no longer exists.
    LinkToMissingWire { wire: WireId, other: WireId },
    /// A connector pin points past the end of its wire, or at a missing wire.
    AttachmentOutOfRange {
        connector: ConnectorId,
        wire: WireId,
        index: usize,
    },
    /// A net has no wires.
    EmptyNet { net: NetId },
    /// A net's wires are not exactly one connected component.
    NetNotConnected { net: NetId },
    /// A wire and the net it points to disagree about membership.
    BrokenNetReference { wire: WireId },
}

impl WireManager {
    /// Audits the store and reports every broken invariant.
    ///
    /// An empty result means every junction is supported, every pin fits its
    /// wire, and every net is exactly one connected component.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        self.check_wires(&mut violations);
        self.check_attachments(&mut violations);
        self.check_nets(&mut violations);
        violations
    }

    fn check_wires(&self, violations: &mut Vec<InvariantViolation>) {
        let tolerance = self.settings.tolerance;
        for (wire, data) in &self.wires {
            for &other in data.connected_wires() {
                if !self.wires.contains_key(other) {
                    violations.push(InvariantViolation::LinkToMissingWire { wire, other });
                }
            }

            let neighbors = self.connected_neighbors(wire);
            for index in data.junctions() {
                let position = data.points()[index].position;
                let supported = neighbors.iter().any(|&n| {
                    self.wires
                        .get(n)
                        .is_some_and(|other| other.point_is_on_wire(&position, tolerance))
                });
                if !supported {
                    violations.push(InvariantViolation::DanglingJunction { wire, index });
                }
            }

            let member = data
                .net()
                .and_then(|net| self.nets.get(net))
                .is_some_and(|net| net.contains(wire));
            if !member {
                violations.push(InvariantViolation::BrokenNetReference { wire });
            }
        }
    }

    fn check_attachments(&self, violations: &mut Vec<InvariantViolation>) {
        for (&connector, attachment) in &self.attachments {
            let fits = self
                .wires
                .get(attachment.wire)
                .is_some_and(|data| attachment.index < data.len());
            if !fits {
                violations.push(InvariantViolation::AttachmentOutOfRange {
                    connector,
                    wire: attachment.wire,
                    index: attachment.index,
                });
            }
        }
    }

    fn check_nets(&self, violations: &mut Vec<InvariantViolation>) {
        for (net, data) in &self.nets {
            let Some(&first) = data.wires().first() else {
                violations.push(InvariantViolation::EmptyNet { net });
                continue;
            };
            for &wire in data.wires() {
                if self.net_of(wire) != Some(net) {
                    violations.push(InvariantViolation::BrokenNetReference { wire });
                }
            }
            let members: BTreeSet<WireId> = data.wires().iter().copied().collect();
            match self.wires_connected_to(first) {
                Ok(component) if component == members => {}
                _ => violations.push(InvariantViolation::NetNotConnected { net }),
            }
        }
    }
}
