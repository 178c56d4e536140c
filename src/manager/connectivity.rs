use std::collections::{BTreeSet, VecDeque};

use crate::error::{Result, TopologyError};
use crate::topology::{NetData, NetId, WireData, WireId};

use super::WireManager;

impl WireManager {
    /// Records that a junction of `other` sits on `anchor` and merges the two
    /// nets into the net of `anchor`.
    ///
    /// Returns `false` if the wires were already connected in that direction.
    ///
    /// # Errors
    ///
    /// Returns an error if either wire is not found.
    pub fn connect_wire(&mut self, anchor: WireId, other: WireId) -> Result<bool> {
        self.wire(other)?;
        if anchor == other || !self.wire_mut(anchor)?.connect_wire(other) {
            return Ok(false);
        }
        let keep = self.owning_net(anchor)?;
        let absorb = self.owning_net(other)?;
        if self.merge_nets(keep, absorb)? {
            self.remove_net_if_empty(absorb);
        }
        tracing::debug!("connected wire {:?} to {:?}", other, anchor);
        Ok(true)
    }

    /// Moves every wire of `absorb` into `keep`.
    ///
    /// Returns `false` if both ids name the same net. `keep` retains its
    /// name unless it has none, in which case it adopts the name of `absorb`.
    /// The drained net is left for the caller to drop.
    ///
    /// # Errors
    ///
    /// Returns an error if either net is not found.
    pub fn merge_nets(&mut self, keep: NetId, absorb: NetId) -> Result<bool> {
        if keep == absorb {
            return Ok(false);
        }
        self.net(keep)?;
        let absorbed = self.net(absorb)?;
        let members = absorbed.wires().to_vec();
        let name = absorbed.name().to_owned();

        for wire in members {
            self.move_wire_to_net(wire, keep)?;
        }
        let kept = self.net_mut(keep)?;
        if kept.name().is_empty() && !name.is_empty() {
            kept.set_name(name);
        }
        tracing::debug!("merged net {:?} into {:?}", absorb, keep);
        Ok(true)
    }

    /// Breaks the link between two wires and splits their net if it no
    /// longer forms one connected component.
    ///
    /// Junction flags left without a supporting neighbour are cleared on
    /// both wires. Returns `false` if the wires were not connected.
    ///
    /// # Errors
    ///
    /// Returns an error if either wire is not found.
    pub fn disconnect_wire(&mut self, anchor: WireId, other: WireId) -> Result<bool> {
        self.wire(other)?;
        let forward = self.wire_mut(anchor)?.disconnect_wire(other);
        let backward = self.wire_mut(other)?.disconnect_wire(anchor);
        if !forward && !backward {
            return Ok(false);
        }
        self.clear_dangling_junctions(anchor)?;
        self.clear_dangling_junctions(other)?;
        self.split_net(anchor, other)?;
        tracing::debug!("disconnected wire {:?} from {:?}", other, anchor);
        Ok(true)
    }

    /// Moves the wires of the shared net that `anchor` can no longer reach
    /// into a fresh, unnamed net.
    fn split_net(&mut self, anchor: WireId, other: WireId) -> Result<()> {
        let net = self.owning_net(anchor)?;
        if self.owning_net(other)? != net {
            return Ok(());
        }
        let component = self.wires_connected_to(anchor)?;
        let stray: Vec<WireId> = self
            .net(net)?
            .wires()
            .iter()
            .copied()
            .filter(|wire| !component.contains(wire))
            .collect();
        if stray.is_empty() {
            return Ok(());
        }
        let split = self.nets.insert(NetData::new());
        for wire in &stray {
            self.move_wire_to_net(*wire, split)?;
        }
        tracing::debug!("split {} wires of net {:?} into {:?}", stray.len(), net, split);
        Ok(())
    }

    /// Clears every junction flag of `wire` that no longer lies on one of
    /// its connected neighbours.
    fn clear_dangling_junctions(&mut self, wire: WireId) -> Result<()> {
        let tolerance = self.settings.tolerance;
        let neighbors = self.connected_neighbors(wire);
        let dangling: Vec<usize> = {
            let data = self.wire(wire)?;
            data.junctions()
                .into_iter()
                .filter(|&index| {
                    let position = data.points()[index].position;
                    !neighbors.iter().any(|&n| {
                        self.wires
                            .get(n)
                            .is_some_and(|other| other.point_is_on_wire(&position, tolerance))
                    })
                })
                .collect()
        };
        for index in dangling {
            self.wire_mut(wire)?.set_point_is_junction(index, false)?;
            tracing::trace!("cleared dangling junction {} of wire {:?}", index, wire);
        }
        Ok(())
    }

    /// Wires linked to `wire` in either direction.
    ///
    /// Links pointing at `wire` are looked up among the members of its net,
    /// since linked wires always share one.
    #[must_use]
    pub fn connected_neighbors(&self, wire: WireId) -> Vec<WireId> {
        let Some(data) = self.wires.get(wire) else {
            return Vec::new();
        };
        let mut neighbors: BTreeSet<WireId> = data.connected_wires().iter().copied().collect();
        let lists_wire = |id: &WireId| {
            self.wires
                .get(*id)
                .is_some_and(|other| other.connected_wires().contains(&wire))
        };
        match data.net().and_then(|net| self.nets.get(net)) {
            Some(net) => neighbors.extend(net.wires().iter().copied().filter(lists_wire)),
            None => neighbors.extend(self.wires.keys().filter(lists_wire)),
        }
        neighbors.remove(&wire);
        neighbors.into_iter().collect()
    }

    /// Whether `a` and `b` are directly linked, in either direction.
    #[must_use]
    pub fn are_connected(&self, a: WireId, b: WireId) -> bool {
        let lists = |x: WireId, y: WireId| {
            self.wires
                .get(x)
                .is_some_and(|data| data.connected_wires().contains(&y))
        };
        lists(a, b) || lists(b, a)
    }

    /// The connected component of `wire`, itself included.
    ///
    /// Walks direct wire-to-wire links only, independent of net membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found.
    pub fn wires_connected_to(&self, wire: WireId) -> Result<BTreeSet<WireId>> {
        self.wire(wire)?;
        let mut visited = BTreeSet::from([wire]);
        let mut queue = VecDeque::from([wire]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.connected_neighbors(current) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        Ok(visited)
    }

    /// Removes a wire, disconnecting it from its neighbours, releasing its
    /// connector pins and dropping its net if that runs empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found.
    pub fn remove_wire(&mut self, wire: WireId) -> Result<WireData> {
        self.wire(wire)?;
        for neighbor in self.connected_neighbors(wire) {
            self.disconnect_wire(neighbor, wire)?;
        }
        self.detach_wire_from_all(wire);

        if let Some(net) = self.net_of(wire) {
            if let Some(data) = self.nets.get_mut(net) {
                data.remove_wire(wire);
            }
            self.remove_net_if_empty(net);
        }
        let mut data = self
            .wires
            .remove(wire)
            .ok_or(TopologyError::EntityNotFound("wire"))?;
        data.reset_links();
        tracing::debug!("removed wire {:?}", wire);
        Ok(data)
    }

    /// Connects every wire whose first or last point lies on another wire
    /// and flags those end points as junctions.
    ///
    /// A batch pass over all ordered wire pairs, meant for reconciling after
    /// a bulk import. Returns the number of new links.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is inconsistent.
    pub fn generate_junctions(&mut self) -> Result<usize> {
        let tolerance = self.settings.tolerance;
        let ids: Vec<WireId> = self.wires.keys().collect();
        let mut linked = 0;

        for &anchor in &ids {
            for &other in &ids {
                if anchor == other {
                    continue;
                }
                let (first_on, last_on, last) = {
                    let candidate = self.wire(other)?;
                    let target = self.wire(anchor)?;
                    let (Some(first), Some(last)) =
                        (candidate.points().first(), candidate.points().last())
                    else {
                        continue;
                    };
                    (
                        target.point_is_on_wire(&first.position, tolerance),
                        target.point_is_on_wire(&last.position, tolerance),
                        candidate.len() - 1,
                    )
                };
                if !first_on && !last_on {
                    continue;
                }
                let candidate = self.wire_mut(other)?;
                if first_on {
                    candidate.set_point_is_junction(0, true)?;
                }
                if last_on {
                    candidate.set_point_is_junction(last, true)?;
                }
                if self.connect_wire(anchor, other)? {
                    linked += 1;
                }
            }
        }
        tracing::debug!("generated {} wire links", linked);
        Ok(linked)
    }

    /// Re-evaluates the connectivity of an end point after an interactive
    /// move.
    ///
    /// A junction that left every wire it was joined to is detached, and an
    /// end point that landed on another wire is joined to it. Interior
    /// points are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found or `index` is out of range.
    pub fn wire_point_moved_by_user(&mut self, wire: WireId, index: usize) -> Result<()> {
        let data = self.wire(wire)?;
        data.check_index(index)?;
        if !data.is_endpoint(index) {
            return Ok(());
        }
        let tolerance = self.settings.tolerance;
        let moved = data.points()[index];

        if moved.is_junction {
            let anchors: Vec<WireId> = self
                .wires
                .iter()
                .filter(|(id, other)| *id != wire && other.connected_wires().contains(&wire))
                .map(|(id, _)| id)
                .collect();
            for anchor in anchors {
                if !self.still_joined(wire, index, anchor)? {
                    self.disconnect_wire(anchor, wire)?;
                }
            }
            self.wire_mut(wire)?.set_point_is_junction(index, false)?;
        }

        let position = moved.position;
        let targets: Vec<WireId> = self
            .wires
            .iter()
            .filter(|(id, other)| *id != wire && other.point_is_on_wire(&position, tolerance))
            .map(|(id, _)| id)
            .collect();
        for anchor in targets {
            self.wire_mut(wire)?.set_point_is_junction(index, true)?;
            self.connect_wire(anchor, wire)?;
        }
        Ok(())
    }

    /// Whether some junction of `wire`, the moved point at its new position
    /// included, still lies on `anchor`.
    fn still_joined(&self, wire: WireId, moved: usize, anchor: WireId) -> Result<bool> {
        let tolerance = self.settings.tolerance;
        let data = self.wire(wire)?;
        let target = self.wire(anchor)?;
        Ok(data
            .points()
            .iter()
            .enumerate()
            .filter(|(index, point)| *index == moved || point.is_junction)
            .any(|(_, point)| target.point_is_on_wire(&point.position, tolerance)))
    }
}
