//! Net storage, subscription and identity merging.
//!
//! Every wire handle indexes a slot in the table. A slot either is a root, owning the net's
//! value and subscriber lists, or points at the root it was merged into. Merging is a
//! union-find style operation that always re-points every member of the absorbed net
//! directly at the survivor, so resolution is a single lookup.
//!
//! Writes never call components directly. A write that changes a value pushes the affected
//! components onto a FIFO ready queue; the circuit drains that queue to a fixed point. A
//! component already waiting in the queue is not queued twice. A rising edge is latched
//! against the subscriber when the write happens, so a high-then-low pulse written within
//! one drain still reaches edge-triggered components.

use std::collections::VecDeque;
use std::mem;

use tracing::trace;

use super::bus::Wire;
use crate::circuit::ComponentId;

/// Which transitions of a net wake a subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Every change of value.
    Any,
    /// Only false-to-true transitions.
    Rising,
}

#[derive(Debug, Default)]
struct NetCell {
    value: bool,
    constant: bool,
    on_change: Vec<ComponentId>,
    on_rising: Vec<ComponentId>,
    members: Vec<Wire>,
}

/// Outcome of a successful merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Merge {
    /// Root that now owns the merged net.
    pub survivor: Wire,
    /// Former root of the absorbed net.
    pub absorbed: Wire,
}

/// Deduplicated FIFO of components waiting for evaluation.
#[derive(Debug, Default)]
struct ReadyQueue {
    order: VecDeque<ComponentId>,
    queued: Vec<bool>,
    rose: Vec<bool>,
}

impl ReadyQueue {
    fn reserve(&mut self, id: ComponentId) {
        if self.queued.len() <= id.index() {
            self.queued.resize(id.index() + 1, false);
            self.rose.resize(id.index() + 1, false);
        }
    }

    fn push(&mut self, id: ComponentId, rising: bool) {
        let i = id.index();
        self.rose[i] |= rising;
        if !self.queued[i] {
            self.queued[i] = true;
            self.order.push_back(id);
        }
    }

    fn push_all(&mut self, on_change: &[ComponentId], on_rising: &[ComponentId], rising: bool) {
        for &id in on_change {
            self.push(id, false);
        }
        if rising {
            for &id in on_rising {
                self.push(id, true);
            }
        }
    }

    fn pop(&mut self) -> Option<(ComponentId, bool)> {
        let id = self.order.pop_front()?;
        self.queued[id.index()] = false;
        Some((id, mem::take(&mut self.rose[id.index()])))
    }
}

/// Storage for every net of a circuit.
#[derive(Debug, Default)]
pub struct NetTable {
    root: Vec<u32>,
    cells: Vec<NetCell>,
    ready: ReadyQueue,
    notifications: u64,
    merges: u64,
}

impl NetTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of wire handles ever created.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether no wires exist.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of distinct nets after merging.
    pub fn net_count(&self) -> usize {
        self.root
            .iter()
            .enumerate()
            .filter(|&(i, &r)| r as usize == i)
            .count()
    }

    /// Component evaluations handed out so far.
    pub const fn notifications(&self) -> u64 {
        self.notifications
    }

    /// Merges performed so far.
    pub const fn merges(&self) -> u64 {
        self.merges
    }

    /// Allocates a new net.
    ///
    /// A constant net ignores writes.
    pub fn create(&mut self, value: bool, constant: bool) -> Wire {
        let wire = Wire(self.root.len() as u32);
        self.root.push(wire.0);
        self.cells.push(NetCell {
            value,
            constant,
            members: vec![wire],
            ..NetCell::default()
        });
        wire
    }

    /// Root handle of the net `wire` belongs to.
    #[inline]
    pub fn resolve(&self, wire: Wire) -> Wire {
        Wire(self.root[wire.index()])
    }

    /// Current value of the net.
    #[inline]
    pub fn get(&self, wire: Wire) -> bool {
        self.cells[self.root[wire.index()] as usize].value
    }

    /// Whether the net is tied to a constant.
    pub fn is_constant(&self, wire: Wire) -> bool {
        self.cells[self.root[wire.index()] as usize].constant
    }

    /// Writes a value, queueing subscribers if it changed.
    ///
    /// Change subscribers are queued first, then rising-edge subscribers when the new value
    /// is high, each list in registration order.
    ///
    /// # Returns
    ///
    /// Whether the stored value changed. Writes to constant nets never do.
    pub fn set(&mut self, wire: Wire, value: bool) -> bool {
        let root = self.root[wire.index()] as usize;
        let cell = &mut self.cells[root];
        if cell.constant || cell.value == value {
            return false;
        }
        cell.value = value;
        let cell = &self.cells[root];
        self.ready.push_all(&cell.on_change, &cell.on_rising, value);
        true
    }

    /// Subscribes a component to a net.
    ///
    /// The subscription fires once straight away: an [`Edge::Any`] subscriber is queued
    /// unconditionally, an [`Edge::Rising`] subscriber only if the net is currently high,
    /// and then as if the net had just risen.
    pub fn subscribe(&mut self, wire: Wire, id: ComponentId, edge: Edge) {
        self.ready.reserve(id);
        let root = self.root[wire.index()] as usize;
        let cell = &mut self.cells[root];
        match edge {
            Edge::Any => {
                cell.on_change.push(id);
                self.ready.push(id, false);
            }
            Edge::Rising => {
                cell.on_rising.push(id);
                if cell.value {
                    self.ready.push(id, true);
                }
            }
        }
    }

    /// Queues a component for evaluation.
    pub fn wake(&mut self, id: ComponentId) {
        self.ready.reserve(id);
        self.ready.push(id, false);
    }

    /// Next component waiting for evaluation.
    ///
    /// # Returns
    ///
    /// The component, and whether one of its [`Edge::Rising`] nets rose since it was last
    /// evaluated. Reading the flag clears it.
    pub fn pop_ready(&mut self) -> Option<(ComponentId, bool)> {
        let next = self.ready.pop()?;
        self.notifications += 1;
        Some(next)
    }

    /// Whether any component is waiting for evaluation.
    pub fn has_ready(&self) -> bool {
        !self.ready.order.is_empty()
    }

    /// Merges the nets of `keep` and `other` into one.
    ///
    /// The survivor is the root of `keep`; every handle of `other`'s net re-points at it and
    /// the subscriber lists are concatenated, `keep`'s first. A constant side forces its value
    /// onto the merged net. Subscribers of a side whose observed value changed are queued.
    ///
    /// # Returns
    ///
    /// `None` if both handles already name the same net.
    pub fn merge(&mut self, keep: Wire, other: Wire) -> Option<Merge> {
        let survivor = self.root[keep.index()] as usize;
        let absorbed = self.root[other.index()] as usize;
        if survivor == absorbed {
            return None;
        }

        let cell = mem::take(&mut self.cells[absorbed]);
        let keep_value = self.cells[survivor].value;
        let merged_value = if cell.constant && !self.cells[survivor].constant {
            cell.value
        } else {
            keep_value
        };

        for member in &cell.members {
            self.root[member.index()] = survivor as u32;
        }

        {
            let target = &mut self.cells[survivor];
            target.value = merged_value;
            target.constant |= cell.constant;
        }
        if keep_value != merged_value {
            let target = &self.cells[survivor];
            self.ready.push_all(&target.on_change, &target.on_rising, merged_value);
        }
        if cell.value != merged_value {
            self.ready.push_all(&cell.on_change, &cell.on_rising, merged_value);
        }

        let target = &mut self.cells[survivor];
        target.members.extend(cell.members);
        target.on_change.extend(cell.on_change);
        target.on_rising.extend(cell.on_rising);

        self.merges += 1;
        trace!(survivor, absorbed, value = merged_value, "merged nets");
        Some(Merge {
            survivor: Wire(survivor as u32),
            absorbed: Wire(absorbed as u32),
        })
    }

}
