//! Evaluation context handed to components.

use super::action::Action;
use super::component::ComponentId;
use crate::common::value::{bits_to_u64, u64_to_bits};
use crate::net::{Bus, NetTable, Wire};
use crate::sched::Scheduler;

/// Read/write view of the circuit for the component being evaluated.
///
/// Reads always observe the current net values. `schedule*` defers a write through the
/// scheduler; `set`/`write` store immediately and queue dependents, which is how
/// zero-delay combinational logic (such as a ROM) is modelled explicitly.
pub struct Signals<'a> {
    nets: &'a mut NetTable,
    scheduler: &'a mut Scheduler<Action>,
    current: ComponentId,
    rose: bool,
}

impl<'a> Signals<'a> {
    pub(crate) fn new(
        nets: &'a mut NetTable,
        scheduler: &'a mut Scheduler<Action>,
        current: ComponentId,
        rose: bool,
    ) -> Self {
        Self {
            nets,
            scheduler,
            current,
            rose,
        }
    }

    /// The component being evaluated.
    pub const fn id(&self) -> ComponentId {
        self.current
    }

    /// Whether a net this component watches for rising edges rose since its last evaluation.
    ///
    /// The edge is latched when it is written, so it is reported even if the net has fallen
    /// again by the time the component runs.
    pub const fn rose(&self) -> bool {
        self.rose
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.scheduler.tick()
    }

    /// Value of one net.
    pub fn get(&self, wire: Wire) -> bool {
        self.nets.get(wire)
    }

    /// Low 64 bits of a bus as an integer.
    pub fn read(&self, bus: &Bus) -> u64 {
        bits_to_u64(&self.read_bits(bus))
    }

    /// Every bit of a bus, least-significant first.
    pub fn read_bits(&self, bus: &Bus) -> Vec<bool> {
        bus.iter().map(|w| self.nets.get(w)).collect()
    }

    /// Writes one net now.
    pub fn set(&mut self, wire: Wire, value: bool) {
        let _ = self.nets.set(wire, value);
    }

    /// Writes an integer onto a bus now.
    pub fn write(&mut self, bus: &Bus, value: u64) {
        for (wire, bit) in bus.iter().zip(u64_to_bits(value, bus.width())) {
            let _ = self.nets.set(wire, bit);
        }
    }

    /// Writes a bit vector onto a bus now.
    pub fn write_bits(&mut self, bus: &Bus, bits: &[bool]) {
        for (wire, &bit) in bus.iter().zip(bits) {
            let _ = self.nets.set(wire, bit);
        }
    }

    /// Writes one net after `delay` ticks.
    pub fn schedule(&mut self, wire: Wire, value: bool, delay: u64) {
        self.scheduler.schedule(Action::Drive { wire, value }, delay);
    }

    /// Writes an integer onto a bus after `delay` ticks, all bits in one step.
    pub fn schedule_write(&mut self, bus: &Bus, value: u64, delay: u64) {
        let bits = bus.iter().zip(u64_to_bits(value, bus.width())).collect();
        self.scheduler.schedule(Action::DriveBus { bits }, delay);
    }

    /// Writes a bit vector onto a bus after `delay` ticks, all bits in one step.
    pub fn schedule_bits(&mut self, bus: &Bus, bits: &[bool], delay: u64) {
        let bits = bus.iter().zip(bits.iter().copied()).collect();
        self.scheduler.schedule(Action::DriveBus { bits }, delay);
    }

    /// Re-runs the current component after `delay` ticks.
    pub fn wake_after(&mut self, delay: u64) {
        self.scheduler.schedule(Action::Wake(self.current), delay);
    }
}

impl std::fmt::Debug for Signals<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signals")
            .field("component", &self.current)
            .field("rose", &self.rose)
            .field("tick", &self.scheduler.tick())
            .finish_non_exhaustive()
    }
}
