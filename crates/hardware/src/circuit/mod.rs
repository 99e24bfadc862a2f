//! Circuit construction and simulation control.
//!
//! A [`Circuit`] owns everything a simulation needs:
//! 1. **Nets:** The [`NetTable`] behind every [`Wire`] and [`Bus`] handle, including the
//!    constant `high`/`low` nets.
//! 2. **Components:** Boxed [`Component`]s, woken through net subscriptions.
//! 3. **Scheduler:** The event queue of [`Action`]s and the simulation clock.
//!
//! Propagation works in two layers. Writes mark dependent components ready; the ready queue
//! is drained to a fixed point after every executed action and after every user-level
//! write. Components usually answer by scheduling their outputs, which the scheduler then
//! drains tick by tick. Both layers are capped so that a circuit which never settles
//! surfaces an error instead of hanging.
//!
//! # Examples
//!
//! ```
//! use gatesim_core::Circuit;
//!
//! let mut c = Circuit::default();
//! let a = c.wire();
//! let b = c.wire();
//! let q = c.and(a, b).unwrap();
//! c.set(a, true).unwrap();
//! c.set(b, true).unwrap();
//! c.settle().unwrap();
//! assert!(c.get(q));
//! ```

/// Scheduled action payloads.
pub mod action;

/// Component trait and identifiers.
pub mod component;

/// Evaluation context for components.
pub mod signals;

use std::fmt;

use tracing::{debug, trace, warn};

pub use self::action::Action;
pub use self::component::{Component, ComponentId};
pub use self::signals::Signals;
use crate::common::value::{self, bits_to_u64, u64_to_bits};
use crate::common::{SimError, SimResult};
use crate::config::Config;
use crate::logic::memory::Memory;
use crate::net::{Bus, Edge, NetTable, Wire};
use crate::sched::Scheduler;
use crate::stats::SimStats;

/// A network of nets and components driven by a discrete-event scheduler.
pub struct Circuit {
    config: Config,
    scheduler: Scheduler<Action>,
    nets: NetTable,
    components: Vec<Box<dyn Component>>,
    high: Wire,
    low: Wire,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::build(Config::default())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Circuit")
            .field("tick", &self.scheduler.tick())
            .field("wires", &self.nets.len())
            .field("components", &self.components.len())
            .field("pending", &self.scheduler.pending())
            .finish_non_exhaustive()
    }
}

impl Circuit {
    /// Creates an empty circuit.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: Config) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: Config) -> Self {
        let mut nets = NetTable::new();
        let low = nets.create(false, true);
        let high = nets.create(true, true);
        Self {
            scheduler: Scheduler::new(&config.scheduler),
            config,
            nets,
            components: Vec::new(),
            high,
            low,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // ══════════════════════════════════════════════════════════
    // Nets
    // ══════════════════════════════════════════════════════════

    /// Net tied high. Writes to it are ignored.
    pub const fn high(&self) -> Wire {
        self.high
    }

    /// Net tied low. Writes to it are ignored.
    pub const fn low(&self) -> Wire {
        self.low
    }

    /// Creates a net initialised low.
    pub fn wire(&mut self) -> Wire {
        self.nets.create(false, false)
    }

    /// Creates a net with an initial value.
    pub fn wire_with(&mut self, value: bool) -> Wire {
        self.nets.create(value, false)
    }

    /// Creates `width` fresh nets initialised to zero.
    pub fn bus(&mut self, width: usize) -> Bus {
        (0..width).map(|_| self.nets.create(false, false)).collect()
    }

    /// Creates `width` fresh nets initialised to `value`.
    pub fn bus_with(&mut self, width: usize, value: u64) -> Bus {
        u64_to_bits(value, width)
            .into_iter()
            .map(|bit| self.nets.create(bit, false))
            .collect()
    }

    /// A bus of constant nets spelling `value`.
    pub fn constant(&self, width: usize, value: u64) -> Bus {
        u64_to_bits(value, width)
            .into_iter()
            .map(|bit| if bit { self.high } else { self.low })
            .collect()
    }

    /// Splices two nets into one.
    ///
    /// Afterwards both handles (and every handle previously merged into either) read and
    /// write the same storage and share one subscriber set. Pending actions that target the
    /// absorbed net are rewritten onto the survivor.
    ///
    /// # Errors
    ///
    /// Propagates a stabilization failure from re-evaluating subscribers whose net changed.
    pub fn connect(&mut self, a: Wire, b: Wire) -> SimResult<()> {
        self.merge(a, b);
        self.propagate()
    }

    /// Splices two equal-width buses bit by bit.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::WidthMismatch`] if the widths differ.
    pub fn connect_bus(&mut self, a: &Bus, b: &Bus) -> SimResult<()> {
        check_width("connect", a, b)?;
        for (x, y) in a.iter().zip(b) {
            self.merge(x, y);
        }
        self.propagate()
    }

    fn merge(&mut self, a: Wire, b: Wire) {
        if let Some(merge) = self.nets.merge(a, b) {
            let nets = &self.nets;
            self.scheduler
                .for_each_pending_mut(|action| action.retarget(nets, merge.survivor));
            debug!(survivor = %merge.survivor, absorbed = %merge.absorbed, "connected nets");
        }
    }

    /// Current value of a net.
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

    /// Bus value in decimal.
    pub fn dec(&self, bus: &Bus) -> String {
        value::to_dec(self.read(bus))
    }

    /// Bus value in hex, padded to the bus width.
    pub fn hex(&self, bus: &Bus) -> String {
        value::to_hex(self.read(bus), bus.width())
    }

    /// Bus value in binary, padded to the bus width.
    pub fn bin(&self, bus: &Bus) -> String {
        value::to_bin(self.read(bus), bus.width())
    }

    /// Writes a net now and propagates to dependents.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotificationStorm`] if propagation does not settle.
    pub fn set(&mut self, wire: Wire, value: bool) -> SimResult<()> {
        let _ = self.nets.set(wire, value);
        self.propagate()
    }

    /// Writes an integer onto a bus as one step and propagates.
    ///
    /// # Errors
    ///
    /// As [`Circuit::set`].
    pub fn write(&mut self, bus: &Bus, value: u64) -> SimResult<()> {
        for (wire, bit) in bus.iter().zip(u64_to_bits(value, bus.width())) {
            let _ = self.nets.set(wire, bit);
        }
        self.propagate()
    }

    /// Writes a bit vector onto a bus as one step and propagates.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::WidthMismatch`] if `bits` does not match the bus, otherwise as
    /// [`Circuit::set`].
    pub fn write_bits(&mut self, bus: &Bus, bits: &[bool]) -> SimResult<()> {
        if bits.len() != bus.width() {
            return Err(SimError::WidthMismatch {
                context: "write_bits",
                expected: bus.width(),
                actual: bits.len(),
            });
        }
        for (wire, &bit) in bus.iter().zip(bits) {
            let _ = self.nets.set(wire, bit);
        }
        self.propagate()
    }

    // ══════════════════════════════════════════════════════════
    // Components
    // ══════════════════════════════════════════════════════════

    /// Registers a component and subscribes it to the given nets.
    ///
    /// Each subscription fires once immediately (edge subscriptions only if the net is
    /// high), so the component sees the circuit's power-up state.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotificationStorm`] if the initial evaluation does not settle.
    pub fn add_component<C>(&mut self, component: C, inputs: &[(Wire, Edge)]) -> SimResult<ComponentId>
    where
        C: Component + 'static,
    {
        let id = ComponentId(self.components.len() as u32);
        trace!(%id, name = component.name(), inputs = inputs.len(), "adding component");
        self.components.push(Box::new(component));
        for &(wire, edge) in inputs {
            self.nets.subscribe(wire, id, edge);
        }
        self.propagate()?;
        Ok(id)
    }

    /// Runs `f` whenever `wire` changes, and once now.
    ///
    /// # Errors
    ///
    /// As [`Circuit::add_component`].
    pub fn on_change<F>(&mut self, wire: Wire, f: F) -> SimResult<ComponentId>
    where
        F: FnMut(&mut Signals<'_>) + 'static,
    {
        self.add_component(f, &[(wire, Edge::Any)])
    }

    /// Runs `f` whenever `wire` rises, and now if it is already high.
    ///
    /// # Errors
    ///
    /// As [`Circuit::add_component`].
    pub fn on_posedge<F>(&mut self, wire: Wire, f: F) -> SimResult<ComponentId>
    where
        F: FnMut(&mut Signals<'_>) + 'static,
    {
        self.add_component(f, &[(wire, Edge::Rising)])
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Log name of a component.
    pub fn component_name(&self, id: ComponentId) -> Option<&'static str> {
        self.components.get(id.index()).map(|c| c.name())
    }

    /// Memory owned by a component.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownComponent`] or [`SimError::NoMemory`].
    pub fn memory(&self, id: ComponentId) -> SimResult<&Memory> {
        self.components
            .get(id.index())
            .ok_or(SimError::UnknownComponent(id.index()))?
            .memory()
            .ok_or(SimError::NoMemory(id.index()))
    }

    /// Mutable memory owned by a component, for loading images or poking words.
    ///
    /// Edits take effect on the component's next access; nothing is re-propagated.
    ///
    /// # Errors
    ///
    /// As [`Circuit::memory`].
    pub fn memory_mut(&mut self, id: ComponentId) -> SimResult<&mut Memory> {
        self.components
            .get_mut(id.index())
            .ok_or(SimError::UnknownComponent(id.index()))?
            .memory_mut()
            .ok_or(SimError::NoMemory(id.index()))
    }

    // ══════════════════════════════════════════════════════════
    // Simulation control
    // ══════════════════════════════════════════════════════════

    /// Ticks elapsed since construction, unaffected by renormalization.
    pub const fn tick(&self) -> u64 {
        self.scheduler.tick()
    }

    /// Whether any action is queued.
    pub fn has_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Queues a raw action `delay` ticks from now.
    pub fn schedule(&mut self, action: Action, delay: u64) {
        self.scheduler.schedule(action, delay);
    }

    /// Queues a net write `delay` ticks from now.
    pub fn schedule_set(&mut self, wire: Wire, value: bool, delay: u64) {
        self.scheduler.schedule(Action::Drive { wire, value }, delay);
    }

    /// Queues an atomic bus write `delay` ticks from now.
    pub fn schedule_write(&mut self, bus: &Bus, value: u64, delay: u64) {
        let bits = bus.iter().zip(u64_to_bits(value, bus.width())).collect();
        self.scheduler.schedule(Action::DriveBus { bits }, delay);
    }

    /// Jumps to the next pending tick and drains it.
    ///
    /// With nothing pending the tick is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Unstable`] or [`SimError::NotificationStorm`] if the tick does
    /// not reach a fixed point.
    pub fn advance(&mut self) -> SimResult<u64> {
        self.propagate()?;
        let Self {
            config,
            scheduler,
            nets,
            components,
            ..
        } = self;
        let tick = scheduler.advance(|action, sched| execute(action, sched, nets, components, config))?;
        trace!(tick, "advanced");
        Ok(tick)
    }

    /// Alias of [`Circuit::advance`].
    ///
    /// # Errors
    ///
    /// As [`Circuit::advance`].
    pub fn forward(&mut self) -> SimResult<u64> {
        self.advance()
    }

    /// Moves exactly one tick forward and drains it.
    ///
    /// # Errors
    ///
    /// As [`Circuit::advance`].
    pub fn step(&mut self) -> SimResult<u64> {
        self.propagate()?;
        let Self {
            config,
            scheduler,
            nets,
            components,
            ..
        } = self;
        scheduler.step(|action, sched| execute(action, sched, nets, components, config))
    }

    /// Drains everything due at the current tick without moving the clock.
    ///
    /// # Errors
    ///
    /// As [`Circuit::advance`].
    pub fn settle(&mut self) -> SimResult<()> {
        self.propagate()?;
        let Self {
            config,
            scheduler,
            nets,
            components,
            ..
        } = self;
        let _ = scheduler.drain(|action, sched| execute(action, sched, nets, components, config))?;
        Ok(())
    }

    /// Executes every action due within the next `ticks` ticks.
    ///
    /// The clock stops at the last executed action, not necessarily at the horizon.
    ///
    /// # Errors
    ///
    /// As [`Circuit::advance`].
    pub fn run_for(&mut self, ticks: u64) -> SimResult<u64> {
        let horizon = self.tick().saturating_add(ticks);
        self.settle()?;
        while let Some(next) = self.scheduler.next_time() {
            if next > horizon {
                break;
            }
            let _ = self.advance()?;
        }
        Ok(self.tick())
    }

    /// Advances until nothing is pending, returning the final tick.
    ///
    /// A free-running clock keeps the queue busy forever, so this is meant for circuits
    /// without one.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NeverIdle`] after `general.wait_limit` advances, or any
    /// propagation error.
    pub fn run_until_idle(&mut self) -> SimResult<u64> {
        self.settle()?;
        let limit = self.config.general.wait_limit;
        let mut advances = 0;
        while self.scheduler.has_pending() {
            if advances >= limit {
                return Err(SimError::NeverIdle { advances });
            }
            let _ = self.advance()?;
            advances += 1;
        }
        Ok(self.tick())
    }

    /// Advances until `wire` rises, returning the tick of the edge.
    ///
    /// If the wire is already high it must first fall. The level is sampled once after each
    /// advance, so a pulse that rises and falls again within a single tick is not seen; the
    /// wait then continues until a later edge or the advance limit. Watch such pulses with
    /// [`Circuit::on_posedge`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Stalled`] if the queue empties first, [`SimError::WaitLimit`]
    /// after the configured number of advances, or any propagation error.
    pub fn posedge(&mut self, wire: Wire) -> SimResult<u64> {
        self.wait_for(wire, true)
    }

    /// Advances until `wire` falls, returning the tick of the edge.
    ///
    /// Like [`Circuit::posedge`], a glitch that falls and recovers within one tick is missed.
    ///
    /// # Errors
    ///
    /// As [`Circuit::posedge`].
    pub fn negedge(&mut self, wire: Wire) -> SimResult<u64> {
        self.wait_for(wire, false)
    }

    fn wait_for(&mut self, wire: Wire, level: bool) -> SimResult<u64> {
        self.propagate()?;
        let limit = self.config.general.wait_limit;
        let mut armed = self.get(wire) != level;
        let mut advances = 0;
        loop {
            if !self.scheduler.has_pending() {
                return Err(SimError::Stalled {
                    wire,
                    tick: self.tick(),
                });
            }
            if advances >= limit {
                return Err(SimError::WaitLimit { wire, advances });
            }
            let tick = self.advance()?;
            advances += 1;
            let value = self.get(wire);
            if value == level && armed {
                return Ok(tick);
            }
            if value != level {
                armed = true;
            }
        }
    }

    /// Snapshot of the simulation counters.
    pub fn stats(&self) -> SimStats {
        SimStats {
            ticks: self.scheduler.tick(),
            actions_executed: self.scheduler.executed(),
            notifications: self.nets.notifications(),
            renormalizations: self.scheduler.renormalizations(),
            peak_pending: self.scheduler.peak_pending(),
            pending: self.scheduler.pending(),
            wires: self.nets.len(),
            nets: self.nets.net_count(),
            merges: self.nets.merges(),
            components: self.components.len(),
        }
    }

    fn propagate(&mut self) -> SimResult<()> {
        propagate(
            &mut self.scheduler,
            &mut self.nets,
            &mut self.components,
            self.config.scheduler.max_notifications,
        )
    }
}

/// Checks that two buses have equal widths.
pub(crate) fn check_width(context: &'static str, expected: &Bus, actual: &Bus) -> SimResult<()> {
    if expected.width() == actual.width() {
        Ok(())
    } else {
        Err(SimError::WidthMismatch {
            context,
            expected: expected.width(),
            actual: actual.width(),
        })
    }
}

fn execute(
    action: Action,
    scheduler: &mut Scheduler<Action>,
    nets: &mut NetTable,
    components: &mut [Box<dyn Component>],
    config: &Config,
) -> SimResult<()> {
    if config.general.trace_actions {
        debug!(tick = scheduler.tick(), ?action, "execute");
    }
    match action {
        Action::Drive { wire, value } => {
            let _ = nets.set(wire, value);
        }
        Action::DriveBus { bits } => {
            for (wire, value) in bits {
                let _ = nets.set(wire, value);
            }
        }
        Action::Wake(id) => nets.wake(id),
    }
    propagate(scheduler, nets, components, config.scheduler.max_notifications)
}

fn propagate(
    scheduler: &mut Scheduler<Action>,
    nets: &mut NetTable,
    components: &mut [Box<dyn Component>],
    limit: usize,
) -> SimResult<()> {
    let mut count = 0;
    while let Some((id, rose)) = nets.pop_ready() {
        count += 1;
        if count > limit {
            warn!(tick = scheduler.tick(), limit, "propagation did not settle");
            return Err(SimError::NotificationStorm {
                tick: scheduler.tick(),
                limit,
            });
        }
        let Some(component) = components.get_mut(id.index()) else {
            continue;
        };
        let mut signals = Signals::new(nets, scheduler, id, rose);
        component.evaluate(&mut signals);
    }
    Ok(())
}
