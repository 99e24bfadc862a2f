//! Stateful elements: clocks, latches, flip-flops, registers and counters.
//!
//! Edge-triggered elements subscribe to the rising edge of their clock and reset lines only.
//! Reset is asynchronous: its rising edge reloads the initial value immediately, and while
//! it is held high every clock edge reloads it again.

use crate::circuit::{Action, Circuit, Component, ComponentId, Signals, check_width};
use crate::common::value::u64_to_bits;
use crate::common::{SimError, SimResult};
use crate::logic::gates::GateKind;
use crate::net::{Bus, Edge, Wire};

/// Free-running square-wave generator.
#[derive(Debug)]
pub struct Clock {
    output: Wire,
    half_period: u64,
}

impl Component for Clock {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        let level = !signals.get(self.output);
        signals.set(self.output, level);
        signals.wake_after(self.half_period);
    }
}

/// Set/reset latch with set dominance.
#[derive(Debug)]
pub struct SrLatch {
    set: Wire,
    reset: Wire,
    state: bool,
    output: Wire,
    delay: u64,
}

impl Component for SrLatch {
    fn name(&self) -> &'static str {
        "sr_latch"
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        self.state = signals.get(self.set) || (self.state && !signals.get(self.reset));
        signals.schedule(self.output, self.state, self.delay);
    }
}

/// Positive-edge register with write enable and asynchronous reset.
#[derive(Debug)]
pub struct Register {
    data: Bus,
    we: Wire,
    reset: Wire,
    initial: Vec<bool>,
    stored: Vec<bool>,
    output: Bus,
    delay: u64,
}

impl Component for Register {
    fn name(&self) -> &'static str {
        "register"
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        if signals.get(self.reset) {
            self.stored.clone_from(&self.initial);
        } else if signals.rose() && signals.get(self.we) {
            self.stored = signals.read_bits(&self.data);
        } else {
            return;
        }
        signals.schedule_bits(&self.output, &self.stored, self.delay);
    }
}

impl Circuit {
    /// Square wave with the given half-period, starting low.
    ///
    /// Rising edges fall on ticks `p, 3p, 5p, ...` and falling edges on `2p, 4p, ...`,
    /// counted from the tick of construction.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ZeroHalfPeriod`] if `half_period` is zero.
    pub fn clock(&mut self, half_period: u64) -> SimResult<Wire> {
        if half_period == 0 {
            return Err(SimError::ZeroHalfPeriod);
        }
        let output = self.wire();
        let id = self.add_component(
            Clock {
                output,
                half_period,
            },
            &[],
        )?;
        self.schedule(Action::Wake(id), half_period);
        Ok(output)
    }

    /// Behavioural SR latch; set wins when both inputs are high.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from the initial evaluation.
    pub fn sr_latch(&mut self, set: Wire, reset: Wire, initial: bool) -> SimResult<Wire> {
        let output = self.wire_with(initial);
        let latch = SrLatch {
            set,
            reset,
            state: initial,
            output,
            delay: self.config().timing.latch_delay,
        };
        let _ = self.add_component(latch, &[(set, Edge::Any), (reset, Edge::Any)])?;
        Ok(output)
    }

    /// Gate-level latch of two cross-coupled NOR gates, returning `(q, !q)`.
    ///
    /// The loop only settles with a propagation delay; releasing both inputs at once
    /// oscillates, as the real circuit does.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ZeroDelayFeedback`] if `delay` is zero.
    pub fn nor_latch(&mut self, set: Wire, reset: Wire, delay: u64) -> SimResult<(Wire, Wire)> {
        if delay == 0 {
            return Err(SimError::ZeroDelayFeedback {
                context: "nor_latch",
            });
        }
        let q = self.wire_with(false);
        let nq = self.wire_with(true);
        self.gate_with_delay(GateKind::Nor, &[reset, nq], q, delay)?;
        self.gate_with_delay(GateKind::Nor, &[set, q], nq, delay)?;
        Ok((q, nq))
    }

    /// Positive-edge D flip-flop with asynchronous reset to `initial`.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from the initial evaluation.
    pub fn dff(&mut self, input: Wire, clk: Wire, reset: Wire, initial: bool) -> SimResult<Wire> {
        let output = self.wire_with(initial);
        let high = self.high();
        let delay = self.config().timing.latch_delay;
        let _ = self.attach_register(
            &Bus::from(input),
            clk,
            high,
            reset,
            initial as u64,
            &Bus::from(output),
            delay,
        )?;
        Ok(output)
    }

    /// Write-enabled register initialised to zero.
    ///
    /// On each rising edge of `clk`: if `reset` is high the register reloads its initial
    /// value, otherwise if `we` is high it stores `data`. The output always shows the stored
    /// value.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from the initial evaluation.
    pub fn register(&mut self, data: &Bus, clk: Wire, we: Wire, reset: Wire) -> SimResult<Bus> {
        self.register_with(data, clk, we, reset, 0)
    }

    /// As [`Circuit::register`] with a non-zero power-up and reset value.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from the initial evaluation.
    pub fn register_with(
        &mut self,
        data: &Bus,
        clk: Wire,
        we: Wire,
        reset: Wire,
        initial: u64,
    ) -> SimResult<Bus> {
        let output = self.bus_with(data.width(), initial);
        let _ = self.register_into(data, clk, we, reset, initial, &output)?;
        Ok(output)
    }

    /// Drives an existing bus from a new register.
    ///
    /// The output bus is not rewritten at construction; it should already hold `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::WidthMismatch`] if `data` and `output` differ in width.
    pub fn register_into(
        &mut self,
        data: &Bus,
        clk: Wire,
        we: Wire,
        reset: Wire,
        initial: u64,
        output: &Bus,
    ) -> SimResult<ComponentId> {
        let delay = self.config().timing.register_delay;
        self.attach_register(data, clk, we, reset, initial, output, delay)
    }

    fn attach_register(
        &mut self,
        data: &Bus,
        clk: Wire,
        we: Wire,
        reset: Wire,
        initial: u64,
        output: &Bus,
        delay: u64,
    ) -> SimResult<ComponentId> {
        check_width("register", data, output)?;
        let initial = u64_to_bits(initial, data.width());
        let register = Register {
            data: data.clone(),
            we,
            reset,
            stored: initial.clone(),
            initial,
            output: output.clone(),
            delay,
        };
        self.add_component(register, &[(clk, Edge::Rising), (reset, Edge::Rising)])
    }

    /// Binary up-counter.
    ///
    /// On each rising edge of `clk` the counter loads `data` if `load` is high and otherwise
    /// increments, wrapping at `2^w`. `reset` clears it asynchronously.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from construction.
    pub fn counter(&mut self, data: &Bus, clk: Wire, load: Wire, reset: Wire) -> SimResult<Bus> {
        let output = self.bus(data.width());
        let (incremented, _) = self.incrementer(&output)?;
        let next = self.mux(&[incremented, data.clone()], &Bus::from(load))?;
        let high = self.high();
        let _ = self.register_into(&next, clk, high, reset, 0, &output)?;
        Ok(output)
    }
}
