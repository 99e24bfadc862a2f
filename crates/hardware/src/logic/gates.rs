//! Combinational gates.
//!
//! Every gate subscribes to each input's changes, recomputes its boolean function and
//! schedules the result onto its output after the configured gate delay. Gates of any fan-in
//! are supported; the two-input helpers cover the common cases.

use crate::circuit::{Circuit, Component, Signals, check_width};
use crate::common::SimResult;
use crate::net::{Bus, Edge, Wire};

/// Boolean function computed by a [`Gate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateKind {
    /// Copies its single input.
    Buf,
    /// Inverts its single input.
    Not,
    /// High when every input is high.
    And,
    /// High when any input is high.
    Or,
    /// Low when every input is high.
    Nand,
    /// Low when any input is high.
    Nor,
    /// High when an odd number of inputs are high.
    Xor,
    /// High when an even number of inputs are high.
    Xnor,
}

impl GateKind {
    /// Evaluates the function over `inputs`.
    pub fn apply(self, mut inputs: impl Iterator<Item = bool>) -> bool {
        match self {
            Self::Buf => inputs.next().unwrap_or(false),
            Self::Not => !inputs.next().unwrap_or(false),
            Self::And => inputs.all(|x| x),
            Self::Or => inputs.any(|x| x),
            Self::Nand => !inputs.all(|x| x),
            Self::Nor => !inputs.any(|x| x),
            Self::Xor => inputs.filter(|&x| x).count() % 2 == 1,
            Self::Xnor => inputs.filter(|&x| x).count() % 2 == 0,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Buf => "buf",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::Xor => "xor",
            Self::Xnor => "xnor",
        }
    }
}

/// A single combinational gate.
#[derive(Debug)]
pub struct Gate {
    kind: GateKind,
    inputs: Vec<Wire>,
    output: Wire,
    delay: u64,
}

impl Component for Gate {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        let value = self.kind.apply(self.inputs.iter().map(|&w| signals.get(w)));
        signals.schedule(self.output, value, self.delay);
    }
}

impl Circuit {
    /// Drives `output` with `kind` applied to `inputs`, after the configured gate delay.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from the initial evaluation.
    pub fn gate_into(&mut self, kind: GateKind, inputs: &[Wire], output: Wire) -> SimResult<()> {
        let delay = self.config().timing.gate_delay;
        self.gate_with_delay(kind, inputs, output, delay)
    }

    /// As [`Circuit::gate_into`] with an explicit delay.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from the initial evaluation.
    pub fn gate_with_delay(
        &mut self,
        kind: GateKind,
        inputs: &[Wire],
        output: Wire,
        delay: u64,
    ) -> SimResult<()> {
        let sensitivity: Vec<_> = inputs.iter().map(|&w| (w, Edge::Any)).collect();
        let gate = Gate {
            kind,
            inputs: inputs.to_vec(),
            output,
            delay,
        };
        let _ = self.add_component(gate, &sensitivity)?;
        Ok(())
    }

    /// Creates a fresh output net driven by `kind` over `inputs`.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from the initial evaluation.
    pub fn gate(&mut self, kind: GateKind, inputs: &[Wire]) -> SimResult<Wire> {
        let output = self.wire();
        self.gate_into(kind, inputs, output)?;
        Ok(output)
    }

    /// `!a`.
    ///
    /// # Errors
    ///
    /// As [`Circuit::gate`].
    pub fn inverter(&mut self, a: Wire) -> SimResult<Wire> {
        self.gate(GateKind::Not, &[a])
    }

    /// `a & b`.
    ///
    /// # Errors
    ///
    /// As [`Circuit::gate`].
    pub fn and(&mut self, a: Wire, b: Wire) -> SimResult<Wire> {
        self.gate(GateKind::And, &[a, b])
    }

    /// `a | b`.
    ///
    /// # Errors
    ///
    /// As [`Circuit::gate`].
    pub fn or(&mut self, a: Wire, b: Wire) -> SimResult<Wire> {
        self.gate(GateKind::Or, &[a, b])
    }

    /// `!(a & b)`.
    ///
    /// # Errors
    ///
    /// As [`Circuit::gate`].
    pub fn nand(&mut self, a: Wire, b: Wire) -> SimResult<Wire> {
        self.gate(GateKind::Nand, &[a, b])
    }

    /// `!(a | b)`.
    ///
    /// # Errors
    ///
    /// As [`Circuit::gate`].
    pub fn nor(&mut self, a: Wire, b: Wire) -> SimResult<Wire> {
        self.gate(GateKind::Nor, &[a, b])
    }

    /// `a ^ b`.
    ///
    /// # Errors
    ///
    /// As [`Circuit::gate`].
    pub fn xor(&mut self, a: Wire, b: Wire) -> SimResult<Wire> {
        self.gate(GateKind::Xor, &[a, b])
    }

    /// Bitwise `!a`.
    ///
    /// # Errors
    ///
    /// As [`Circuit::gate`].
    pub fn not_bus(&mut self, a: &Bus) -> SimResult<Bus> {
        a.iter().map(|w| self.inverter(w)).collect()
    }

    /// Bitwise `a & b`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::WidthMismatch`] if the widths differ.
    pub fn and_bus(&mut self, a: &Bus, b: &Bus) -> SimResult<Bus> {
        self.bitwise(GateKind::And, a, b)
    }

    /// Bitwise `a | b`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::WidthMismatch`] if the widths differ.
    pub fn or_bus(&mut self, a: &Bus, b: &Bus) -> SimResult<Bus> {
        self.bitwise(GateKind::Or, a, b)
    }

    /// Bitwise `a ^ b`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::WidthMismatch`] if the widths differ.
    pub fn xor_bus(&mut self, a: &Bus, b: &Bus) -> SimResult<Bus> {
        self.bitwise(GateKind::Xor, a, b)
    }

    fn bitwise(&mut self, kind: GateKind, a: &Bus, b: &Bus) -> SimResult<Bus> {
        check_width(kind.name(), a, b)?;
        a.iter()
            .zip(b)
            .map(|(x, y)| self.gate(kind, &[x, y]))
            .collect()
    }
}
