//! Microcode sequencer.
//!
//! The control unit keeps a step counter and drives the control bus with
//! `table[(opcode << step_bits) | step]`. Its timing is:
//!
//! 1. **Rising clock edge:** The step advances. It returns to zero if the word active
//!    during the cycle that just ended was the all-zero end marker, or if that was the
//!    instruction's last step.
//! 2. **Any opcode or step change:** The control word is looked up again and driven with
//!    zero delay, so the word for the new instruction is in place before the next edge.
//! 3. **Reset high:** The step is forced to zero.
//!
//! Registers sample on the same rising edge that advances the step. They see the word of
//! the step that just ended, because the new word is scheduled after the edge's writes.
//! An instruction with `n` microcode steps in total therefore takes `n + 1` cycles, the
//! last one spent on the end marker.

use tracing::debug;

use crate::circuit::{Circuit, Component, ComponentId, Signals};
use crate::common::{SimError, SimResult};
use crate::microcode::table::MicrocodeTable;
use crate::net::{Bus, Edge, Wire};

/// Step counter plus microcode lookup.
#[derive(Debug)]
pub struct ControlUnit {
    table: MicrocodeTable,
    opcode: Bus,
    reset: Wire,
    control: Bus,
    step_bus: Bus,
    step: u64,
}

impl ControlUnit {
    fn next_step(&self, opcode: u64) -> u64 {
        let current = self.table.word(opcode, self.step);
        let last = self.table.steps_per_instruction() as u64 - 1;
        if current == 0 || self.step >= last {
            0
        } else {
            self.step + 1
        }
    }
}

impl Component for ControlUnit {
    fn name(&self) -> &'static str {
        "control_unit"
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        let opcode = signals.read(&self.opcode);
        if signals.get(self.reset) {
            self.step = 0;
        } else if signals.rose() {
            self.step = self.next_step(opcode);
        }

        let word = self.table.word(opcode, self.step);
        signals.schedule_write(&self.control, word, 0);
        signals.schedule_write(&self.step_bus, self.step, 0);
    }
}

/// Handles returned by [`Circuit::control_unit`].
#[derive(Clone, Debug)]
pub struct ControlPorts {
    /// Component id.
    pub id: ComponentId,
    /// Current step, `table.step_bits()` wide.
    pub step: Bus,
}

impl Circuit {
    /// Sequences `control` from `table`, indexed by `opcode` and an internal step counter.
    ///
    /// # Arguments
    ///
    /// * `opcode` - Opcode bus; may be narrower than the table's opcode field.
    /// * `clk` - Clock whose rising edge advances the step. A clock that is already high
    ///   when the unit is built counts as one edge.
    /// * `reset` - Holds the step at zero while high.
    /// * `table` - Microcode.
    /// * `control` - Control bus, exactly `table.word_bits()` wide.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OpcodeWidth`] if `opcode` is wider than the table's opcode field
    /// and [`SimError::WidthMismatch`] if `control` does not match the word width.
    pub fn control_unit(
        &mut self,
        opcode: &Bus,
        clk: Wire,
        reset: Wire,
        table: MicrocodeTable,
        control: &Bus,
    ) -> SimResult<ControlPorts> {
        if opcode.width() > table.opcode_bits() {
            return Err(SimError::OpcodeWidth {
                width: opcode.width(),
                field: table.opcode_bits(),
            });
        }
        if control.width() != table.word_bits() {
            return Err(SimError::WidthMismatch {
                context: "control_unit",
                expected: table.word_bits(),
                actual: control.width(),
            });
        }
        debug!(
            opcode_bits = table.opcode_bits(),
            step_bits = table.step_bits(),
            word_bits = table.word_bits(),
            fetch = table.fetch_len(),
            "building control unit"
        );

        let step = self.bus(table.step_bits());
        let mut sensitivity = vec![(clk, Edge::Rising), (reset, Edge::Any)];
        sensitivity.extend(opcode.iter().map(|w| (w, Edge::Any)));
        let unit = ControlUnit {
            table,
            opcode: opcode.clone(),
            reset,
            control: control.clone(),
            step_bus: step.clone(),
            step: 0,
        };
        let id = self.add_component(unit, &sensitivity)?;
        Ok(ControlPorts { id, step })
    }
}
