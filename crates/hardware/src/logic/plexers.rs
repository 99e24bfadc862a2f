//! Decoders, buffers and multiplexers.
//!
//! Buffers are the only way several drivers share one bus. No tri-state value exists: a
//! disabled buffer simply stops writing, and the bus keeps whatever value was last driven.

use crate::circuit::{Circuit, Component, Signals, check_width};
use crate::common::{SimError, SimResult};
use crate::net::{Bus, Edge, Wire};

/// Widest selector a decoder (and therefore a multiplexer) accepts.
pub const MAX_DECODER_BITS: usize = 16;

/// Forwards `input` to `output` while `enable` is high.
#[derive(Debug)]
pub struct Buffer {
    input: Bus,
    enable: Wire,
    output: Bus,
    delay: u64,
}

impl Component for Buffer {
    fn name(&self) -> &'static str {
        "buffer"
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        if signals.get(self.enable) {
            let bits = signals.read_bits(&self.input);
            signals.schedule_bits(&self.output, &bits, self.delay);
        }
    }
}

/// Raises the output line selected by `sel`.
#[derive(Debug)]
pub struct Decoder {
    sel: Bus,
    lines: Bus,
    active: Option<usize>,
    delay: u64,
}

impl Component for Decoder {
    fn name(&self) -> &'static str {
        "decoder"
    }

    fn evaluate(&mut self, signals: &mut Signals<'_>) {
        let selected = signals.read(&self.sel) as usize;
        if self.active == Some(selected) {
            return;
        }
        let mut wires = Vec::with_capacity(2);
        let mut bits = Vec::with_capacity(2);
        if let Some(previous) = self.active {
            wires.push(self.lines[previous]);
            bits.push(false);
        }
        wires.push(self.lines[selected]);
        bits.push(true);
        signals.schedule_bits(&Bus::new(wires), &bits, self.delay);
        self.active = Some(selected);
    }
}

impl Circuit {
    /// One-hot decoder: line `n` is high exactly when `sel` reads `n`.
    ///
    /// Each selector change lowers the previous line and raises the new one in a single
    /// step, so no other line rises in between.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DecoderTooWide`] for selectors wider than [`MAX_DECODER_BITS`].
    pub fn decoder(&mut self, sel: &Bus) -> SimResult<Bus> {
        let width = sel.width();
        if width > MAX_DECODER_BITS {
            return Err(SimError::DecoderTooWide {
                width,
                max: MAX_DECODER_BITS,
            });
        }
        let lines = self.bus(1 << width);
        let sensitivity: Vec<_> = sel.iter().map(|w| (w, Edge::Any)).collect();
        let decoder = Decoder {
            sel: sel.clone(),
            lines: lines.clone(),
            active: None,
            delay: self.config().timing.gate_delay,
        };
        let _ = self.add_component(decoder, &sensitivity)?;
        Ok(lines)
    }

    /// Creates a fresh bus fed from `input` while `enable` is high.
    ///
    /// # Errors
    ///
    /// Propagates stabilization failures from the initial evaluation.
    pub fn buffer(&mut self, input: &Bus, enable: Wire) -> SimResult<Bus> {
        let output = self.bus(input.width());
        self.buffer_into(input, enable, &output)?;
        Ok(output)
    }

    /// Drives `output` from `input` while `enable` is high.
    ///
    /// The input is copied when `enable` rises and whenever it changes while `enable` is
    /// already high. Several buffers may drive the same output; keeping at most one
    /// enabled at a time is up to the circuit.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::WidthMismatch`] if the widths differ.
    pub fn buffer_into(&mut self, input: &Bus, enable: Wire, output: &Bus) -> SimResult<()> {
        check_width("buffer", input, output)?;
        let mut sensitivity = vec![(enable, Edge::Rising)];
        sensitivity.extend(input.iter().map(|w| (w, Edge::Any)));
        let buffer = Buffer {
            input: input.clone(),
            enable,
            output: output.clone(),
            delay: self.config().timing.gate_delay,
        };
        let _ = self.add_component(buffer, &sensitivity)?;
        Ok(())
    }

    /// Selects `data[sel]` onto a fresh output bus.
    ///
    /// Each data bus passes through a buffer enabled by the matching decoder line, so exactly
    /// one input drives the output once the decoder has settled. Changing `sel` alone
    /// re-drives the output.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MuxInputs`] unless there are exactly `2^sel.width()` data buses,
    /// and [`SimError::WidthMismatch`] if they differ in width.
    pub fn mux(&mut self, data: &[Bus], sel: &Bus) -> SimResult<Bus> {
        let select_bits = sel.width();
        if select_bits > MAX_DECODER_BITS || data.len() != 1 << select_bits {
            return Err(SimError::MuxInputs {
                inputs: data.len(),
                select_bits,
            });
        }
        for input in &data[1..] {
            check_width("mux", &data[0], input)?;
        }
        let lines = self.decoder(sel)?;
        let output = self.bus(data[0].width());
        for (input, line) in data.iter().zip(&lines) {
            self.buffer_into(input, line, &output)?;
        }
        Ok(output)
    }

    /// Single-bit [`Circuit::mux`].
    ///
    /// # Errors
    ///
    /// As [`Circuit::mux`].
    pub fn mux_wire(&mut self, data: &[Wire], sel: &Bus) -> SimResult<Wire> {
        let buses: Vec<Bus> = data.iter().map(|&w| Bus::from(w)).collect();
        let output = self.mux(&buses, sel)?;
        Ok(output[0])
    }
}
