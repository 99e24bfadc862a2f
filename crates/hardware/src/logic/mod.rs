//! Component library.
//!
//! Every constructor is a method on [`crate::Circuit`] that wires new components onto
//! existing nets and returns the nets it creates. The library covers:
//! 1. **Gates:** Inverter, AND/OR/NAND/NOR/XOR of any fan-in and their bus-wide forms.
//! 2. **Arithmetic:** Ripple-carry full adder, incrementer and decrementer.
//! 3. **Plexers:** Decoder, buffer and multiplexer.
//! 4. **Sequential:** Clock, SR and NOR latches, D flip-flop, register and counter.
//! 5. **Memory:** RAM, bidirectional RAM, ROM and clocked ROM over an owned word store.

/// Ripple-carry arithmetic.
pub mod arith;

/// Combinational gates.
pub mod gates;

/// Addressable memories.
pub mod memory;

/// Decoders, buffers and multiplexers.
pub mod plexers;

/// Clocks, latches, flip-flops, registers and counters.
pub mod sequential;

pub use gates::GateKind;
pub use memory::{Memory, RamPorts};
