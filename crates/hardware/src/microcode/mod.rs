//! Microcode-driven control.
//!
//! This module provides the pieces a microcoded CPU is sequenced with:
//! 1. **Tables:** [`MicrocodeTable`], built by [`MicrocodeBuilder`] from a fetch sequence and
//!    sparse per-opcode entries.
//! 2. **Control unit:** A step counter clocked by the system clock that drives a control bus
//!    from the table.

/// Control unit component.
pub mod control;

/// Microcode table layout and validation.
pub mod table;

pub use control::{ControlPorts, ControlUnit};
pub use table::{MicrocodeBuilder, MicrocodeTable};
