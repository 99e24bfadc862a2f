//! Discrete-event digital logic simulator library.
//!
//! This crate builds and simulates circuits out of wires, buses and components:
//! 1. **Scheduler:** A tick-ordered agenda of pending actions with FIFO order within a tick
//!    and periodic renormalization of the tick counter.
//! 2. **Nets:** Boolean wires, buses, identity merging of connected wires, and edge-filtered
//!    subscriptions that notify components when a value changes.
//! 3. **Components:** Gates, adders, decoders, tri-state buffers, multiplexers, latches,
//!    registers, counters, clocks, RAM and ROM.
//! 4. **Microcode:** Control-word tables and a step-counting control unit.
//! 5. **CPU:** An 8-bit SAP-1 computer assembled from the library, with program loading.
//!
//! # Examples
//!
//! ```
//! use gatesim_core::Circuit;
//!
//! let mut circuit = Circuit::default();
//! let a = circuit.bus(4);
//! let b = circuit.bus(4);
//! let zero = circuit.low();
//! let (sum, carry) = circuit.full_adder(&a, &b, zero).unwrap();
//! circuit.write(&a, 9).unwrap();
//! circuit.write(&b, 8).unwrap();
//! circuit.settle().unwrap();
//! assert_eq!(circuit.read(&sum), 1);
//! assert!(circuit.get(carry));
//! ```

/// Circuit container, components, and simulation control.
pub mod circuit;
/// Common types (errors, bit-vector conversions and formatting).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// CPU assemblies built from the component library.
pub mod cpu;
/// Component library (gates, arithmetic, plexers, sequential logic, memory).
pub mod logic;
/// Microcode tables and the control unit.
pub mod microcode;
/// Wires, buses, and the net table.
pub mod net;
/// Discrete-event scheduler.
pub mod sched;
/// Program loading.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Circuit container; build with `Circuit::default()` or `Circuit::new(config)`.
pub use crate::circuit::{Circuit, Component, ComponentId, Signals};
/// Error type and result alias used throughout the crate.
pub use crate::common::{SimError, SimResult};
/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Word-addressed memory backing RAM and ROM components.
pub use crate::logic::memory::Memory;
/// Wire and bus handles.
pub use crate::net::{Bus, Edge, Wire};
/// Counter snapshot returned by `Circuit::stats`.
pub use crate::stats::SimStats;
