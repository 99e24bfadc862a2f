//! Simulator error definitions.
//!
//! This module defines the single error type returned by every fallible operation. It covers:
//! 1. **Configuration errors:** Width mismatches, malformed multiplexers and memories, invalid
//!    microcode tables and invalid simulator settings. Raised at construction time.
//! 2. **Usage errors:** Waiting on an edge that can never arrive, or addressing a component
//!    that owns no memory.
//! 3. **Circuit hazards:** Same-tick work that never reaches a fixed point.
//! 4. **I/O:** Reading configuration files and program images.

use thiserror::Error;

use crate::net::Wire;

/// Errors raised while building or simulating a circuit.
#[derive(Debug, Error)]
pub enum SimError {
    /// Two buses that must have equal widths do not.
    #[error("{context}: width mismatch (expected {expected} bits, got {actual})")]
    WidthMismatch {
        /// Constructor or operation that detected the mismatch.
        context: &'static str,
        /// Required width.
        expected: usize,
        /// Width that was supplied.
        actual: usize,
    },

    /// A multiplexer was given a data-line count that is not `2^selector_width`.
    #[error("mux: {inputs} data inputs do not match a {select_bits}-bit selector")]
    MuxInputs {
        /// Number of data buses supplied.
        inputs: usize,
        /// Width of the selector bus.
        select_bits: usize,
    },

    /// A memory backing array does not hold exactly `2^address_width` words.
    #[error("memory: {words} words cannot back a {address_bits}-bit address space")]
    MemorySize {
        /// Number of words supplied.
        words: usize,
        /// Width of the address bus.
        address_bits: usize,
    },

    /// A memory or value was requested with an unsupported word width.
    #[error("memory: word width {width} is outside 1..=64")]
    MemoryWidth {
        /// Requested word width in bits.
        width: usize,
    },

    /// A decoder (or a memory address bus) is too wide to materialise.
    #[error("decoder: {width}-bit selector exceeds the {max}-bit limit")]
    DecoderTooWide {
        /// Requested selector width.
        width: usize,
        /// Largest supported width.
        max: usize,
    },

    /// A clock was created with a zero half-period.
    #[error("clock: half-period must be at least one tick")]
    ZeroHalfPeriod,

    /// A feedback structure that needs propagation delay was built with none.
    #[error("{context}: zero-delay feedback loop cannot settle")]
    ZeroDelayFeedback {
        /// Constructor that rejected the delay.
        context: &'static str,
    },

    /// The opcode bus is wider than the microcode table's opcode field.
    #[error("control unit: {width}-bit opcode bus exceeds the table's {field}-bit opcode field")]
    OpcodeWidth {
        /// Width of the supplied opcode bus.
        width: usize,
        /// Width of the table's opcode field.
        field: usize,
    },

    /// A microcode entry names an opcode outside the table.
    #[error("microcode: opcode {opcode:#x} does not fit in {bits} bits")]
    OpcodeRange {
        /// Offending opcode.
        opcode: u64,
        /// Width of the opcode field.
        bits: usize,
    },

    /// A microcode entry has more steps than an instruction slot holds.
    #[error("microcode: opcode {opcode:#x} needs {steps} steps but only {capacity} are available")]
    MicrocodeOverflow {
        /// Offending opcode (the fetch sequence reports opcode 0).
        opcode: u64,
        /// Steps required, fetch included.
        steps: usize,
        /// Steps per instruction.
        capacity: usize,
    },

    /// A microcode entry contains the all-zero end-of-instruction word.
    #[error("microcode: opcode {opcode:#x} step {step} is the empty end-of-instruction word")]
    EmptyControlWord {
        /// Offending opcode.
        opcode: u64,
        /// Step index within the instruction.
        step: usize,
    },

    /// A control word has bits set beyond the control bus.
    #[error("microcode: control word {word:#x} does not fit in {bits} bits")]
    ControlWordWidth {
        /// Offending word.
        word: u64,
        /// Width of the control bus.
        bits: usize,
    },

    /// A memory load would run past the end of the memory.
    #[error("load: {len} bytes at offset {offset:#x} exceed memory of {size} words")]
    LoadOutOfRange {
        /// Start offset of the load.
        offset: usize,
        /// Number of bytes to load.
        len: usize,
        /// Memory size in words.
        size: usize,
    },

    /// The addressed component does not own a memory array.
    #[error("component {0} has no memory")]
    NoMemory(usize),

    /// No component was registered under the given id.
    #[error("no component with id {0}")]
    UnknownComponent(usize),

    /// A single tick kept producing same-tick actions past the configured cap.
    #[error("circuit did not stabilize at tick {tick}: more than {limit} actions in one tick")]
    Unstable {
        /// Absolute tick at which the cap was hit.
        tick: u64,
        /// Configured cap.
        limit: usize,
    },

    /// A single write kept re-triggering components past the configured cap.
    #[error("circuit did not stabilize at tick {tick}: more than {limit} notifications in one pass")]
    NotificationStorm {
        /// Absolute tick at which the cap was hit.
        tick: u64,
        /// Configured cap.
        limit: usize,
    },

    /// An edge was awaited but nothing is left to simulate.
    #[error("waiting on {wire}: no pending actions at tick {tick}")]
    Stalled {
        /// Wire being waited on.
        wire: Wire,
        /// Absolute tick at which the queue ran dry.
        tick: u64,
    },

    /// An edge did not arrive within the configured number of advances.
    #[error("waiting on {wire}: no transition after {advances} advances")]
    WaitLimit {
        /// Wire being waited on.
        wire: Wire,
        /// Advances performed before giving up.
        advances: u64,
    },

    /// The queue was still non-empty after the configured number of advances.
    #[error("circuit still busy after {advances} advances")]
    NeverIdle {
        /// Advances performed before giving up.
        advances: u64,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A hex program image contains a token that is not a byte.
    #[error("program line {line}: '{token}' is not a hex byte")]
    ProgramSyntax {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },

    /// Reading a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type SimResult<T> = Result<T, SimError>;
