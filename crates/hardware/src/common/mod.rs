//! Common utilities and types used throughout the simulator.
//!
//! This module provides the building blocks shared by every layer. It includes:
//! 1. **Error Handling:** The crate-wide [`SimError`] and [`SimResult`] alias.
//! 2. **Value Conversion:** Packing bus bits into integers and back, and diagnostic renderings.

/// Error types for construction and simulation failures.
pub mod error;

/// Bit-vector and integer conversions.
pub mod value;

pub use error::{SimError, SimResult};
