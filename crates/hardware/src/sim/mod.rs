//! Simulation utilities and program loading.
//!
//! Provides utilities for reading program images from disk before they are copied into a
//! simulated memory.

/// Raw and hex-text program images.
pub mod loader;

pub use loader::load_program;
