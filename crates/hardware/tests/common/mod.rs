//! # Test Infrastructure
//!
//! Helpers shared by every unit test module.
