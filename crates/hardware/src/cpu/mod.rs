//! CPU assemblies built from the component library.

/// The 8-bit SAP-1 computer.
pub mod sap1;

pub use sap1::{RunSummary, Sap1, Sap1State};
