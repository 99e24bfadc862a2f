//! Signal carriers.
//!
//! This module implements the net model underneath every circuit:
//! 1. **Handles:** Copyable [`Wire`] handles and ordered [`Bus`] groups with slicing.
//! 2. **Storage:** The [`NetTable`], holding values, subscriber lists and merge indirection.
//! 3. **Notification:** The ready queue of components woken by value changes.

/// Wire and bus handles.
pub mod bus;

/// Net storage, subscription and merging.
pub mod table;

pub use bus::{Bus, Wire};
pub use table::{Edge, Merge, NetTable};
