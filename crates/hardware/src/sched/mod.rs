//! Event scheduling.
//!
//! This module provides the time-ordered action queue that drives every simulation:
//! 1. **Agenda:** A d-ary min-heap keyed by `(time, insertion sequence)`.
//! 2. **Scheduler:** Tick ownership, advancement, draining and renormalization.

/// D-ary heap of timed actions.
pub mod heap;

/// Tick-owning scheduler generic over the action type.
pub mod scheduler;

pub use heap::AgendaHeap;
pub use scheduler::Scheduler;
