//! Discrete-event scheduler.
//!
//! The scheduler owns the simulation clock and a queue of pending actions. It performs:
//! 1. **Admission:** `schedule(action, delay)` queues an action at `tick + delay`.
//! 2. **Advancement:** `advance` jumps to the earliest pending time, `step` moves exactly one
//!    tick forward. Both then drain the current tick.
//! 3. **Draining:** Every action due now is executed, including ones scheduled with zero delay
//!    while draining, until none remain or the per-tick cap is exceeded.
//! 4. **Renormalization:** Once the heap-local time passes a configured limit, the local time
//!    and every pending time are rebased by a fixed delta. The offset lives in `epoch`, so
//!    every tick the scheduler reports is absolute and unaffected by a rebase.
//!
//! The scheduler knows nothing about circuits; the action type and its execution are
//! supplied by the caller.

use tracing::{debug, warn};

use super::heap::AgendaHeap;
use crate::common::{SimError, SimResult};
use crate::config::SchedulerConfig;

/// Time-ordered queue of actions of type `A`.
#[derive(Debug)]
pub struct Scheduler<A> {
    agenda: AgendaHeap<A>,
    now: u64,
    epoch: u64,
    renormalize_limit: u64,
    renormalize_delta: u64,
    max_actions_per_tick: usize,
    executed: u64,
    renormalizations: u64,
    peak_pending: usize,
}

impl<A> Scheduler<A> {
    /// Creates an idle scheduler at tick 0.
    ///
    /// # Arguments
    ///
    /// * `config` - Heap arity, renormalization bounds and the per-tick action cap. The
    ///   delta is clamped into `1..=limit`; use [`crate::config::Config::validate`] to
    ///   reject such values instead.
    pub fn new(config: &SchedulerConfig) -> Self {
        let limit = config.renormalize_limit.max(1);
        Self {
            agenda: AgendaHeap::new(config.arity),
            now: 0,
            epoch: 0,
            renormalize_limit: limit,
            renormalize_delta: config.renormalize_delta.clamp(1, limit),
            max_actions_per_tick: config.max_actions_per_tick.max(1),
            executed: 0,
            renormalizations: 0,
            peak_pending: 0,
        }
    }

    /// Ticks elapsed since construction, unaffected by renormalization.
    pub const fn tick(&self) -> u64 {
        self.epoch + self.now
    }

    /// Whether any action is queued.
    pub fn has_pending(&self) -> bool {
        !self.agenda.is_empty()
    }

    /// Number of queued actions.
    pub fn pending(&self) -> usize {
        self.agenda.len()
    }

    /// Tick of the earliest queued action.
    pub fn next_time(&self) -> Option<u64> {
        self.agenda.peek_time().map(|time| self.epoch + time)
    }

    /// Total actions executed so far.
    pub const fn executed(&self) -> u64 {
        self.executed
    }

    /// Number of rebases performed.
    pub const fn renormalizations(&self) -> u64 {
        self.renormalizations
    }

    /// Largest queue length observed.
    pub const fn peak_pending(&self) -> usize {
        self.peak_pending
    }

    /// Queues `action` to run `delay` ticks from now.
    ///
    /// A zero delay runs the action during the current drain if one is in progress,
    /// otherwise on the next `advance`.
    pub fn schedule(&mut self, action: A, delay: u64) {
        self.agenda.push(self.now.saturating_add(delay), action);
        self.peak_pending = self.peak_pending.max(self.agenda.len());
    }

    /// Jumps to the earliest pending time and drains it.
    ///
    /// With nothing pending this is a no-op returning the unchanged tick.
    ///
    /// # Arguments
    ///
    /// * `execute` - Runs one action; it may schedule further actions through the scheduler
    ///   it is handed.
    ///
    /// # Returns
    ///
    /// The tick after draining.
    ///
    /// # Errors
    ///
    /// Propagates errors from `execute`, and returns [`SimError::Unstable`] if the tick
    /// executes more actions than the configured cap.
    pub fn advance<F>(&mut self, execute: F) -> SimResult<u64>
    where
        F: FnMut(A, &mut Self) -> SimResult<()>,
    {
        let Some(next) = self.agenda.peek_time() else {
            return Ok(self.tick());
        };
        self.now = next.max(self.now);
        let _ = self.drain(execute)?;
        self.renormalize();
        Ok(self.tick())
    }

    /// Moves exactly one tick forward and drains it.
    ///
    /// # Errors
    ///
    /// As [`Scheduler::advance`].
    pub fn step<F>(&mut self, execute: F) -> SimResult<u64>
    where
        F: FnMut(A, &mut Self) -> SimResult<()>,
    {
        self.now += 1;
        let _ = self.drain(execute)?;
        self.renormalize();
        Ok(self.tick())
    }

    /// Executes every action due at the current tick, returning how many ran.
    ///
    /// # Errors
    ///
    /// As [`Scheduler::advance`].
    pub fn drain<F>(&mut self, mut execute: F) -> SimResult<usize>
    where
        F: FnMut(A, &mut Self) -> SimResult<()>,
    {
        let mut count = 0;
        while self.agenda.peek_time() == Some(self.now) {
            let Some((_, action)) = self.agenda.pop() else {
                break;
            };
            count += 1;
            if count > self.max_actions_per_tick {
                warn!(
                    tick = self.tick(),
                    limit = self.max_actions_per_tick,
                    "tick did not stabilize"
                );
                return Err(SimError::Unstable {
                    tick: self.tick(),
                    limit: self.max_actions_per_tick,
                });
            }
            self.executed += 1;
            execute(action, self)?;
        }
        Ok(count)
    }

    /// Rewrites every queued action in place.
    pub fn for_each_pending_mut(&mut self, f: impl FnMut(&mut A)) {
        self.agenda.for_each_mut(f);
    }

    fn renormalize(&mut self) {
        if self.now <= self.renormalize_limit {
            return;
        }
        let delta = self.renormalize_delta;
        self.now -= delta;
        self.epoch += delta;
        self.agenda.rebase(delta);
        self.renormalizations += 1;
        debug!(
            delta,
            local = self.now,
            epoch = self.epoch,
            pending = self.agenda.len(),
            "rebased scheduler clock"
        );
    }
}
