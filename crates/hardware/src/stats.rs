//! Simulation statistics and reporting.
//!
//! This module summarizes a circuit's activity. It reports:
//! 1. **Scheduler:** Current tick, actions executed, pending and peak queue depth, and the
//!    number of tick renormalizations.
//! 2. **Netlist:** Wires created, distinct nets after merging, merges performed, and
//!    registered components.
//! 3. **Propagation:** Component notifications delivered.

use serde::Serialize;

/// Snapshot of a circuit's counters, taken by [`crate::Circuit::stats`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Absolute simulated time, including ticks folded away by renormalization.
    pub ticks: u64,
    /// Scheduled actions executed so far.
    pub actions_executed: u64,
    /// Component evaluations triggered by net changes.
    pub notifications: u64,
    /// Times the tick counter was rebased.
    pub renormalizations: u64,
    /// Largest number of simultaneously pending actions.
    pub peak_pending: usize,
    /// Actions still pending.
    pub pending: usize,
    /// Wire handles created.
    pub wires: usize,
    /// Distinct nets after merging.
    pub nets: usize,
    /// Successful merges.
    pub merges: u64,
    /// Registered components.
    pub components: usize,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"scheduler"`, `"netlist"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "scheduler", "netlist"];

impl SimStats {
    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Section names from [`STATS_SECTIONS`], or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        if want("summary") {
            let per_tick = if self.ticks == 0 {
                0.0
            } else {
                self.actions_executed as f64 / self.ticks as f64
            };
            println!("\n==========================================================");
            println!("DIGITAL LOGIC SIMULATION STATISTICS");
            println!("==========================================================");
            println!("sim_ticks                {}", self.ticks);
            println!("sim_actions              {}", self.actions_executed);
            println!("sim_actions_per_tick     {per_tick:.4}");
            println!("sim_notifications        {}", self.notifications);
            println!("----------------------------------------------------------");
        }

        if want("scheduler") {
            println!("SCHEDULER");
            println!("  sched.pending          {}", self.pending);
            println!("  sched.peak_pending     {}", self.peak_pending);
            println!("  sched.renormalizations {}", self.renormalizations);
            println!("----------------------------------------------------------");
        }

        if want("netlist") {
            println!("NETLIST");
            println!("  net.wires              {}", self.wires);
            println!("  net.nets               {}", self.nets);
            println!("  net.merges             {}", self.merges);
            println!("  net.components         {}", self.components);
            println!("==========================================================");
        }
    }

    /// Prints every section.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
