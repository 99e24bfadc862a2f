//! Configuration system for the logic simulator.
//!
//! This module defines the configuration structures used to parameterize a circuit. It provides:
//! 1. **Defaults:** Baseline scheduler limits and propagation delays.
//! 2. **Structures:** Hierarchical config for general, scheduler and timing settings.
//! 3. **Loading:** JSON deserialization and validation.
//!
//! Every field is optional in JSON; omitted fields fall back to the constants in `defaults`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{SimError, SimResult};

/// Default configuration constants for the simulator.
mod defaults {
    /// Fan-out of the scheduler's d-ary heap.
    pub const HEAP_ARITY: usize = 4;

    /// Tick value past which the scheduler rebases its clock.
    ///
    /// Keeps local tick arithmetic far from `u64` overflow on very long runs.
    pub const RENORMALIZE_LIMIT: u64 = 1_000_000_000_000;

    /// Amount subtracted from the tick and every pending action on a rebase.
    pub const RENORMALIZE_DELTA: u64 = 1_000_000_000_000;

    /// Most actions a single tick may execute before the circuit is declared unstable.
    pub const MAX_ACTIONS_PER_TICK: usize = 1_000_000;

    /// Most component evaluations one propagation pass may perform.
    pub const MAX_NOTIFICATIONS: usize = 1_000_000;

    /// Most advances `posedge`/`negedge` perform while waiting for a transition.
    pub const WAIT_LIMIT: u64 = 1_000_000;

    /// Propagation delay of combinational gates and buffers, in ticks.
    pub const GATE_DELAY: u64 = 0;

    /// Propagation delay of latches and flip-flops, in ticks.
    pub const LATCH_DELAY: u64 = 0;

    /// Clock-to-output delay of registers, in ticks.
    pub const REGISTER_DELAY: u64 = 0;

    /// Read latency of RAM and clocked ROM, in ticks.
    pub const MEMORY_DELAY: u64 = 0;
}

/// Root configuration structure.
///
/// Use `Config::default()` for the zero-delay functional model, or load overrides from JSON.
///
/// # Examples
///
/// ```
/// use gatesim_core::config::Config;
///
/// let json = r#"{ "timing": { "gate_delay": 1 }, "scheduler": { "arity": 2 } }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.timing.gate_delay, 1);
/// assert_eq!(config.scheduler.arity, 2);
/// assert_eq!(config.timing.register_delay, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Event queue and stabilization limits
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Propagation delays
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Config {
    /// Parses a configuration from a JSON document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed JSON and [`SimError::InvalidConfig`] for
    /// out-of-range values.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as [`Config::from_json`].
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] describing the first violated constraint.
    pub fn validate(&self) -> SimResult<()> {
        let s = &self.scheduler;
        if s.arity < 2 {
            return Err(SimError::InvalidConfig(format!(
                "scheduler.arity must be at least 2, got {}",
                s.arity
            )));
        }
        if s.renormalize_delta == 0 || s.renormalize_delta > s.renormalize_limit {
            return Err(SimError::InvalidConfig(format!(
                "scheduler.renormalize_delta must be in 1..={}, got {}",
                s.renormalize_limit, s.renormalize_delta
            )));
        }
        if s.max_actions_per_tick == 0 || s.max_notifications == 0 {
            return Err(SimError::InvalidConfig(
                "scheduler caps must be non-zero".to_string(),
            ));
        }
        if self.general.wait_limit == 0 {
            return Err(SimError::InvalidConfig(
                "general.wait_limit must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Emit a debug event for every executed action
    #[serde(default)]
    pub trace_actions: bool,

    /// Maximum advances spent waiting for an edge before giving up
    #[serde(default = "GeneralConfig::default_wait_limit")]
    pub wait_limit: u64,
}

impl GeneralConfig {
    fn default_wait_limit() -> u64 {
        defaults::WAIT_LIMIT
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_actions: false,
            wait_limit: defaults::WAIT_LIMIT,
        }
    }
}

/// Event queue configuration.
///
/// Controls the shape of the agenda heap, tick renormalization and the caps that turn a
/// non-settling circuit into an error instead of a hung process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Children per heap node
    #[serde(default = "SchedulerConfig::default_arity")]
    pub arity: usize,

    /// Local tick above which the clock is rebased
    #[serde(default = "SchedulerConfig::default_renormalize_limit")]
    pub renormalize_limit: u64,

    /// Ticks removed by each rebase
    #[serde(default = "SchedulerConfig::default_renormalize_delta")]
    pub renormalize_delta: u64,

    /// Actions allowed within one tick
    #[serde(default = "SchedulerConfig::default_max_actions")]
    pub max_actions_per_tick: usize,

    /// Component evaluations allowed within one propagation pass
    #[serde(default = "SchedulerConfig::default_max_notifications")]
    pub max_notifications: usize,
}

impl SchedulerConfig {
    fn default_arity() -> usize {
        defaults::HEAP_ARITY
    }

    fn default_renormalize_limit() -> u64 {
        defaults::RENORMALIZE_LIMIT
    }

    fn default_renormalize_delta() -> u64 {
        defaults::RENORMALIZE_DELTA
    }

    fn default_max_actions() -> usize {
        defaults::MAX_ACTIONS_PER_TICK
    }

    fn default_max_notifications() -> usize {
        defaults::MAX_NOTIFICATIONS
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            arity: defaults::HEAP_ARITY,
            renormalize_limit: defaults::RENORMALIZE_LIMIT,
            renormalize_delta: defaults::RENORMALIZE_DELTA,
            max_actions_per_tick: defaults::MAX_ACTIONS_PER_TICK,
            max_notifications: defaults::MAX_NOTIFICATIONS,
        }
    }
}

/// Propagation delays applied by the component library.
///
/// All delays default to zero, giving a purely functional model in which every
/// combinational path settles within the tick that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Gate and buffer delay
    #[serde(default = "TimingConfig::default_gate_delay")]
    pub gate_delay: u64,

    /// Latch and flip-flop delay
    #[serde(default = "TimingConfig::default_latch_delay")]
    pub latch_delay: u64,

    /// Register clock-to-output delay
    #[serde(default = "TimingConfig::default_register_delay")]
    pub register_delay: u64,

    /// Memory read delay
    #[serde(default = "TimingConfig::default_memory_delay")]
    pub memory_delay: u64,
}

impl TimingConfig {
    fn default_gate_delay() -> u64 {
        defaults::GATE_DELAY
    }

    fn default_latch_delay() -> u64 {
        defaults::LATCH_DELAY
    }

    fn default_register_delay() -> u64 {
        defaults::REGISTER_DELAY
    }

    fn default_memory_delay() -> u64 {
        defaults::MEMORY_DELAY
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            gate_delay: defaults::GATE_DELAY,
            latch_delay: defaults::LATCH_DELAY,
            register_delay: defaults::REGISTER_DELAY,
            memory_delay: defaults::MEMORY_DELAY,
        }
    }
}
