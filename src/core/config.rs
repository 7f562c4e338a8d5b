/*!
 * Scheduler Configuration
 *
 * Frame budget and per-priority expiration policies for the timed host.
 */

use super::limits::{
    DEFAULT_FRAME_BUDGET, LOW_TIMEOUT, MAX_FRAME_BUDGET, MIN_FRAME_BUDGET, NORMAL_TIMEOUT,
    USER_BLOCKING_TIMEOUT,
};
use super::types::Priority;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "SLICE_SCHED";

/// Expiration budget for a priority class
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ms", rename_all = "snake_case")]
pub enum Expiration {
    /// Expired on registration; always runs synchronously
    Immediately,
    /// Expires once the duration has passed since registration
    After(#[serde_as(as = "DurationMilliSeconds<u64>")] Duration),
    /// Never expires
    Never,
}

/// Per-priority expiration timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityTimeouts {
    pub immediate: Expiration,
    pub user_blocking: Expiration,
    pub normal: Expiration,
    pub low: Expiration,
    pub idle: Expiration,
}

impl PriorityTimeouts {
    /// Look up the expiration for a priority class
    #[inline]
    pub fn for_priority(&self, priority: Priority) -> Expiration {
        match priority {
            Priority::Immediate => self.immediate,
            Priority::UserBlocking => self.user_blocking,
            Priority::Normal => self.normal,
            Priority::Low => self.low,
            Priority::Idle => self.idle,
        }
    }

    fn slot_mut(&mut self, priority: Priority) -> &mut Expiration {
        match priority {
            Priority::Immediate => &mut self.immediate,
            Priority::UserBlocking => &mut self.user_blocking,
            Priority::Normal => &mut self.normal,
            Priority::Low => &mut self.low,
            Priority::Idle => &mut self.idle,
        }
    }
}

impl Default for PriorityTimeouts {
    fn default() -> Self {
        Self {
            immediate: Expiration::Immediately,
            user_blocking: Expiration::After(USER_BLOCKING_TIMEOUT),
            normal: Expiration::After(NORMAL_TIMEOUT),
            low: Expiration::After(LOW_TIMEOUT),
            idle: Expiration::Never,
        }
    }
}

/// Scheduler configuration
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Slice budget before the host asks the executor to yield (default: 5ms)
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub frame_budget: Duration,

    /// Expiration policy per priority class
    pub timeouts: PriorityTimeouts,

    /// Emit JSON log lines instead of compact text
    #[serde(default)]
    pub trace_json: bool,
}

impl SchedulerConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            frame_budget: DEFAULT_FRAME_BUDGET,
            timeouts: PriorityTimeouts::default(),
            trace_json: false,
        }
    }

    /// Short slices and tight expirations for interactive workloads
    pub fn responsive() -> Self {
        Self {
            frame_budget: MIN_FRAME_BUDGET,
            timeouts: PriorityTimeouts {
                immediate: Expiration::Immediately,
                user_blocking: Expiration::After(Duration::from_millis(100)),
                normal: Expiration::After(Duration::from_secs(1)),
                low: Expiration::After(Duration::from_secs(2)),
                idle: Expiration::Never,
            },
            trace_json: false,
        }
    }

    /// Long slices and lenient expirations for throughput-heavy or slow environments
    pub fn relaxed() -> Self {
        Self {
            frame_budget: Duration::from_millis(50),
            timeouts: PriorityTimeouts {
                immediate: Expiration::Immediately,
                user_blocking: Expiration::After(Duration::from_secs(1)),
                normal: Expiration::After(Duration::from_secs(30)),
                low: Expiration::After(Duration::from_secs(60)),
                idle: Expiration::Never,
            },
            trace_json: false,
        }
    }

    /// Set the frame budget, clamped to the accepted range
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = budget.clamp(MIN_FRAME_BUDGET, MAX_FRAME_BUDGET);
        self
    }

    /// Default configuration with environment overrides applied
    ///
    /// Environment variables:
    /// - SLICE_SCHED_FRAME_MS: slice budget in milliseconds
    /// - SLICE_SCHED_<LEVEL>_TIMEOUT_MS: expiration per class (`never` disables it)
    /// - SLICE_SCHED_TRACE_JSON: `1` or `true` for JSON logs
    pub fn from_env() -> Self {
        Self::new().apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let frame_key = format!("{}_FRAME_MS", ENV_PREFIX);
        if let Some(raw) = lookup(&frame_key) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self = self.with_frame_budget(Duration::from_millis(ms)),
                Err(_) => warn!("Ignoring {}={:?}: not a millisecond count", frame_key, raw),
            }
        }

        for priority in Priority::ALL {
            let key = format!(
                "{}_{}_TIMEOUT_MS",
                ENV_PREFIX,
                priority.as_str().to_uppercase()
            );
            let Some(raw) = lookup(&key) else {
                continue;
            };
            let raw = raw.trim();
            let expiration = if raw.eq_ignore_ascii_case("never") {
                Some(Expiration::Never)
            } else {
                raw.parse::<u64>().ok().map(|ms| match ms {
                    0 => Expiration::Immediately,
                    ms => Expiration::After(Duration::from_millis(ms)),
                })
            };
            match expiration {
                Some(expiration) => *self.timeouts.slot_mut(priority) = expiration,
                None => warn!("Ignoring {}={:?}: expected milliseconds or 'never'", key, raw),
            }
        }

        let json_key = format!("{}_TRACE_JSON", ENV_PREFIX);
        if let Some(raw) = lookup(&json_key) {
            self.trace_json = raw == "1" || raw.eq_ignore_ascii_case("true");
        }

        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}
