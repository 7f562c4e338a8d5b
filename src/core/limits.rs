/*!
 * Scheduler Limits and Constants
 *
 * Centralized location for time budgets and thresholds.
 */

use std::time::Duration;

// =============================================================================
// TIME SLICING
// =============================================================================

/// Default slice budget before `should_yield` reports true (5ms)
/// [PERF] Bounds preemption latency at roughly one frame budget plus one sub-step
pub const DEFAULT_FRAME_BUDGET: Duration = Duration::from_millis(5);

/// Smallest accepted frame budget (1ms)
pub const MIN_FRAME_BUDGET: Duration = Duration::from_millis(1);

/// Largest accepted frame budget (1s)
pub const MAX_FRAME_BUDGET: Duration = Duration::from_secs(1);

// =============================================================================
// EXPIRATION TIMEOUTS
// =============================================================================

/// User-blocking callbacks expire after 250ms
pub const USER_BLOCKING_TIMEOUT: Duration = Duration::from_millis(250);

/// Normal callbacks expire after 5s
pub const NORMAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Low callbacks expire after 10s
pub const LOW_TIMEOUT: Duration = Duration::from_secs(10);

// Immediate callbacks are born expired; Idle callbacks never expire.

// =============================================================================
// DEMO WORKLOAD
// =============================================================================

/// Sub-steps per submission in the demo binary
pub const DEMO_WORK_SIZE: u32 = 100;

/// Busy-loop iterations per rendered cell in the demo binary
pub const DEMO_SPIN_ITERATIONS: u64 = 10_000_000;
