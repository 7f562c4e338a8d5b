/*!
 * Slice Scheduler Library
 * Cooperative, priority-class task scheduling over a single host callback
 */

pub mod core;
pub mod host;
pub mod monitoring;
pub mod scheduler;

// Re-exports
pub use crate::core::{
    Expiration, HostError, Priority, PriorityTimeouts, SchedulerConfig, SchedulerError,
    SchedulerResult, WorkId,
};
pub use host::{CallbackHandle, CallbackHost, HostCall, HostDriver, Invocation, ManualHost, TimedHost};
pub use monitoring::init_tracing;
pub use scheduler::{
    Scheduler, SchedulerHandle, SchedulerStats, SchedulerTask, SliceOutcome, WorkItem, WorkQueue,
};
