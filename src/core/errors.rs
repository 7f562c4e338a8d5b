/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler operation result
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Callback host errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum HostError {
    #[error("Host callback slots exhausted")]
    Exhausted,

    #[error("Host rejected callback: {0}")]
    Rejected(String),
}

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Invalid priority: {0}")]
    #[diagnostic(
        code(scheduler::invalid_priority),
        help("Use one of immediate, user_blocking, normal, low, idle (levels 1-5).")
    )]
    InvalidPriority(String),

    #[error("Work size must be at least one sub-step")]
    #[diagnostic(
        code(scheduler::empty_work),
        help("A work item with nothing left to do is never queued.")
    )]
    EmptyWork,

    #[error("Host failed to register callback: {0}")]
    #[diagnostic(
        code(scheduler::host_scheduling_failed),
        help("The work item stays queued. A later reschedule or submission retries.")
    )]
    HostScheduling(#[from] HostError),

    #[error("Scheduler task is not running")]
    #[diagnostic(
        code(scheduler::task_closed),
        help("The scheduler task was shut down or panicked. Spawn a new one.")
    )]
    TaskClosed,
}

impl SchedulerError {
    /// Whether retrying the same operation later can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::HostScheduling(_))
    }
}
