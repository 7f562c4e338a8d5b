/*!
 * Callback Host Traits
 * Interface definitions for the host's deferred-execution facility
 */

use super::types::{CallbackHandle, Invocation};
use crate::core::errors::HostError;
use crate::core::types::{Priority, WorkId};

/// Scheduler-facing host operations
///
/// A host holds at most one callback registered by a given scheduler. The
/// callback stays current while it executes and is only released once the
/// driver reports it complete, or when the scheduler cancels it.
pub trait CallbackHost: Send {
    /// Register a callback that runs a slice of `task` at a time suited to `priority`
    fn schedule_callback(
        &mut self,
        priority: Priority,
        task: WorkId,
    ) -> Result<CallbackHandle, HostError>;

    /// Unregister a callback; no-op if it already completed or was cancelled
    fn cancel_callback(&mut self, handle: CallbackHandle);

    /// The registered callback, if it has not completed or been cancelled
    fn current_callback(&self) -> Option<CallbackHandle>;

    /// Whether the running slice has used up its budget
    fn should_yield(&self) -> bool;
}

/// Driver-facing host operations
pub trait HostDriver: CallbackHost {
    /// Take the due callback for execution, starting a fresh slice budget
    fn next_invocation(&mut self) -> Option<Invocation>;

    /// Report an invocation finished; `continues` keeps the same registration alive
    fn complete(&mut self, handle: CallbackHandle, continues: bool);
}
