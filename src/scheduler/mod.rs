/*!
 * Cooperative Slice Scheduler
 * Priority-class scheduling of work items over a single host callback
 */

use crate::core::types::{Priority, WorkId};
use crate::host::{CallbackHandle, CallbackHost};
use log::info;
use std::fmt;
use std::sync::Arc;

pub mod atomic_stats;
mod driver;
mod executor;
mod operations;
pub mod queue;
pub mod task;

pub use atomic_stats::{AtomicSchedulerStats, SchedulerStats};
pub use executor::SliceOutcome;
pub use queue::{WorkItem, WorkQueue};
pub use task::{SchedulerCommand, SchedulerHandle, SchedulerTask};

/// Side effect performed once per atomic sub-step
pub type SubStepFn = Box<dyn FnMut(Priority) + Send>;

/// Callback currently registered on behalf of the queue head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCallback {
    handle: CallbackHandle,
    priority: Priority,
    task: WorkId,
}

/// Cooperative scheduler
///
/// Exclusively owns its queue and decision state; every operation takes
/// `&mut self`, so at most one slice can be executing at a time.
pub struct Scheduler<H: CallbackHost> {
    host: H,
    queue: WorkQueue,

    // Priority class of the last slice; None is the idle sentinel
    last_run: Option<Priority>,
    pending: Option<PendingCallback>,

    next_id: WorkId,
    perform_sub_step: SubStepFn,
    stats: Arc<AtomicSchedulerStats>,
}

impl<H: CallbackHost> Scheduler<H> {
    /// Create scheduler over `host`, calling `perform_sub_step` for every executed sub-step
    pub fn new<F>(host: H, perform_sub_step: F) -> Self
    where
        F: FnMut(Priority) + Send + 'static,
    {
        info!("Scheduler initialized with lock-free atomic stats");

        Self {
            host,
            queue: WorkQueue::new(),
            last_run: None,
            pending: None,
            next_id: 0,
            perform_sub_step: Box::new(perform_sub_step),
            stats: Arc::new(AtomicSchedulerStats::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Priority class of the most recent slice, None when idle
    pub fn last_run_priority(&self) -> Option<Priority> {
        self.last_run
    }

    /// Handle of the callback registered for the queue head
    pub fn pending_callback(&self) -> Option<CallbackHandle> {
        self.pending.map(|p| p.handle)
    }

    /// Remaining sub-steps of a queued item
    pub fn remaining(&self, id: WorkId) -> Option<u32> {
        self.queue.get(id).map(|item| item.remaining)
    }

    /// Queue empty and no callback pending
    pub fn is_quiescent(&self) -> bool {
        self.queue.is_empty() && self.pending.is_none()
    }

    /// Get scheduler statistics (lock-free snapshot)
    pub fn stats(&self) -> SchedulerStats {
        self.stats.snapshot()
    }

    /// Shared stats counters, readable from other threads
    pub fn stats_handle(&self) -> Arc<AtomicSchedulerStats> {
        Arc::clone(&self.stats)
    }
}

impl<H: CallbackHost + fmt::Debug> fmt::Debug for Scheduler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("host", &self.host)
            .field("queue", &self.queue)
            .field("last_run", &self.last_run)
            .field("pending", &self.pending)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
