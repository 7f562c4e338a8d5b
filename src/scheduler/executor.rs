/*!
 * Slice Executor
 * Runs one item's work in bounded chunks between yield checkpoints
 */

use super::Scheduler;
use crate::core::errors::SchedulerResult;
use crate::core::types::{Priority, WorkId};
use crate::host::CallbackHost;
use log::{debug, trace, warn};
use serde::Serialize;

/// What the host should do after a slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "work", rename_all = "snake_case")]
pub enum SliceOutcome {
    /// Same callback stays registered; invoke it again for this item
    Continue(WorkId),
    /// Item exhausted and removed
    Finished,
    /// Another item or priority class now owns the callback
    Preempted,
}

impl SliceOutcome {
    #[inline]
    pub fn continues(&self) -> bool {
        matches!(self, Self::Continue(_))
    }
}

impl<H: CallbackHost> Scheduler<H> {
    /// Execute one slice of work `id`
    ///
    /// Immediate work and expired callbacks run to completion without
    /// consulting `should_yield`; everything else checks it after every
    /// sub-step.
    pub fn run_slice(&mut self, id: WorkId, did_timeout: bool) -> SchedulerResult<SliceOutcome> {
        let Some(item) = self.queue.get_mut(id) else {
            warn!("Slice requested for work {} which is no longer queued", id);
            self.reschedule()?;
            return Ok(SliceOutcome::Finished);
        };

        let priority = item.priority;
        let force_sync = priority == Priority::Immediate || did_timeout;
        let mut executed = 0u64;

        while item.remaining > 0 && (force_sync || !self.host.should_yield()) {
            item.remaining -= 1;
            executed += 1;
            trace!("Work {} sub-step ({} left)", id, item.remaining);
            (self.perform_sub_step)(priority);
        }

        let exhausted = item.remaining == 0;
        let left = item.remaining;
        self.stats.record_slice(executed, did_timeout);
        self.last_run = Some(priority);

        if exhausted {
            if !self.queue.remove(id) {
                warn!("Exhausted work {} was already removed", id);
            }
            self.stats.inc_completed();
            self.last_run = None;
            debug!("Work {} completed after {} sub-steps in last slice", id, executed);
        } else {
            debug!(
                "Work {} yielded after {} sub-steps ({} left, forced: {})",
                id, executed, left, force_sync
            );
        }

        let prev = self.pending_callback();
        self.reschedule()?;

        // Continue only if the unchanged callback still belongs to this item
        let kept = self
            .pending
            .is_some_and(|p| p.task == id && Some(p.handle) == prev);

        if kept {
            self.stats.inc_continuations();
            Ok(SliceOutcome::Continue(id))
        } else if exhausted {
            Ok(SliceOutcome::Finished)
        } else {
            Ok(SliceOutcome::Preempted)
        }
    }
}
