/*!
 * Scheduler Core Operations
 * Submission and the reschedule decision
 */

use super::queue::WorkItem;
use super::{PendingCallback, Scheduler};
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{Priority, WorkId};
use crate::host::CallbackHost;
use log::{debug, info, trace, warn};

impl<H: CallbackHost> Scheduler<H> {
    /// Queue `work_size` sub-steps at `priority` and re-evaluate the queue head
    ///
    /// A host registration failure is returned as `HostScheduling`; the item
    /// stays queued and a later `reschedule` retries.
    pub fn submit(&mut self, priority: Priority, work_size: u32) -> SchedulerResult<WorkId> {
        if work_size == 0 {
            return Err(SchedulerError::EmptyWork);
        }

        self.next_id += 1;
        let id = self.next_id;
        self.queue.push(WorkItem::new(id, priority, work_size));
        self.stats.inc_submitted();

        info!(
            "Work {} submitted (priority: {}, sub-steps: {})",
            id, priority, work_size
        );

        self.reschedule()?;
        Ok(id)
    }

    /// Submit with a raw priority level (1 = immediate .. 5 = idle)
    pub fn submit_level(&mut self, level: u8, work_size: u32) -> SchedulerResult<WorkId> {
        let priority = Priority::from_level(level)?;
        self.submit(priority, work_size)
    }

    /// Decide which priority class owns the host callback
    ///
    /// Touches the host only when the class at the head of the queue differs
    /// from the class of the last slice.
    pub fn reschedule(&mut self) -> SchedulerResult<()> {
        let existing = self.host.current_callback();

        let Some((candidate, priority)) = self
            .queue
            .highest_priority()
            .map(|item| (item.id, item.priority))
        else {
            if let Some(handle) = existing {
                self.host.cancel_callback(handle);
                self.stats.inc_cancelled();
                debug!("Queue drained, cancelled {}", handle);
            }
            self.pending = None;
            self.last_run = None;
            return Ok(());
        };

        if self.last_run == Some(priority) {
            trace!("Priority class {} unchanged, keeping callback", priority);
            return Ok(());
        }

        // Not run yet, but already armed for this class with live work
        let armed = self.pending.is_some_and(|p| {
            p.priority == priority && existing == Some(p.handle) && self.queue.get(p.task).is_some()
        });
        if armed {
            trace!("Callback already armed for {}", priority);
            return Ok(());
        }

        if let Some(handle) = existing {
            self.host.cancel_callback(handle);
            self.stats.inc_cancelled();
            if self.pending.is_some_and(|p| priority < p.priority) {
                self.stats.inc_preemptions();
                debug!("Work {} ({}) preempts {}", candidate, priority, handle);
            }
        }

        match self.host.schedule_callback(priority, candidate) {
            Ok(handle) => {
                self.pending = Some(PendingCallback {
                    handle,
                    priority,
                    task: candidate,
                });
                self.stats.inc_scheduled();
                debug!(
                    "Scheduled {} for work {} (priority: {})",
                    handle, candidate, priority
                );
                Ok(())
            }
            Err(e) => {
                // Forget the last class so the next reschedule re-arms
                self.pending = None;
                self.last_run = None;
                self.stats.inc_host_failures();
                warn!("Host failed to schedule work {}: {}", candidate, e);
                Err(e.into())
            }
        }
    }
}
