/*!
 * Host Driver Loop
 * Pulls due callbacks from a host and feeds slices through the executor
 */

use super::executor::SliceOutcome;
use super::Scheduler;
use crate::core::errors::SchedulerResult;
use crate::host::HostDriver;
use crate::monitoring::SliceSpan;
use log::trace;

impl<H: HostDriver> Scheduler<H> {
    /// Run the host's due callback, if any
    ///
    /// Returns `None` when nothing is registered.
    pub fn run_next_slice(&mut self) -> SchedulerResult<Option<SliceOutcome>> {
        let Some(invocation) = self.host.next_invocation() else {
            return Ok(None);
        };

        trace!(
            "Invoking {} for work {} (timed out: {})",
            invocation.handle,
            invocation.task,
            invocation.did_timeout
        );

        let span = SliceSpan::new(
            invocation.handle,
            invocation.task,
            invocation.priority,
            invocation.did_timeout,
        );
        let result = {
            let _entered = span.enter();
            self.run_slice(invocation.task, invocation.did_timeout)
        };
        let continues = matches!(result, Ok(ref outcome) if outcome.continues());
        self.host.complete(invocation.handle, continues);
        if let Ok(ref outcome) = result {
            span.record_outcome(outcome);
        }

        result.map(Some)
    }

    /// Run slices until no callback is registered; returns the slice count
    pub fn run_until_idle(&mut self) -> SchedulerResult<usize> {
        let mut slices = 0;
        while self.run_next_slice()?.is_some() {
            slices += 1;
        }
        Ok(slices)
    }

    /// Run at most `max` slices; returns the slice count
    pub fn run_slices(&mut self, max: usize) -> SchedulerResult<usize> {
        let mut slices = 0;
        while slices < max && self.run_next_slice()?.is_some() {
            slices += 1;
        }
        Ok(slices)
    }
}
