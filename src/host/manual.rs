/*!
 * Manual Callback Host
 *
 * Deterministic host driven step by step. Slices are bounded by a sub-step
 * budget instead of a clock, expiration and registration failures are
 * scripted, and every scheduler-initiated call is journaled.
 */

use super::traits::{CallbackHost, HostDriver};
use super::types::{CallbackHandle, HandleSeq, HostCall, Invocation, Registration};
use crate::core::errors::HostError;
use crate::core::types::{Priority, WorkId};
use log::debug;
use std::cell::Cell;

/// Step-driven host for tests and simulations
#[derive(Debug, Default)]
pub struct ManualHost {
    handles: HandleSeq,
    registered: Option<Registration>,
    running: Option<CallbackHandle>,

    // Sub-steps allowed per slice (None = never yield)
    slice_budget: Option<u32>,
    polls: Cell<u32>,

    expire_next: bool,
    fail_next: Option<HostError>,

    journal: Vec<HostCall>,
    invocations: u64,
}

impl ManualHost {
    /// Host whose slices never yield
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that yields after `steps` sub-steps per slice
    pub fn with_slice_budget(steps: u32) -> Self {
        Self {
            slice_budget: Some(steps),
            ..Self::default()
        }
    }

    pub fn set_slice_budget(&mut self, steps: Option<u32>) {
        self.slice_budget = steps;
    }

    /// Mark the next invocation as expired
    pub fn expire_next(&mut self) {
        self.expire_next = true;
    }

    /// Make the next `schedule_callback` fail with `error`
    pub fn fail_next_schedule(&mut self, error: HostError) {
        self.fail_next = Some(error);
    }

    /// Every schedule/cancel call made so far
    pub fn journal(&self) -> &[HostCall] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// The registration currently held, if any
    pub fn registration(&self) -> Option<Registration> {
        self.registered
    }

    /// Number of invocations dispatched so far
    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

impl CallbackHost for ManualHost {
    fn schedule_callback(
        &mut self,
        priority: Priority,
        task: WorkId,
    ) -> Result<CallbackHandle, HostError> {
        if let Some(error) = self.fail_next.take() {
            debug!("Manual host refusing callback for work {}: {}", task, error);
            return Err(error);
        }

        let handle = self.handles.next();
        self.registered = Some(Registration {
            handle,
            priority,
            task,
        });
        self.journal.push(HostCall::Schedule {
            handle,
            priority,
            task,
        });
        Ok(handle)
    }

    fn cancel_callback(&mut self, handle: CallbackHandle) {
        self.journal.push(HostCall::Cancel { handle });
        if self.registered.map(|r| r.handle) == Some(handle) {
            self.registered = None;
        }
    }

    fn current_callback(&self) -> Option<CallbackHandle> {
        self.registered.map(|r| r.handle)
    }

    fn should_yield(&self) -> bool {
        match self.slice_budget {
            None => false,
            Some(budget) => {
                let polled = self.polls.get();
                self.polls.set(polled + 1);
                polled >= budget
            }
        }
    }
}

impl HostDriver for ManualHost {
    fn next_invocation(&mut self) -> Option<Invocation> {
        if self.running.is_some() {
            return None;
        }
        let reg = self.registered?;
        self.running = Some(reg.handle);
        self.polls.set(0);
        self.invocations += 1;
        let did_timeout = std::mem::take(&mut self.expire_next);
        Some(Invocation::from_registration(reg, did_timeout))
    }

    fn complete(&mut self, handle: CallbackHandle, continues: bool) {
        if self.running == Some(handle) {
            self.running = None;
        }
        if !continues && self.registered.map(|r| r.handle) == Some(handle) {
            self.registered = None;
        }
    }
}
