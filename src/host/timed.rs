/*!
 * Timed Callback Host
 *
 * Wall-clock host: a slice yields once the frame budget has elapsed or an
 * input-pending probe reports waiting submissions. Each registration carries
 * an expiration deadline derived from its priority class.
 */

use super::traits::{CallbackHost, HostDriver};
use super::types::{CallbackHandle, HandleSeq, Invocation, Registration};
use crate::core::config::{Expiration, SchedulerConfig};
use crate::core::errors::HostError;
use crate::core::types::{Priority, WorkId};
use log::{debug, trace};
use std::fmt;
use std::time::{Duration, Instant};

/// Probe reporting whether input is waiting to be handled
pub type InputProbe = Box<dyn Fn() -> bool + Send>;

#[derive(Debug, Clone, Copy)]
struct TimedRegistration {
    reg: Registration,
    // None = never expires
    expires_at: Option<Instant>,
}

/// Host backed by `Instant` slice budgets and per-priority expiration
pub struct TimedHost {
    config: SchedulerConfig,
    handles: HandleSeq,
    registered: Option<TimedRegistration>,
    running: Option<CallbackHandle>,
    slice_started: Instant,
    input_pending: Option<InputProbe>,
}

impl TimedHost {
    pub fn new(config: SchedulerConfig) -> Self {
        debug!(
            "Timed host initialized: frame_budget={:?}",
            config.frame_budget
        );
        Self {
            config,
            handles: HandleSeq::default(),
            registered: None,
            running: None,
            slice_started: Instant::now(),
            input_pending: None,
        }
    }

    /// Yield early whenever `probe` reports pending input
    pub fn with_input_probe(mut self, probe: InputProbe) -> Self {
        self.input_pending = Some(probe);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Time spent in the current slice
    pub fn slice_elapsed(&self) -> Duration {
        self.slice_started.elapsed()
    }

    fn deadline_for(&self, priority: Priority, now: Instant) -> Option<Instant> {
        match self.config.timeouts.for_priority(priority) {
            Expiration::Immediately => Some(now),
            Expiration::After(timeout) => now.checked_add(timeout),
            Expiration::Never => None,
        }
    }
}

impl fmt::Debug for TimedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedHost")
            .field("config", &self.config)
            .field("registered", &self.registered)
            .field("running", &self.running)
            .field("input_probe", &self.input_pending.is_some())
            .finish()
    }
}

impl CallbackHost for TimedHost {
    fn schedule_callback(
        &mut self,
        priority: Priority,
        task: WorkId,
    ) -> Result<CallbackHandle, HostError> {
        let handle = self.handles.next();
        let expires_at = self.deadline_for(priority, Instant::now());
        self.registered = Some(TimedRegistration {
            reg: Registration {
                handle,
                priority,
                task,
            },
            expires_at,
        });
        trace!("Registered {} for work {} at {}", handle, task, priority);
        Ok(handle)
    }

    fn cancel_callback(&mut self, handle: CallbackHandle) {
        if self.registered.map(|r| r.reg.handle) == Some(handle) {
            self.registered = None;
            trace!("Cancelled {}", handle);
        }
    }

    fn current_callback(&self) -> Option<CallbackHandle> {
        self.registered.map(|r| r.reg.handle)
    }

    fn should_yield(&self) -> bool {
        if self.slice_started.elapsed() >= self.config.frame_budget {
            return true;
        }
        self.input_pending.as_ref().is_some_and(|probe| probe())
    }
}

impl HostDriver for TimedHost {
    fn next_invocation(&mut self) -> Option<Invocation> {
        if self.running.is_some() {
            return None;
        }
        let registration = self.registered?;
        let now = Instant::now();
        let did_timeout = registration.expires_at.is_some_and(|deadline| now >= deadline);

        self.running = Some(registration.reg.handle);
        self.slice_started = now;
        Some(Invocation::from_registration(registration.reg, did_timeout))
    }

    fn complete(&mut self, handle: CallbackHandle, continues: bool) {
        if self.running == Some(handle) {
            self.running = None;
        }
        if !continues && self.registered.map(|r| r.reg.handle) == Some(handle) {
            self.registered = None;
        }
    }
}
