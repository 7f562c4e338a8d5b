/*!
 * Callback Host Types
 * Handles, registrations, and invocation records shared by host implementations
 */

use crate::core::types::{Priority, WorkId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackHandle(u64);

impl CallbackHandle {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb#{}", self.0)
    }
}

/// A callback registered with a host: run a slice of `task` at `priority`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub handle: CallbackHandle,
    pub priority: Priority,
    pub task: WorkId,
}

/// A due callback handed to the driver for execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub handle: CallbackHandle,
    pub priority: Priority,
    pub task: WorkId,
    /// The callback's expiration budget has elapsed; finish synchronously
    pub did_timeout: bool,
}

impl Invocation {
    pub(crate) fn from_registration(reg: Registration, did_timeout: bool) -> Self {
        Self {
            handle: reg.handle,
            priority: reg.priority,
            task: reg.task,
            did_timeout,
        }
    }
}

/// Journal entry for a scheduler-initiated host call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    Schedule {
        handle: CallbackHandle,
        priority: Priority,
        task: WorkId,
    },
    Cancel {
        handle: CallbackHandle,
    },
}

impl HostCall {
    #[inline]
    pub fn is_schedule(&self) -> bool {
        matches!(self, Self::Schedule { .. })
    }

    #[inline]
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel { .. })
    }
}

/// Monotonic handle allocator
#[derive(Debug, Default)]
pub(crate) struct HandleSeq(u64);

impl HandleSeq {
    #[inline]
    pub(crate) fn next(&mut self) -> CallbackHandle {
        self.0 += 1;
        CallbackHandle(self.0)
    }
}
