/*!
 * Lock-Free Scheduler Statistics
 * Uses atomic counters so a scheduler task can publish stats to other threads
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Scheduler statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub submitted: u64,
    pub completed: u64,
    pub slices: u64,
    pub sub_steps: u64,
    pub continuations: u64,
    pub preemptions: u64,
    pub callbacks_scheduled: u64,
    pub callbacks_cancelled: u64,
    pub host_failures: u64,
    pub expired_slices: u64,
    pub queued: usize,
}

/// Atomic scheduler statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering; snapshots may be slightly skewed
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct AtomicSchedulerStats {
    submitted: AtomicU64,
    completed: AtomicU64,
    slices: AtomicU64,
    sub_steps: AtomicU64,
    continuations: AtomicU64,
    preemptions: AtomicU64,
    callbacks_scheduled: AtomicU64,
    callbacks_cancelled: AtomicU64,
    host_failures: AtomicU64,
    expired_slices: AtomicU64,
    queued: AtomicUsize,
}

impl AtomicSchedulerStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.queued.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record one slice and the sub-steps it executed
    ///
    /// # Performance
    /// Hot path - called once per slice, never per sub-step
    #[inline(always)]
    pub fn record_slice(&self, sub_steps: u64, expired: bool) {
        self.slices.fetch_add(1, Ordering::Relaxed);
        self.sub_steps.fetch_add(sub_steps, Ordering::Relaxed);
        if expired {
            self.expired_slices.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline(always)]
    pub fn inc_continuations(&self) {
        self.continuations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_preemptions(&self) {
        self.preemptions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_scheduled(&self) {
        self.callbacks_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_cancelled(&self) {
        self.callbacks_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_host_failures(&self) {
        self.host_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    #[inline]
    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            slices: self.slices.load(Ordering::Relaxed),
            sub_steps: self.sub_steps.load(Ordering::Relaxed),
            continuations: self.continuations.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            callbacks_scheduled: self.callbacks_scheduled.load(Ordering::Relaxed),
            callbacks_cancelled: self.callbacks_cancelled.load(Ordering::Relaxed),
            host_failures: self.host_failures.load(Ordering::Relaxed),
            expired_slices: self.expired_slices.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
        }
    }
}
