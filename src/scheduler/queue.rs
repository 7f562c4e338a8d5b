/*!
 * Work Queue
 * Pending work items with fresh highest-priority selection on every decision
 */

use crate::core::types::{Priority, WorkId};
use serde::Serialize;

/// One unit of schedulable work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    pub id: WorkId,
    pub priority: Priority,
    /// Sub-steps left; never zero while queued
    pub remaining: u32,
}

impl WorkItem {
    pub fn new(id: WorkId, priority: Priority, remaining: u32) -> Self {
        Self {
            id,
            priority,
            remaining,
        }
    }

    #[inline]
    fn rank(&self) -> (Priority, WorkId) {
        (self.priority, self.id)
    }
}

/// Unordered multiset of pending work
///
/// Ties on priority go to the earliest arrival (lowest id).
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Vec<WorkItem>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item - O(1) amortized
    pub fn push(&mut self, item: WorkItem) {
        debug_assert!(item.remaining > 0, "exhausted work must not be queued");
        self.items.push(item);
    }

    /// Most urgent item, FIFO within a priority class
    pub fn highest_priority(&self) -> Option<&WorkItem> {
        self.items.iter().min_by_key(|item| item.rank())
    }

    /// Remove an item by id; returns false if it was not queued
    pub fn remove(&mut self, id: WorkId) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(pos) => {
                self.items.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: WorkId) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: WorkId) -> Option<&mut WorkItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }

    /// Total remaining sub-steps per priority class, most urgent first
    pub fn remaining_by_priority(&self) -> Vec<(Priority, u64)> {
        Priority::ALL
            .iter()
            .filter_map(|&priority| {
                let total: u64 = self
                    .items
                    .iter()
                    .filter(|item| item.priority == priority)
                    .map(|item| u64::from(item.remaining))
                    .sum();
                (total > 0).then_some((priority, total))
            })
            .collect()
    }
}
