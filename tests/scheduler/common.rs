/*!
 * Shared test fixtures for scheduler tests
 */

use parking_lot::Mutex;
use slice_sched::{ManualHost, Priority, Scheduler};
use std::sync::Arc;

/// Sub-step journal shared with the scheduler's side effect
pub type StepLog = Arc<Mutex<Vec<Priority>>>;

/// Scheduler over `host` that records every sub-step's priority
pub fn recording_scheduler(host: ManualHost) -> (Scheduler<ManualHost>, StepLog) {
    let log: StepLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let scheduler = Scheduler::new(host, move |priority| sink.lock().push(priority));
    (scheduler, log)
}
