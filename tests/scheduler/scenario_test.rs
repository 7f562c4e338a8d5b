/*!
 * Scheduler Scenario Tests
 * Preemption, continuation, and no-churn behaviour over a manual host
 */

use super::common::recording_scheduler;
use pretty_assertions::assert_eq;
use slice_sched::{HostCall, ManualHost, Priority, SliceOutcome};

#[test]
fn test_immediate_work_runs_synchronously() {
    // Host never yields; Immediate work ignores yield checks anyway
    let (mut scheduler, log) = recording_scheduler(ManualHost::new());
    let id = scheduler.submit(Priority::Immediate, 5).unwrap();

    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Finished)
    );
    assert_eq!(log.lock().as_slice(), &[Priority::Immediate; 5]);
    assert_eq!(scheduler.remaining(id), None);
    assert_eq!(scheduler.last_run_priority(), None);
    assert!(scheduler.is_quiescent());
    assert_eq!(scheduler.host().invocations(), 1);
}

#[test]
fn test_immediate_ignores_slice_budget() {
    let (mut scheduler, log) = recording_scheduler(ManualHost::with_slice_budget(1));
    scheduler.submit(Priority::Immediate, 8).unwrap();
    assert_eq!(scheduler.run_until_idle().unwrap(), 1);
    assert_eq!(log.lock().len(), 8);
}

#[test]
fn test_immediate_preempts_low_mid_item() {
    let (mut scheduler, log) = recording_scheduler(ManualHost::with_slice_budget(4));
    let low = scheduler.submit(Priority::Low, 10).unwrap();

    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Continue(low))
    );
    assert_eq!(scheduler.remaining(low), Some(6));

    let urgent = scheduler.submit(Priority::Immediate, 2).unwrap();
    assert_eq!(
        scheduler.host().registration().map(|r| r.task),
        Some(urgent)
    );

    // Urgent work completes before Low advances
    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Finished)
    );
    assert_eq!(scheduler.remaining(urgent), None);
    assert_eq!(scheduler.remaining(low), Some(6));

    // Low resumes from its partially-decremented count
    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Continue(low))
    );
    assert_eq!(scheduler.remaining(low), Some(2));
    scheduler.run_until_idle().unwrap();

    let mut expected = vec![Priority::Low; 4];
    expected.extend([Priority::Immediate; 2]);
    expected.extend([Priority::Low; 6]);
    assert_eq!(*log.lock(), expected);
    assert!(scheduler.is_quiescent());
}

#[test]
fn test_same_class_slices_do_not_churn() {
    let (mut scheduler, log) = recording_scheduler(ManualHost::with_slice_budget(2));
    let first = scheduler.submit(Priority::Normal, 4).unwrap();
    let second = scheduler.submit(Priority::Normal, 4).unwrap();

    // Second submission finds the class already armed
    assert_eq!(scheduler.host().journal().len(), 1);
    scheduler.host_mut().clear_journal();

    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Continue(first))
    );
    assert!(scheduler.host().journal().is_empty());

    // Item boundary re-derives the owner from scratch: one re-arm
    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Finished)
    );
    let journal = scheduler.host().journal().to_vec();
    assert_eq!(journal.len(), 2);
    assert!(journal[0].is_cancel());
    assert!(matches!(
        journal[1],
        HostCall::Schedule { task, priority: Priority::Normal, .. } if task == second
    ));
    scheduler.host_mut().clear_journal();

    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Continue(second))
    );
    assert!(scheduler.host().journal().is_empty());

    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Finished)
    );
    assert!(matches!(scheduler.host().journal(), [HostCall::Cancel { .. }]));
    assert!(scheduler.is_quiescent());
    assert_eq!(log.lock().len(), 8);
}

#[test]
fn test_same_class_keeps_running_item() {
    // Continuation binds the running item even when a peer of the same class waits
    let (mut scheduler, _) = recording_scheduler(ManualHost::with_slice_budget(1));
    let first = scheduler.submit(Priority::Low, 3).unwrap();
    scheduler.run_next_slice().unwrap();
    scheduler.submit(Priority::Low, 3).unwrap();

    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Continue(first))
    );
    assert_eq!(scheduler.remaining(first), Some(1));
}

#[test]
fn test_reschedule_is_idempotent() {
    let (mut scheduler, _) = recording_scheduler(ManualHost::with_slice_budget(1));
    scheduler.submit(Priority::UserBlocking, 3).unwrap();
    let calls = scheduler.host().journal().len();

    scheduler.reschedule().unwrap();
    scheduler.reschedule().unwrap();
    assert_eq!(scheduler.host().journal().len(), calls);

    scheduler.run_next_slice().unwrap();
    let calls = scheduler.host().journal().len();
    scheduler.reschedule().unwrap();
    scheduler.reschedule().unwrap();
    assert_eq!(scheduler.host().journal().len(), calls);
}

#[test]
fn test_expired_callback_finishes_synchronously() {
    let (mut scheduler, log) = recording_scheduler(ManualHost::with_slice_budget(1));
    scheduler.submit(Priority::Normal, 6).unwrap();

    scheduler.run_next_slice().unwrap();
    assert_eq!(log.lock().len(), 1);

    scheduler.host_mut().expire_next();
    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Finished)
    );
    assert_eq!(log.lock().len(), 6);
    assert_eq!(scheduler.stats().expired_slices, 1);
}

#[test]
fn test_less_urgent_submission_does_not_preempt() {
    let (mut scheduler, log) = recording_scheduler(ManualHost::with_slice_budget(2));
    let normal = scheduler.submit(Priority::Normal, 4).unwrap();
    scheduler.run_next_slice().unwrap();

    scheduler.host_mut().clear_journal();
    scheduler.submit(Priority::Idle, 2).unwrap();
    assert!(scheduler.host().journal().is_empty());

    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Finished)
    );
    assert_eq!(scheduler.remaining(normal), None);
    scheduler.run_until_idle().unwrap();

    let log = log.lock();
    assert_eq!(&log[..4], &[Priority::Normal; 4]);
    assert_eq!(&log[4..], &[Priority::Idle; 2]);
}

#[test]
fn test_independent_schedulers() {
    let (mut a, log_a) = recording_scheduler(ManualHost::new());
    let (mut b, log_b) = recording_scheduler(ManualHost::new());
    a.submit(Priority::Low, 3).unwrap();
    b.submit(Priority::Normal, 5).unwrap();

    a.run_until_idle().unwrap();
    assert_eq!(log_a.lock().len(), 3);
    assert!(log_b.lock().is_empty());
    assert_eq!(b.queue().len(), 1);
}

#[test]
fn test_slice_of_displaced_item_reports_preempted() {
    let (mut scheduler, _) = recording_scheduler(ManualHost::with_slice_budget(2));
    let low = scheduler.submit(Priority::Low, 10).unwrap();
    scheduler.run_next_slice().unwrap();

    // Urgent work takes the callback before the Low item's next slice
    let urgent = scheduler.submit(Priority::Immediate, 2).unwrap();
    let owner = scheduler.pending_callback();
    let continuations = scheduler.stats().continuations;

    assert_eq!(scheduler.run_slice(low, false).unwrap(), SliceOutcome::Preempted);
    assert_eq!(scheduler.pending_callback(), owner);
    assert_eq!(
        scheduler.host().registration().map(|r| r.task),
        Some(urgent)
    );
    assert_eq!(scheduler.stats().continuations, continuations);
    assert!(scheduler.remaining(low).is_some());

    // The urgent item still runs next, then Low resumes
    assert_eq!(
        scheduler.run_next_slice().unwrap(),
        Some(SliceOutcome::Finished)
    );
    assert_eq!(scheduler.remaining(urgent), None);
    scheduler.run_until_idle().unwrap();
    assert!(scheduler.is_quiescent());
}
