/*!
 * Scheduler Property Tests
 * Random submit/slice interleavings checked against the scheduling invariants
 */

use super::common::{recording_scheduler, StepLog};
use proptest::prelude::*;
use slice_sched::{CallbackHost, ManualHost, Priority, Scheduler, SliceOutcome, WorkId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Submit(Priority, u32),
    RunSlice,
    Expire,
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (priority_strategy(), 1u32..12).prop_map(|(p, n)| Op::Submit(p, n)),
        5 => Just(Op::RunSlice),
        1 => Just(Op::Expire),
    ]
}

/// Invariants that hold between any two operations
fn check_invariants(scheduler: &Scheduler<ManualHost>) -> Result<(), TestCaseError> {
    prop_assert!(scheduler.queue().iter().all(|item| item.remaining > 0));
    prop_assert_eq!(scheduler.host().current_callback(), scheduler.pending_callback());
    prop_assert_eq!(
        scheduler.pending_callback().is_some(),
        !scheduler.queue().is_empty()
    );

    if let Some(reg) = scheduler.host().registration() {
        let head = scheduler.queue().highest_priority();
        prop_assert_eq!(Some(reg.priority), head.map(|item| item.priority));
        prop_assert!(scheduler.queue().get(reg.task).is_some());
    }
    Ok(())
}

/// Run the due slice, crediting its sub-steps to the invoked item
///
/// Every sub-step logged during the slice must belong to that item.
fn run_accounted(
    scheduler: &mut Scheduler<ManualHost>,
    log: &StepLog,
    executed: &mut HashMap<WorkId, u32>,
) -> Result<Option<(SliceOutcome, u32)>, TestCaseError> {
    let Some(reg) = scheduler.host().registration() else {
        prop_assert!(scheduler.run_next_slice().unwrap().is_none());
        return Ok(None);
    };
    let before = scheduler.remaining(reg.task).unwrap_or(0);
    let logged = log.lock().len();

    let outcome = scheduler.run_next_slice().unwrap();
    prop_assert!(outcome.is_some());

    let steps = before - scheduler.remaining(reg.task).unwrap_or(0);
    let log = log.lock();
    prop_assert_eq!(log.len() - logged, steps as usize);
    prop_assert!(log[logged..].iter().all(|p| *p == reg.priority));
    *executed.entry(reg.task).or_default() += steps;

    Ok(outcome.map(|outcome| (outcome, steps)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_interleavings_preserve_invariants(
        budget in 1u32..6,
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let (mut scheduler, log) = recording_scheduler(ManualHost::with_slice_budget(budget));
        let mut submitted: HashMap<WorkId, u32> = HashMap::new();
        let mut executed: HashMap<WorkId, u32> = HashMap::new();
        let mut expire_pending = false;

        for op in ops {
            match op {
                Op::Submit(priority, size) => {
                    let id = scheduler.submit(priority, size).unwrap();
                    submitted.insert(id, size);
                }
                Op::Expire => {
                    scheduler.host_mut().expire_next();
                    expire_pending = true;
                }
                Op::RunSlice => {
                    let journal_len = scheduler.host().journal().len();
                    let forced = expire_pending
                        || scheduler.host().registration().map(|r| r.priority)
                            == Some(Priority::Immediate);

                    match run_accounted(&mut scheduler, &log, &mut executed)? {
                        None => {
                            prop_assert!(scheduler.is_quiescent());
                        }
                        Some((outcome, steps)) => {
                            expire_pending = false;
                            prop_assert!(steps >= 1);
                            if !forced {
                                prop_assert!(steps <= budget);
                            }
                            if let SliceOutcome::Continue(id) = outcome {
                                prop_assert_eq!(scheduler.host().journal().len(), journal_len);
                                prop_assert_eq!(
                                    scheduler.host().registration().map(|r| r.task),
                                    Some(id)
                                );
                            }
                        }
                    }
                }
            }
            check_invariants(&scheduler)?;
        }

        while run_accounted(&mut scheduler, &log, &mut executed)?.is_some() {}
        prop_assert!(scheduler.is_quiescent());
        prop_assert_eq!(executed, submitted);
    }

    #[test]
    fn prop_more_urgent_submission_takes_next_slice(
        budget in 1u32..4,
        low_size in 5u32..20,
        urgent in priority_strategy(),
    ) {
        prop_assume!(urgent < Priority::Low);
        let (mut scheduler, log) = recording_scheduler(ManualHost::with_slice_budget(budget));

        scheduler.submit(Priority::Low, low_size).unwrap();
        scheduler.run_next_slice().unwrap();
        let before = log.lock().len();

        let id = scheduler.submit(urgent, 2).unwrap();
        scheduler.run_next_slice().unwrap();

        let log = log.lock();
        prop_assert_eq!(log[before], urgent);
        if scheduler.remaining(id).is_none() {
            prop_assert!(log[before..].iter().all(|p| *p == urgent));
        }
    }
}
