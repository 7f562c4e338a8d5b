/*!
 * Scheduler Task - Exclusive Owner of a Timed Scheduler
 *
 * A tokio task that owns one `Scheduler<TimedHost>` and runs its slices.
 * Submissions from any thread cross into it over a channel; a waiting
 * command makes the running slice yield at its next checkpoint.
 */

use super::atomic_stats::{AtomicSchedulerStats, SchedulerStats};
use super::Scheduler;
use crate::core::config::SchedulerConfig;
use crate::core::errors::{SchedulerError, SchedulerResult};
use crate::core::types::{Priority, WorkId};
use crate::host::TimedHost;
use crate::monitoring::generate_trace_id;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::Instrument;

/// Control messages for the scheduler task
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Queue new work and report its id (or the registration failure)
    Submit {
        priority: Priority,
        work_size: u32,
        reply: oneshot::Sender<SchedulerResult<WorkId>>,
    },
    /// Stop running slices; submissions are still queued
    Pause,
    /// Resume running slices
    Resume,
    /// Notify once the scheduler reaches quiescence
    WhenIdle(oneshot::Sender<()>),
    /// Shutdown the scheduler task
    Shutdown,
}

/// Cloneable submission handle usable from any thread
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    command_tx: flume::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    /// Submit work from async code
    pub async fn submit(&self, priority: Priority, work_size: u32) -> SchedulerResult<WorkId> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send_async(SchedulerCommand::Submit {
                priority,
                work_size,
                reply,
            })
            .await
            .map_err(|_| SchedulerError::TaskClosed)?;
        rx.await.map_err(|_| SchedulerError::TaskClosed)?
    }

    /// Submit work from a plain (non-async) thread
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context (a
    /// tokio runtime worker). Use `submit` there instead.
    pub fn submit_blocking(&self, priority: Priority, work_size: u32) -> SchedulerResult<WorkId> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(SchedulerCommand::Submit {
                priority,
                work_size,
                reply,
            })
            .map_err(|_| SchedulerError::TaskClosed)?;
        rx.blocking_recv().map_err(|_| SchedulerError::TaskClosed)?
    }

    /// Wait until the queue is empty and no callback is pending
    pub async fn wait_idle(&self) -> SchedulerResult<()> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send_async(SchedulerCommand::WhenIdle(tx))
            .await
            .map_err(|_| SchedulerError::TaskClosed)?;
        rx.await.map_err(|_| SchedulerError::TaskClosed)
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(SchedulerCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.command_tx.send(SchedulerCommand::Resume);
    }
}

/// Handle to the scheduler background task
pub struct SchedulerTask {
    handle: SchedulerHandle,
    stats: Arc<AtomicSchedulerStats>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl SchedulerTask {
    /// Spawn a scheduler task on the current tokio runtime
    pub fn spawn<F>(config: SchedulerConfig, perform_sub_step: F) -> Self
    where
        F: FnMut(Priority) + Send + 'static,
    {
        let (command_tx, command_rx) = flume::unbounded();

        let probe_rx = command_rx.clone();
        let host = TimedHost::new(config)
            .with_input_probe(Box::new(move || !probe_rx.is_empty()));
        let scheduler = Scheduler::new(host, perform_sub_step);
        let stats = scheduler.stats_handle();

        let run_id = generate_trace_id();
        let span = tracing::info_span!("scheduler_task", run_id = %run_id);
        let join = tokio::spawn(run_scheduler_loop(scheduler, command_rx).instrument(span));

        info!("Scheduler task spawned (run {})", run_id);

        Self {
            handle: SchedulerHandle { command_tx },
            stats,
            join: Some(join),
        }
    }

    /// Cloneable handle for submitting from other tasks or threads
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    pub async fn submit(&self, priority: Priority, work_size: u32) -> SchedulerResult<WorkId> {
        self.handle.submit(priority, work_size).await
    }

    pub async fn wait_idle(&self) -> SchedulerResult<()> {
        self.handle.wait_idle().await
    }

    pub fn pause(&self) {
        self.handle.pause();
    }

    pub fn resume(&self) {
        self.handle.resume();
    }

    /// Lock-free stats snapshot
    pub fn stats(&self) -> SchedulerStats {
        self.stats.snapshot()
    }

    /// Shutdown the scheduler task gracefully
    pub async fn shutdown(mut self) {
        let _ = self.handle.command_tx.send(SchedulerCommand::Shutdown);

        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                warn!("Scheduler task shutdown error: {}", e);
            } else {
                info!("Scheduler task shutdown complete");
            }
        }
    }
}

impl Drop for SchedulerTask {
    fn drop(&mut self) {
        if self.join.is_some() {
            let _ = self.handle.command_tx.send(SchedulerCommand::Shutdown);
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

struct LoopState {
    active: bool,
    idle_waiters: Vec<oneshot::Sender<()>>,
}

fn handle_command(
    scheduler: &mut Scheduler<TimedHost>,
    state: &mut LoopState,
    cmd: SchedulerCommand,
) -> Flow {
    match cmd {
        SchedulerCommand::Submit {
            priority,
            work_size,
            reply,
        } => {
            let _ = reply.send(scheduler.submit(priority, work_size));
        }
        SchedulerCommand::Pause => {
            info!("Scheduler task paused");
            state.active = false;
        }
        SchedulerCommand::Resume => {
            info!("Scheduler task resumed");
            state.active = true;
            // Re-arm in case a registration failed while paused
            if let Err(e) = scheduler.reschedule() {
                warn!("Reschedule on resume failed: {}", e);
            }
        }
        SchedulerCommand::WhenIdle(waiter) => {
            if scheduler.is_quiescent() {
                let _ = waiter.send(());
            } else {
                state.idle_waiters.push(waiter);
            }
        }
        SchedulerCommand::Shutdown => {
            info!("Scheduler task shutting down");
            return Flow::Stop;
        }
    }
    Flow::Continue
}

/// Core scheduler loop: drain commands, run one slice, repeat
async fn run_scheduler_loop(
    mut scheduler: Scheduler<TimedHost>,
    command_rx: flume::Receiver<SchedulerCommand>,
) {
    let mut state = LoopState {
        active: true,
        idle_waiters: Vec::new(),
    };

    info!(
        "Scheduler loop started with {:?} frame budget",
        scheduler.host().config().frame_budget
    );

    loop {
        while let Ok(cmd) = command_rx.try_recv() {
            if let Flow::Stop = handle_command(&mut scheduler, &mut state, cmd) {
                return;
            }
        }

        if state.active {
            match scheduler.run_next_slice() {
                Ok(Some(outcome)) => {
                    log::trace!("Slice outcome: {:?}", outcome);
                    // Let other tasks (and submitters) in between slices
                    tokio::task::yield_now().await;
                    continue;
                }
                Ok(None) => {}
                Err(e) => warn!("Slice ended with host failure: {}", e),
            }
        }

        if scheduler.is_quiescent() {
            for waiter in state.idle_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }

        match command_rx.recv_async().await {
            Ok(cmd) => {
                if let Flow::Stop = handle_command(&mut scheduler, &mut state, cmd) {
                    return;
                }
            }
            Err(_) => {
                info!("All scheduler handles dropped, stopping loop");
                return;
            }
        }
    }
}
