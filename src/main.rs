/*!
 * Slice Scheduler - Demo Entry Point
 *
 * Replays a set of timed submissions against a scheduler task. Each
 * sub-step renders one cell (the priority rank) after a busy loop standing
 * in for expensive work, so preemption shows up as interleaved digits.
 *
 * Usage: slice-sched [--frame-ms N] [--spin N] [PRIORITY[:STEPS][@DELAY_MS]]...
 */

use anyhow::{bail, Context, Result};
use slice_sched::core::limits::{DEMO_SPIN_ITERATIONS, DEMO_WORK_SIZE};
use slice_sched::{init_tracing, Priority, SchedulerConfig, SchedulerTask};
use std::hint::black_box;
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// One planned submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Submission {
    priority: Priority,
    steps: u32,
    delay: Duration,
}

impl Submission {
    /// Parse `PRIORITY[:STEPS][@DELAY_MS]`
    fn parse(text: &str) -> Result<Self> {
        let (head, delay) = match text.split_once('@') {
            Some((head, ms)) => (
                head,
                Duration::from_millis(ms.parse().with_context(|| format!("bad delay in '{}'", text))?),
            ),
            None => (text, Duration::ZERO),
        };
        let (priority, steps) = match head.split_once(':') {
            Some((p, n)) => (p, n.parse().with_context(|| format!("bad step count in '{}'", text))?),
            None => (head, DEMO_WORK_SIZE),
        };
        Ok(Self {
            priority: priority.parse()?,
            steps,
            delay,
        })
    }
}

struct Options {
    config: SchedulerConfig,
    spin: u64,
    plan: Vec<Submission>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options> {
    let mut config = SchedulerConfig::from_env();
    let mut spin = DEMO_SPIN_ITERATIONS;
    let mut plan = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--frame-ms" => {
                let ms: u64 = args
                    .next()
                    .context("--frame-ms needs a value")?
                    .parse()
                    .context("--frame-ms expects milliseconds")?;
                config = config.with_frame_budget(Duration::from_millis(ms));
            }
            "--spin" => {
                spin = args
                    .next()
                    .context("--spin needs a value")?
                    .parse()
                    .context("--spin expects an iteration count")?;
            }
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            other => plan.push(Submission::parse(other)?),
        }
    }

    // Default plan: one click per button, least urgent first
    if plan.is_empty() {
        for (i, priority) in [
            Priority::Low,
            Priority::Normal,
            Priority::UserBlocking,
            Priority::Immediate,
        ]
        .into_iter()
        .enumerate()
        {
            plan.push(Submission {
                priority,
                steps: DEMO_WORK_SIZE,
                delay: Duration::from_millis(20 * i as u64),
            });
        }
    }
    plan.sort_by_key(|s| s.delay);

    Ok(Options { config, spin, plan })
}

/// Render one cell after spinning to simulate an expensive sub-step
fn render_cell(priority: Priority, spin: u64) {
    let mut acc = 0u64;
    for i in 0..spin {
        acc = acc.wrapping_add(black_box(i));
    }
    black_box(acc);

    let mut out = std::io::stdout().lock();
    let _ = write!(out, "{}", priority.rank());
    let _ = out.flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = parse_args(std::env::args().skip(1))?;
    init_tracing(options.config.trace_json);

    info!("Slice scheduler demo starting");
    info!(
        frame_budget_ms = options.config.frame_budget.as_millis() as u64,
        submissions = options.plan.len(),
        "Configuration loaded"
    );

    let spin = options.spin;
    let task = SchedulerTask::spawn(options.config.clone(), move |priority| {
        render_cell(priority, spin)
    });

    let start = tokio::time::Instant::now();
    for submission in &options.plan {
        tokio::time::sleep_until(start + submission.delay).await;
        let id = task
            .submit(submission.priority, submission.steps)
            .await
            .with_context(|| format!("submitting {:?}", submission))?;
        info!(work = id, priority = %submission.priority, "Submitted");
    }

    task.wait_idle().await?;
    println!();

    let stats = task.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    task.shutdown().await;
    info!("Slice scheduler demo finished");
    Ok(())
}
