/*!
 * Structured Tracing
 * Tracing subscriber setup and per-slice spans using the tracing crate
 *
 * Features:
 * - Run IDs for correlating a scheduler task's log lines
 * - JSON-formatted logs for structured parsing
 * - `log` records bridged into the tracing subscriber
 * - Slow-slice warnings with duration fields
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

use crate::core::types::{Priority, WorkId};
use crate::host::CallbackHandle;

/// Slices running longer than this are reported as slow
pub const SLOW_SLICE_THRESHOLD: Duration = Duration::from_millis(10);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
///
/// `json` selects JSON output (see `SchedulerConfig::trace_json`).
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Generate a unique ID for correlating a scheduler run
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one slice execution
pub struct SliceSpan {
    span: tracing::Span,
    start: Instant,
}

impl SliceSpan {
    pub fn new(handle: CallbackHandle, task: WorkId, priority: Priority, did_timeout: bool) -> Self {
        let span = span!(
            Level::DEBUG,
            "slice",
            callback = %handle,
            work = task,
            priority = priority.as_str(),
            did_timeout = did_timeout,
            duration_us = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
        }
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Record the slice outcome
    pub fn record_outcome<V: std::fmt::Debug>(&self, outcome: V) {
        self.span.record("outcome", format!("{:?}", outcome).as_str());
    }
}

impl Drop for SliceSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > SLOW_SLICE_THRESHOLD {
            warn!(
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow slice detected"
            );
        } else {
            debug!(duration_us = duration.as_micros() as u64, "slice completed");
        }
    }
}
