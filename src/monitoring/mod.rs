/*!
 * Monitoring
 * Structured tracing for scheduler runs and slices
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, SliceSpan, SLOW_SLICE_THRESHOLD};
