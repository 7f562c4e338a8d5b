/*!
 * Callback Host Module
 * Deferred-execution hosts that run scheduler slices
 */

pub mod manual;
pub mod timed;
pub mod traits;
pub mod types;

// Re-export public API
pub use manual::ManualHost;
pub use timed::{InputProbe, TimedHost};
pub use traits::{CallbackHost, HostDriver};
pub use types::{CallbackHandle, HostCall, Invocation, Registration};
