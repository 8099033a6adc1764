//! Analytics sink adapters.
//!
//! - `RecordingAnalyticsSink` - Captures events for test assertions
//! - `TracingAnalyticsSink` - Emits events as structured log lines

mod in_memory;
mod tracing_sink;

pub use in_memory::RecordingAnalyticsSink;
pub use tracing_sink::TracingAnalyticsSink;
