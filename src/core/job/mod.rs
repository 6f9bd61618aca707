//! Job context, progress reporting and cancellation

pub mod context;
pub mod progress;

pub use context::JobContext;
pub use progress::{ChannelProgressSink, ProgressEvent, ProgressSink, TracingProgressSink};
