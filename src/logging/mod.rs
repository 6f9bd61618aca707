//! Logging and observability
//!
//! Structured logging through `tracing`, with:
//! - Console output
//! - Optional JSON log files with rotation
//! - Configurable log levels, overridable with `RUST_LOG`
//!
//! ```no_run
//! use bpagen::logging::init_logging;
//! use bpagen::config::LoggingConfig;
//!
//! let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
//! tracing::info!(competence = "202403", "Generating batch file");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of a generation or repair job
#[macro_export]
macro_rules! log_job_start {
    ($task_id:expr, $kind:expr) => {
        tracing::info!(task_id = %$task_id, job = $kind, "Job started");
    };
}

/// Log a job failure with the error message
#[macro_export]
macro_rules! log_job_failure {
    ($task_id:expr, $error:expr) => {
        tracing::error!(task_id = %$task_id, error = %$error, "Job failed")
    };
}
