//! Core logging types: per-app entries, status, and the [`Log`] trait.

/// Outcome of one app for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// App name.
    pub name: String,
    /// Final status of the app.
    pub status: TaskStatus,
    /// Optional detail message (e.g., link counts or error description).
    pub message: Option<String>,
}

/// Status of a processed app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The plan was applied.
    Ok,
    /// The plan was validated and reported; nothing was changed.
    DryRun,
    /// The plan was rejected or the apply step failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) writes through `tracing`; tests plug in
/// a capturing implementation so output can be asserted on.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Print a copy-pasteable remediation line verbatim to standard error.
    fn remedy(&self, msg: &str);
    /// Record an app result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
