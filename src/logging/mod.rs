//! Console and log file output.
//!
//! Commands and tasks talk to the [`Log`] trait.  [`Logger`] turns each call
//! into a `tracing` event with a `dotlink::*` target; the subscriber installed
//! by [`init_subscriber`] prints progress to stdout, errors and copy-paste
//! remediation to stderr, and mirrors everything to a per-command log file.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, TaskEntry, TaskStatus};

/// A [`Logger`] wired to a thread-local subscriber that writes into a
/// temporary log file, so tests can read back what was logged.
///
/// Keep the returned guard alive for the whole test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let tmp = tempfile::tempdir().expect("temp dir");
    let path = tmp.path().join("test.log");
    let file_layer = subscriber::FileLayer::create(&path, "test").expect("log file");
    let dispatch = tracing::Dispatch::new(
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG)),
    );
    let guard = tracing::dispatcher::set_default(&dispatch);
    (Logger::with_log_file(path), tmp, guard)
}
