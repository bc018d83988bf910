//! Tracing subscriber: every event is classified once as a [`LineKind`], then
//! rendered for the console (stdout or stderr) and for the log file.
use std::fs;
use std::io::{self, Write as _};
use std::path::Path;
use std::sync::Mutex;

use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::{EitherWriter, MakeWriter};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::utils::{HEADER_CLOCK, LINE_CLOCK, log_file_path, strip_ansi, utc_now};

/// Target for stage headers.
pub(super) const STAGE_TARGET: &str = "dotlink::stage";
/// Target for dry-run action lines.
pub(super) const DRY_RUN_TARGET: &str = "dotlink::dry_run";
/// Target for verbatim remediation lines.
pub(super) const REMEDY_TARGET: &str = "dotlink::remedy";
/// Target for the per-app result lines of the run summary.
pub(super) const SUMMARY_TARGET: &str = "dotlink::summary";

/// What a line is, independent of where it ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LineKind {
    Stage,
    DryRun,
    Remedy,
    Summary,
    Error,
    Warn,
    Info,
    Debug,
}

impl LineKind {
    /// Classify an event by its target first, then by its level.
    pub(super) fn of(metadata: &Metadata<'_>) -> Self {
        match (metadata.target(), *metadata.level()) {
            (REMEDY_TARGET, _) => Self::Remedy,
            (STAGE_TARGET, _) => Self::Stage,
            (DRY_RUN_TARGET, _) => Self::DryRun,
            (SUMMARY_TARGET, _) => Self::Summary,
            (_, Level::ERROR) => Self::Error,
            (_, Level::WARN) => Self::Warn,
            (_, Level::INFO) => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Lines written to stderr; everything else goes to stdout.
    pub(super) const fn is_diagnostic(self) -> bool {
        matches!(self, Self::Remedy | Self::Error | Self::Warn)
    }

    /// Console rendering.  Remediation stays verbatim so it can be pasted.
    fn console(self, msg: &str) -> String {
        match self {
            Self::Remedy => msg.to_string(),
            Self::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
            Self::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Self::Summary => format!("    {msg}"),
            Self::Info => format!("  {msg}"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
        }
    }

    /// Log file rendering: clock prefix, plain-text tag, no escape codes.
    fn file(self, clock: &str, msg: &str) -> String {
        let msg = strip_ansi(msg);
        let tag = match self {
            Self::Stage => return format!("[{clock}] ==> {msg}"),
            Self::DryRun => "[dry run] ",
            Self::Remedy => "[fix] ",
            Self::Summary => "[summary] ",
            Self::Error => "[error] ",
            Self::Warn => "[warn] ",
            Self::Debug => "[debug] ",
            Self::Info => "",
        };
        format!("[{clock}]     {tag}{msg}")
    }
}

/// Collects the `message` field of an event.
#[derive(Default)]
struct Message(String);

impl tracing::field::Visit for Message {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

fn message(event: &Event<'_>) -> String {
    let mut visitor = Message::default();
    event.record(&mut visitor);
    visitor.0
}

/// Layer that appends every event to the log file of one invocation.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate `path`, write the run header for `command`, and keep the file
    /// open for the rest of the run.
    pub(super) fn create(path: &Path, command: &str) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = fs::File::create(path)?;
        let version =
            option_env!("DOTLINK_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let rule = "=".repeat(42);
        writeln!(
            file,
            "{rule}\ndotlink {version} {command} {}\n{rule}",
            utc_now(HEADER_CLOCK)
        )?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let line = LineKind::of(event.metadata()).file(&utc_now(LINE_CLOCK), &message(event));
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Renders each event through [`LineKind::console`].
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let line = LineKind::of(event.metadata()).console(&message(event));
        writeln!(writer, "{line}")
    }
}

/// Picks `out` or `err` per event, so diagnostics and progress never share
/// a stream.
struct ConsoleWriter<O, E> {
    out: O,
    err: E,
}

impl<'a, O, E> MakeWriter<'a> for ConsoleWriter<O, E>
where
    O: MakeWriter<'a>,
    E: MakeWriter<'a>,
{
    type Writer = EitherWriter<O::Writer, E::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        EitherWriter::A(self.out.make_writer())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        if LineKind::of(meta).is_diagnostic() {
            EitherWriter::B(self.err.make_writer_for(meta))
        } else {
            EitherWriter::A(self.out.make_writer_for(meta))
        }
    }
}

/// Console layer writing progress to `out` and diagnostics to `err`.
fn console_layer<O, E>(out: O, err: E) -> impl Layer<Registry>
where
    O: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    E: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(ConsoleWriter { out, err })
}

/// Initialise the global [`tracing`] subscriber.
///
/// Progress goes to stdout; errors, warnings and remediation lines go to
/// stderr.  Every event, `debug` included, is also written to
/// `$XDG_CACHE_HOME/dotlink/<command>.log`; if that file cannot be created
/// the run continues with console output only.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::{
        filter::LevelFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let file_layer = FileLayer::create(&log_file_path(command), command)
        .ok()
        .map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer(io::stdout, io::stderr).with_filter(console_level))
        .with(file_layer)
        .init();
}
