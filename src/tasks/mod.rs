//! Per-app link runs: plan, validate, apply, and record the outcome.
pub mod context;
pub mod plan;
pub mod remediation;
pub mod symlinks;

pub use context::Context;

use std::path::Path;

use crate::config::registry::AppConfig;
use crate::error::LinkError;
use crate::logging::TaskStatus;

use plan::{Direction, LinkStatus, build_install_plan, build_uninstall_plan};

/// Run one app in `direction`, recording the result in the logger.
///
/// Failures are contained to the app: collisions are reported with
/// remediation commands and filesystem errors are logged, but neither is
/// returned, so the caller moves on to the next app.
///
/// Returns `true` if the app succeeded.
pub fn execute(ctx: &Context, app: &AppConfig, target: &Path, direction: Direction) -> bool {
    ctx.log.stage(&format!("{} {}", stage_verb(direction), app.name));

    match run(ctx, app, target, direction) {
        Ok(report) => {
            ctx.log.info(&report.summary(direction));
            let status = if report.dry_run {
                TaskStatus::DryRun
            } else {
                TaskStatus::Ok
            };
            ctx.log.record_task(&app.name, status, None);
            true
        }
        Err(LinkError::Collisions {
            app: name,
            direction,
            collisions,
        }) => {
            remediation::report(ctx.log.as_ref(), &name, direction, &collisions);
            ctx.log.record_task(
                &name,
                TaskStatus::Failed,
                Some(&format!("{} collision(s)", collisions.len())),
            );
            false
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e}", app.name));
            ctx.log
                .record_task(&app.name, TaskStatus::Failed, Some(&e.to_string()));
            false
        }
    }
}

fn run(
    ctx: &Context,
    app: &AppConfig,
    target: &Path,
    direction: Direction,
) -> Result<symlinks::ApplyReport, LinkError> {
    let fs = ctx.fs_ops.as_ref();
    let plan = match direction {
        Direction::Install => build_install_plan(fs, &ctx.settings, app, target)?,
        Direction::Uninstall => build_uninstall_plan(fs, &ctx.settings, app, target)?,
    };
    ctx.log.debug(&format!(
        "{}: {} planned, {} ready, {} already linked, {} colliding",
        app.name,
        plan.entries.len(),
        plan.count(LinkStatus::Ready),
        plan.count(LinkStatus::AlreadyCorrect),
        plan.entries.len()
            - plan.count(LinkStatus::Ready)
            - plan.count(LinkStatus::AlreadyCorrect),
    ));
    symlinks::apply(fs, &plan, ctx.log.as_ref(), ctx.dry_run)
}

const fn stage_verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Install => "Installing",
        Direction::Uninstall => "Uninstalling",
    }
}

/// Shared helpers for task unit tests.
///
/// Provides an in-memory repository and a capturing logger so each test
/// module does not have to duplicate boilerplate.
#[cfg(test)]
pub mod test_helpers {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use crate::config::registry::AppConfig;
    use crate::config::{IgnoreSet, Settings};
    use crate::logging::{Log, TaskEntry, TaskStatus};
    use crate::operations::MemoryFileSystemOps;

    use super::Context;

    /// Repository with one app, `vim`, holding a `vimrc` file and a
    /// `plugins` directory, and an empty target at `/home/u`.
    #[must_use]
    pub fn memory_repo() -> MemoryFileSystemOps {
        MemoryFileSystemOps::new()
            .with_dir("/repo/config")
            .with_dir("/repo/config/vim")
            .with_dir("/repo/config/vim/plugins")
            .with_file("/repo/config/vim/vimrc", 12)
            .with_dir("/home/u")
    }

    /// Settings for the repository built by [`memory_repo`].
    #[must_use]
    pub fn settings() -> Settings {
        Settings {
            root: PathBuf::from("/repo"),
            configs_root: PathBuf::from("/repo/config"),
            ignore: IgnoreSet::default(),
        }
    }

    /// The `vim` app of [`memory_repo`].
    #[must_use]
    pub fn vim_app() -> AppConfig {
        AppConfig {
            name: "vim".to_string(),
            source_dir: PathBuf::from("/repo/config/vim"),
        }
    }

    /// [`Log`] that keeps every message in memory, tagged by kind.
    #[derive(Debug, Default)]
    pub struct CapturingLog {
        lines: Mutex<Vec<(&'static str, String)>>,
        tasks: Mutex<Vec<TaskEntry>>,
    }

    impl CapturingLog {
        fn push(&self, kind: &'static str, msg: &str) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push((kind, msg.to_string()));
            }
        }

        /// Messages of one kind (`"error"`, `"remedy"`, `"dry_run"`, ...).
        #[must_use]
        pub fn messages(&self, kind: &str) -> Vec<String> {
            self.lines.lock().map_or_else(
                |_| vec![],
                |lines| {
                    lines
                        .iter()
                        .filter(|(k, _)| *k == kind)
                        .map(|(_, m)| m.clone())
                        .collect()
                },
            )
        }

        /// Recorded app results.
        #[must_use]
        pub fn tasks(&self) -> Vec<TaskEntry> {
            self.tasks.lock().map_or_else(|_| vec![], |t| t.clone())
        }
    }

    impl Log for CapturingLog {
        fn stage(&self, msg: &str) {
            self.push("stage", msg);
        }
        fn info(&self, msg: &str) {
            self.push("info", msg);
        }
        fn debug(&self, msg: &str) {
            self.push("debug", msg);
        }
        fn warn(&self, msg: &str) {
            self.push("warn", msg);
        }
        fn error(&self, msg: &str) {
            self.push("error", msg);
        }
        fn dry_run(&self, msg: &str) {
            self.push("dry_run", msg);
        }
        fn remedy(&self, msg: &str) {
            self.push("remedy", msg);
        }
        fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
            if let Ok(mut tasks) = self.tasks.lock() {
                tasks.push(TaskEntry {
                    name: name.to_string(),
                    status,
                    message: message.map(String::from),
                });
            }
        }
    }

    /// Build a [`Context`] over `fs`, returning the log for inspection.
    #[must_use]
    pub fn make_context(fs: MemoryFileSystemOps, dry_run: bool) -> (Context, Arc<CapturingLog>) {
        let log = Arc::new(CapturingLog::default());
        let ctx = Context::new(settings(), Arc::clone(&log) as Arc<dyn Log>, dry_run)
            .with_fs_ops(Arc::new(fs));
        (ctx, log)
    }
}
