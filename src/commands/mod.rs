//! Top-level subcommand orchestration.
pub mod install;
pub mod list;
pub mod uninstall;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, LinkOpts};
use crate::config::Settings;
use crate::config::registry::Registry;
use crate::error::ConfigError;
use crate::logging::{Log, Logger};
use crate::operations::SystemFileSystemOps;
use crate::tasks::plan::Direction;
use crate::tasks::{self, Context};

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "DOTLINK_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates root resolution, settings loading, and app discovery so that
/// each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved settings.
    pub settings: Settings,
    /// Every app found under the configs root.
    pub registry: Registry,
}

impl CommandSetup {
    /// Resolve the root, load settings, and discover apps.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be determined, the settings file is
    /// invalid, or the configs root is unusable.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("root: {}", root.display()));

        let settings = Settings::load(&root)?;
        log.debug(&format!("configs root: {}", settings.configs_root.display()));

        let registry =
            Registry::discover(&SystemFileSystemOps, &settings.configs_root, &settings.ignore)?;
        log.debug(&format!("{} apps discovered", registry.len()));

        Ok(Self { settings, registry })
    }
}

/// Resolve the repository root from CLI arguments, the environment, or the
/// current directory.
///
/// # Errors
///
/// Returns [`ConfigError::RootUnavailable`] if no flag or variable is set and
/// the current directory cannot be read.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf, ConfigError> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }

    if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(root));
    }

    std::env::current_dir().map_err(|e| ConfigError::RootUnavailable(e.to_string()))
}

/// Resolve a target argument to an absolute, existing directory.
///
/// # Errors
///
/// Returns [`ConfigError::TargetUnresolvable`] if a relative target cannot be
/// made absolute, or [`ConfigError::TargetUnavailable`] if the result is not
/// an existing directory.
pub fn resolve_target(raw: &str) -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let target = expand_target(raw, home.as_deref(), std::env::current_dir)?;
    if target.is_dir() {
        Ok(target)
    } else {
        Err(ConfigError::TargetUnavailable { path: target })
    }
}

/// Expand a leading `~` and make `raw` absolute against the directory
/// returned by `cwd`, which is only consulted for relative targets.
fn expand_target(
    raw: &str,
    home: Option<&Path>,
    cwd: impl FnOnce() -> std::io::Result<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    let expanded = match home {
        Some(home) if raw == "~" => home.to_path_buf(),
        Some(home) => raw
            .strip_prefix("~/")
            .map_or_else(|| PathBuf::from(raw), |rest| home.join(rest)),
        None => PathBuf::from(raw),
    };
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    let cwd = cwd().map_err(|e| ConfigError::TargetUnresolvable {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(cwd.join(expanded))
}

/// Run install or uninstall for the requested apps, print the summary, and
/// bail if any app failed.
///
/// Every argument is validated before the first app is touched.
///
/// # Errors
///
/// Returns an error if arguments or configuration are invalid, or if one or
/// more apps recorded a failure.
pub fn run_links(
    global: &GlobalOpts,
    opts: &LinkOpts,
    log: &Arc<Logger>,
    direction: Direction,
) -> Result<()> {
    let setup = CommandSetup::init(global, log.as_ref())?;
    let (names, raw_target) = opts.split()?;
    let apps = setup.registry.resolve(names)?;
    let target = resolve_target(raw_target)?;

    if names.is_empty() {
        log.info(&format!(
            "{} all {} configs to {}",
            match direction {
                Direction::Install => "installing",
                Direction::Uninstall => "uninstalling",
            },
            apps.len(),
            target.display()
        ));
    }

    let ctx = Context::new(
        setup.settings.clone(),
        Arc::clone(log) as Arc<dyn Log>,
        global.dry_run,
    );
    for app in apps {
        tasks::execute(&ctx, app, &target, direction);
    }

    log.print_summary();

    if log.has_failures() {
        anyhow::bail!("{} app(s) failed", log.failure_count());
    }
    Ok(())
}
