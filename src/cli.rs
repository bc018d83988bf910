//! Command-line interface definition.
use clap::{Parser, Subcommand};

use crate::error::ConfigError;

/// Top-level CLI entry point for the link engine.
#[derive(Parser, Debug)]
#[command(
    name = "dotlink",
    about = "Symlink per-application config directories into a target directory",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// Name used for the log file of this invocation.
    #[must_use]
    pub const fn command_name(&self) -> &'static str {
        match self.command {
            Command::List(_) => "list",
            Command::Install(_) => "install",
            Command::Uninstall(_) => "uninstall",
            Command::Version => "version",
        }
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override repository root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List apps, or the files of the given apps
    List(ListOpts),
    /// Link apps into a target directory
    Install(LinkOpts),
    /// Remove links to apps from a target directory
    Uninstall(LinkOpts),
    /// Print version information
    Version,
}

/// Options for the `list` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ListOpts {
    /// Apps to list files for (all apps when omitted)
    #[arg(value_name = "APP")]
    pub apps: Vec<String>,
}

/// Options for the `install` and `uninstall` subcommands.
#[derive(Parser, Debug, Clone)]
pub struct LinkOpts {
    /// Apps to process (all when omitted), followed by the target directory
    #[arg(value_name = "APP... TARGET")]
    pub args: Vec<String>,
}

impl LinkOpts {
    /// Split the positional arguments into app names and the target.
    ///
    /// The target is always the last argument.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTarget`] if no arguments were given.
    pub fn split(&self) -> Result<(&[String], &str), ConfigError> {
        match self.args.split_last() {
            Some((target, apps)) => Ok((apps, target.as_str())),
            None => Err(ConfigError::MissingTarget),
        }
    }
}
