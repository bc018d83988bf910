//! Domain-specific error types for the link engine.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! - [`ConfigError`]: settings, app discovery, argument validation; fatal
//!   before any app is touched.
//! - [`LinkError`]: collisions and filesystem failures; fatal for one app.

use std::path::PathBuf;

use thiserror::Error;

use crate::tasks::plan::{Collision, Direction};

/// Errors raised while resolving settings, discovering apps and validating
/// command-line arguments.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The repository root could not be determined.
    #[error("cannot determine repository root: {0}")]
    RootUnavailable(String),

    /// The configs root is missing, not a directory, or unreadable.
    #[error("cannot access {path}, or it's not a directory: {reason}")]
    ConfigRootUnavailable {
        /// Configs root that was checked.
        path: PathBuf,
        /// Why it could not be used.
        reason: String,
    },

    /// A requested app has no directory under the configs root.
    #[error("no config for app: {0}")]
    UnknownApp(String),

    /// `install`/`uninstall` was invoked without a target directory.
    #[error("insufficient arguments: install/uninstall require a target")]
    MissingTarget,

    /// A relative target could not be made absolute.
    #[error("cannot resolve target {raw}: {reason}")]
    TargetUnresolvable {
        /// The target as given on the command line.
        raw: String,
        /// Why the current directory could not be read.
        reason: String,
    },

    /// The target is not an existing directory.
    #[error("target is not a directory: {path}")]
    TargetUnavailable {
        /// The resolved target path.
        path: PathBuf,
    },

    /// The settings file exists but cannot be read or parsed.
    #[error("invalid settings in {path}: {message}")]
    InvalidSettings {
        /// Path to the settings file.
        path: PathBuf,
        /// Parser or I/O message.
        message: String,
    },
}

/// Errors raised while validating or applying a link plan.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The plan contains entries that block safe application.
    #[error("{direction} of {app} blocked by {} collision(s)", collisions.len())]
    Collisions {
        /// App whose plan was rejected.
        app: String,
        /// Whether the plan was for install or uninstall.
        direction: Direction,
        /// Every colliding entry, in plan order.
        collisions: Vec<Collision>,
    },

    /// A plan was handed to the entry point for the other direction.
    #[error("{app}: cannot {expected} with a plan built for {found}")]
    DirectionMismatch {
        /// App the plan belongs to.
        app: String,
        /// Direction of the entry point that was called.
        expected: Direction,
        /// Direction the plan was built for.
        found: Direction,
    },

    /// An I/O failure while creating or removing a link.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        /// Path being mutated when the failure occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::tasks::plan::CollisionReason;
    use std::io;

    #[test]
    fn config_root_unavailable_display() {
        let e = ConfigError::ConfigRootUnavailable {
            path: PathBuf::from("/repo/config"),
            reason: "not found".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "cannot access /repo/config, or it's not a directory: not found"
        );
    }

    #[test]
    fn unknown_app_display() {
        let e = ConfigError::UnknownApp("emacs".to_string());
        assert_eq!(e.to_string(), "no config for app: emacs");
    }

    #[test]
    fn missing_target_display() {
        assert!(
            ConfigError::MissingTarget
                .to_string()
                .contains("require a target")
        );
    }

    #[test]
    fn collisions_display_counts_entries() {
        let e = LinkError::Collisions {
            app: "vim".to_string(),
            direction: Direction::Install,
            collisions: vec![
                Collision {
                    link_path: PathBuf::from("/home/u/vimrc"),
                    reason: CollisionReason::NotASymlink,
                    is_dir: false,
                },
                Collision {
                    link_path: PathBuf::from("/home/u/plugins"),
                    reason: CollisionReason::WrongTarget,
                    is_dir: true,
                },
            ],
        };
        assert_eq!(e.to_string(), "install of vim blocked by 2 collision(s)");
    }

    #[test]
    fn direction_mismatch_display() {
        let e = LinkError::DirectionMismatch {
            app: "vim".to_string(),
            expected: Direction::Uninstall,
            found: Direction::Install,
        };
        assert_eq!(
            e.to_string(),
            "vim: cannot uninstall with a plan built for install"
        );
    }

    #[test]
    fn target_unresolvable_names_the_argument() {
        let e = ConfigError::TargetUnresolvable {
            raw: "dots".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "cannot resolve target dots: No such file or directory"
        );
    }

    #[test]
    fn filesystem_error_has_source() {
        use std::error::Error as StdError;
        let e = LinkError::Filesystem {
            path: PathBuf::from("/home/u/vimrc"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/home/u/vimrc"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ConfigError>();
        assert_send_sync::<LinkError>();
    }

    #[test]
    fn errors_convert_to_anyhow() {
        let _config: anyhow::Error = ConfigError::MissingTarget.into();
        let _link: anyhow::Error = LinkError::Filesystem {
            path: PathBuf::from("/t"),
            source: io::Error::from(io::ErrorKind::Other),
        }
        .into();
    }
}
