//! Shared state threaded through every per-app run.
use std::sync::Arc;

use crate::config::Settings;
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};

/// Shared context for planning and applying links.
pub struct Context {
    /// Resolved settings (configs root, ignore set).
    pub settings: Settings,
    /// Logger for output and per-app recording.
    pub log: Arc<dyn Log>,
    /// Whether to report the plan without mutating anything.
    pub dry_run: bool,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("fs_ops", &"<dyn FileSystemOps>")
            .finish()
    }
}

impl Context {
    /// Create a context backed by the real filesystem.
    #[must_use]
    pub fn new(settings: Settings, log: Arc<dyn Log>, dry_run: bool) -> Self {
        Self {
            settings,
            log,
            dry_run,
            fs_ops: Arc::new(SystemFileSystemOps),
        }
    }

    /// Replace the filesystem implementation.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }
}
