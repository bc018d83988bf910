// Shared helpers for integration tests.
//
// Provides a temporary repository with a configs root and a separate
// temporary target directory, plus thin wrappers that drive the command
// functions the binary dispatches to.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dotlink_cli::cli::{GlobalOpts, LinkOpts};
use dotlink_cli::commands;
use dotlink_cli::logging::Logger;

/// An isolated repository and target, both backed by [`tempfile::TempDir`].
///
/// Both directories are deleted when dropped.
pub struct TestRepo {
    /// Repository root holding `config/<app>/`.
    pub root: tempfile::TempDir,
    /// Directory links are created in.
    pub target: tempfile::TempDir,
}

impl TestRepo {
    /// Create an empty repository with a `config/` directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create repo dir");
        std::fs::create_dir(root.path().join("config")).expect("create config dir");
        let target = tempfile::tempdir().expect("create target dir");
        Self { root, target }
    }

    /// Add an app with the given files (name, contents) and directories.
    pub fn with_app(self, name: &str, files: &[(&str, &str)], dirs: &[&str]) -> Self {
        let app = self.root.path().join("config").join(name);
        std::fs::create_dir_all(&app).expect("create app dir");
        for (file, contents) in files {
            std::fs::write(app.join(file), contents).expect("write app file");
        }
        for dir in dirs {
            std::fs::create_dir_all(app.join(dir)).expect("create app subdir");
        }
        self
    }

    /// Write `dotlink.toml` at the repository root.
    pub fn with_settings(self, contents: &str) -> Self {
        std::fs::write(self.root.path().join("dotlink.toml"), contents).expect("write settings");
        self
    }

    /// Path to the target directory.
    pub fn target_path(&self) -> &Path {
        self.target.path()
    }

    /// Canonical path of an entry inside an app directory.
    pub fn source(&self, app: &str, entry: &str) -> PathBuf {
        std::fs::canonicalize(self.root.path().join("config").join(app).join(entry))
            .expect("canonicalize source")
    }

    /// Global options pointing at this repository.
    pub fn global(&self, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            dry_run,
            root: Some(self.root.path().to_path_buf()),
        }
    }

    /// Positional arguments: `apps` followed by the target directory.
    pub fn link_opts(&self, apps: &[&str]) -> LinkOpts {
        let mut args: Vec<String> = apps.iter().map(|a| (*a).to_string()).collect();
        args.push(self.target_path().to_string_lossy().into_owned());
        LinkOpts { args }
    }

    /// Run `install` for `apps`.
    pub fn install(&self, apps: &[&str], dry_run: bool) -> (anyhow::Result<()>, Arc<Logger>) {
        let log = Arc::new(Logger::new("install"));
        let result = commands::install::run(&self.global(dry_run), &self.link_opts(apps), &log);
        (result, log)
    }

    /// Run `uninstall` for `apps`.
    pub fn uninstall(&self, apps: &[&str], dry_run: bool) -> (anyhow::Result<()>, Arc<Logger>) {
        let log = Arc::new(Logger::new("uninstall"));
        let result = commands::uninstall::run(&self.global(dry_run), &self.link_opts(apps), &log);
        (result, log)
    }

    /// Sorted `(name, description)` pairs of everything in the target.
    ///
    /// Symlinks are described by where they point, files by their contents
    /// and directories as `<dir>`.
    pub fn target_state(&self) -> Vec<(String, String)> {
        let mut state: Vec<(String, String)> = std::fs::read_dir(self.target_path())
            .expect("read target")
            .map(|e| {
                let entry = e.expect("dir entry");
                let path = entry.path();
                let kind = entry.file_type().expect("file type");
                let description = if kind.is_symlink() {
                    format!(
                        "-> {}",
                        std::fs::read_link(&path).expect("read link").display()
                    )
                } else if kind.is_dir() {
                    "<dir>".to_string()
                } else {
                    std::fs::read_to_string(&path).expect("read file")
                };
                (entry.file_name().to_string_lossy().into_owned(), description)
            })
            .collect();
        state.sort();
        state
    }

    /// Whether `name` in the target is a symlink to `destination`.
    pub fn links_to(&self, name: &str, destination: &Path) -> bool {
        std::fs::read_link(self.target_path().join(name)).is_ok_and(|dest| dest == destination)
    }
}

/// Create a symlink on any supported platform.
pub fn symlink(destination: &Path, link: &Path) {
    #[cfg(unix)]
    std::os::unix::fs::symlink(destination, link).expect("create symlink");
    #[cfg(windows)]
    std::os::windows::fs::symlink_file(destination, link).expect("create symlink");
}
