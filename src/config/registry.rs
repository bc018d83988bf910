//! App discovery: one app per subdirectory of the configs root.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::IgnoreSet;
use crate::error::ConfigError;
use crate::operations::FileSystemOps;

/// A named, self-contained set of files deployed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory name under the configs root, lossily converted to UTF-8.
    pub name: String,
    /// Canonical absolute path of the app directory.
    pub source_dir: PathBuf,
}

/// All apps found under the configs root, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    apps: BTreeMap<String, AppConfig>,
}

impl Registry {
    /// Scan `configs_root` for app directories.
    ///
    /// Entries named in `ignore` and anything that is not a directory
    /// (following symlinks) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigRootUnavailable`] if `configs_root` does
    /// not exist, is not a directory, or cannot be listed.
    pub fn discover(
        fs: &dyn FileSystemOps,
        configs_root: &Path,
        ignore: &IgnoreSet,
    ) -> Result<Self, ConfigError> {
        let unavailable = |path: &Path, reason: String| ConfigError::ConfigRootUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        if !fs.exists(configs_root) {
            return Err(unavailable(configs_root, "does not exist".to_string()));
        }
        if !fs.is_dir(configs_root) {
            return Err(unavailable(configs_root, "not a directory".to_string()));
        }

        let names = fs
            .list_entries(configs_root)
            .map_err(|e| unavailable(configs_root, e.to_string()))?;

        let mut apps = BTreeMap::new();
        for entry in names.into_iter().filter(|n| !ignore.contains(n)) {
            let path = configs_root.join(&entry);
            if !fs.is_dir(&path) {
                continue;
            }
            let source_dir = fs
                .canonicalize(&path)
                .map_err(|e| unavailable(&path, e.to_string()))?;
            // The directory is reached through `source_dir`; the name is only
            // used for selection and display.
            let name = entry.to_string_lossy().into_owned();
            apps.insert(name.clone(), AppConfig { name, source_dir });
        }

        Ok(Self { apps })
    }

    /// Look up an app by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AppConfig> {
        self.apps.get(name)
    }

    /// Number of discovered apps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// Returns `true` if no apps were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Iterate over all apps in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AppConfig> {
        self.apps.values()
    }

    /// Resolve requested app names.
    ///
    /// With no names, returns every app in name order.  Otherwise returns the
    /// requested apps in the order given, each at most once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownApp`] for the first name with no app.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<&AppConfig>, ConfigError> {
        if names.is_empty() {
            return Ok(self.iter().collect());
        }

        let mut selected: Vec<&AppConfig> = Vec::with_capacity(names.len());
        for name in names {
            let app = self
                .get(name)
                .ok_or_else(|| ConfigError::UnknownApp(name.clone()))?;
            if !selected.iter().any(|a| a.name == app.name) {
                selected.push(app);
            }
        }
        Ok(selected)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::{MemoryFileSystemOps, SystemFileSystemOps};

    fn sample_fs() -> MemoryFileSystemOps {
        MemoryFileSystemOps::new()
            .with_dir("/repo/config")
            .with_dir("/repo/config/vim")
            .with_dir("/repo/config/git")
            .with_dir("/repo/config/.git")
            .with_file("/repo/config/README", 10)
    }

    #[test]
    fn discovers_directories_in_name_order() {
        let fs = sample_fs();
        let registry =
            Registry::discover(&fs, Path::new("/repo/config"), &IgnoreSet::default()).unwrap();
        let names: Vec<&str> = registry.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["git", "vim"]);
        assert_eq!(
            registry.get("vim").unwrap().source_dir,
            PathBuf::from("/repo/config/vim")
        );
    }

    #[test]
    fn skips_ignored_and_non_directories() {
        let fs = sample_fs();
        let registry =
            Registry::discover(&fs, Path::new("/repo/config"), &IgnoreSet::default()).unwrap();
        assert!(registry.get(".git").is_none());
        assert!(registry.get("README").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn extra_ignores_apply() {
        let fs = sample_fs();
        let ignore = IgnoreSet::with_extra(["git"]);
        let registry = Registry::discover(&fs, Path::new("/repo/config"), &ignore).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn missing_root_is_unavailable() {
        let fs = MemoryFileSystemOps::new();
        let err = Registry::discover(&fs, Path::new("/repo/config"), &IgnoreSet::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ConfigRootUnavailable { .. }));
    }

    #[test]
    fn file_root_is_unavailable() {
        let fs = MemoryFileSystemOps::new().with_file("/repo/config", 3);
        let err = Registry::discover(&fs, Path::new("/repo/config"), &IgnoreSet::default())
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"), "got: {err}");
    }

    #[test]
    fn source_dir_is_canonical_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config/zsh")).unwrap();
        let relative_root = dir.path().join("config/../config");
        let registry =
            Registry::discover(&SystemFileSystemOps, &relative_root, &IgnoreSet::default())
                .unwrap();
        let zsh = registry.get("zsh").unwrap();
        assert_eq!(
            zsh.source_dir,
            dunce::canonicalize(dir.path().join("config/zsh")).unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_app_dir_is_discovered() {
        use std::os::unix::ffi::OsStrExt as _;
        let dir = tempfile::tempdir().unwrap();
        let raw = std::ffi::OsStr::from_bytes(b"caf\xe9");
        std::fs::create_dir_all(dir.path().join("config").join(raw)).unwrap();

        let registry = Registry::discover(
            &SystemFileSystemOps,
            &dir.path().join("config"),
            &IgnoreSet::default(),
        )
        .unwrap();

        let app = registry.iter().next().unwrap();
        assert_eq!(app.name, "caf\u{fffd}");
        assert!(app.source_dir.ends_with(raw));
        assert!(app.source_dir.is_dir());
    }

    #[test]
    fn resolve_all_when_no_names() {
        let fs = sample_fs();
        let registry =
            Registry::discover(&fs, Path::new("/repo/config"), &IgnoreSet::default()).unwrap();
        assert_eq!(registry.resolve(&[]).unwrap().len(), 2);
    }

    #[test]
    fn resolve_keeps_requested_order_and_dedups() {
        let fs = sample_fs();
        let registry =
            Registry::discover(&fs, Path::new("/repo/config"), &IgnoreSet::default()).unwrap();
        let names = vec!["vim".to_string(), "git".to_string(), "vim".to_string()];
        let apps = registry.resolve(&names).unwrap();
        let resolved: Vec<&str> = apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(resolved, vec!["vim", "git"]);
    }

    #[test]
    fn resolve_rejects_unknown_app() {
        let fs = sample_fs();
        let registry =
            Registry::discover(&fs, Path::new("/repo/config"), &IgnoreSet::default()).unwrap();
        let err = registry
            .resolve(&["vim".to_string(), "emacs".to_string()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownApp(name) if name == "emacs"));
    }
}
