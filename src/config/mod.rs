//! Settings resolution and app discovery.
pub mod registry;
pub mod toml_loader;

use serde::Deserialize;
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Name of the optional settings file at the repository root.
pub const SETTINGS_FILE: &str = "dotlink.toml";

/// Configs directory used when the settings file does not name one.
pub const DEFAULT_CONFIGS_DIR: &str = "config";

/// Entry names that are never treated as apps or linked.
pub const BUILTIN_IGNORE: &[&str] = &[".", "..", ".git", ".svn"];

/// Set of entry names skipped during discovery and planning.
///
/// Names are compared as raw OS strings, so entries that are not valid UTF-8
/// are never mistaken for an ignored name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet(BTreeSet<OsString>);

impl IgnoreSet {
    /// The built-in set extended with `extra` names.
    #[must_use]
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut names: BTreeSet<OsString> = BUILTIN_IGNORE.iter().map(OsString::from).collect();
        names.extend(extra.into_iter().map(Into::into));
        Self(names)
    }

    /// Returns `true` if `name` must be skipped.
    #[must_use]
    pub fn contains(&self, name: &OsStr) -> bool {
        self.0.contains(name)
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<OsString>())
    }
}

/// On-disk shape of `dotlink.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    configs: Option<PathBuf>,
    ignore: Vec<String>,
}

/// Resolved settings passed to the registry and the plan builder.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Repository root.
    pub root: PathBuf,
    /// Directory holding one subdirectory per app.
    pub configs_root: PathBuf,
    /// Names skipped everywhere.
    pub ignore: IgnoreSet,
}

impl Settings {
    /// Load settings for the repository at `root`.
    ///
    /// Reads `<root>/dotlink.toml` when present; otherwise the configs root is
    /// `<root>/config` and only the built-in ignore set applies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSettings`] if the settings file exists but
    /// cannot be parsed.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(SETTINGS_FILE);
        let file: SettingsFile =
            toml_loader::load_config(&path).map_err(|e| ConfigError::InvalidSettings {
                path: path.clone(),
                message: format!("{e:#}"),
            })?;

        let configs = file
            .configs
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIGS_DIR));
        Ok(Self {
            root: root.to_path_buf(),
            configs_root: root.join(configs),
            ignore: IgnoreSet::with_extra(file.ignore),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ignore_covers_vcs_metadata() {
        let ignore = IgnoreSet::default();
        for name in [".", "..", ".git", ".svn"] {
            assert!(ignore.contains(OsStr::new(name)), "{name} should be ignored");
        }
        assert!(!ignore.contains(OsStr::new("vimrc")));
    }

    #[test]
    fn load_without_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.configs_root, dir.path().join("config"));
        assert_eq!(settings.ignore, IgnoreSet::default());
    }

    #[test]
    fn load_reads_configs_dir_and_extra_ignores() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "configs = \"apps\"\nignore = [\".hg\", \".DS_Store\"]\n",
        )
        .unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.configs_root, dir.path().join("apps"));
        assert!(settings.ignore.contains(OsStr::new(".hg")));
        assert!(settings.ignore.contains(OsStr::new(".DS_Store")));
        assert!(settings.ignore.contains(OsStr::new(".git")), "built-ins are kept");
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "colour = \"blue\"\n").unwrap();
        let err = Settings::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSettings { .. }));
    }
}
