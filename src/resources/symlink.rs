//! Symlink resource.
use std::path::{Path, PathBuf};

use super::{ResourceChange, ResourceState};
use crate::error::LinkError;
use crate::operations::FileSystemOps;

/// A symlink resource that can be checked, created and removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkResource {
    /// What the symlink points to (canonical source path).
    pub destination: PathBuf,
    /// Where the symlink lives (inside the target directory).
    pub link: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(destination: PathBuf, link: PathBuf) -> Self {
        Self { destination, link }
    }

    /// Human-readable description of this resource.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} -> {}", self.link.display(), self.destination.display())
    }

    /// Inspect what currently occupies the link location.
    #[must_use]
    pub fn current_state(&self, fs: &dyn FileSystemOps) -> ResourceState {
        if fs.is_symlink(&self.link) {
            return match fs.read_link(&self.link) {
                Ok(current) if self.points_here(&current) => ResourceState::Correct,
                Ok(current) => ResourceState::WrongTarget { current },
                Err(_) => ResourceState::WrongTarget {
                    current: PathBuf::new(),
                },
            };
        }
        if fs.exists(&self.link) {
            ResourceState::NotASymlink
        } else {
            ResourceState::Missing
        }
    }

    /// Create the symlink unless it already points at the destination.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Filesystem`] if the link cannot be created.
    pub fn apply(&self, fs: &dyn FileSystemOps) -> Result<ResourceChange, LinkError> {
        if self.current_state(fs) == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        fs.create_symlink(&self.destination, &self.link)
            .map_err(|source| LinkError::Filesystem {
                path: self.link.clone(),
                source,
            })?;
        Ok(ResourceChange::Applied)
    }

    /// Remove the symlink.  The destination is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Filesystem`] if the link cannot be removed.
    pub fn remove(&self, fs: &dyn FileSystemOps) -> Result<ResourceChange, LinkError> {
        fs.remove_file(&self.link)
            .map_err(|source| LinkError::Filesystem {
                path: self.link.clone(),
                source,
            })?;
        Ok(ResourceChange::Applied)
    }

    /// Whether a link destination read from disk refers to our destination.
    ///
    /// Relative destinations are resolved against the link's directory.
    fn points_here(&self, current: &Path) -> bool {
        let resolved = if current.is_relative() {
            self.link
                .parent()
                .map_or_else(|| current.to_path_buf(), |dir| dir.join(current))
        } else {
            current.to_path_buf()
        };
        paths_equal(&resolved, &self.destination)
    }
}

/// Compare two paths, normalising the `\\?\` prefix that Windows `read_link`
/// prepends to extended-length paths.
fn paths_equal(a: &Path, b: &Path) -> bool {
    strip_win_prefix(a) == strip_win_prefix(b)
}

fn strip_win_prefix(p: &Path) -> PathBuf {
    let s = p.to_string_lossy();
    s.strip_prefix(r"\\?\")
        .map_or_else(|| p.to_path_buf(), PathBuf::from)
}
