//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that planning and apply logic can
//! be unit-tested without touching the real filesystem.  Production code uses
//! [`SystemFileSystemOps`]; unit tests use `MemoryFileSystemOps` (stateful) or
//! the `mockall`-generated `MockFileSystemOps` (call expectations).

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem primitives used by the registry, the plan
/// builder and the installer.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystemOps: Send + Sync {
    /// Returns `true` if `path` exists, following symlinks.
    ///
    /// A dangling symlink does not exist.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` itself is a symbolic link (dangling or not).
    fn is_symlink(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Read the destination of the symbolic link at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be read.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create a symbolic link at `link` pointing to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error on permission or I/O failure, or if `link` exists.
    fn create_symlink(&self, destination: &Path, link: &Path) -> io::Result<()>;

    /// Remove the link at `link`.  The link destination is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error on permission or I/O failure.
    fn remove_file(&self, link: &Path) -> io::Result<()>;

    /// Size of `path` in bytes, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    fn size(&self, path: &Path) -> io::Result<u64>;

    /// Names of the immediate children of `path`, sorted bytewise.
    ///
    /// Names are returned as the OS gives them, valid UTF-8 or not.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn list_entries(&self, path: &Path) -> io::Result<Vec<OsString>>;

    /// Resolve `path` to its absolute, symlink-free form.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn create_symlink(&self, destination: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(destination, link)
        }

        #[cfg(windows)]
        {
            if destination.is_dir() {
                std::os::windows::fs::symlink_dir(destination, link)
            } else {
                std::os::windows::fs::symlink_file(destination, link)
            }
        }
    }

    fn remove_file(&self, link: &Path) -> io::Result<()> {
        // Windows directory symlinks must go through remove_dir.
        #[cfg(windows)]
        {
            use std::os::windows::fs::MetadataExt as _;
            let meta = std::fs::symlink_metadata(link)?;
            if meta.file_attributes() & 0x10 != 0 {
                return std::fs::remove_dir(link);
            }
        }
        std::fs::remove_file(link)
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        std::fs::metadata(path).map(|m| m.len())
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let mut names = std::fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        dunce::canonicalize(path)
    }
}

/// A node in the in-memory filesystem.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNode {
    /// Regular file with a size in bytes.
    File(u64),
    /// Directory.
    Dir,
    /// Symbolic link to the given destination.
    Symlink(PathBuf),
}

/// Stateful in-memory [`FileSystemOps`] for unit tests.
///
/// Paths are taken literally (no `..` handling); symlinks are followed up to
/// a fixed depth.  Every successful mutation is counted so tests can assert
/// that a rejected plan touched nothing.
///
/// # Example
///
/// ```ignore
/// let fs = MemoryFileSystemOps::new()
///     .with_dir("/repo/config/vim")
///     .with_file("/repo/config/vim/vimrc", 12)
///     .with_dir("/home/u");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryFileSystemOps {
    nodes: std::sync::Mutex<std::collections::BTreeMap<PathBuf, MemoryNode>>,
    mutations: std::sync::atomic::AtomicUsize,
    fail_mutations_at: Option<PathBuf>,
}

#[cfg(test)]
impl MemoryFileSystemOps {
    const MAX_LINK_DEPTH: usize = 40;

    /// Create an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory (parents are not created implicitly).
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.insert(path.into(), MemoryNode::Dir);
        self
    }

    /// Add a regular file of `size` bytes.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, size: u64) -> Self {
        self.insert(path.into(), MemoryNode::File(size));
        self
    }

    /// Add a symlink at `path` pointing to `destination`.
    #[must_use]
    pub fn with_symlink(self, path: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        self.insert(path.into(), MemoryNode::Symlink(destination.into()));
        self
    }

    /// Make every mutation of `path` fail with `PermissionDenied`.
    #[must_use]
    pub fn failing_at(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_mutations_at = Some(path.into());
        self
    }

    /// Number of successful create/remove calls so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// The node stored at `path` itself (links are not followed).
    #[must_use]
    pub fn node(&self, path: &Path) -> Option<MemoryNode> {
        self.lock().get(path).cloned()
    }

    fn insert(&self, path: PathBuf, node: MemoryNode) {
        self.lock().insert(path, node);
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, std::collections::BTreeMap<PathBuf, MemoryNode>> {
        self.nodes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Follow symlinks from `path`, returning the final path and its node.
    fn resolve(&self, path: &Path) -> Option<(PathBuf, MemoryNode)> {
        let nodes = self.lock();
        let mut current = path.to_path_buf();
        for _ in 0..Self::MAX_LINK_DEPTH {
            match nodes.get(&current)? {
                MemoryNode::Symlink(dest) => {
                    current = if dest.is_absolute() {
                        dest.clone()
                    } else {
                        current
                            .parent()
                            .map_or_else(|| dest.clone(), |p| p.join(dest))
                    };
                }
                node => return Some((current, node.clone())),
            }
        }
        None
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        if self.fail_mutations_at.as_deref() == Some(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        Ok(())
    }
}

#[cfg(test)]
impl FileSystemOps for MemoryFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(MemoryNode::Symlink(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some((_, MemoryNode::Dir)))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        match self.node(path) {
            Some(MemoryNode::Symlink(dest)) => Ok(dest),
            Some(_) => Err(io::Error::from(io::ErrorKind::InvalidInput)),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn create_symlink(&self, destination: &Path, link: &Path) -> io::Result<()> {
        self.check_writable(link)?;
        let mut nodes = self.lock();
        if nodes.contains_key(link) {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        nodes.insert(
            link.to_path_buf(),
            MemoryNode::Symlink(destination.to_path_buf()),
        );
        drop(nodes);
        self.mutations
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn remove_file(&self, link: &Path) -> io::Result<()> {
        self.check_writable(link)?;
        match self.lock().remove(link) {
            Some(_) => {
                self.mutations
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            }
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        match self.resolve(path) {
            Some((_, MemoryNode::File(size))) => Ok(size),
            Some(_) => Ok(4096),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn list_entries(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let Some((dir, MemoryNode::Dir)) = self.resolve(path) else {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        };
        // BTreeMap iteration keeps the names sorted.
        Ok(self
            .lock()
            .keys()
            .filter(|p| p.parent() == Some(dir.as_path()))
            .filter_map(|p| p.file_name())
            .map(std::ffi::OsStr::to_os_string)
            .collect())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.resolve(path)
            .map(|(p, _)| p)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}
