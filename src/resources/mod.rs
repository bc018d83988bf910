//! Idempotent resource primitives (check + apply pattern).
pub mod symlink;

use std::path::PathBuf;

/// Observed state of a link location.
///
/// # Examples
///
/// ```
/// use dotlink_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::WrongTarget { current: "/elsewhere".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert!(matches!(wrong, ResourceState::WrongTarget { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the link location.
    Missing,
    /// A symlink to the desired destination exists.
    Correct,
    /// A symlink exists but points somewhere else (or nowhere).
    WrongTarget {
        /// The link's current destination.
        current: PathBuf,
    },
    /// A real file or directory occupies the link location.
    NotASymlink,
}

/// Result of applying a resource change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceChange {
    /// The filesystem was mutated.
    Applied,
    /// Nothing needed to change.
    AlreadyCorrect,
}
