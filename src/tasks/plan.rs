//! Link planning: compute and classify every link for one app before any
//! mutation happens.
//!
//! A plan is the only safety mechanism of the engine.  It is built and fully
//! classified up front; [`LinkPlan::validate`] then rejects the whole app if a
//! single entry collides, so a target is never left half-migrated for one app.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::config::registry::AppConfig;
use crate::error::LinkError;
use crate::operations::FileSystemOps;
use crate::resources::ResourceState;
use crate::resources::symlink::SymlinkResource;

/// Which way a plan moves the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Create links.
    Install,
    /// Remove links.
    Uninstall,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// Why an existing entry blocks a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionReason {
    /// A symlink points somewhere other than the expected destination.
    WrongTarget,
    /// A real file or directory is in the way.
    NotASymlink,
}

/// Classification of one plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Safe to mutate: create on install, remove on uninstall.
    Ready,
    /// Install only: the correct link already exists.
    AlreadyCorrect,
    /// Blocks the whole plan.
    Collision(CollisionReason),
}

/// One link location and its desired destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlanEntry {
    /// Entry name inside the app directory, lossily converted for display.
    pub name: String,
    /// The link and its canonical destination.
    pub resource: SymlinkResource,
    /// Classification at planning time.
    pub status: LinkStatus,
    /// Whether the occupant of the link location is a directory.
    pub occupied_by_dir: bool,
}

impl LinkPlanEntry {
    /// Location of the link inside the target directory.
    #[must_use]
    pub fn link_path(&self) -> &Path {
        &self.resource.link
    }

    /// Canonical path the link must point at.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.resource.destination
    }
}

/// A colliding entry, with enough detail to print a remediation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// The blocked link location.
    pub link_path: PathBuf,
    /// What kind of collision it is.
    pub reason: CollisionReason,
    /// Whether the occupant is a directory (`rm -rf` instead of `rm -f`).
    pub is_dir: bool,
}

/// Ordered, fully classified set of links for one app.
#[derive(Debug, Clone)]
pub struct LinkPlan {
    /// App the plan belongs to.
    pub app: String,
    /// Install or uninstall.
    pub direction: Direction,
    /// Entries in name order; link paths are unique.
    pub entries: Vec<LinkPlanEntry>,
    /// Uninstall only: link locations with nothing to remove.
    pub absent: Vec<PathBuf>,
}

impl LinkPlan {
    /// Every colliding entry, in plan order.
    #[must_use]
    pub fn collisions(&self) -> Vec<Collision> {
        self.entries
            .iter()
            .filter_map(|e| match e.status {
                LinkStatus::Collision(reason) => Some(Collision {
                    link_path: e.link_path().to_path_buf(),
                    reason,
                    is_dir: e.occupied_by_dir,
                }),
                LinkStatus::Ready | LinkStatus::AlreadyCorrect => None,
            })
            .collect()
    }

    /// Reject the plan if any entry collides.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Collisions`] listing every collision.
    pub fn validate(&self) -> Result<(), LinkError> {
        let collisions = self.collisions();
        if collisions.is_empty() {
            return Ok(());
        }
        Err(LinkError::Collisions {
            app: self.app.clone(),
            direction: self.direction,
            collisions,
        })
    }

    /// Number of entries with the given status.
    #[must_use]
    pub fn count(&self, status: LinkStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

/// Plan the links that installing `app` into `target` requires.
///
/// # Errors
///
/// Returns [`LinkError::Filesystem`] if the app directory cannot be listed or
/// an entry cannot be canonicalized.
pub fn build_install_plan(
    fs: &dyn FileSystemOps,
    settings: &Settings,
    app: &AppConfig,
    target: &Path,
) -> Result<LinkPlan, LinkError> {
    let mut entries = Vec::new();
    for (name, resource) in desired_links(fs, settings, app, target)? {
        let state = resource.current_state(fs);
        let status = match state {
            ResourceState::Correct => LinkStatus::AlreadyCorrect,
            ResourceState::Missing => LinkStatus::Ready,
            ResourceState::WrongTarget { .. } => {
                LinkStatus::Collision(CollisionReason::WrongTarget)
            }
            ResourceState::NotASymlink => LinkStatus::Collision(CollisionReason::NotASymlink),
        };
        entries.push(entry(fs, name, resource, status));
    }

    Ok(LinkPlan {
        app: app.name.clone(),
        direction: Direction::Install,
        entries,
        absent: Vec::new(),
    })
}

/// Plan the links that uninstalling `app` from `target` removes.
///
/// Locations with nothing in them are not part of the removal set; they are
/// listed in [`LinkPlan::absent`] instead.
///
/// # Errors
///
/// Returns [`LinkError::Filesystem`] if the app directory cannot be listed or
/// an entry cannot be canonicalized.
pub fn build_uninstall_plan(
    fs: &dyn FileSystemOps,
    settings: &Settings,
    app: &AppConfig,
    target: &Path,
) -> Result<LinkPlan, LinkError> {
    let mut entries = Vec::new();
    let mut absent = Vec::new();
    for (name, resource) in desired_links(fs, settings, app, target)? {
        let status = match resource.current_state(fs) {
            ResourceState::Missing => {
                absent.push(resource.link);
                continue;
            }
            ResourceState::Correct => LinkStatus::Ready,
            ResourceState::WrongTarget { .. } => {
                LinkStatus::Collision(CollisionReason::WrongTarget)
            }
            ResourceState::NotASymlink => LinkStatus::Collision(CollisionReason::NotASymlink),
        };
        entries.push(entry(fs, name, resource, status));
    }

    Ok(LinkPlan {
        app: app.name.clone(),
        direction: Direction::Uninstall,
        entries,
        absent,
    })
}

fn entry(
    fs: &dyn FileSystemOps,
    name: String,
    resource: SymlinkResource,
    status: LinkStatus,
) -> LinkPlanEntry {
    let occupied_by_dir = matches!(status, LinkStatus::Collision(_)) && fs.is_dir(&resource.link);
    LinkPlanEntry {
        name,
        resource,
        status,
        occupied_by_dir,
    }
}

/// Map every non-ignored entry of the app directory to its link.
///
/// Paths are built from the raw entry names, so names that are not valid
/// UTF-8 are linked like any other.
fn desired_links(
    fs: &dyn FileSystemOps,
    settings: &Settings,
    app: &AppConfig,
    target: &Path,
) -> Result<Vec<(String, SymlinkResource)>, LinkError> {
    let names = fs
        .list_entries(&app.source_dir)
        .map_err(|source| LinkError::Filesystem {
            path: app.source_dir.clone(),
            source,
        })?;

    names
        .into_iter()
        .filter(|name| !settings.ignore.contains(name))
        .map(|name| {
            let destination = link_destination(fs, &app.source_dir.join(&name))?;
            let link = target.join(&name);
            Ok((
                name.to_string_lossy().into_owned(),
                SymlinkResource::new(destination, link),
            ))
        })
        .collect()
}

/// Canonical form of `source`.
///
/// A dangling symlink inside the app directory has no canonical form; it is
/// linked by its own absolute path, which the app directory already is.
fn link_destination(fs: &dyn FileSystemOps, source: &Path) -> Result<PathBuf, LinkError> {
    match fs.canonicalize(source) {
        Ok(path) => Ok(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound && fs.is_symlink(source) => {
            Ok(source.to_path_buf())
        }
        Err(e) => Err(LinkError::Filesystem {
            path: source.to_path_buf(),
            source: e,
        }),
    }
}
