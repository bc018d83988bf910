//! Apply a validated link plan in either direction.
use crate::error::LinkError;
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::resources::ResourceChange;

use super::plan::{Direction, LinkPlan, LinkStatus};

/// Counts collected while applying one plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Links created or removed (or that would be, in dry-run mode).
    pub changed: usize,
    /// Install only: links that were already correct.
    pub already_ok: usize,
    /// Uninstall only: locations with nothing to remove.
    pub absent: usize,
    /// Whether the plan was only reported.
    pub dry_run: bool,
}

impl ApplyReport {
    /// One-line summary for the console.
    #[must_use]
    pub fn summary(&self, direction: Direction) -> String {
        let verb = match (direction, self.dry_run) {
            (Direction::Install, false) => "linked",
            (Direction::Install, true) => "would link",
            (Direction::Uninstall, false) => "removed",
            (Direction::Uninstall, true) => "would remove",
        };
        match direction {
            Direction::Install => format!("{} {verb}, {} already ok", self.changed, self.already_ok),
            Direction::Uninstall => format!("{} {verb}, {} not present", self.changed, self.absent),
        }
    }
}

/// Validate `plan`, then create or remove every ready link according to
/// the plan's direction.
///
/// Nothing is mutated unless the whole plan is collision-free.  In dry-run
/// mode each action is logged instead of performed.
///
/// # Errors
///
/// Returns [`LinkError::Collisions`] if validation fails, or
/// [`LinkError::Filesystem`] on the first mutation that fails; links already
/// handled before the failure stay in place.
pub fn apply(
    fs: &dyn FileSystemOps,
    plan: &LinkPlan,
    log: &dyn Log,
    dry_run: bool,
) -> Result<ApplyReport, LinkError> {
    plan.validate()?;
    let direction = plan.direction;

    let mut report = ApplyReport {
        absent: plan.absent.len(),
        dry_run,
        ..ApplyReport::default()
    };

    for path in &plan.absent {
        log.debug(&format!("not present, skipping: {}", path.display()));
    }

    for entry in &plan.entries {
        match entry.status {
            LinkStatus::AlreadyCorrect => {
                log.debug(&format!("ok: {} (already linked)", entry.link_path().display()));
                report.already_ok += 1;
                continue;
            }
            LinkStatus::Ready => {}
            // Unreachable after validate; counted as nothing.
            LinkStatus::Collision(_) => continue,
        }

        let resource = &entry.resource;
        if dry_run {
            match direction {
                Direction::Install => log.dry_run(&format!("would link {}", resource.description())),
                Direction::Uninstall => {
                    log.dry_run(&format!("would remove {}", entry.link_path().display()));
                }
            }
            report.changed += 1;
            continue;
        }

        let change = match direction {
            Direction::Install => resource.apply(fs)?,
            Direction::Uninstall => resource.remove(fs)?,
        };
        match change {
            ResourceChange::Applied => {
                match direction {
                    Direction::Install => log.debug(&format!("linked {}", resource.description())),
                    Direction::Uninstall => {
                        log.debug(&format!("removed {}", entry.link_path().display()));
                    }
                }
                report.changed += 1;
            }
            ResourceChange::AlreadyCorrect => report.already_ok += 1,
        }
    }

    Ok(report)
}

/// Validate an install `plan`, then create a link for every ready entry.
///
/// # Errors
///
/// Returns [`LinkError::DirectionMismatch`] for an uninstall plan; otherwise
/// see [`apply`].
pub fn install(
    fs: &dyn FileSystemOps,
    plan: &LinkPlan,
    log: &dyn Log,
    dry_run: bool,
) -> Result<ApplyReport, LinkError> {
    expect_direction(plan, Direction::Install)?;
    apply(fs, plan, log, dry_run)
}

/// Validate an uninstall `plan`, then remove every ready link.
///
/// # Errors
///
/// Returns [`LinkError::DirectionMismatch`] for an install plan; otherwise
/// see [`apply`].
pub fn uninstall(
    fs: &dyn FileSystemOps,
    plan: &LinkPlan,
    log: &dyn Log,
    dry_run: bool,
) -> Result<ApplyReport, LinkError> {
    expect_direction(plan, Direction::Uninstall)?;
    apply(fs, plan, log, dry_run)
}

fn expect_direction(plan: &LinkPlan, expected: Direction) -> Result<(), LinkError> {
    if plan.direction == expected {
        return Ok(());
    }
    Err(LinkError::DirectionMismatch {
        app: plan.app.clone(),
        expected,
        found: plan.direction,
    })
}
