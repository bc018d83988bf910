//! Copy-pasteable remediation hints for rejected plans.
use std::path::Path;

use super::plan::{Collision, CollisionReason, Direction};
use crate::logging::Log;

/// A block of remediation output: one summary line, one hint, and one shell
/// command per colliding path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationGroup {
    /// What is wrong, with a count.
    pub summary: String,
    /// What the user should do with the commands.
    pub hint: &'static str,
    /// One removal command per path.
    pub commands: Vec<String>,
}

/// Shell command that removes the occupant of a colliding path.
#[must_use]
pub fn removal_command(collision: &Collision) -> String {
    let flags = if collision.is_dir { "-rf" } else { "-f" };
    format!("rm {flags} \"{}\"", shell_quote(&collision.link_path))
}

/// Group collisions the way each direction reports them.
///
/// Install reports every collision together.  Uninstall reports links that
/// point at the wrong target separately from entries that are not links.
#[must_use]
pub fn remediation_groups(direction: Direction, collisions: &[Collision]) -> Vec<RemediationGroup> {
    let commands = |reason: Option<CollisionReason>| -> Vec<String> {
        collisions
            .iter()
            .filter(|c| reason.is_none_or(|r| c.reason == r))
            .map(removal_command)
            .collect()
    };

    let groups = match direction {
        Direction::Install => {
            let all = commands(None);
            vec![RemediationGroup {
                summary: format!(
                    "{} file(s) already exist or are symlinks to somewhere else.",
                    all.len()
                ),
                hint: "To rectify, copy-paste:",
                commands: all,
            }]
        }
        Direction::Uninstall => {
            let wrong = commands(Some(CollisionReason::WrongTarget));
            let not_links = commands(Some(CollisionReason::NotASymlink));
            vec![
                RemediationGroup {
                    summary: format!("{} link(s) point at the wrong targets.", wrong.len()),
                    hint: "To rectify, inspect and then delete/move them:",
                    commands: wrong,
                },
                RemediationGroup {
                    summary: format!("{} file(s) are not symlinks.", not_links.len()),
                    hint: "To rectify, inspect and then delete/move them:",
                    commands: not_links,
                },
            ]
        }
    };

    groups
        .into_iter()
        .filter(|g| !g.commands.is_empty())
        .collect()
}

/// Write remediation for a rejected plan to standard error.
pub fn report(log: &dyn Log, app: &str, direction: Direction, collisions: &[Collision]) {
    for group in remediation_groups(direction, collisions) {
        log.error(&format!("{app}: {}", group.summary));
        log.remedy(group.hint);
        for command in &group.commands {
            log.remedy(command);
        }
    }
}

/// Escape characters that keep their meaning inside double quotes.
fn shell_quote(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
