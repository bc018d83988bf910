//! Install command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, LinkOpts};
use crate::logging::Logger;
use crate::tasks::plan::Direction;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if arguments or configuration are invalid, or if any app
/// collided or failed to link.
pub fn run(global: &GlobalOpts, opts: &LinkOpts, log: &Arc<Logger>) -> Result<()> {
    super::run_links(global, opts, log, Direction::Install)
}
