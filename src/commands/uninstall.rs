//! Uninstall command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, LinkOpts};
use crate::logging::Logger;
use crate::tasks::plan::Direction;

/// Run the uninstall command.
///
/// Only links that point at the app's own files are removed; anything else
/// in the way is reported and left alone.
///
/// # Errors
///
/// Returns an error if arguments or configuration are invalid, or if any app
/// collided or failed to unlink.
pub fn run(global: &GlobalOpts, opts: &LinkOpts, log: &Arc<Logger>) -> Result<()> {
    super::run_links(global, opts, log, Direction::Uninstall)
}
