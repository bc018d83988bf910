//! Collision-safe symlink deployment.
//!
//! Each subdirectory of a repository's configs root is an *app*.  Installing
//! an app links every top-level entry of its directory into a target
//! directory; uninstalling removes exactly those links.  Every run is planned
//! and classified up front, and an app with a single collision is left
//! untouched while the tool prints the shell commands that would clear it.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: settings and app discovery
//! - **[`resources`]**: idempotent `check + apply` symlink primitive
//! - **[`tasks`]**: per-app plan, validate, and apply
//! - **[`commands`]**: top-level subcommand orchestration (`list`, `install`, `uninstall`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod operations;
pub mod resources;
pub mod tasks;
