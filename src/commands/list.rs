//! List command implementation.
use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context as _, Result};
use bytesize::ByteSize;

use crate::cli::{GlobalOpts, ListOpts};
use crate::config::Settings;
use crate::config::registry::AppConfig;
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};

/// One entry of an app directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListing {
    /// Entry name, lossily converted for display.
    pub name: String,
    /// Whether the entry is a directory (following symlinks).
    pub is_dir: bool,
    /// Size in bytes as reported by the filesystem.
    pub size: u64,
}

/// Entry counts for one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSummary {
    /// App name.
    pub name: String,
    /// Non-directory entries.
    pub files: usize,
    /// Directory entries.
    pub dirs: usize,
}

/// Entries of `app` that would be linked, in name order.
///
/// # Errors
///
/// Returns an error if the app directory cannot be listed or an entry cannot
/// be inspected.
pub fn files(
    fs: &dyn FileSystemOps,
    settings: &Settings,
    app: &AppConfig,
) -> Result<Vec<FileListing>> {
    let names = fs
        .list_entries(&app.source_dir)
        .with_context(|| format!("list {}", app.source_dir.display()))?;

    names
        .into_iter()
        .filter(|name| !settings.ignore.contains(name))
        .map(|name| {
            let path = app.source_dir.join(&name);
            let size = match fs.size(&path) {
                // Dangling links are still linked; they just have no size.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound && fs.is_symlink(&path) => 0,
                other => other.with_context(|| format!("stat {}", path.display()))?,
            };
            Ok(FileListing {
                is_dir: fs.is_dir(&path),
                name: name.to_string_lossy().into_owned(),
                size,
            })
        })
        .collect()
}

/// Count the files and directories of `app`.
///
/// # Errors
///
/// Returns an error if the app directory cannot be listed.
pub fn summarize(
    fs: &dyn FileSystemOps,
    settings: &Settings,
    app: &AppConfig,
) -> Result<AppSummary> {
    let listing = files(fs, settings, app)?;
    let dirs = listing.iter().filter(|f| f.is_dir).count();
    Ok(AppSummary {
        name: app.name.clone(),
        files: listing.len() - dirs,
        dirs,
    })
}

/// Render the overview of every app.
#[must_use]
pub fn render_overview(summaries: &[AppSummary]) -> String {
    let mut out = String::from("Available configs:\n");
    for s in summaries {
        let _ = writeln!(out, "    {}: {} file(s), {} dir(s)", s.name, s.files, s.dirs);
    }
    out
}

/// Render the numbered file listing of one app with a size footer.
#[must_use]
pub fn render_files(app: &str, listing: &[FileListing]) -> String {
    let mut out = format!("Files for {app}:\n");
    for (i, file) in listing.iter().enumerate() {
        let slash = if file.is_dir { "/" } else { "" };
        let _ = writeln!(out, " {}. {}{slash}", i + 1, file.name);
    }
    let total: u64 = listing.iter().map(|f| f.size).sum();
    let _ = writeln!(
        out,
        "{} file(s), {} ({total} bytes)",
        listing.len(),
        ByteSize::b(total)
    );
    out
}

/// Run the list command, writing the listing to `out`.
///
/// # Errors
///
/// Returns an error if configuration is invalid, an app is unknown, or an
/// app directory cannot be read.
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &dyn Log, out: &mut dyn Write) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let fs = SystemFileSystemOps;

    if opts.apps.is_empty() {
        let summaries = setup
            .registry
            .iter()
            .map(|app| summarize(&fs, &setup.settings, app))
            .collect::<Result<Vec<_>>>()?;
        out.write_all(render_overview(&summaries).as_bytes())?;
        return Ok(());
    }

    for app in setup.registry.resolve(&opts.apps)? {
        let listing = files(&fs, &setup.settings, app)?;
        out.write_all(render_files(&app.name, &listing).as_bytes())?;
    }
    Ok(())
}
