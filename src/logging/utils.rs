//! Log file location, clock formatting, and escape-code removal.
use std::ffi::OsString;
use std::path::PathBuf;

/// `YYYY-MM-DD HH:MM:SS`, used in the log file header.
pub(super) const HEADER_CLOCK: &str = "%Y-%m-%d %H:%M:%S";
/// `HH:MM:SS`, used on every log file line.
pub(super) const LINE_CLOCK: &str = "%H:%M:%S";

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(pattern: &str) -> String {
    chrono::Utc::now().format(pattern).to_string()
}

/// Directory that holds the per-command log files.
///
/// `$XDG_CACHE_HOME/dotlink`, else `$HOME/.cache/dotlink` (`USERPROFILE` on
/// Windows), else `./.cache/dotlink`.  Empty variables count as unset.
pub(super) fn log_dir(var: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    let set = |name: &str| var(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    let cache = set("XDG_CACHE_HOME").unwrap_or_else(|| {
        set("HOME")
            .or_else(|| set("USERPROFILE"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cache")
    });
    cache.join("dotlink")
}

/// Log file for one invocation of `command`, from the process environment.
pub(super) fn log_file_path(command: &str) -> PathBuf {
    log_dir(|name| std::env::var_os(name)).join(format!("{command}.log"))
}

/// Remove CSI escape sequences (`ESC [ ... final`), keeping everything else.
///
/// The summary and console lines carry colour codes; the log file does not.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some((before, sequence)) = rest.split_once("\x1b[") {
        out.push_str(before);
        // Final byte of a CSI sequence lies in '@'..='~'.
        rest = sequence
            .find(|c: char| ('@'..='~').contains(&c))
            .and_then(|end| sequence.get(end + 1..))
            .unwrap_or("");
    }
    out.push_str(rest);
    out
}
