use std::path::Path;
use std::time::Duration;

/// Playlist name for a file: the file name with its last extension stripped.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// Format a duration as `m:ss`; unknown durations render as `0:00`.
pub fn format_clock(d: Option<Duration>) -> String {
    let secs = d.map(|d| d.as_secs()).unwrap_or(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `1 track`, `2 tracks`, ...
pub fn track_count_label(n: usize) -> String {
    if n == 1 {
        "1 track".to_string()
    } else {
        format!("{n} tracks")
    }
}
