//! Utility helpers: path resolution, date formatting, string manipulation.

use std::path::PathBuf;

/// Get the toolloop data directory (e.g. `~/.toolloop/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".toolloop")
}

/// Get the REPL history directory (e.g. `~/.toolloop/history/`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history")
}

/// Get today's date as YYYY-MM-DD.
pub fn today_date() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
