//! Shared CLI helpers: response printing, status lines, banner.

use std::path::Path;

use colored::Colorize;

use toolloop_agent::TurnObserver;

/// Show a path with the home directory abbreviated to `~`.
pub fn tilde_path(path: &Path) -> String {
    if let Some(home) = dirs_next::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

/// Print an agent response to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "🔁 toolloop".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(mode: &str, model: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "{}  v{}  {}",
        "🔁 toolloop".cyan().bold(),
        version.dimmed(),
        format!("[{mode} · {model}]").dimmed()
    );
    println!(
        "{}",
        "Type a message, \"/clear\" to start over, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a one-line notice.
pub fn print_notice(text: &str) {
    println!("{}", text.dimmed());
}

/// Print a "thinking" spinner placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Prints the single-shot agent's progress messages as they arrive.
pub struct StatusPrinter;

impl TurnObserver for StatusPrinter {
    fn on_status(&self, status: &str) {
        clear_thinking();
        eprintln!("{}", status.yellow());
        print_thinking();
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn tilde_path_under_home() {
        if let Some(home) = dirs_next::home_dir() {
            let shown = tilde_path(&home.join(".toolloop").join("config.json"));
            assert_eq!(shown, "~/.toolloop/config.json");
        }
    }

    #[test]
    fn tilde_path_elsewhere() {
        let path = PathBuf::from("/definitely/not/home/config.json");
        assert_eq!(tilde_path(&path), "/definitely/not/home/config.json");
    }
}
