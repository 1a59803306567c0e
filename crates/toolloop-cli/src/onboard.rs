//! `toolloop onboard`: write the default configuration.
//!
//! - Creates `~/.toolloop/config.json` with defaults (never overwrites)
//! - Creates the REPL history directory

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use toolloop_core::config::{get_config_path, save_config, Config};
use toolloop_core::utils::get_history_path;

use crate::helpers::tilde_path;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔁 toolloop: Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), tilde_path(&config_path));
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            tilde_path(&config_path)
        );
    }

    let history_dir = get_history_path();
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;
    println!("  {} history dir at {}", "✓".green(), tilde_path(&history_dir));

    println!();
    println!("  Next steps:");
    println!("    1. Add an API key to the config (or export OPENAI_API_KEY)");
    println!("    2. Add a Serper key for web search (or export SERPER_API_KEY)");
    println!("    3. Run `toolloop chat` or `toolloop react -i`");
    println!();

    Ok(())
}

/// Write `Config::default()` to `path` unless a file is already there.
///
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert!(write_default_config(&path).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"maxToolIterations\": 10"));

        std::fs::write(&path, "{}").unwrap();
        assert!(!write_default_config(&path).unwrap());
        // Should NOT overwrite
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
