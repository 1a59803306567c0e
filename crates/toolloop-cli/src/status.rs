//! `toolloop status`: show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use toolloop_core::config::{get_config_path, load_config};
use toolloop_providers::registry::{match_provider, PROVIDERS};

use crate::helpers::tilde_path;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🔁 toolloop Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        tilde_path(&config_path),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    let providers_map = config.providers.to_map();
    let route = match match_provider(&config.agent.model, &providers_map) {
        Some((_, spec)) => format!("via {}", spec.display_name).green().to_string(),
        None => "no configured provider".red().to_string(),
    };
    println!("  {:<18} {} {}", "Model:".bold(), config.agent.model, route);

    println!(
        "  {:<18} {} | {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", config.agent.temperature).dimmed(),
        format!("max_tokens: {}", config.agent.max_tokens).dimmed(),
        format!("max_iterations: {}", config.agent.max_tool_iterations).dimmed(),
    );
    println!(
        "  {:<18} {}",
        "Memory window:".bold(),
        format!("{} messages", config.agent.memory_window).dimmed()
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let configured = providers_map
            .get(spec.name)
            .is_some_and(|c| c.is_configured());
        let status = if configured {
            format!("{} (key set)", "✓".green())
        } else if spec.is_local {
            format!("{}", "· local, no key needed".dimmed())
        } else {
            format!("{}", format!("· not configured ({})", spec.env_key).dimmed())
        };
        println!("    {:<20} {}", spec.display_name, status);
    }

    println!();
    let search_status = if config.tools.search.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured (SERPER_API_KEY)".dimmed())
    };
    println!("  {:<18} {}", "Serper Search:".bold(), search_status);

    println!();

    Ok(())
}
