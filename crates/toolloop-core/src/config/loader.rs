//! Config loader: reads `~/.toolloop/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.toolloop/config.json`
//! 3. Environment variables `TOOLLOOP_<SECTION>__<FIELD>` (override JSON)
//! 4. Provider-native keys (`OPENAI_API_KEY`, `SERPER_API_KEY`, …), only
//!    where no key is set yet

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Provider name → native API key env var.
const NATIVE_KEY_VARS: &[(&str, &str)] = &[
    ("openai", "OPENAI_API_KEY"),
    ("openrouter", "OPENROUTER_API_KEY"),
    ("deepseek", "DEEPSEEK_API_KEY"),
    ("groq", "GROQ_API_KEY"),
];

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path))
}

fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `TOOLLOOP_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `TOOLLOOP_AGENT__MODEL` → `agent.model`
/// - `TOOLLOOP_AGENT__MAX_TOKENS` → `agent.max_tokens`
/// - `TOOLLOOP_AGENT__TEMPERATURE` → `agent.temperature`
/// - `TOOLLOOP_AGENT__MAX_TOOL_ITERATIONS` → `agent.max_tool_iterations`
/// - `TOOLLOOP_AGENT__MEMORY_WINDOW` → `agent.memory_window`
/// - `TOOLLOOP_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `TOOLLOOP_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
/// - `TOOLLOOP_TOOLS__SEARCH__API_KEY` → `tools.search.api_key`
/// - `TOOLLOOP_TOOLS__SEARCH__API_BASE` → `tools.search.api_base`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("TOOLLOOP_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(n) = env_parse::<u32>("TOOLLOOP_AGENT__MAX_TOKENS") {
        config.agent.max_tokens = n;
    }
    if let Some(t) = env_parse::<f64>("TOOLLOOP_AGENT__TEMPERATURE") {
        config.agent.temperature = t;
    }
    if let Some(n) = env_parse::<u32>("TOOLLOOP_AGENT__MAX_TOOL_ITERATIONS") {
        config.agent.max_tool_iterations = n;
    }
    if let Some(n) = env_parse::<usize>("TOOLLOOP_AGENT__MEMORY_WINDOW") {
        config.agent.memory_window = n;
    }

    for name in ["openai", "openrouter", "deepseek", "groq", "ollama"] {
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            apply_provider_env(provider, &name.to_uppercase());
        }
    }

    if let Ok(val) = std::env::var("TOOLLOOP_TOOLS__SEARCH__API_KEY") {
        config.tools.search.api_key = val;
    }
    if let Ok(val) = std::env::var("TOOLLOOP_TOOLS__SEARCH__API_BASE") {
        config.tools.search.api_base = val;
    }

    apply_native_keys(config)
}

/// Fill still-empty keys from the provider's own env var names.
fn apply_native_keys(mut config: Config) -> Config {
    for (name, var) in NATIVE_KEY_VARS {
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            if !provider.is_configured() {
                if let Ok(val) = std::env::var(var) {
                    debug!(provider = name, var = var, "using native API key env var");
                    provider.api_key = val;
                }
            }
        }
    }
    if !config.tools.search.is_configured() {
        if let Ok(val) = std::env::var("SERPER_API_KEY") {
            config.tools.search.api_key = val;
        }
    }
    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("TOOLLOOP_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("TOOLLOOP_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
