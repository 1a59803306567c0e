//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentSettings`, `ProvidersConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default Serper search endpoint.
pub const DEFAULT_SEARCH_API_BASE: &str = "https://google.serper.dev/search";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.toolloop/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentSettings,
    pub providers: ProvidersConfig,
    pub tools: ToolsConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Settings shared by both conversation loops.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Default LLM model identifier.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum model ↔ tool iterations before the iterative loop gives up.
    pub max_tool_iterations: u32,
    /// Number of most-recent messages the single-shot loop replays.
    pub memory_window: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            max_tool_iterations: 10,
            memory_window: 6,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider (API key, base URL, headers).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// All provider configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub openrouter: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub groq: ProviderConfig,
    pub ollama: ProviderConfig,
}

impl ProvidersConfig {
    /// Named entries, in registry order.
    fn entries(&self) -> [(&'static str, &ProviderConfig); 5] {
        [
            ("openai", &self.openai),
            ("openrouter", &self.openrouter),
            ("deepseek", &self.deepseek),
            ("groq", &self.groq),
            ("ollama", &self.ollama),
        ]
    }

    /// Get a provider config by name (e.g. `"openai"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        self.entries()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c)
    }

    /// Mutable access by name, used by the env-override pass.
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "openai" => Some(&mut self.openai),
            "openrouter" => Some(&mut self.openrouter),
            "deepseek" => Some(&mut self.deepseek),
            "groq" => Some(&mut self.groq),
            "ollama" => Some(&mut self.ollama),
            _ => None,
        }
    }

    /// Convert to a HashMap<String, ProviderConfig> for use with the provider registry.
    pub fn to_map(&self) -> HashMap<String, ProviderConfig> {
        self.entries()
            .into_iter()
            .map(|(name, config)| (name.to_string(), config.clone()))
            .collect()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Tool configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    pub search: SearchConfig,
}

/// Web search configuration (Serper API).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Serper API key.
    pub api_key: String,
    /// Search endpoint.
    pub api_base: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_SEARCH_API_BASE.to_string(),
        }
    }
}

impl SearchConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.agent.max_tool_iterations, 10);
        assert_eq!(config.agent.memory_window, 6);
        assert_eq!(config.tools.search.api_base, DEFAULT_SEARCH_API_BASE);
        assert!(!config.providers.openai.is_configured());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "agent": { "model": "gemma3", "memoryWindow": 4 } }"#,
        )
        .unwrap();
        assert_eq!(config.agent.model, "gemma3");
        assert_eq!(config.agent.memory_window, 4);
        assert_eq!(config.agent.temperature, 0.7);
    }

    #[test]
    fn test_get_by_name() {
        let mut config = ProvidersConfig::default();
        config.groq.api_key = "gsk-1".into();
        assert!(config.get_by_name("groq").unwrap().is_configured());
        assert!(config.get_by_name("anthropic").is_none());
        config.get_by_name_mut("ollama").unwrap().api_base = Some("http://box:11434/v1".into());
        assert_eq!(config.ollama.api_base.as_deref(), Some("http://box:11434/v1"));
    }

    #[test]
    fn test_to_map_contains_all_providers() {
        let map = ProvidersConfig::default().to_map();
        assert_eq!(map.len(), 5);
        for name in ["openai", "openrouter", "deepseek", "groq", "ollama"] {
            assert!(map.contains_key(name), "missing {name}");
        }
    }
}
