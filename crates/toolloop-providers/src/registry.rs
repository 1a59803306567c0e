//! Provider registry: static specs for the supported LLM providers.
//!
//! Each `ProviderSpec` describes how to connect to a provider:
//! keywords for model matching, env var names, API bases, quirks, etc.

use std::collections::HashMap;

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
///
/// Used by the matching logic to figure out which provider to use for a given model.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"openrouter"`).
    pub name: &'static str,
    /// Keywords to match in model names (lowercase). E.g. `&["gpt", "openai"]`.
    pub keywords: &'static [&'static str],
    /// Environment variable for the API key. E.g. `"OPENROUTER_API_KEY"`.
    pub env_key: &'static str,
    /// Human-readable name for logs. E.g. `"OpenRouter"`.
    pub display_name: &'static str,
    /// Whether this is a gateway/aggregator (OpenRouter).
    /// Gateways are used as fallback when no direct match is found.
    pub is_gateway: bool,
    /// Whether this is a local/self-hosted provider that needs no API key.
    pub is_local: bool,
    /// Default API base URL.
    pub default_api_base: Option<&'static str>,
    /// Routing prefix users may put in front of the model name
    /// (e.g. `"ollama/gemma3"`); removed before the request is sent.
    pub strip_prefix: Option<&'static str>,
}

// ─────────────────────────────────────────────
// Supported providers (in priority order)
// ─────────────────────────────────────────────

/// Complete list of supported provider specifications, in matching priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    // 1. OpenRouter: gateway, fallback for unmatched models
    ProviderSpec {
        name: "openrouter",
        keywords: &["openrouter"],
        env_key: "OPENROUTER_API_KEY",
        display_name: "OpenRouter",
        is_gateway: true,
        is_local: false,
        default_api_base: Some("https://openrouter.ai/api/v1"),
        strip_prefix: Some("openrouter/"),
    },
    // 2. OpenAI
    ProviderSpec {
        name: "openai",
        keywords: &["openai", "gpt"],
        env_key: "OPENAI_API_KEY",
        display_name: "OpenAI",
        is_gateway: false,
        is_local: false,
        default_api_base: Some("https://api.openai.com/v1"),
        strip_prefix: Some("openai/"),
    },
    // 3. DeepSeek
    ProviderSpec {
        name: "deepseek",
        keywords: &["deepseek"],
        env_key: "DEEPSEEK_API_KEY",
        display_name: "DeepSeek",
        is_gateway: false,
        is_local: false,
        default_api_base: Some("https://api.deepseek.com/v1"),
        strip_prefix: Some("deepseek/"),
    },
    // 4. Groq
    ProviderSpec {
        name: "groq",
        keywords: &["groq"],
        env_key: "GROQ_API_KEY",
        display_name: "Groq",
        is_gateway: false,
        is_local: false,
        default_api_base: Some("https://api.groq.com/openai/v1"),
        strip_prefix: Some("groq/"),
    },
    // 5. Ollama (local, OpenAI-compatible /v1 endpoint)
    ProviderSpec {
        name: "ollama",
        keywords: &["ollama", "gemma", "llama", "mistral", "qwen", "phi"],
        env_key: "OLLAMA_API_KEY",
        display_name: "Ollama",
        is_gateway: false,
        is_local: true,
        default_api_base: Some("http://localhost:11434/v1"),
        strip_prefix: Some("ollama/"),
    },
];

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Find a provider spec by matching keywords against a model name.
///
/// Skips gateways: those are fallback only.
/// Returns the first match in priority order.
pub fn find_by_model(model: &str) -> Option<&'static ProviderSpec> {
    let model_lower = model.to_lowercase();
    PROVIDERS.iter().find(|spec| {
        !spec.is_gateway && spec.keywords.iter().any(|kw| model_lower.contains(kw))
    })
}

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Resolve the model name for API calls by removing the routing prefix.
pub fn resolve_model_name(model: &str, spec: &ProviderSpec) -> String {
    spec.strip_prefix
        .and_then(|prefix| model.strip_prefix(prefix))
        .unwrap_or(model)
        .to_string()
}

/// Re-export the provider config from core: single source of truth.
pub use toolloop_core::config::schema::ProviderConfig;

/// Match a model name to a configured provider.
///
/// 1. Find by keyword match, only if that provider has an API key
///    (local providers need none).
/// 2. Fallback to the first configured gateway.
pub fn match_provider<'a>(
    model: &str,
    providers: &'a HashMap<String, ProviderConfig>,
) -> Option<(&'a ProviderConfig, &'static ProviderSpec)> {
    // 1. Direct keyword match
    if let Some(spec) = find_by_model(model) {
        if let Some(config) = providers.get(spec.name) {
            if spec.is_local || config.is_configured() {
                return Some((config, spec));
            }
        }
    }

    // 2. Fallback to first configured gateway
    PROVIDERS
        .iter()
        .filter(|s| s.is_gateway)
        .find_map(|spec| {
            providers
                .get(spec.name)
                .filter(|c| c.is_configured())
                .map(|c| (c, spec))
        })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
