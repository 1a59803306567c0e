//! Errors raised while talking to a model endpoint.

use thiserror::Error;

/// A failed model invocation.
///
/// Every variant is a transport/auth/protocol problem; the agent loops wrap
/// these into their own model-invocation failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request to {provider} failed: {message}")]
    Transport { provider: String, message: String },

    #[error("{provider} returned {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("failed to parse {provider} response: {message}")]
    Decode { provider: String, message: String },

    #[error("{provider} returned no choices")]
    EmptyResponse { provider: String },

    #[error(
        "no configured provider found for model '{model}'; \
         set the appropriate API key (e.g. OPENAI_API_KEY, OPENROUTER_API_KEY)"
    )]
    NotConfigured { model: String },
}
