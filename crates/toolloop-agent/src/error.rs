//! Error taxonomy for tool execution and the conversation loops.

use thiserror::Error;
use toolloop_providers::ProviderError;

/// A tool-level failure.
///
/// Never fatal: the executor folds every variant into a failed
/// `CallResult` that the model reads as an observation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    MalformedArguments { tool: String, reason: String },

    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),

    #[error("{tool} failed: {message}")]
    ExecutionFailure { tool: String, message: String },

    #[error("No search results found.")]
    NoSearchResults,
}

/// A failure that ends the current turn.
///
/// Caught once at the conversation boundary and rendered as an
/// `"An error occurred: …"` assistant message.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    ModelInvocation(#[from] ProviderError),

    #[error("iteration limit exceeded: model still requested tools after {limit} iterations")]
    IterationLimitExceeded { limit: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_messages() {
        assert_eq!(
            ToolError::UnknownTool("weather".into()).to_string(),
            "Tool 'weather' not found"
        );
        assert_eq!(
            ToolError::MissingRequiredParameter("query".into()).to_string(),
            "Missing required parameter: query"
        );
    }

    #[test]
    fn test_provider_error_converts() {
        let err: AgentError = ProviderError::EmptyResponse {
            provider: "OpenAI".into(),
        }
        .into();
        assert!(matches!(err, AgentError::ModelInvocation(_)));
        assert_eq!(err.to_string(), "OpenAI returned no choices");
    }
}
