//! Iterative (ReAct) loop: model ↔ tools until the model stops calling.
//!
//! Each turn sends the whole conversation plus the registry's schemas.
//! A response with tool calls is appended together with one `tool` message
//! per call; a response without calls is the final answer. An iteration
//! guard stops a model that never stops calling.

use std::sync::Arc;

use toolloop_core::types::Message;
use toolloop_core::utils::truncate_string;
use toolloop_providers::{LlmProvider, LlmRequestConfig};
use tracing::{debug, error, info, warn};

use crate::context::{react_system_prompt, ContextBuilder};
use crate::error::AgentError;
use crate::executor::ToolExecutor;
use crate::tools::ToolRegistry;

/// Default cap on model calls per user turn.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

// ─────────────────────────────────────────────
// ReactAgent
// ─────────────────────────────────────────────

pub struct ReactAgent {
    /// LLM provider.
    provider: Arc<dyn LlmProvider>,
    /// Dispatches tool calls against the shared registry.
    executor: ToolExecutor,
    /// Model to use (defaults to the provider's).
    model: String,
    /// Max model calls per user turn.
    max_iterations: u32,
    /// LLM request config (temperature, max_tokens).
    request_config: LlmRequestConfig,
}

impl ReactAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        model: Option<String>,
        max_iterations: Option<u32>,
        request_config: Option<LlmRequestConfig>,
    ) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        let max_iterations = match max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS) {
            0 => {
                warn!("max_iterations of 0 would never call the model, using 1");
                1
            }
            n => n,
        };

        info!(
            model = %model,
            provider = provider.display_name(),
            tools = tools.len(),
            max_iterations = max_iterations,
            "react agent initialized"
        );

        Self {
            provider,
            executor: ToolExecutor::new(tools),
            model,
            max_iterations,
            request_config: request_config.unwrap_or_default(),
        }
    }

    /// A fresh conversation holding only the system prompt.
    pub fn new_conversation(&self) -> Vec<Message> {
        vec![Message::system(react_system_prompt())]
    }

    /// Drive the loop over `messages` until the model answers.
    ///
    /// Every assistant response and tool result is appended to `messages`,
    /// including the final answer.
    pub async fn run(&self, messages: &mut Vec<Message>) -> Result<String, AgentError> {
        let tool_defs = self.executor.registry().schemas();

        for iteration in 0..self.max_iterations {
            debug!(iteration = iteration, messages = messages.len(), "LLM call");

            let response = self
                .provider
                .chat(messages, Some(&tool_defs), &self.model, &self.request_config)
                .await?;

            if !response.has_tool_calls() {
                let answer = response.content.unwrap_or_default();
                ContextBuilder::add_assistant_message(messages, Some(answer.clone()), vec![]);
                return Ok(answer);
            }

            ContextBuilder::add_assistant_message(
                messages,
                response.content,
                response.tool_calls.clone(),
            );

            for (call_id, result) in self.executor.execute_tool_calls(&response.tool_calls).await {
                let observation = result.observation();
                info!(
                    tool = %result.tool_name,
                    success = result.success,
                    iteration = iteration,
                    "executed tool call"
                );
                debug!(result = %truncate_string(&observation, 120), "tool result");
                ContextBuilder::add_tool_result(messages, &call_id, &observation);
            }
        }

        Err(AgentError::IterationLimitExceeded {
            limit: self.max_iterations,
        })
    }

    /// One conversational turn: append `user_input`, run, return the reply.
    ///
    /// Failures are appended as an assistant message instead of returned, so
    /// the conversation can continue.
    pub async fn respond(&self, messages: &mut Vec<Message>, user_input: &str) -> String {
        messages.push(Message::user(user_input));
        match self.run(messages).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "react turn failed");
                let text = format!("An error occurred: {e}");
                messages.push(Message::assistant(text.as_str()));
                text
            }
        }
    }

    /// Answer a single prompt in a throwaway conversation.
    pub async fn single_query(&self, prompt: &str) -> Result<String, AgentError> {
        let mut messages = self.new_conversation();
        messages.push(Message::user(prompt));
        self.run(&mut messages).await
    }

    /// Get a reference to the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
