//! Single-shot loop: at most one free-text function call per user turn.
//!
//! Phase 1 prompts the model with a windowed slice of the conversation. If
//! the reply contains a `{"name": …, "parameters": …}` object naming a
//! registered tool, phase 2 runs that tool, shows progress through a
//! [`TurnObserver`], and prompts once more with the result. The second
//! reply is the answer and is never parsed for calls.

use std::sync::Arc;

use toolloop_core::types::Message;
use toolloop_providers::{LlmProvider, LlmRequestConfig};
use tracing::{debug, error, info};

use crate::context::{ContextBuilder, DEFAULT_WINDOW, SEARCHED_PREFIX, SEARCHING_PREFIX};
use crate::error::AgentError;
use crate::executor::ToolExecutor;
use crate::extractor::extract_free_text;
use crate::tools::ToolRegistry;

/// Receives progress updates while a tool runs.
pub trait TurnObserver: Send + Sync {
    /// Called with the transient status message, then again with the
    /// message that replaces it once the tool has returned.
    fn on_status(&self, status: &str);
}

/// Observer that ignores progress.
pub struct NoopObserver;

impl TurnObserver for NoopObserver {
    fn on_status(&self, _status: &str) {}
}

// ─────────────────────────────────────────────
// SingleShotAgent
// ─────────────────────────────────────────────

pub struct SingleShotAgent {
    provider: Arc<dyn LlmProvider>,
    executor: ToolExecutor,
    context: ContextBuilder,
    model: String,
    request_config: LlmRequestConfig,
}

impl SingleShotAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        model: Option<String>,
        window: Option<usize>,
        request_config: Option<LlmRequestConfig>,
    ) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        let context = ContextBuilder::new(&tools, window.unwrap_or(DEFAULT_WINDOW));

        info!(
            model = %model,
            provider = provider.display_name(),
            tools = tools.len(),
            window = context.window(),
            "single-shot agent initialized"
        );

        Self {
            provider,
            executor: ToolExecutor::new(tools),
            context,
            model,
            request_config: request_config.unwrap_or_default(),
        }
    }

    /// Replace the generated system instructions.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.context = self.context.with_system_prompt(prompt);
        self
    }

    /// Handle one user message, appending everything to `history`.
    ///
    /// Returns the answer. Model failures are appended as
    /// `"An error occurred: …"` and returned in its place.
    pub async fn process_message(
        &self,
        history: &mut Vec<Message>,
        user_input: &str,
        observer: &dyn TurnObserver,
    ) -> String {
        history.push(Message::user(user_input));
        match self.turn(history, user_input, observer).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "single-shot turn failed");
                let text = format!("An error occurred: {e}");
                history.push(Message::assistant(text.as_str()));
                text
            }
        }
    }

    async fn turn(
        &self,
        history: &mut Vec<Message>,
        user_input: &str,
        observer: &dyn TurnObserver,
    ) -> Result<String, AgentError> {
        let messages = self.context.build(history, user_input, None);
        let reply = self.ask(&messages).await?;

        let call = match extract_free_text(&reply) {
            Some(call) if self.executor.registry().has(&call.tool_name) => call,
            Some(call) => {
                debug!(tool = %call.tool_name, "reply names an unregistered tool, treating as answer");
                history.push(Message::assistant(reply.as_str()));
                return Ok(reply);
            }
            None => {
                history.push(Message::assistant(reply.as_str()));
                return Ok(reply);
            }
        };

        let subject = call.describe();
        let status = format!("{SEARCHING_PREFIX} {subject}");
        history.push(Message::assistant(status.as_str()));
        observer.on_status(&status);

        let result = self.executor.execute(&call).await;
        let observation = result.observation();
        info!(tool = %call.tool_name, success = result.success, "single-shot tool call finished");

        let done = format!("{SEARCHED_PREFIX} {subject}\n\nResult:\n{observation}");
        if let Some(last) = history.last_mut() {
            *last = Message::assistant(done.as_str());
        }
        observer.on_status(&done);

        let messages = self.context.build(history, user_input, Some(&observation));
        let answer = self.ask(&messages).await?;
        history.push(Message::assistant(format!("Response:\n{answer}")));
        Ok(answer)
    }

    async fn ask(&self, messages: &[Message]) -> Result<String, AgentError> {
        let response = self
            .provider
            .chat(messages, None, &self.model, &self.request_config)
            .await?;
        Ok(response.content.unwrap_or_default())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn context(&self) -> &ContextBuilder {
        &self.context
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::calculator::CalculatorTool;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use toolloop_core::types::{LlmResponse, Role, ToolDefinition};
    use toolloop_providers::ProviderError;

    struct MockProvider {
        responses: Mutex<Vec<Result<LlmResponse, ProviderError>>>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl MockProvider {
        fn new(replies: &[&str]) -> Self {
            Self::scripted(replies.iter().map(|r| Ok(LlmResponse::text(*r))).collect())
        }

        fn scripted(responses: Vec<Result<LlmResponse, ProviderError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn chat(
            &self,
            messages: &[Message],
            tools: Option<&[ToolDefinition]>,
            _model: &str,
            _config: &LlmRequestConfig,
        ) -> Result<LlmResponse, ProviderError> {
            assert!(tools.is_none(), "single-shot never sends tool schemas");
            self.requests.lock().unwrap().push(messages.to_vec());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(LlmResponse::text("(no more responses)"))
            } else {
                responses.remove(0)
            }
        }

        fn default_model(&self) -> &str {
            "mock-model"
        }

        fn display_name(&self) -> &str {
            "MockProvider"
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl TurnObserver for Recorder {
        fn on_status(&self, status: &str) {
            self.0.lock().unwrap().push(status.to_string());
        }
    }

    fn agent(provider: Arc<MockProvider>) -> SingleShotAgent {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CalculatorTool));
        SingleShotAgent::new(provider, Arc::new(tools), None, Some(6), None)
            .with_system_prompt("SYS")
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = Arc::new(MockProvider::new(&["Paris."]));
        let agent = agent(provider.clone());
        let recorder = Recorder::default();

        let mut history = Vec::new();
        let answer = agent
            .process_message(&mut history, "Capital of France?", &recorder)
            .await;

        assert_eq!(answer, "Paris.");
        assert_eq!(history, vec![Message::user("Capital of France?"), Message::assistant("Paris.")]);
        assert!(recorder.0.lock().unwrap().is_empty());

        // First turn: the slice is empty, the raw input is appended.
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0], vec![Message::system("SYS"), Message::user("Capital of France?")]);
    }

    #[tokio::test]
    async fn test_tool_call_then_final_answer() {
        let provider = Arc::new(MockProvider::new(&[
            r#"{"name": "calculator", "parameters": {"expression": "1+2*3"}}"#,
            "The result is 7.",
        ]));
        let agent = agent(provider.clone());
        let recorder = Recorder::default();

        let mut history = Vec::new();
        let answer = agent.process_message(&mut history, "1+2*3?", &recorder).await;
        assert_eq!(answer, "The result is 7.");

        let expected_status = r#"Searched for: calculator({"expression":"1+2*3"})

Result:
7"#;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1], Message::assistant(expected_status));
        assert_eq!(history[2], Message::assistant("Response:\nThe result is 7."));

        let statuses = recorder.0.lock().unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].starts_with("Searching for: calculator("));
        assert_eq!(statuses[1], expected_status);

        // Phase 2 carries the observation prompt and no status messages.
        let requests = provider.requests.lock().unwrap();
        let phase2 = &requests[1];
        assert_eq!(phase2.len(), 3);
        assert_eq!(phase2[1], Message::user("1+2*3?"));
        assert!(phase2[2].content().unwrap().ends_with("\n7"));
    }

    #[tokio::test]
    async fn test_second_reply_is_never_parsed() {
        let call = r#"{"name": "calculator", "parameters": {"expression": "2+2"}}"#;
        let provider = Arc::new(MockProvider::new(&[call, call]));
        let agent = agent(provider.clone());

        let mut history = Vec::new();
        let answer = agent.process_message(&mut history, "2+2", &NoopObserver).await;

        assert_eq!(answer, call);
        assert_eq!(provider.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unregistered_tool_is_an_answer() {
        let reply = r#"{"name": "weather", "parameters": {"city": "Seoul"}}"#;
        let provider = Arc::new(MockProvider::new(&[reply]));
        let agent = agent(provider.clone());

        let mut history = Vec::new();
        let answer = agent.process_message(&mut history, "Weather?", &NoopObserver).await;

        assert_eq!(answer, reply);
        assert_eq!(history.len(), 2);
        assert_eq!(provider.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_tool_still_reaches_model() {
        let provider = Arc::new(MockProvider::new(&[
            r#"{"name": "calculator", "parameters": {"expression": "1/0"}}"#,
            "That division is undefined.",
        ]));
        let agent = agent(provider.clone());

        let mut history = Vec::new();
        let answer = agent.process_message(&mut history, "1/0?", &NoopObserver).await;
        assert_eq!(answer, "That division is undefined.");
        assert!(history[1]
            .content()
            .unwrap()
            .ends_with("Result:\nError: calculator failed: division by zero"));
    }

    #[tokio::test]
    async fn test_model_failure_appends_error() {
        let provider = Arc::new(MockProvider::scripted(vec![Err(ProviderError::Transport {
            provider: "Ollama".into(),
            message: "connection refused".into(),
        })]));
        let agent = agent(provider);

        let mut history = Vec::new();
        let answer = agent.process_message(&mut history, "Hello", &NoopObserver).await;

        assert_eq!(
            answer,
            "An error occurred: HTTP request to Ollama failed: connection refused"
        );
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role(), Role::Assistant);
    }
}
