//! Context builder: assembles the message list for each model turn.
//!
//! The single-shot loop replays a bounded, filtered slice of the
//! conversation; the iterative loop replays everything as-is and only uses
//! the append helpers here.

use toolloop_core::types::{Message, Role, ToolCall};
use toolloop_core::utils::today_date;
use tracing::debug;

use crate::tools::ToolRegistry;

/// Prefix of the transient "tool running" status message.
pub const SEARCHING_PREFIX: &str = "Searching for:";
/// Prefix of the status message that replaces it once the tool returns.
pub const SEARCHED_PREFIX: &str = "Searched for:";

/// Default number of history messages replayed by the single-shot loop.
pub const DEFAULT_WINDOW: usize = 6;

/// Whether a message is a progress annotation rather than conversation.
pub fn is_status_message(msg: &Message) -> bool {
    msg.role() == Role::Assistant
        && msg
            .content()
            .is_some_and(|c| c.starts_with(SEARCHING_PREFIX) || c.starts_with(SEARCHED_PREFIX))
}

/// The working-memory slice of `history`.
///
/// The last `window` messages when the history is longer than that,
/// otherwise everything except the newest message.
pub fn memory_slice(history: &[Message], window: usize) -> &[Message] {
    if history.len() > window {
        &history[history.len() - window..]
    } else {
        &history[..history.len().saturating_sub(1)]
    }
}

// ─────────────────────────────────────────────
// Context builder
// ─────────────────────────────────────────────

/// Builds prompts for the single-shot loop.
pub struct ContextBuilder {
    system_prompt: String,
    window: usize,
}

impl ContextBuilder {
    /// Builder whose instructions describe the tools in `registry`.
    pub fn new(registry: &ToolRegistry, window: usize) -> Self {
        Self {
            system_prompt: single_shot_system_prompt(registry),
            window,
        }
    }

    /// Replace the generated instructions.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Message list for one single-shot turn.
    ///
    /// 1. Memory slice of `history`, with status messages removed
    /// 2. System instructions in front
    /// 3. The observation prompt when a tool result exists, otherwise `new_input`
    pub fn build(
        &self,
        history: &[Message],
        new_input: &str,
        observation: Option<&str>,
    ) -> Vec<Message> {
        let memory = memory_slice(history, self.window);

        let mut messages = Vec::with_capacity(memory.len() + 2);
        messages.push(Message::system(self.system_prompt.as_str()));
        messages.extend(memory.iter().filter(|m| !is_status_message(m)).cloned());

        match observation {
            Some(result) => messages.push(Message::user(observation_prompt(result))),
            None => messages.push(Message::user(new_input)),
        }

        debug!(
            history = history.len(),
            sent = messages.len(),
            grounded = observation.is_some(),
            "built single-shot context"
        );
        messages
    }

    // ────────────── Iterative helpers ──────────────

    /// Add a tool result to the message list.
    pub fn add_tool_result(messages: &mut Vec<Message>, tool_call_id: &str, result: &str) {
        messages.push(Message::tool_result(tool_call_id, result));
    }

    /// Add an assistant message (with optional tool calls) to the message list.
    pub fn add_assistant_message(
        messages: &mut Vec<Message>,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    ) {
        if tool_calls.is_empty() {
            messages.push(Message::assistant(content.unwrap_or_default()));
        } else {
            messages.push(Message::assistant_tool_calls(content, tool_calls));
        }
    }
}

// ─────────────────────────────────────────────
// Prompts
// ─────────────────────────────────────────────

/// System prompt for the iterative loop.
pub fn react_system_prompt() -> String {
    format!(
        "You are a helpful assistant using ReAct. \
         Call the available tools whenever they help, then give a final answer in plain language.\n\n\
         Today's date: {}",
        today_date()
    )
}

fn observation_prompt(result: &str) -> String {
    format!(
        "Refer to the following tool result and provide a concise, factual answer based only on this information. \
         Quote exact values such as dates, names and numbers as they appear. \
         Do not add or invent anything the result does not state.\n{result}"
    )
}

fn single_shot_system_prompt(registry: &ToolRegistry) -> String {
    let schemas = registry.schemas();
    let example_name = schemas
        .iter()
        .map(|d| d.function.name.as_str())
        .find(|n| *n == "search")
        .or_else(|| schemas.first().map(|d| d.function.name.as_str()))
        .unwrap_or("search");

    let functions = schemas
        .iter()
        .map(|d| serde_json::to_string_pretty(&d.function).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an AI assistant. Your training data may be out of date; today's date is {today}. Answer questions directly when possible, and call a function when necessary.

You will receive previous conversation messages as part of the input. Use them to keep context and give coherent answers.

DECISION PROCESS:
1. Historical events and timeless information (scientific facts, concepts): answer directly.
2. Recent events you are certain about: answer directly. If unsure, search.
3. Current or recent information: always search.
4. Arithmetic: use the calculator when one is available.

ALWAYS SEARCH if the question:
- Contains words like "current", "latest", "now", "present", "today", "recent"
- Asks about someone in a changing position (champion, president, CEO)
- Is time-sensitive and does not specify a time period

FUNCTION CALL FORMAT:
When you need a function, respond WITH ONLY THE JSON OBJECT, no other text, no backticks:
{{
	"name": "{example_name}",
	"parameters": {{
		"query": "your search query"
	}}
}}

AVAILABLE FUNCTIONS:
{functions}

WHEN ANSWERING BASED ON A FUNCTION RESULT:
- Use ONLY facts found in the result.
- Do NOT add dates or information that are not present in the result.
- Quote dates exactly as they appear.
- Keep your answer concise and factual."#,
        today = today_date(),
    )
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::calculator::CalculatorTool;
    use crate::tools::search::SearchTool;
    use std::sync::Arc;

    fn builder(window: usize) -> ContextBuilder {
        ContextBuilder::new(&ToolRegistry::new(), window).with_system_prompt("SYS")
    }

    fn numbered(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("u{i}"))
                } else {
                    Message::assistant(format!("a{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn test_memory_slice_long_history() {
        let history = numbered(10);
        let slice = memory_slice(&history, 6);
        assert_eq!(slice.len(), 6);
        assert_eq!(slice[0].content(), Some("u4"));
        assert_eq!(slice[5].content(), Some("a9"));
    }

    #[test]
    fn test_memory_slice_short_history_drops_newest() {
        let history = numbered(4);
        let slice = memory_slice(&history, 6);
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[2].content(), Some("u2"));

        // Exactly N entries still counts as "short".
        assert_eq!(memory_slice(&numbered(6), 6).len(), 5);
        assert!(memory_slice(&[], 6).is_empty());
    }

    #[test]
    fn test_build_window_minus_status_messages() {
        let mut history = numbered(10);
        history[5] = Message::assistant("Searching for: weather");
        history[7] = Message::assistant("Searched for: weather\n\nResult:\nTitle: x");
        // Same prefix on a user message is conversation, not status.
        history[6] = Message::user("Searching for: my keys");

        let messages = builder(6).build(&history, "new question", None);

        // system + (6 - 2 status) + new input
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0], Message::system("SYS"));
        assert_eq!(messages[1].content(), Some("u4"));
        assert_eq!(messages[2].content(), Some("Searching for: my keys"));
        assert_eq!(messages[3].content(), Some("u8"));
        assert_eq!(messages[4].content(), Some("a9"));
        assert_eq!(messages[5], Message::user("new question"));
    }

    #[test]
    fn test_build_with_observation() {
        let history = vec![
            Message::user("What's the latest iPhone model?"),
            Message::assistant("Searched for: latest iPhone\n\nResult:\nTitle: iPhone 16"),
        ];
        let messages = builder(6).build(&history, "ignored", Some("Snippet: released 2024-09-09"));

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), Role::System);
        let last = messages[1].content().unwrap();
        assert!(last.starts_with("Refer to the following tool result"));
        assert!(last.contains("based only on this information"));
        assert!(last.contains("Quote exact values such as dates"));
        assert!(last.contains("Do not add or invent anything"));
        assert!(last.ends_with("\nSnippet: released 2024-09-09"));
    }

    #[test]
    fn test_is_status_message() {
        assert!(is_status_message(&Message::assistant("Searching for: x")));
        assert!(is_status_message(&Message::assistant("Searched for: x")));
        assert!(!is_status_message(&Message::assistant("Response:\nx")));
        assert!(!is_status_message(&Message::user("Searched for: x")));
    }

    #[test]
    fn test_single_shot_prompt_lists_registered_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CalculatorTool));
        registry.register(Arc::new(SearchTool::new(Some("k".into()))));

        let builder = ContextBuilder::new(&registry, DEFAULT_WINDOW);
        let prompt = builder.system_prompt();
        assert!(prompt.contains(r#""name": "search""#));
        assert!(prompt.contains(r#""name": "calculator""#));
        assert!(prompt.contains(&today_date()));
        assert_eq!(builder.window(), 6);
    }

    #[test]
    fn test_add_assistant_message() {
        let mut messages = Vec::new();
        ContextBuilder::add_assistant_message(&mut messages, Some("hi".into()), vec![]);
        ContextBuilder::add_assistant_message(
            &mut messages,
            None,
            vec![ToolCall::new("c1", "search", "{}")],
        );
        ContextBuilder::add_tool_result(&mut messages, "c1", "result");

        assert_eq!(messages[0], Message::assistant("hi"));
        assert_eq!(messages[1].tool_calls().len(), 1);
        assert_eq!(messages[2], Message::tool_result("c1", "result"));
    }

    #[test]
    fn test_react_prompt_has_date() {
        assert!(react_system_prompt().contains(&today_date()));
    }
}
