//! Call extraction: model output → invocation requests.
//!
//! Two strategies:
//! - **structured**: the provider already attached `tool_calls` to the
//!   response; each one's JSON argument blob is decoded.
//! - **free text**: the model wrote a `{"name": …, "parameters": {…}}` object
//!   somewhere in its reply, possibly inside prose or code fences.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use toolloop_core::types::ToolCall;

use crate::error::ToolError;

/// One request to run a named tool.
#[derive(Clone, Debug, PartialEq)]
pub struct CallRequest {
    /// Id of the originating tool call; empty for free-text calls.
    pub call_id: String,
    pub tool_name: String,
    pub parameters: HashMap<String, Value>,
}

impl CallRequest {
    pub fn new(tool_name: impl Into<String>, parameters: HashMap<String, Value>) -> Self {
        Self {
            call_id: String::new(),
            tool_name: tool_name.into(),
            parameters,
        }
    }

    /// Decode a provider tool call's JSON argument blob.
    ///
    /// An empty blob means no arguments.
    pub fn from_tool_call(call: &ToolCall) -> Result<Self, ToolError> {
        let raw = call.function.arguments.trim();
        let parameters = if raw.is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str::<HashMap<String, Value>>(raw).map_err(|e| {
                ToolError::MalformedArguments {
                    tool: call.function.name.clone(),
                    reason: e.to_string(),
                }
            })?
        };

        Ok(Self {
            call_id: call.id.clone(),
            tool_name: call.function.name.clone(),
            parameters,
        })
    }

    /// Short human-readable form, used for progress lines.
    ///
    /// The `query` string when present, otherwise `name(args)`.
    pub fn describe(&self) -> String {
        match self.parameters.get("query").and_then(Value::as_str) {
            Some(query) => query.to_string(),
            None => {
                let sorted: BTreeMap<&String, &Value> = self.parameters.iter().collect();
                let args = serde_json::to_string(&sorted).unwrap_or_default();
                format!("{}({})", self.tool_name, args)
            }
        }
    }
}

/// Map every structured tool call on a response into a request.
///
/// Each entry is decoded independently, so one malformed blob does not
/// hide its siblings.
pub fn extract_structured(calls: &[ToolCall]) -> Vec<Result<CallRequest, ToolError>> {
    calls.iter().map(CallRequest::from_tool_call).collect()
}

#[derive(Deserialize)]
struct FreeTextCall {
    name: String,
    parameters: HashMap<String, Value>,
}

/// Scan free text for a single function-call object.
///
/// Takes the span from the first `{` to the last `}` and decodes it.
/// Anything that does not fit yields `None`; the text is then an answer.
pub fn extract_free_text(text: &str) -> Option<CallRequest> {
    let text = text.trim();
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<FreeTextCall>(&text[start..=end]) {
        Ok(call) => Some(CallRequest::new(call.name, call.parameters)),
        Err(e) => {
            debug!(error = %e, "model output is not a function call");
            None
        }
    }
}
