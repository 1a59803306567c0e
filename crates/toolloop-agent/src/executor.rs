//! Tool executor: runs call requests against the registry.
//!
//! Every failure (unknown tool, bad or missing arguments, a tool returning
//! `Err`) is folded into a `CallResult` with `success == false`; nothing
//! here aborts a turn.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use toolloop_core::types::ToolCall;

use crate::error::ToolError;
use crate::extractor::{extract_structured, CallRequest};
use crate::tools::ToolRegistry;

/// Outcome of one tool invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct CallResult {
    pub tool_name: String,
    pub success: bool,
    pub payload: String,
    pub error: Option<String>,
}

impl CallResult {
    pub fn success(tool_name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            payload: payload.into(),
            error: None,
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: &ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            payload: String::new(),
            error: Some(error.to_string()),
        }
    }

    /// Text handed back to the model.
    pub fn observation(&self) -> String {
        match &self.error {
            Some(e) => format!("Error: {e}"),
            None => self.payload.clone(),
        }
    }
}

// ─────────────────────────────────────────────
// ToolExecutor
// ─────────────────────────────────────────────

/// Validates and dispatches call requests.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one request. Never fails; errors come back inside the result.
    pub async fn execute(&self, request: &CallRequest) -> CallResult {
        match self.try_execute(request).await {
            Ok(payload) => {
                debug!(tool = %request.tool_name, bytes = payload.len(), "tool succeeded");
                CallResult::success(&request.tool_name, payload)
            }
            Err(e) => {
                warn!(tool = %request.tool_name, error = %e, "tool execution failed");
                CallResult::failure(&request.tool_name, &e)
            }
        }
    }

    /// Run every structured call of one model response, in order.
    ///
    /// Returns `(call_id, result)` pairs; calls whose arguments fail to
    /// decode still get a (failed) result.
    pub async fn execute_tool_calls(&self, calls: &[ToolCall]) -> Vec<(String, CallResult)> {
        let mut results = Vec::with_capacity(calls.len());
        for (call, request) in calls.iter().zip(extract_structured(calls)) {
            let result = match request {
                Ok(request) => self.execute(&request).await,
                Err(e) => {
                    warn!(tool = %call.function.name, error = %e, "malformed tool arguments");
                    CallResult::failure(&call.function.name, &e)
                }
            };
            results.push((call.id.clone(), result));
        }
        results
    }

    async fn try_execute(&self, request: &CallRequest) -> Result<String, ToolError> {
        let tool = self.registry.resolve(&request.tool_name)?;

        for key in tool.required_params() {
            match request.parameters.get(&key) {
                None | Some(Value::Null) => return Err(ToolError::MissingRequiredParameter(key)),
                Some(_) => {}
            }
        }

        tool.execute(request.parameters.clone())
            .await
            .map_err(|e| match e.downcast::<ToolError>() {
                Ok(tool_error) => tool_error,
                Err(e) => ToolError::ExecutionFailure {
                    tool: request.tool_name.clone(),
                    message: format!("{e:#}"),
                },
            })
    }
}
