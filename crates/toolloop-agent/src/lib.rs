//! toolloop agent: tool-calling conversation loops.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and built-in tools (search, calculator)
//! - **extractor**: model output → call requests (structured and free-text)
//! - **executor**: validated tool dispatch that never fails a turn
//! - **context**: windowed prompt construction and status-message filtering
//! - **agent_loop**: the iterative ReAct loop
//! - **single_shot**: the one-call-then-answer loop

pub mod agent_loop;
pub mod context;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod single_shot;
pub mod tools;

pub use agent_loop::{ReactAgent, DEFAULT_MAX_ITERATIONS};
pub use context::ContextBuilder;
pub use error::{AgentError, ToolError};
pub use executor::{CallResult, ToolExecutor};
pub use extractor::CallRequest;
pub use single_shot::{NoopObserver, SingleShotAgent, TurnObserver};
pub use tools::{Tool, ToolRegistry};
