//! toolloop core: conversation types, configuration, and shared helpers.

pub mod config;
pub mod types;
pub mod utils;

pub use config::Config;
pub use types::{LlmResponse, Message, Role, ToolCall, ToolDefinition};
