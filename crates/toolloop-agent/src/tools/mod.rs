//! Tool modules for the toolloop agents.

pub mod base;
pub mod calculator;
pub mod registry;
pub mod search;

pub use base::{require_string, Tool};
pub use calculator::CalculatorTool;
pub use registry::ToolRegistry;
pub use search::{SearchResult, SearchTool};
