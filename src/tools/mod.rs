//! Caller-facing tools.
//!
//! # Tools
//!
//! - **web_search**: one query through the provider fallback chain
//! - **research_topic**: several related queries merged into a report
//! - **search_status**: provider availability and rate-limit usage

pub mod registry;
pub mod research_topic;
pub mod search_status;
pub mod types;
pub mod web_search;

pub use registry::ToolRegistry;
pub use research_topic::ResearchTopicTool;
pub use search_status::SearchStatusTool;
pub use types::{DEFAULT_MAX_BYTES, Tool, ToolResult, truncate_output};
pub use web_search::WebSearchTool;
