//! Fanout: provider-fallback web search exposed as JSON tools.
//!
//! This crate hosts the caller-facing tools over a line-oriented JSON bridge:
//! stdin requests → tool registry → `fanout-search` → stdout responses
//!
//! # Architecture
//!
//! - **Config**: TOML file plus credentials from the environment
//! - **Tools**: `web_search`, `research_topic` and `search_status`, sharing
//!   one [`fanout_search::WebResearch`]
//! - **Bridge**: newline-delimited JSON over stdin/stdout

pub mod bridge;
pub mod config;
pub mod error;
pub mod tools;

use std::sync::Arc;

pub use config::{HostConfig, ToolSettings};
pub use error::{HostError, Result};
pub use tools::ToolRegistry;

/// Build the search engine and its tools from `config`.
///
/// # Errors
///
/// Returns [`HostError::Config`] if the configuration is invalid and
/// [`HostError::ToolFailed`] if the HTTP client cannot be built.
pub fn build_tools(config: &HostConfig) -> Result<ToolRegistry> {
    config.validate()?;
    let research = fanout_search::WebResearch::new(&config.search)?;
    let available = research.status().iter().filter(|s| s.available).count();
    tracing::info!(
        providers = config.search.priority.len(),
        available,
        "search providers configured"
    );
    Ok(ToolRegistry::with_search_tools(
        Arc::new(research),
        &config.tools,
    ))
}
