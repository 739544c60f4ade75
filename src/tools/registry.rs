//! Tool registry.
//!
//! The [`ToolRegistry`] holds registered tools, provides lookup by name,
//! and exports JSON schemas for callers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fanout_search::WebResearch;

use crate::config::ToolSettings;

use super::research_topic::ResearchTopicTool;
use super::search_status::SearchStatusTool;
use super::types::Tool;
use super::web_search::WebSearchTool;

/// Registry of available tools, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `web_search`, `research_topic` and `search_status`,
    /// all sharing one [`WebResearch`].
    pub fn with_search_tools(research: Arc<WebResearch>, settings: &ToolSettings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WebSearchTool::with_max_bytes(
            Arc::clone(&research),
            settings.max_output_bytes,
        )));
        registry.register(Arc::new(
            ResearchTopicTool::new(
                Arc::clone(&research),
                Duration::from_secs(settings.research_deadline_seconds),
            )
            .with_max_bytes(settings.max_output_bytes),
        ));
        registry.register(Arc::new(SearchStatusTool::new(research)));
        registry
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Names of all registered tools, sorted.
    pub fn list_available(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.values().map(|t| t.name()).collect();
        names.sort_unstable();
        names
    }

    /// Export JSON schemas for all tools, sorted by name.
    ///
    /// Each entry contains `name`, `description`, and `parameters` (the schema).
    pub fn schemas_for_api(&self) -> Vec<serde_json::Value> {
        let mut schemas: Vec<(String, serde_json::Value)> = self
            .tools
            .values()
            .map(|t| {
                let entry = serde_json::json!({
                    "name": t.name(),
                    "description": t.description(),
                    "parameters": t.schema(),
                });
                (t.name().to_string(), entry)
            })
            .collect();
        schemas.sort_by(|a, b| a.0.cmp(&b.0));
        schemas.into_iter().map(|(_, v)| v).collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}
