//! Provider status tool.

use std::sync::Arc;

use async_trait::async_trait;
use fanout_search::WebResearch;

use crate::error::HostError;

use super::types::{Tool, ToolResult};

/// Reports which providers can be called right now. Makes no network calls.
pub struct SearchStatusTool {
    research: Arc<WebResearch>,
}

impl SearchStatusTool {
    pub fn new(research: Arc<WebResearch>) -> Self {
        Self { research }
    }
}

#[async_trait]
impl Tool for SearchStatusTool {
    fn name(&self) -> &str {
        "search_status"
    }

    fn description(&self) -> &str {
        "Show which search providers are configured and available, with their rate-limit usage."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: serde_json::Value) -> Result<ToolResult, HostError> {
        Ok(ToolResult::success(self.research.search_status()))
    }
}
