//! Topic research tool: expands a topic into sub-queries and merges the answers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fanout_search::WebResearch;

use crate::error::HostError;

use super::types::{DEFAULT_MAX_BYTES, Tool, ToolResult, optional_str, required_str};

/// Tool that researches a topic at `quick`, `standard` or `deep` depth.
///
/// Sub-queries that have not answered when the deadline passes are reported
/// as unfinished; the rest of the report is still returned.
pub struct ResearchTopicTool {
    research: Arc<WebResearch>,
    deadline: Duration,
    max_bytes: usize,
}

impl ResearchTopicTool {
    pub fn new(research: Arc<WebResearch>, deadline: Duration) -> Self {
        Self {
            research,
            deadline,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl Tool for ResearchTopicTool {
    fn name(&self) -> &str {
        "research_topic"
    }

    fn description(&self) -> &str {
        "Research a topic by running several related searches and merging the sources into one report."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "The topic to research"
                },
                "depth": {
                    "type": "string",
                    "enum": ["quick", "standard", "deep"],
                    "description": "quick runs 1 search, standard 3, deep 5 (default standard)"
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, HostError> {
        let topic = required_str(&args, "topic")?;
        let depth = optional_str(&args, "depth", "standard")?;

        let deadline = tokio::time::Instant::now() + self.deadline;
        let report = self
            .research
            .research_with_deadline(topic, depth, deadline)
            .await?;
        tracing::debug!(
            depth = %report.depth,
            sources = report.total_sources(),
            "research finished"
        );

        let output = fanout_search::format::format_report(&report);
        Ok(ToolResult::bounded(&output, self.max_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_search::SearchConfig;

    fn tool() -> ResearchTopicTool {
        let research = match WebResearch::new(&SearchConfig::default()) {
            Ok(r) => r,
            Err(e) => unreachable!("default config builds: {e}"),
        };
        ResearchTopicTool::new(Arc::new(research), Duration::from_secs(60))
    }

    #[test]
    fn schema_lists_depths() {
        let schema = tool().schema();
        let depths = schema["properties"]["depth"]["enum"].clone();
        assert_eq!(depths, serde_json::json!(["quick", "standard", "deep"]));
        assert_eq!(schema["required"], serde_json::json!(["topic"]));
    }

    #[tokio::test]
    async fn unknown_depth_is_rejected() {
        let err = match tool()
            .execute(serde_json::json!({"topic": "rust", "depth": "exhaustive"}))
            .await
        {
            Err(e) => e,
            Ok(_) => unreachable!("unknown depth must be rejected"),
        };
        assert_eq!(err.code(), "TOOL_VALIDATION");
        assert!(err.to_string().contains("exhaustive"));
    }

    #[tokio::test]
    async fn blank_topic_is_rejected() {
        let err = match tool().execute(serde_json::json!({"topic": " "})).await {
            Err(e) => e,
            Ok(_) => unreachable!("blank topic must be rejected"),
        };
        assert!(err.to_string().contains("topic must not be empty"));
    }
}
