//! Web search tool backed by the provider fallback chain.

use std::sync::Arc;

use async_trait::async_trait;
use fanout_search::WebResearch;

use crate::error::HostError;

use super::types::{DEFAULT_MAX_BYTES, Tool, ToolResult, optional_str, required_str};

/// Results returned when `num_results` is omitted.
pub const DEFAULT_NUM_RESULTS: u64 = 10;

/// Largest `num_results` a caller may request.
pub const MAX_NUM_RESULTS: u64 = 50;

/// Tool that answers a query from the first provider with results.
///
/// # Arguments (JSON)
///
/// - `query` (string, required): the search query
/// - `num_results` (integer, optional): 1 to 50, default 10
/// - `provider` (string, optional): `auto`, `google`, `bing` or `duckduckgo`
pub struct WebSearchTool {
    research: Arc<WebResearch>,
    max_bytes: usize,
}

impl WebSearchTool {
    pub fn new(research: Arc<WebResearch>) -> Self {
        Self::with_max_bytes(research, DEFAULT_MAX_BYTES)
    }

    pub fn with_max_bytes(research: Arc<WebResearch>, max_bytes: usize) -> Self {
        Self {
            research,
            max_bytes,
        }
    }
}

fn num_results(args: &serde_json::Value) -> Result<usize, HostError> {
    let n = match args.get("num_results") {
        None | Some(serde_json::Value::Null) => DEFAULT_NUM_RESULTS,
        Some(v) => v.as_u64().ok_or_else(|| {
            HostError::ToolValidation("num_results must be a positive integer".into())
        })?,
    };
    if !(1..=MAX_NUM_RESULTS).contains(&n) {
        return Err(HostError::ToolValidation(format!(
            "num_results must be between 1 and {MAX_NUM_RESULTS}, got {n}"
        )));
    }
    Ok(n as usize)
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web, falling back across DuckDuckGo, Google and Bing. Returns titles, URLs, and snippets."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_NUM_RESULTS,
                    "description": "Maximum number of results to return (default 10)"
                },
                "provider": {
                    "type": "string",
                    "enum": ["auto", "google", "bing", "duckduckgo"],
                    "description": "Provider to use; auto tries each configured provider in order (default auto)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, HostError> {
        let query = required_str(&args, "query")?;
        let num_results = num_results(&args)?;
        let provider = optional_str(&args, "provider", "auto")?;

        let output = self
            .research
            .web_search(query, num_results, provider)
            .await?;
        Ok(ToolResult::bounded(&output, self.max_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_search::SearchConfig;

    fn tool() -> WebSearchTool {
        let research = match WebResearch::new(&SearchConfig::default()) {
            Ok(r) => r,
            Err(e) => unreachable!("default config builds: {e}"),
        };
        WebSearchTool::new(Arc::new(research))
    }

    #[test]
    fn schema_has_required_query() {
        let schema = tool().schema();
        let required = match schema.get("required").and_then(|v| v.as_array()) {
            Some(r) => r.clone(),
            None => unreachable!("schema should have required"),
        };
        assert_eq!(required, vec![serde_json::json!("query")]);
        assert!(schema["properties"].get("num_results").is_some());
        assert!(schema["properties"].get("provider").is_some());
    }

    #[test]
    fn num_results_defaults_and_bounds() {
        assert_eq!(num_results(&serde_json::json!({})).ok(), Some(10));
        assert_eq!(num_results(&serde_json::json!({"num_results": 50})).ok(), Some(50));
        assert!(num_results(&serde_json::json!({"num_results": 0})).is_err());
        assert!(num_results(&serde_json::json!({"num_results": 51})).is_err());
        assert!(num_results(&serde_json::json!({"num_results": "ten"})).is_err());
        assert!(num_results(&serde_json::json!({"num_results": -3})).is_err());
    }

    #[tokio::test]
    async fn missing_query_returns_validation_error() {
        let err = match tool().execute(serde_json::json!({})).await {
            Err(e) => e,
            Ok(_) => unreachable!("should return error for missing query"),
        };
        assert_eq!(err.code(), "TOOL_VALIDATION");
        assert!(err.to_string().contains("query"));
    }

    #[tokio::test]
    async fn unknown_provider_returns_validation_error() {
        let err = match tool()
            .execute(serde_json::json!({"query": "rust", "provider": "altavista"}))
            .await
        {
            Err(e) => e,
            Ok(_) => unreachable!("unknown provider is a caller error"),
        };
        assert_eq!(err.code(), "TOOL_VALIDATION");
        assert!(err.to_string().contains("altavista"));
    }

    #[tokio::test]
    async fn unconfigured_provider_is_rendered_not_raised() {
        let result = tool()
            .execute(serde_json::json!({"query": "rust", "provider": "google"}))
            .await
            .expect("provider failures are part of the output in test");
        assert!(!result.truncated);
        assert!(result.content.contains("Search failed for: 'rust'"));
        assert!(result.content.contains("Google: missing credentials"));
    }

    #[test]
    fn tool_metadata() {
        let t = tool();
        assert_eq!(t.name(), "web_search");
        assert!(!t.description().is_empty());
    }
}
