//! Stdin/stdout JSON bridge for the tool surface.
//!
//! Reads newline-delimited JSON requests, dispatches each to a tool in the
//! [`ToolRegistry`], and writes one JSON response line per request.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{HostError, Result};
use crate::tools::ToolRegistry;

/// Pseudo-tool that returns the schemas of every registered tool.
pub const LIST_TOOLS: &str = "list_tools";

/// One request line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BridgeRequest {
    /// Echoed back verbatim in the response. Any JSON value.
    #[serde(default)]
    pub id: serde_json::Value,
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Coded error carried by a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeError {
    pub code: &'static str,
    pub message: String,
}

impl From<&HostError> for BridgeError {
    fn from(err: &HostError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeResponse {
    pub id: serde_json::Value,
    pub ok: bool,
    /// Rendered text for tools, the schema array for `list_tools`.
    pub content: serde_json::Value,
    pub error: Option<BridgeError>,
    pub truncated: bool,
}

impl BridgeResponse {
    fn ok(id: serde_json::Value, content: serde_json::Value, truncated: bool) -> Self {
        Self {
            id,
            ok: true,
            content,
            error: None,
            truncated,
        }
    }

    fn error(id: serde_json::Value, err: &HostError) -> Self {
        Self {
            id,
            ok: false,
            content: serde_json::Value::String(String::new()),
            error: Some(err.into()),
            truncated: false,
        }
    }
}

/// Run the bridge over the process's stdin and stdout until EOF.
///
/// # Errors
///
/// Returns [`HostError::Io`] if stdin cannot be read or stdout written.
pub async fn run_stdio_bridge(tools: &ToolRegistry) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let mut writer = BufWriter::new(tokio::io::stdout());
    run_bridge(tools, reader, &mut writer).await
}

/// Read `reader` line-by-line, dispatch each request, and write responses.
///
/// Blank lines are skipped. A malformed line produces an
/// `INVALID_REQUEST` response and the loop continues.
///
/// # Errors
///
/// Only I/O failures on the streams end the loop early.
pub async fn run_bridge<R, W>(tools: &ToolRegistry, mut reader: R, writer: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tracing::info!(tools = ?tools.list_available(), "bridge ready");
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        // EOF
        if bytes_read == 0 {
            tracing::info!("input closed (EOF); shutting down bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = handle_line(tools, trimmed).await;
        let json = serde_json::to_string(&response)
            .map_err(|e| HostError::ToolFailed(format!("failed to serialize response: {e}")))?;
        write_line(writer, &json).await?;
    }

    Ok(())
}

/// Parse and dispatch one request line.
pub async fn handle_line(tools: &ToolRegistry, line: &str) -> BridgeResponse {
    match serde_json::from_str::<BridgeRequest>(line) {
        Ok(request) => dispatch(tools, request).await,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse bridge request");
            tracing::debug!(raw_line = %line, "unparsed request");
            let err = HostError::InvalidRequest(format!("failed to parse request: {e}"));
            BridgeResponse::error(serde_json::Value::Null, &err)
        }
    }
}

/// Run one request against the registry.
pub async fn dispatch(tools: &ToolRegistry, request: BridgeRequest) -> BridgeResponse {
    let BridgeRequest { id, tool, args } = request;

    if tool == LIST_TOOLS {
        return BridgeResponse::ok(id, serde_json::Value::Array(tools.schemas_for_api()), false);
    }

    let Some(handler) = tools.get(&tool) else {
        let err = HostError::InvalidRequest(format!(
            "unknown tool: {tool:?} (available: {})",
            tools.list_available().join(", ")
        ));
        return BridgeResponse::error(id, &err);
    };

    tracing::debug!(tool = %tool, "dispatching tool call");
    match handler.execute(args).await {
        Ok(result) => {
            BridgeResponse::ok(id, serde_json::Value::String(result.content), result.truncated)
        }
        Err(e) => {
            tracing::warn!(tool = %tool, error = %e, "tool call failed");
            BridgeResponse::error(id, &e)
        }
    }
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, ToolResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Upper;

    #[async_trait]
    impl Tool for Upper {
        fn name(&self) -> &str {
            "upper"
        }
        fn description(&self) -> &str {
            "Uppercase the text argument"
        }
        fn schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "required": ["text"]})
        }
        async fn execute(&self, args: serde_json::Value) -> std::result::Result<ToolResult, HostError> {
            let text = args
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| HostError::ToolValidation("missing required argument: text".into()))?;
            Ok(ToolResult::success(text.to_uppercase()))
        }
    }

    struct Broken;

    #[async_trait]
    impl Tool for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(&self, _args: serde_json::Value) -> std::result::Result<ToolResult, HostError> {
            Err(HostError::ToolFailed("backend unavailable".into()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Upper));
        registry.register(Arc::new(Broken));
        registry
    }

    async fn run(input: &str) -> Vec<serde_json::Value> {
        let mut out: Vec<u8> = Vec::new();
        run_bridge(&registry(), input.as_bytes(), &mut out)
            .await
            .expect("bridge runs in test");
        String::from_utf8(out)
            .expect("utf8 in test")
            .lines()
            .map(|l| serde_json::from_str(l).expect("each line is JSON in test"))
            .collect()
    }

    #[tokio::test]
    async fn dispatches_and_echoes_id() {
        let responses = run(r#"{"id": 7, "tool": "upper", "args": {"text": "rust"}}"#).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 7);
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[0]["content"], "RUST");
        assert_eq!(responses[0]["truncated"], false);
        assert!(responses[0]["error"].is_null());
    }

    #[tokio::test]
    async fn malformed_line_gets_error_and_loop_continues() {
        let input = "not json\n\n{\"id\": \"b\", \"tool\": \"upper\", \"args\": {\"text\": \"ok\"}}\n";
        let responses = run(input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["ok"], false);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[0]["error"]["code"], "INVALID_REQUEST");
        assert_eq!(responses[1]["id"], "b");
        assert_eq!(responses[1]["content"], "OK");
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_request() {
        let responses = run(r#"{"id": 1, "tool": "nope"}"#).await;
        assert_eq!(responses[0]["error"]["code"], "INVALID_REQUEST");
        let message = responses[0]["error"]["message"].as_str().unwrap_or_default();
        assert!(message.contains("broken, upper"));
    }

    #[tokio::test]
    async fn validation_error_keeps_code() {
        let responses = run(r#"{"id": 2, "tool": "upper", "args": {}}"#).await;
        assert_eq!(responses[0]["ok"], false);
        assert_eq!(responses[0]["error"]["code"], "TOOL_VALIDATION");
    }

    #[tokio::test]
    async fn tool_failure_keeps_code() {
        let responses = run(r#"{"id": 3, "tool": "broken"}"#).await;
        assert_eq!(responses[0]["error"]["code"], "TOOL_FAILED");
        let message = responses[0]["error"]["message"].as_str().unwrap_or_default();
        assert!(message.contains("backend unavailable"));
    }

    #[tokio::test]
    async fn list_tools_returns_schemas() {
        let responses = run(r#"{"tool": "list_tools"}"#).await;
        let schemas = responses[0]["content"].as_array().cloned().unwrap_or_default();
        let names: Vec<&str> = schemas.iter().filter_map(|s| s["name"].as_str()).collect();
        assert_eq!(names, vec!["broken", "upper"]);
        assert!(responses[0]["id"].is_null());
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        assert!(run("").await.is_empty());
        assert!(run("\n   \n").await.is_empty());
    }
}
