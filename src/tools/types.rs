//! Core tool types for the fanout tool surface.
//!
//! Defines the [`Tool`] trait that all tools implement and [`ToolResult`]
//! for capturing bounded execution output.

use async_trait::async_trait;

use crate::error::HostError;

/// Default maximum output size (100 KB).
pub const DEFAULT_MAX_BYTES: usize = 100 * 1024;

/// Output of a successful tool execution.
///
/// Failures are reported as [`HostError`] from [`Tool::execute`], so a
/// `ToolResult` always carries content (bounded to `max_bytes`) plus a flag
/// indicating whether that content was truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Output content (bounded).
    pub content: String,
    /// Whether the output was truncated to fit within max_bytes.
    pub truncated: bool,
}

impl ToolResult {
    /// Create a tool result with complete output.
    pub fn success(content: String) -> Self {
        Self {
            content,
            truncated: false,
        }
    }

    /// Create a tool result whose output was cut short.
    pub fn success_truncated(content: String) -> Self {
        Self {
            content,
            truncated: true,
        }
    }

    /// Bound `output` to `max_bytes` and wrap it as a success.
    pub fn bounded(output: &str, max_bytes: usize) -> Self {
        let (content, was_truncated) = truncate_output(output, max_bytes);
        if was_truncated {
            Self::success_truncated(content)
        } else {
            Self::success(content)
        }
    }
}

/// Truncate a string to at most `max_bytes`, respecting UTF-8 boundaries.
///
/// Returns `(truncated_string, was_truncated)`.
pub fn truncate_output(s: &str, max_bytes: usize) -> (String, bool) {
    if s.len() <= max_bytes {
        return (s.to_string(), false);
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    let truncated = &s[..end];
    (
        format!("{truncated}\n\n[output truncated at {max_bytes} bytes]"),
        true,
    )
}

/// A caller-facing operation exposed over the bridge.
///
/// All tools must be `Send + Sync`; the bridge holds them behind `Arc`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (e.g. "web_search").
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's arguments.
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with the given JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::ToolValidation`] for bad arguments and
    /// [`HostError::ToolFailed`] when the tool cannot produce output.
    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, HostError>;
}

/// Read a required, non-blank string argument.
pub(crate) fn required_str<'a>(args: &'a serde_json::Value, key: &str) -> Result<&'a str, HostError> {
    let value = args
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| HostError::ToolValidation(format!("missing required argument: {key}")))?;
    if value.trim().is_empty() {
        return Err(HostError::ToolValidation(format!("{key} must not be empty")));
    }
    Ok(value)
}

/// Read an optional string argument, falling back to `default`.
pub(crate) fn optional_str<'a>(
    args: &'a serde_json::Value,
    key: &str,
    default: &'a str,
) -> Result<&'a str, HostError> {
    match args.get(key) {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(v) => v
            .as_str()
            .ok_or_else(|| HostError::ToolValidation(format!("{key} must be a string"))),
    }
}
