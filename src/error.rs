//! Error types for the fanout host.
//!
//! Each error variant carries a stable error code (SCREAMING_SNAKE_CASE)
//! that is included in the Display output and accessible via [`HostError::code()`].
//! Codes are part of the bridge protocol and will not change.

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid or unreadable configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Tool arguments failed validation.
    pub const TOOL_VALIDATION: &str = "TOOL_VALIDATION";

    /// A tool ran but could not produce a result.
    pub const TOOL_FAILED: &str = "TOOL_FAILED";

    /// Reading or writing the bridge streams or a file failed.
    pub const IO_ERROR: &str = "IO_ERROR";

    /// A bridge request line could not be parsed or named no known tool.
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
}

/// Errors produced by the fanout host.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Invalid or unreadable configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    /// Tool arguments failed validation.
    #[error("[{}] {}", error_codes::TOOL_VALIDATION, .0)]
    ToolValidation(String),

    /// A tool ran but could not produce a result.
    #[error("[{}] {}", error_codes::TOOL_FAILED, .0)]
    ToolFailed(String),

    /// I/O failure.
    #[error("[{}] {}", error_codes::IO_ERROR, .0)]
    Io(#[from] std::io::Error),

    /// Malformed bridge request.
    #[error("[{}] {}", error_codes::INVALID_REQUEST, .0)]
    InvalidRequest(String),
}

impl HostError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::ToolValidation(_) => error_codes::TOOL_VALIDATION,
            Self::ToolFailed(_) => error_codes::TOOL_FAILED,
            Self::Io(_) => error_codes::IO_ERROR,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
        }
    }
}

impl From<fanout_search::SearchError> for HostError {
    /// Caller input problems are validation errors; the rest are failures.
    fn from(err: fanout_search::SearchError) -> Self {
        match err {
            fanout_search::SearchError::Config(msg) => Self::Config(msg),
            e if e.is_caller_error() => Self::ToolValidation(e.to_string()),
            e => Self::ToolFailed(e.to_string()),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HostError>;
