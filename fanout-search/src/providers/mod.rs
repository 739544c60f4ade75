//! Search provider backends.
//!
//! Each module provides a struct implementing [`crate::provider::SearchProvider`]
//! for one backend, plus a pure parsing function that can be tested against
//! canned responses.

pub mod bing;
pub mod duckduckgo;
pub mod google;

pub use bing::BingProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use google::GoogleProvider;

use crate::error::ProviderFailure;
use crate::types::ProviderName;

/// Longest slice of an unparseable error body carried into a failure detail.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Classify a non-success HTTP status.
///
/// 429 means the backend is throttling us; everything else is the backend
/// reporting an error. `message` is the backend's own explanation when the
/// body could be parsed.
pub(crate) fn status_failure(
    provider: ProviderName,
    status: reqwest::StatusCode,
    message: Option<String>,
) -> ProviderFailure {
    let detail = match message {
        Some(msg) if !msg.trim().is_empty() => format!("HTTP {}: {}", status.as_u16(), msg.trim()),
        _ => format!("HTTP {}", status.as_u16()),
    };
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        ProviderFailure::rate_limited(provider, detail)
    } else {
        ProviderFailure::provider_error(provider, detail)
    }
}

/// Shorten a raw response body for inclusion in a failure detail.
pub(crate) fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}

/// Collapse runs of whitespace and trim.
pub(crate) fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use reqwest::StatusCode;

    #[test]
    fn too_many_requests_is_rate_limited() {
        let failure = status_failure(ProviderName::Bing, StatusCode::TOO_MANY_REQUESTS, None);
        assert_eq!(failure.kind, FailureKind::RateLimited);
        assert_eq!(failure.detail, "HTTP 429");
    }

    #[test]
    fn other_statuses_are_provider_errors() {
        let failure = status_failure(
            ProviderName::Google,
            StatusCode::FORBIDDEN,
            Some("API key not valid".into()),
        );
        assert_eq!(failure.kind, FailureKind::ProviderError);
        assert_eq!(failure.detail, "HTTP 403: API key not valid");
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let body = "x".repeat(500);
        let short = excerpt(&body);
        assert_eq!(short.len(), MAX_ERROR_BODY_CHARS + 3);
        assert!(short.ends_with("..."));
        assert_eq!(excerpt("  short  "), "short");
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a \n\t b   c "), "a b c");
    }
}
