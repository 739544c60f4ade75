//! Error types for the fanout-search crate.
//!
//! Two layers of failure exist. A [`ProviderFailure`] describes why one
//! provider could not answer one query; the router recovers from these by
//! moving to the next provider. A [`SearchError`] is what leaves the crate:
//! either a caller input error or a terminal routing failure that carries
//! the full chain of provider failures.
//!
//! No API keys or other secrets appear in any error message.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ProviderName;

/// Classification of a single provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The provider needs credentials and none are configured.
    MissingCredentials,
    /// The provider's call window is full, or the backend answered 429.
    RateLimited,
    /// The call did not complete within the per-call timeout.
    Timeout,
    /// Transport-level failure: DNS, connection refused, TLS.
    NetworkError,
    /// The backend answered but reported an error.
    ProviderError,
    /// The backend answered successfully with zero usable items.
    EmptyResult,
}

impl FailureKind {
    /// Short human-readable label used in logs and rendered reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing credentials",
            Self::RateLimited => "rate limited",
            Self::Timeout => "timeout",
            Self::NetworkError => "network error",
            Self::ProviderError => "provider error",
            Self::EmptyResult => "empty result",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why one provider failed to answer one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Which provider failed.
    pub provider: ProviderName,
    /// Failure classification.
    pub kind: FailureKind,
    /// Backend message or local explanation.
    pub detail: String,
}

impl ProviderFailure {
    /// Build a failure of the given kind.
    pub fn new(provider: ProviderName, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            detail: detail.into(),
        }
    }

    pub fn missing_credentials(provider: ProviderName, detail: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::MissingCredentials, detail)
    }

    pub fn rate_limited(provider: ProviderName, detail: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::RateLimited, detail)
    }

    pub fn timeout(provider: ProviderName, detail: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::Timeout, detail)
    }

    pub fn network(provider: ProviderName, detail: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::NetworkError, detail)
    }

    pub fn provider_error(provider: ProviderName, detail: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::ProviderError, detail)
    }

    pub fn empty(provider: ProviderName) -> Self {
        Self::new(provider, FailureKind::EmptyResult, "no results returned")
    }

    /// Classify a transport error from `reqwest`.
    ///
    /// Timeouts map to [`FailureKind::Timeout`]; body decoding problems mean
    /// the backend answered with something unexpected, so they map to
    /// [`FailureKind::ProviderError`]; everything else is a
    /// [`FailureKind::NetworkError`].
    pub fn from_reqwest(provider: ProviderName, err: reqwest::Error) -> Self {
        let is_timeout = err.is_timeout();
        let is_decode = err.is_decode();
        // The request URL can carry an API key as a query parameter.
        let detail = describe_error_chain(&err.without_url());
        if is_timeout {
            Self::timeout(provider, detail)
        } else if is_decode {
            Self::provider_error(provider, format!("malformed response: {detail}"))
        } else {
            Self::network(provider, detail)
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.provider, self.kind, self.detail)
    }
}

/// Render an error and its source chain as `outer: inner: innermost`.
fn describe_error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

/// Ordered list of every provider failure encountered while routing one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureChain(pub Vec<ProviderFailure>);

impl FailureChain {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, failure: ProviderFailure) {
        self.0.push(failure);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn failures(&self) -> &[ProviderFailure] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProviderFailure> {
        self.0.iter()
    }
}

impl fmt::Display for FailureChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no providers configured");
        }
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// Errors surfaced to callers of the crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// The query text or requested count is out of range.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A research depth other than quick, standard or deep was requested.
    #[error("invalid depth: {0:?} (expected quick, standard or deep)")]
    InvalidDepth(String),

    /// An explicit provider name did not match any known provider.
    #[error("unknown provider: {0:?} (expected auto, google, bing or duckduckgo)")]
    UnknownProvider(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An explicitly selected provider failed. No fallback was attempted.
    #[error("provider failed: {0}")]
    Provider(ProviderFailure),

    /// Every eligible provider failed for this query.
    #[error("all providers failed: {0}")]
    AllProvidersFailed(FailureChain),
}

impl SearchError {
    /// Whether this error was caused by caller input rather than providers.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuery(_) | Self::InvalidDepth(_) | Self::UnknownProvider(_)
        )
    }

    /// Provider failures carried by this error, in the order they occurred.
    pub fn provider_failures(&self) -> &[ProviderFailure] {
        match self {
            Self::Provider(failure) => std::slice::from_ref(failure),
            Self::AllProvidersFailed(chain) => chain.failures(),
            _ => &[],
        }
    }
}

/// Convenience type alias for fanout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
