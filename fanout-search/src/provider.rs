//! The search capability shared by every provider backend.
//!
//! Each backend (Google, Bing, DuckDuckGo) implements [`SearchProvider`].
//! The registry stores them as the closed [`Provider`] enum, so dispatch is
//! a `match` on a tagged variant rather than a lookup by name string.

use std::future::Future;

use crate::config::SearchConfig;
use crate::error::{ProviderFailure, SearchError};
use crate::http;
use crate::providers::{BingProvider, DuckDuckGoProvider, GoogleProvider};
use crate::types::{ProviderName, SearchQuery, SearchResultSet};

/// A search backend that answers one query with one HTTP round trip.
///
/// Implementations classify every outcome themselves:
///
/// - credentials required but absent: fail with
///   [`crate::error::FailureKind::MissingCredentials`] without touching the network
/// - transport problems: `Timeout` or `NetworkError`
/// - backend-reported errors: `ProviderError` (or `RateLimited` for 429)
/// - zero parsed items: `EmptyResult`
///
/// Successful sets keep the backend's ranking order and hold at most
/// `query.requested_count()` items.
///
/// All implementations must be `Send + Sync` so one registry can serve
/// concurrent requests.
pub trait SearchProvider: Send + Sync {
    /// Run `query` against this backend.
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<SearchResultSet, ProviderFailure>> + Send;

    /// Which provider this is.
    fn name(&self) -> ProviderName;

    /// Whether this backend needs credentials at all.
    fn requires_credentials(&self) -> bool;

    /// Whether the credentials it needs are configured.
    fn credentials_present(&self) -> bool;

    /// `true` when the provider can be called, ignoring rate limits.
    fn is_configured(&self) -> bool {
        !self.requires_credentials() || self.credentials_present()
    }
}

/// The closed set of provider backends.
#[derive(Debug, Clone)]
pub enum Provider {
    Google(GoogleProvider),
    Bing(BingProvider),
    DuckDuckGo(DuckDuckGoProvider),
}

impl Provider {
    /// Build the backend for `name` from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn from_config(name: ProviderName, config: &SearchConfig) -> Result<Self, SearchError> {
        let client = http::build_client(config)?;
        Ok(match name {
            ProviderName::Google => Self::Google(GoogleProvider::new(client, &config.google)),
            ProviderName::Bing => Self::Bing(BingProvider::new(client, &config.bing)),
            ProviderName::DuckDuckGo => {
                Self::DuckDuckGo(DuckDuckGoProvider::new(client, &config.duckduckgo))
            }
        })
    }
}

impl SearchProvider for Provider {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet, ProviderFailure> {
        match self {
            Self::Google(p) => p.search(query).await,
            Self::Bing(p) => p.search(query).await,
            Self::DuckDuckGo(p) => p.search(query).await,
        }
    }

    fn name(&self) -> ProviderName {
        match self {
            Self::Google(p) => p.name(),
            Self::Bing(p) => p.name(),
            Self::DuckDuckGo(p) => p.name(),
        }
    }

    fn requires_credentials(&self) -> bool {
        match self {
            Self::Google(p) => p.requires_credentials(),
            Self::Bing(p) => p.requires_credentials(),
            Self::DuckDuckGo(p) => p.requires_credentials(),
        }
    }

    fn credentials_present(&self) -> bool {
        match self {
            Self::Google(p) => p.credentials_present(),
            Self::Bing(p) => p.credentials_present(),
            Self::DuckDuckGo(p) => p.credentials_present(),
        }
    }
}
