//! Core types for queries, providers and normalised results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProviderFailure, SearchError};

/// Number of results requested when the caller does not say.
pub const DEFAULT_RESULT_COUNT: usize = 10;

/// Largest number of results a single query may request.
pub const MAX_RESULT_COUNT: usize = 50;

/// Search providers that fanout can route queries to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderName {
    /// Google Custom Search JSON API. Needs an API key and an engine id.
    #[serde(alias = "google")]
    Google,
    /// Bing Web Search API. Needs an API key.
    #[serde(alias = "bing")]
    Bing,
    /// DuckDuckGo HTML endpoint. No credentials.
    #[serde(alias = "duckduckgo")]
    DuckDuckGo,
}

impl ProviderName {
    /// Returns the human-readable name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
            Self::DuckDuckGo => "DuckDuckGo",
        }
    }

    /// Returns all provider variants in declaration order.
    pub fn all() -> &'static [ProviderName] {
        &[Self::Google, Self::Bing, Self::DuckDuckGo]
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderName {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "bing" => Ok(Self::Bing),
            "duckduckgo" | "ddg" => Ok(Self::DuckDuckGo),
            _ => Err(SearchError::UnknownProvider(s.to_owned())),
        }
    }
}

/// A validated search request.
///
/// Created per call and never mutated. Construction trims the text and
/// checks that the requested count lies within `1..=50`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    requested_count: usize,
}

impl SearchQuery {
    /// Build a query, rejecting empty text or an out-of-range count.
    pub fn new(text: &str, requested_count: usize) -> Result<Self, SearchError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SearchError::InvalidQuery("query must not be empty".into()));
        }
        if !(1..=MAX_RESULT_COUNT).contains(&requested_count) {
            return Err(SearchError::InvalidQuery(format!(
                "requested count must be between 1 and {MAX_RESULT_COUNT}, got {requested_count}"
            )));
        }
        Ok(Self {
            text: text.to_owned(),
            requested_count,
        })
    }

    /// Build a query asking for [`DEFAULT_RESULT_COUNT`] results.
    pub fn with_default_count(text: &str) -> Result<Self, SearchError> {
        Self::new(text, DEFAULT_RESULT_COUNT)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn requested_count(&self) -> usize {
        self.requested_count
    }
}

/// One normalised search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// Page title.
    pub title: String,
    /// Absolute `http(s)` URL of the page.
    pub url: String,
    /// Plain-text summary of the page.
    pub snippet: String,
    /// Which provider returned this item.
    pub source_provider: ProviderName,
}

/// A successful answer from one provider.
///
/// Every construction path, deserialisation included, goes through
/// [`SearchResultSet::from_items`], so a successful set is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawResultSet")]
pub struct SearchResultSet {
    items: Vec<SearchResultItem>,
    provider_used: ProviderName,
    succeeded: bool,
}

/// Wire shape of a [`SearchResultSet`]; `succeeded` is derived, not trusted.
#[derive(Deserialize)]
struct RawResultSet {
    items: Vec<SearchResultItem>,
    provider_used: ProviderName,
}

impl TryFrom<RawResultSet> for SearchResultSet {
    type Error = ProviderFailure;

    fn try_from(raw: RawResultSet) -> Result<Self, Self::Error> {
        let count = raw.items.len();
        Self::from_items(raw.provider_used, raw.items, count)
    }
}

impl SearchResultSet {
    /// Wrap a provider's parsed items.
    ///
    /// Keeps at most `count` items in provider order. An empty list is
    /// reclassified as an [`crate::error::FailureKind::EmptyResult`] failure.
    pub fn from_items(
        provider: ProviderName,
        mut items: Vec<SearchResultItem>,
        count: usize,
    ) -> Result<Self, ProviderFailure> {
        items.truncate(count);
        if items.is_empty() {
            return Err(ProviderFailure::empty(provider));
        }
        Ok(Self {
            items,
            provider_used: provider,
            succeeded: true,
        })
    }

    pub fn items(&self) -> &[SearchResultItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<SearchResultItem> {
        self.items
    }

    pub fn provider_used(&self) -> ProviderName {
        self.provider_used
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keep only the items for which `keep` returns `true`.
    ///
    /// Used by research deduplication. The set stays marked as succeeded
    /// because the provider did answer; the research section is retained
    /// even when nothing is left.
    pub(crate) fn retain_items(&mut self, keep: impl FnMut(&SearchResultItem) -> bool) {
        self.items.retain(keep);
    }
}

/// Returns `true` if `raw` parses as an absolute `http` or `https` URL.
pub(crate) fn is_web_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
