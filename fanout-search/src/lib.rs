//! # fanout-search
//!
//! Provider-fallback web search and multi-query topic research.
//!
//! Queries are answered by the first provider in a configured priority
//! chain (DuckDuckGo, Google, Bing by default) that returns results.
//! Providers without credentials or with a full call window are skipped.
//! Research expands a topic into several sub-queries, routes them
//! concurrently and merges the answers into one deduplicated report.
//!
//! ## Design
//!
//! - Provider backends behind one [`SearchProvider`] trait, dispatched via
//!   the closed [`Provider`] enum
//! - A [`ProviderRegistry`] holding credential state and per-provider
//!   sliding call windows, shared by `Arc`
//! - A [`FallbackRouter`] that never retries a provider for the same query
//!   and reports the full failure chain when everything fails
//! - A [`ResearchOrchestrator`] with a fixed per-depth plan table
//! - Plain-text renderers in [`format`] for the caller-facing operations
//!
//! ## Security
//!
//! - API keys are redacted from `Debug` output and never appear in errors
//! - No network listeners: this is a library, not a server
//! - Search queries are logged only at trace/debug level

pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod research;
pub mod router;
pub mod status;
pub mod types;
pub mod url_normalize;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use config::SearchConfig;
pub use error::{FailureChain, FailureKind, ProviderFailure, Result, SearchError};
pub use provider::{Provider, SearchProvider};
pub use registry::{ProviderDescriptor, ProviderRegistry};
pub use research::{ResearchDepth, ResearchOrchestrator, ResearchReport, SectionOutcome};
pub use router::FallbackRouter;
pub use status::ProviderStatus;
pub use types::{ProviderName, SearchQuery, SearchResultItem, SearchResultSet};

/// Parse a caller's provider selection.
///
/// `"auto"` (any case) means the full fallback chain and yields `None`.
///
/// # Errors
///
/// Returns [`SearchError::UnknownProvider`] for any other unrecognised name.
pub fn parse_provider_selection(selection: &str) -> Result<Option<ProviderName>> {
    if selection.trim().eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    selection.parse().map(Some)
}

/// The caller-facing search, research and status operations.
///
/// Built once at startup and shared. Cloning is cheap: all clones route
/// through the same registry and call windows.
#[derive(Debug)]
pub struct WebResearch<P: SearchProvider = Provider> {
    router: FallbackRouter<P>,
    orchestrator: ResearchOrchestrator<P>,
}

impl<P: SearchProvider> Clone for WebResearch<P> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            orchestrator: self.orchestrator.clone(),
        }
    }
}

impl WebResearch<Provider> {
    /// Build the registry and routing for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid configuration or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> fanout_search::Result<()> {
    /// let research = fanout_search::WebResearch::new(&fanout_search::SearchConfig::default())?;
    /// println!("{}", research.web_search("rust async runtimes", 5, "auto").await?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let registry = Arc::new(ProviderRegistry::from_config(config)?);
        Ok(Self::from_registry(registry))
    }
}

impl<P: SearchProvider> WebResearch<P> {
    pub fn from_registry(registry: Arc<ProviderRegistry<P>>) -> Self {
        let router = FallbackRouter::new(registry);
        Self {
            orchestrator: ResearchOrchestrator::new(router.clone()),
            router,
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry<P>> {
        self.router.registry()
    }

    /// Search with either the full chain (`"auto"`) or one named provider.
    ///
    /// # Errors
    ///
    /// Caller errors ([`SearchError::InvalidQuery`],
    /// [`SearchError::UnknownProvider`]) and routing failures.
    pub async fn search(
        &self,
        query: &str,
        num_results: usize,
        provider: &str,
    ) -> Result<SearchResultSet> {
        let query = SearchQuery::new(query, num_results)?;
        let explicit = parse_provider_selection(provider)?;
        self.router.route(&query, explicit).await
    }

    /// [`Self::search`] rendered as text.
    ///
    /// Provider failures are part of the answer and are rendered, not
    /// returned as errors.
    ///
    /// # Errors
    ///
    /// Only caller input errors.
    pub async fn web_search(&self, query: &str, num_results: usize, provider: &str) -> Result<String> {
        match self.search(query, num_results, provider).await {
            Ok(set) => Ok(format::format_result_set(query.trim(), &set)),
            Err(err) if err.is_caller_error() => Err(err),
            Err(err) => Ok(format::format_search_error(query.trim(), &err)),
        }
    }

    /// Research `topic` at a depth named `quick`, `standard` or `deep`.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidDepth`] or [`SearchError::InvalidQuery`].
    pub async fn research(&self, topic: &str, depth: &str) -> Result<ResearchReport> {
        let depth: ResearchDepth = depth.parse()?;
        self.orchestrator.research(topic, depth).await
    }

    /// [`Self::research`] with an overall deadline.
    ///
    /// # Errors
    ///
    /// Same as [`Self::research`].
    pub async fn research_with_deadline(
        &self,
        topic: &str,
        depth: &str,
        deadline: tokio::time::Instant,
    ) -> Result<ResearchReport> {
        let depth: ResearchDepth = depth.parse()?;
        self.orchestrator
            .research_with_deadline(topic, depth, deadline)
            .await
    }

    /// [`Self::research`] rendered as text.
    ///
    /// # Errors
    ///
    /// Same as [`Self::research`].
    pub async fn research_topic(&self, topic: &str, depth: &str) -> Result<String> {
        let report = self.research(topic, depth).await?;
        Ok(format::format_report(&report))
    }

    /// Current availability of every configured provider.
    pub fn status(&self) -> Vec<ProviderStatus> {
        status::status(self.registry())
    }

    /// [`Self::status`] rendered as text.
    pub fn search_status(&self) -> String {
        format::format_status(&self.status())
    }
}
