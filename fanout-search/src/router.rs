//! Fallback routing across the provider chain.
//!
//! Given a query, the router walks the eligible providers in priority order
//! and returns the first successful answer. Each provider is tried at most
//! once per query. When every eligible provider fails, the caller receives
//! the full chain of failures in the order they happened.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{FailureChain, ProviderFailure, SearchError};
use crate::provider::{Provider, SearchProvider};
use crate::registry::ProviderRegistry;
use crate::types::{ProviderName, SearchQuery, SearchResultSet};

/// Routes queries over a shared [`ProviderRegistry`].
#[derive(Debug)]
pub struct FallbackRouter<P: SearchProvider = Provider> {
    registry: Arc<ProviderRegistry<P>>,
}

impl<P: SearchProvider> Clone for FallbackRouter<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P: SearchProvider> FallbackRouter<P> {
    pub fn new(registry: Arc<ProviderRegistry<P>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry<P>> {
        &self.registry
    }

    /// Answer `query` from the provider chain.
    ///
    /// With `explicit` set, only that provider is consulted: an ineligible
    /// provider fails immediately with the reason, and a failed call is
    /// returned as [`SearchError::Provider`] without falling back.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Provider`] when an explicitly chosen provider fails
    /// - [`SearchError::AllProvidersFailed`] when every eligible provider
    ///   fails, or none is eligible. The chain holds one entry per provider
    ///   tried (or, when none was eligible, one per configured provider).
    pub async fn route(
        &self,
        query: &SearchQuery,
        explicit: Option<ProviderName>,
    ) -> Result<SearchResultSet, SearchError> {
        match explicit {
            Some(name) => self.route_explicit(query, name).await,
            None => self.route_chain(query).await,
        }
    }

    async fn route_explicit(
        &self,
        query: &SearchQuery,
        name: ProviderName,
    ) -> Result<SearchResultSet, SearchError> {
        if let Some(reason) = self.registry.ineligibility(name, Instant::now()) {
            tracing::debug!(provider = %name, kind = %reason.kind, "explicit provider not eligible");
            self.registry.record_failure(&reason);
            return Err(SearchError::Provider(reason));
        }
        self.attempt(query, name).await.map_err(SearchError::Provider)
    }

    async fn route_chain(&self, query: &SearchQuery) -> Result<SearchResultSet, SearchError> {
        let now = Instant::now();
        let mut eligible = Vec::new();
        let mut ineligible = FailureChain::new();
        for name in self.registry.names() {
            match self.registry.ineligibility(name, now) {
                None => eligible.push(name),
                Some(reason) => ineligible.push(reason),
            }
        }

        if eligible.is_empty() {
            tracing::warn!(reasons = %ineligible, "no provider eligible");
            return Err(SearchError::AllProvidersFailed(ineligible));
        }

        let mut chain = FailureChain::new();
        for name in eligible {
            match self.attempt(query, name).await {
                Ok(set) => {
                    tracing::info!(
                        provider = %name,
                        results = set.len(),
                        fallbacks = chain.len(),
                        "search answered"
                    );
                    return Ok(set);
                }
                Err(failure) => chain.push(failure),
            }
        }

        tracing::warn!(failures = %chain, "all providers failed");
        Err(SearchError::AllProvidersFailed(chain))
    }

    /// One call to one provider under the call window and timeout.
    async fn attempt(
        &self,
        query: &SearchQuery,
        name: ProviderName,
    ) -> Result<SearchResultSet, ProviderFailure> {
        let outcome = self.call(query, name).await;
        match outcome {
            Ok(ref set) => self.registry.record_success(name, set.len()),
            Err(ref failure) => self.registry.record_failure(failure),
        }
        outcome
    }

    async fn call(
        &self,
        query: &SearchQuery,
        name: ProviderName,
    ) -> Result<SearchResultSet, ProviderFailure> {
        let Some(provider) = self.registry.provider(name) else {
            return Err(ProviderFailure::missing_credentials(
                name,
                "provider not enabled in configuration",
            ));
        };

        // A concurrent route may have filled the window since eligibility
        // was checked.
        self.registry.try_record_call(name, Instant::now())?;

        tracing::debug!(provider = %name, query = query.text(), "trying provider");

        let limit = self.registry.call_timeout();
        match tokio::time::timeout(limit, provider.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderFailure::timeout(
                name,
                format!("no response within {}s", limit.as_secs()),
            )),
        }
    }
}
