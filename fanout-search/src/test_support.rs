//! Scripted providers for router and research tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::RateLimit;
use crate::error::{FailureKind, ProviderFailure};
use crate::provider::SearchProvider;
use crate::registry::ProviderRegistry;
use crate::types::{ProviderName, SearchQuery, SearchResultItem, SearchResultSet};

/// What a [`ScriptedProvider`] does when called.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Return these URLs for every query.
    Fixed(Vec<&'static str>),
    /// Return `n` URLs derived from the query text.
    Echo(usize),
    /// Fail with this kind.
    Fail(FailureKind),
    /// Sleep before answering like `Echo(n)`.
    Slow(Duration, usize),
    /// Like `Slow`, with the delay looked up by query text (zero if absent).
    Staggered(Vec<(&'static str, Duration)>, usize),
}

#[derive(Debug)]
pub(crate) struct ScriptedProvider {
    name: ProviderName,
    needs_credentials: bool,
    has_credentials: bool,
    script: Script,
    calls: Arc<AtomicUsize>,
    finished: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub(crate) fn new(name: ProviderName, script: Script) -> Self {
        Self {
            name,
            needs_credentials: false,
            has_credentials: false,
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider that needs credentials and has none.
    pub(crate) fn unconfigured(name: ProviderName) -> Self {
        Self {
            needs_credentials: true,
            ..Self::new(name, Script::Echo(3))
        }
    }

    /// A provider that needs credentials and has them.
    pub(crate) fn credentialed(name: ProviderName, script: Script) -> Self {
        Self {
            needs_credentials: true,
            has_credentials: true,
            ..Self::new(name, script)
        }
    }

    /// Shared counter of calls that reached `search`.
    pub(crate) fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Query texts in the order their calls returned.
    pub(crate) fn finish_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.finished)
    }
}

pub(crate) fn slug(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join("-")
}

fn echo_items(name: ProviderName, query: &SearchQuery, n: usize) -> Vec<SearchResultItem> {
    (0..n)
        .map(|i| SearchResultItem {
            title: format!("{} result {i}", query.text()),
            url: format!("https://example.com/{}/{i}", slug(query.text())),
            snippet: format!("About {}", query.text()),
            source_provider: name,
        })
        .collect()
}

impl SearchProvider for ScriptedProvider {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items = match &self.script {
            Script::Fixed(urls) => urls
                .iter()
                .enumerate()
                .map(|(i, url)| SearchResultItem {
                    title: format!("Fixed {i}"),
                    url: (*url).to_owned(),
                    snippet: "fixed".into(),
                    source_provider: self.name,
                })
                .collect(),
            Script::Echo(n) => echo_items(self.name, query, *n),
            Script::Fail(kind) => {
                return Err(ProviderFailure::new(self.name, *kind, "scripted failure"));
            }
            Script::Slow(delay, n) => {
                tokio::time::sleep(*delay).await;
                echo_items(self.name, query, *n)
            }
            Script::Staggered(delays, n) => {
                let delay = delays
                    .iter()
                    .find(|(text, _)| *text == query.text())
                    .map_or(Duration::ZERO, |(_, d)| *d);
                tokio::time::sleep(delay).await;
                echo_items(self.name, query, *n)
            }
        };
        self.finished
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query.text().to_owned());
        SearchResultSet::from_items(self.name, items, query.requested_count())
    }

    fn name(&self) -> ProviderName {
        self.name
    }

    fn requires_credentials(&self) -> bool {
        self.needs_credentials
    }

    fn credentials_present(&self) -> bool {
        self.has_credentials
    }
}

/// Registry over scripted providers with a roomy call window.
pub(crate) fn registry(providers: Vec<ScriptedProvider>) -> Arc<ProviderRegistry<ScriptedProvider>> {
    registry_with_limit(providers, RateLimit::new(100, 60))
}

pub(crate) fn registry_with_limit(
    providers: Vec<ScriptedProvider>,
    limit: RateLimit,
) -> Arc<ProviderRegistry<ScriptedProvider>> {
    Arc::new(ProviderRegistry::with_entries(
        providers.into_iter().map(|p| (p, limit)).collect(),
        Duration::from_secs(10),
    ))
}
