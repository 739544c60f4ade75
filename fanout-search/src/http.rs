//! Shared HTTP client construction for provider requests.
//!
//! The DuckDuckGo HTML endpoint turns away requests that look automated, so
//! the client sends a browser Accept-Language and, unless `user_agent` is set,
//! a User-Agent drawn from [`USER_AGENTS`] once per client.

use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Browser User-Agent strings used when none is configured.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

const MAX_REDIRECTS: usize = 5;

/// Build the [`reqwest::Client`] every provider shares.
///
/// The per-call timeout from `config` covers the whole request, body
/// included. Responses may be brotli or gzip encoded.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the TLS backend cannot be initialised.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let user_agent = user_agent_for(config);
    tracing::debug!(%user_agent, timeout = ?config.timeout(), "building provider client");

    reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(user_agent)
        .default_headers(browser_headers())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// The configured User-Agent, or a random browser one when unset or blank.
pub fn user_agent_for(config: &SearchConfig) -> String {
    config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .unwrap_or_else(|| {
            USER_AGENTS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(USER_AGENTS[0])
        })
        .to_owned()
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}
