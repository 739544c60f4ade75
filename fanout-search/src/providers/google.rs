//! Google provider: Custom Search JSON API.
//!
//! Needs an API key and a Programmable Search Engine id (`cx`). The API
//! returns at most 10 items per request, so larger requests are capped.

use serde::Deserialize;

use crate::config::{GoogleCredentials, GoogleSettings};
use crate::error::ProviderFailure;
use crate::provider::SearchProvider;
use crate::types::{is_web_url, ProviderName, SearchQuery, SearchResultItem, SearchResultSet};

use super::{clean_text, excerpt, status_failure};

/// Most items the Custom Search API returns for one request.
const GOOGLE_MAX_PER_REQUEST: usize = 10;

/// Google Custom Search client.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<GoogleCredentials>,
}

impl GoogleProvider {
    pub fn new(client: reqwest::Client, settings: &GoogleSettings) -> Self {
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            credentials: settings.credentials.clone(),
        }
    }
}

impl SearchProvider for GoogleProvider {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet, ProviderFailure> {
        let Some(ref creds) = self.credentials else {
            return Err(ProviderFailure::missing_credentials(
                ProviderName::Google,
                "API key or search engine id not configured",
            ));
        };

        tracing::trace!(query = query.text(), "Google search");

        let num = query
            .requested_count()
            .min(GOOGLE_MAX_PER_REQUEST)
            .to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", creds.api_key.as_str()),
                ("cx", creds.engine_id.as_str()),
                ("q", query.text()),
                ("num", num.as_str()),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProviderFailure::from_reqwest(ProviderName::Google, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderFailure::from_reqwest(ProviderName::Google, e))?;

        tracing::trace!(status = status.as_u16(), bytes = body.len(), "Google response received");

        parse_google_response(status, &body, query.requested_count())
    }

    fn name(&self) -> ProviderName {
        ProviderName::Google
    }

    fn requires_credentials(&self) -> bool {
        true
    }

    fn credentials_present(&self) -> bool {
        self.credentials.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
    error: Option<GoogleApiError>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct GoogleApiError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Classify a Custom Search API response.
///
/// Extracted as a separate function for testability with canned JSON.
fn parse_google_response(
    status: reqwest::StatusCode,
    body: &str,
    count: usize,
) -> Result<SearchResultSet, ProviderFailure> {
    let parsed = serde_json::from_str::<GoogleResponse>(body);

    if !status.is_success() {
        let message = match parsed {
            Ok(GoogleResponse {
                error: Some(err), ..
            }) => Some(err.message),
            _ => Some(excerpt(body)),
        };
        return Err(status_failure(ProviderName::Google, status, message));
    }

    let data = parsed.map_err(|e| {
        ProviderFailure::provider_error(ProviderName::Google, format!("malformed response: {e}"))
    })?;

    if let Some(err) = data.error {
        if err.code == Some(429) {
            return Err(ProviderFailure::rate_limited(ProviderName::Google, err.message));
        }
        return Err(ProviderFailure::provider_error(ProviderName::Google, err.message));
    }

    let items: Vec<SearchResultItem> = data
        .items
        .into_iter()
        .filter(|item| is_web_url(&item.link))
        .map(|item| SearchResultItem {
            title: clean_text(&item.title),
            url: item.link,
            snippet: clean_text(&item.snippet),
            source_provider: ProviderName::Google,
        })
        .collect();

    tracing::debug!(count = items.len(), "Google results parsed");
    SearchResultSet::from_items(ProviderName::Google, items, count)
}
