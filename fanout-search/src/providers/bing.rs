//! Bing provider: Web Search API v7.
//!
//! Authenticates with a subscription key header. Snippets come back with
//! inline HTML highlighting, which is stripped to plain text.

use scraper::Html;
use serde::Deserialize;

use crate::config::{BingCredentials, BingSettings};
use crate::error::ProviderFailure;
use crate::provider::SearchProvider;
use crate::types::{is_web_url, ProviderName, SearchQuery, SearchResultItem, SearchResultSet};

use super::{clean_text, excerpt, status_failure};

/// Bing Web Search client.
#[derive(Debug, Clone)]
pub struct BingProvider {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<BingCredentials>,
}

impl BingProvider {
    pub fn new(client: reqwest::Client, settings: &BingSettings) -> Self {
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            credentials: settings.credentials.clone(),
        }
    }
}

impl SearchProvider for BingProvider {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet, ProviderFailure> {
        let Some(ref creds) = self.credentials else {
            return Err(ProviderFailure::missing_credentials(
                ProviderName::Bing,
                "API key not configured",
            ));
        };

        tracing::trace!(query = query.text(), "Bing search");

        let count = query.requested_count().to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &creds.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("q", query.text()),
                ("count", count.as_str()),
                ("responseFilter", "Webpages"),
                ("textFormat", "HTML"),
            ])
            .send()
            .await
            .map_err(|e| ProviderFailure::from_reqwest(ProviderName::Bing, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderFailure::from_reqwest(ProviderName::Bing, e))?;

        tracing::trace!(status = status.as_u16(), bytes = body.len(), "Bing response received");

        parse_bing_response(status, &body, query.requested_count())
    }

    fn name(&self) -> ProviderName {
        ProviderName::Bing
    }

    fn requires_credentials(&self) -> bool {
        true
    }

    fn credentials_present(&self) -> bool {
        self.credentials.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    web_pages: Option<BingWebPages>,
    // Search errors arrive as `errors: [...]`, gateway errors as `error: {...}`.
    #[serde(default)]
    errors: Vec<BingApiError>,
    error: Option<BingApiError>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebPage>,
}

#[derive(Debug, Deserialize)]
struct BingWebPage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct BingApiError {
    #[serde(default)]
    message: String,
}

impl BingResponse {
    fn error_message(&self) -> Option<String> {
        self.error
            .iter()
            .chain(self.errors.iter())
            .map(|e| e.message.trim())
            .find(|m| !m.is_empty())
            .map(str::to_owned)
    }
}

/// Strip inline HTML (`<b>` highlighting, entities) from a snippet.
fn strip_html(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    clean_text(&parsed.root_element().text().collect::<String>())
}

/// Classify a Web Search API response.
///
/// Extracted as a separate function for testability with canned JSON.
fn parse_bing_response(
    status: reqwest::StatusCode,
    body: &str,
    count: usize,
) -> Result<SearchResultSet, ProviderFailure> {
    let parsed = serde_json::from_str::<BingResponse>(body);

    if !status.is_success() {
        let message = match parsed {
            Ok(ref data) => data.error_message(),
            Err(_) => None,
        }
        .or_else(|| Some(excerpt(body)));
        return Err(status_failure(ProviderName::Bing, status, message));
    }

    let data = parsed.map_err(|e| {
        ProviderFailure::provider_error(ProviderName::Bing, format!("malformed response: {e}"))
    })?;

    if let Some(message) = data.error_message() {
        return Err(ProviderFailure::provider_error(ProviderName::Bing, message));
    }

    let items: Vec<SearchResultItem> = data
        .web_pages
        .map(|pages| pages.value)
        .unwrap_or_default()
        .into_iter()
        .filter(|page| is_web_url(&page.url))
        .map(|page| SearchResultItem {
            title: strip_html(&page.name),
            url: page.url,
            snippet: strip_html(&page.snippet),
            source_provider: ProviderName::Bing,
        })
        .collect();

    tracing::debug!(count = items.len(), "Bing results parsed");
    SearchResultSet::from_items(ProviderName::Bing, items, count)
}
