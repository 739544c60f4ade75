//! DuckDuckGo provider: HTML endpoint plus Instant Answer fallback.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`
//! which requires no JavaScript and no credentials. When that page yields
//! no organic results, the Instant Answer API is asked for an abstract and
//! related topics before the call is classified as empty.

use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::config::DuckDuckGoSettings;
use crate::error::ProviderFailure;
use crate::provider::SearchProvider;
use crate::types::{is_web_url, ProviderName, SearchQuery, SearchResultItem, SearchResultSet};

use super::{clean_text, status_failure};

/// Longest title derived from an Instant Answer topic text.
const MAX_TOPIC_TITLE_CHARS: usize = 100;

/// DuckDuckGo client. Always configured: no credentials are needed.
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    html_endpoint: String,
    instant_answer_endpoint: String,
    instant_answer_fallback: bool,
    safe_search: bool,
}

impl DuckDuckGoProvider {
    pub fn new(client: reqwest::Client, settings: &DuckDuckGoSettings) -> Self {
        Self {
            client,
            html_endpoint: settings.html_endpoint.clone(),
            instant_answer_endpoint: settings.instant_answer_endpoint.clone(),
            instant_answer_fallback: settings.instant_answer_fallback,
            safe_search: settings.safe_search,
        }
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    /// We parse out the `uddg` query parameter and URL-decode it.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }

    async fn fetch_html(&self, query: &SearchQuery) -> Result<String, ProviderFailure> {
        let mut params = vec![("q", query.text()), ("kl", "us-en")];
        if self.safe_search {
            params.push(("kp", "1"));
        }

        let response = self
            .client
            .post(&self.html_endpoint)
            .form(&params)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| ProviderFailure::from_reqwest(ProviderName::DuckDuckGo, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_failure(ProviderName::DuckDuckGo, status, None));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ProviderFailure::from_reqwest(ProviderName::DuckDuckGo, e))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo HTML received");
        Ok(html)
    }

    /// Ask the Instant Answer API. Failures here only mean "nothing extra".
    async fn fetch_instant_answer(&self, query: &SearchQuery) -> Vec<SearchResultItem> {
        let request = self
            .client
            .get(&self.instant_answer_endpoint)
            .query(&[
                ("q", query.text()),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        let response = match request {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e.without_url(), "DuckDuckGo instant answer request failed");
                return Vec::new();
            }
        };

        match response.text().await {
            Ok(body) => parse_instant_answer(&body, query.requested_count()),
            Err(e) => {
                tracing::debug!(error = %e.without_url(), "DuckDuckGo instant answer read failed");
                Vec::new()
            }
        }
    }
}

impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet, ProviderFailure> {
        tracing::trace!(query = query.text(), "DuckDuckGo search");

        let html = self.fetch_html(query).await?;
        let mut items = parse_duckduckgo_html(&html, query.requested_count())?;

        if items.is_empty() && self.instant_answer_fallback {
            tracing::debug!("DuckDuckGo HTML page had no results; trying instant answer");
            items = self.fetch_instant_answer(query).await;
        }

        SearchResultSet::from_items(ProviderName::DuckDuckGo, items, query.requested_count())
    }

    fn name(&self) -> ProviderName {
        ProviderName::DuckDuckGo
    }

    fn requires_credentials(&self) -> bool {
        false
    }

    fn credentials_present(&self) -> bool {
        false
    }
}

/// Parse DuckDuckGo HTML response into result items.
///
/// Extracted as a separate function for testability with mock HTML.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResultItem>, ProviderFailure> {
    let document = Html::parse_document(html);

    let selector = |css: &str| {
        Selector::parse(css).map_err(|e| {
            ProviderFailure::provider_error(
                ProviderName::DuckDuckGo,
                format!("invalid selector {css:?}: {e:?}"),
            )
        })
    };
    let result_sel = selector(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = clean_text(&title_el.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el
            .value()
            .attr("href")
            .and_then(DuckDuckGoProvider::extract_url)
        else {
            continue;
        };

        // Internal links (settings, "more results") are not results.
        if !is_web_url(&url) || is_duckduckgo_host(&url) {
            continue;
        }

        // A page can list the same organic result twice (e.g. sitelinks).
        if results.iter().any(|r: &SearchResultItem| r.url == url) {
            continue;
        }

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>()))
            .unwrap_or_default();

        results.push(SearchResultItem {
            title,
            url,
            snippet,
            source_provider: ProviderName::DuckDuckGo,
        });

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}

fn is_duckduckgo_host(raw: &str) -> bool {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com")))
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "Abstract", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

/// Either a topic (`Text` + `FirstURL`) or a named group of nested topics.
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(rename = "Topics", default)]
    topics: Vec<RelatedTopic>,
}

/// Turn an Instant Answer payload into result items.
///
/// The abstract (when present) comes first, followed by related topics in
/// the order given, with topic groups flattened. Malformed JSON yields no
/// items.
fn parse_instant_answer(body: &str, max_results: usize) -> Vec<SearchResultItem> {
    let answer: InstantAnswer = match serde_json::from_str(body) {
        Ok(a) => a,
        Err(e) => {
            tracing::debug!(error = %e, "DuckDuckGo instant answer was not valid JSON");
            return Vec::new();
        }
    };

    let mut items = Vec::new();

    if !answer.abstract_text.trim().is_empty() && is_web_url(&answer.abstract_url) {
        let title = if answer.heading.trim().is_empty() {
            "DuckDuckGo Summary".to_owned()
        } else {
            clean_text(&answer.heading)
        };
        items.push(SearchResultItem {
            title,
            url: answer.abstract_url,
            snippet: clean_text(&answer.abstract_text),
            source_provider: ProviderName::DuckDuckGo,
        });
    }

    let mut stack: Vec<&RelatedTopic> = answer.related_topics.iter().rev().collect();
    while let Some(topic) = stack.pop() {
        if items.len() >= max_results {
            break;
        }
        if !topic.topics.is_empty() {
            stack.extend(topic.topics.iter().rev());
            continue;
        }
        let (Some(text), Some(url)) = (&topic.text, &topic.first_url) else {
            continue;
        };
        let text = clean_text(text);
        if text.is_empty() || !is_web_url(url) || items.iter().any(|i| &i.url == url) {
            continue;
        }
        items.push(SearchResultItem {
            title: truncate_chars(&text, MAX_TOPIC_TITLE_CHARS),
            url: url.clone(),
            snippet: text,
            source_provider: ProviderName::DuckDuckGo,
        });
    }

    items.truncate(max_results);
    items
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}
