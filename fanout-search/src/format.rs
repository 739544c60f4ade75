//! Plain-text rendering of results, reports and provider status.
//!
//! Every renderer is total and deterministic. Items are always laid out as
//! title, URL, snippet, provider, in that order.

use std::fmt::Write;

use crate::error::{ProviderFailure, SearchError};
use crate::research::{ResearchReport, SectionOutcome};
use crate::status::{ProviderStatus, Unavailability};
use crate::types::{SearchResultItem, SearchResultSet};

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
    out.push('\n');
}

fn item(out: &mut String, index: usize, entry: &SearchResultItem, snippet_label: &str) {
    let _ = writeln!(out, "{index}. **{}**", entry.title);
    let _ = writeln!(out, "   URL: {}", entry.url);
    let _ = writeln!(out, "   {snippet_label}: {}", entry.snippet);
    let _ = writeln!(out, "   Source: {}", entry.source_provider);
    out.push('\n');
}

fn providers_tried(out: &mut String, failures: &[ProviderFailure]) {
    let tried: Vec<String> = failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.kind))
        .collect();
    let _ = writeln!(
        out,
        "No results available, providers tried: [{}]",
        tried.join(", ")
    );
    for failure in failures {
        let _ = writeln!(out, "- {failure}");
    }
}

/// Render a successful search.
pub fn format_result_set(query: &str, set: &SearchResultSet) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Web Search Results for: '{query}'"));
    for (idx, entry) in set.items().iter().enumerate() {
        item(&mut out, idx + 1, entry, "Snippet");
    }
    let _ = writeln!(
        out,
        "Provider used: {} ({} results)",
        set.provider_used(),
        set.len()
    );
    out
}

/// Render a failed search.
pub fn format_search_error(query: &str, err: &SearchError) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Search failed for: '{query}'");
    match err {
        SearchError::Provider(_) | SearchError::AllProvidersFailed(_) => {
            providers_tried(&mut out, err.provider_failures());
        }
        other => {
            let _ = writeln!(out, "Error: {other}");
        }
    }
    out
}

/// Render a research report, one section per sub-query in plan order.
pub fn format_report(report: &ResearchReport) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Research Report: {}", report.topic));
    let _ = writeln!(out, "Research Depth: {}", capitalize(report.depth.as_str()));
    let _ = writeln!(out, "Search Queries: {}", report.sections.len());
    let _ = writeln!(out, "Total Sources Found: {}", report.total_sources());
    out.push('\n');

    for (idx, section) in report.sections.iter().enumerate() {
        let _ = writeln!(out, "## Search Topic {}: {}", idx + 1, section.sub_query);
        out.push('\n');
        match section.outcome {
            SectionOutcome::Found(ref set) if set.is_empty() => {
                let _ = writeln!(
                    out,
                    "No results available: every result from {} already appears above",
                    set.provider_used()
                );
                out.push('\n');
            }
            SectionOutcome::Found(ref set) => {
                for (n, entry) in set.items().iter().enumerate() {
                    item(&mut out, n + 1, entry, "Summary");
                }
            }
            SectionOutcome::Failed(ref err) => {
                if err.provider_failures().is_empty() {
                    let _ = writeln!(out, "No results available: {err}");
                } else {
                    providers_tried(&mut out, err.provider_failures());
                }
                out.push('\n');
            }
            SectionOutcome::DeadlineExceeded => {
                let _ = writeln!(out, "No results available: not finished before the deadline");
                out.push('\n');
            }
        }
    }

    if report.total_sources() == 0 {
        let _ = writeln!(
            out,
            "No research results found. Check the topic or try different search terms."
        );
    }
    out
}

/// Render provider availability.
pub fn format_status(statuses: &[ProviderStatus]) -> String {
    let mut out = String::new();
    heading(&mut out, "Web Search Provider Status");

    for status in statuses {
        let _ = writeln!(out, "**{}**", status.name);
        let availability = match status.reason {
            None => "Yes".to_owned(),
            Some(Unavailability::MissingCredentials) => "No (configuration needed)".to_owned(),
            Some(Unavailability::RateLimited { retry_after }) => format!(
                "No (rate limited, retry in {}s)",
                retry_after.as_secs().saturating_add(1)
            ),
        };
        let _ = writeln!(out, "- Available: {availability}");
        let _ = writeln!(
            out,
            "- Rate Limit: {}/{} calls used in a {}s window",
            status.rate_limit.used, status.rate_limit.max_calls, status.rate_limit.window_seconds
        );
        if let Some(hint) = status.config_hint {
            let _ = writeln!(out, "- Config: {hint}");
        }
        out.push('\n');
    }

    let available = statuses.iter().filter(|s| s.available).count();
    let _ = writeln!(
        out,
        "Summary: {available}/{} providers available",
        statuses.len()
    );
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
