//! Provider availability reporting.
//!
//! A pure read of the registry: no network calls, no side effects. Calling
//! [`status`] twice with nothing routed in between gives identical answers.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::provider::SearchProvider;
use crate::registry::{ProviderRegistry, RateWindowSnapshot};
use crate::types::ProviderName;

/// Why a provider cannot be called right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unavailability {
    MissingCredentials,
    RateLimited {
        /// Time until a call slot frees up.
        retry_after: Duration,
    },
}

/// Occupancy of a provider's call window, in serialisable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub used: u32,
    pub max_calls: u32,
    pub window_seconds: u64,
}

impl From<RateWindowSnapshot> for RateLimitStatus {
    fn from(snapshot: RateWindowSnapshot) -> Self {
        Self {
            used: snapshot.used,
            max_calls: snapshot.max_calls,
            window_seconds: snapshot.window.as_secs(),
        }
    }
}

/// Availability of one configured provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub name: ProviderName,
    pub available: bool,
    pub reason: Option<Unavailability>,
    pub rate_limit: RateLimitStatus,
    /// What the operator must set to enable this provider. Only present
    /// while credentials are missing.
    pub config_hint: Option<&'static str>,
}

/// Configuration hint for a provider.
pub fn config_hint(name: ProviderName) -> &'static str {
    match name {
        ProviderName::Google => {
            "Set GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID environment variables"
        }
        ProviderName::Bing => "Set BING_SEARCH_API_KEY environment variable",
        ProviderName::DuckDuckGo => "No API key required",
    }
}

/// Status of every configured provider, in priority order.
pub fn status<P: SearchProvider>(registry: &ProviderRegistry<P>) -> Vec<ProviderStatus> {
    status_at(registry, Instant::now())
}

/// [`status`] evaluated at `now`.
pub fn status_at<P: SearchProvider>(
    registry: &ProviderRegistry<P>,
    now: Instant,
) -> Vec<ProviderStatus> {
    registry
        .descriptors()
        .into_iter()
        .map(|descriptor| {
            let snapshot = registry
                .rate_window(descriptor.name, now)
                .unwrap_or(RateWindowSnapshot {
                    used: 0,
                    max_calls: descriptor.rate_limit.max_calls,
                    window: descriptor.rate_limit.window(),
                    retry_after: None,
                });

            let reason = if !descriptor.is_configured() {
                Some(Unavailability::MissingCredentials)
            } else if snapshot.is_exhausted() {
                Some(Unavailability::RateLimited {
                    retry_after: snapshot.retry_after.unwrap_or(snapshot.window),
                })
            } else {
                None
            };

            ProviderStatus {
                name: descriptor.name,
                available: reason.is_none(),
                reason,
                rate_limit: snapshot.into(),
                config_hint: matches!(reason, Some(Unavailability::MissingCredentials))
                    .then(|| config_hint(descriptor.name)),
            }
        })
        .collect()
}
