//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the fallback order, provider credentials and
//! endpoints, per-provider rate limits and the per-call timeout. It is
//! serde-friendly so the host can load it from TOML; every field has a
//! default, so an empty file is a valid configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::ProviderName;

/// Default Google Custom Search JSON API endpoint.
pub const GOOGLE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Default Bing Web Search v7 endpoint.
pub const BING_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";

/// Default DuckDuckGo HTML (no JavaScript) endpoint.
pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Default DuckDuckGo Instant Answer API endpoint.
pub const DUCKDUCKGO_INSTANT_ANSWER_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// A sliding-window call budget for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Calls allowed inside one window.
    pub max_calls: u32,
    /// Window length in seconds.
    pub window_seconds: u64,
}

impl RateLimit {
    pub fn new(max_calls: u32, window_seconds: u64) -> Self {
        Self {
            max_calls,
            window_seconds,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Default budget for a provider.
    ///
    /// Derived from the minimum spacing each backend tolerates between
    /// requests: 1.5s for DuckDuckGo, 0.5s for Bing, 0.1s for Google.
    pub fn default_for(provider: ProviderName) -> Self {
        match provider {
            ProviderName::DuckDuckGo => Self::new(40, 60),
            ProviderName::Bing => Self::new(120, 60),
            ProviderName::Google => Self::new(600, 60),
        }
    }

    fn validate(&self, provider: ProviderName) -> Result<(), SearchError> {
        if self.max_calls == 0 {
            return Err(SearchError::Config(format!(
                "{provider} rate_limit.max_calls must be greater than 0"
            )));
        }
        if self.window_seconds == 0 {
            return Err(SearchError::Config(format!(
                "{provider} rate_limit.window_seconds must be greater than 0"
            )));
        }
        Ok(())
    }
}

/// Google API key plus Custom Search engine id (`cx`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

/// Bing subscription key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingCredentials {
    pub api_key: String,
}

impl fmt::Debug for BingCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BingCredentials")
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "[EMPTY]"
    } else {
        "[REDACTED]"
    }
}

/// Google provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// `None` leaves Google permanently ineligible.
    pub credentials: Option<GoogleCredentials>,
    pub endpoint: String,
    /// Overrides [`RateLimit::default_for`] when set.
    pub rate_limit: Option<RateLimit>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            credentials: None,
            endpoint: GOOGLE_ENDPOINT.to_owned(),
            rate_limit: None,
        }
    }
}

/// Bing provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BingSettings {
    /// `None` leaves Bing permanently ineligible.
    pub credentials: Option<BingCredentials>,
    pub endpoint: String,
    pub rate_limit: Option<RateLimit>,
}

impl Default for BingSettings {
    fn default() -> Self {
        Self {
            credentials: None,
            endpoint: BING_ENDPOINT.to_owned(),
            rate_limit: None,
        }
    }
}

/// DuckDuckGo provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuckDuckGoSettings {
    pub html_endpoint: String,
    pub instant_answer_endpoint: String,
    /// Consult the Instant Answer API when the HTML page yields nothing.
    pub instant_answer_fallback: bool,
    /// Ask DuckDuckGo for strict safe search.
    pub safe_search: bool,
    pub rate_limit: Option<RateLimit>,
}

impl Default for DuckDuckGoSettings {
    fn default() -> Self {
        Self {
            html_endpoint: DUCKDUCKGO_HTML_ENDPOINT.to_owned(),
            instant_answer_endpoint: DUCKDUCKGO_INSTANT_ANSWER_ENDPOINT.to_owned(),
            instant_answer_fallback: true,
            safe_search: true,
            rate_limit: None,
        }
    }
}

/// Configuration for the provider registry and router.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fallback order. Providers earlier in the list are tried first.
    pub priority: Vec<ProviderName>,
    pub google: GoogleSettings,
    pub bing: BingSettings,
    pub duckduckgo: DuckDuckGoSettings,
    /// Per-call HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            priority: vec![
                ProviderName::DuckDuckGo,
                ProviderName::Google,
                ProviderName::Bing,
            ],
            google: GoogleSettings::default(),
            bing: BingSettings::default(),
            duckduckgo: DuckDuckGoSettings::default(),
            timeout_seconds: 10,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Per-call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Effective rate limit for a provider: the override if set, otherwise
    /// the built-in default.
    pub fn rate_limit_for(&self, provider: ProviderName) -> RateLimit {
        let configured = match provider {
            ProviderName::Google => self.google.rate_limit,
            ProviderName::Bing => self.bing.rate_limit,
            ProviderName::DuckDuckGo => self.duckduckgo.rate_limit,
        };
        configured.unwrap_or_else(|| RateLimit::default_for(provider))
    }

    /// Priority rank of a provider (lower is tried first), or `None` when the
    /// provider is not part of the fallback order.
    pub fn priority_of(&self, provider: ProviderName) -> Option<u32> {
        self.priority
            .iter()
            .position(|p| *p == provider)
            .map(|idx| idx as u32)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `priority` must not be empty or contain duplicates
    /// - `timeout_seconds` must be greater than 0
    /// - rate-limit overrides must have non-zero calls and window
    /// - configured credential pairs must not contain empty fields
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.priority.is_empty() {
            return Err(SearchError::Config(
                "at least one provider must be listed in priority".into(),
            ));
        }
        for (idx, provider) in self.priority.iter().enumerate() {
            if self.priority[..idx].contains(provider) {
                return Err(SearchError::Config(format!(
                    "provider {provider} listed twice in priority"
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        for provider in ProviderName::all() {
            self.rate_limit_for(*provider).validate(*provider)?;
        }
        if let Some(ref creds) = self.google.credentials {
            if creds.api_key.trim().is_empty() || creds.engine_id.trim().is_empty() {
                return Err(SearchError::Config(
                    "Google credentials need both api_key and engine_id".into(),
                ));
            }
        }
        if let Some(ref creds) = self.bing.credentials {
            if creds.api_key.trim().is_empty() {
                return Err(SearchError::Config("Bing api_key must not be empty".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.user_agent.is_none());
        assert!(config.google.credentials.is_none());
        assert!(config.bing.credentials.is_none());
        assert!(config.duckduckgo.instant_answer_fallback);
    }

    #[test]
    fn default_priority_puts_duckduckgo_first() {
        let config = SearchConfig::default();
        assert_eq!(
            config.priority,
            vec![
                ProviderName::DuckDuckGo,
                ProviderName::Google,
                ProviderName::Bing
            ]
        );
        assert_eq!(config.priority_of(ProviderName::DuckDuckGo), Some(0));
        assert_eq!(config.priority_of(ProviderName::Bing), Some(2));
    }

    #[test]
    fn priority_of_unlisted_provider_is_none() {
        let config = SearchConfig {
            priority: vec![ProviderName::DuckDuckGo],
            ..Default::default()
        };
        assert_eq!(config.priority_of(ProviderName::Google), None);
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_priority_rejected() {
        let config = SearchConfig {
            priority: vec![],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("priority"));
    }

    #[test]
    fn duplicate_priority_rejected() {
        let config = SearchConfig {
            priority: vec![ProviderName::Bing, ProviderName::Bing],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn zero_rate_limit_rejected() {
        let mut config = SearchConfig::default();
        config.bing.rate_limit = Some(RateLimit::new(0, 60));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_calls"));

        config.bing.rate_limit = Some(RateLimit::new(5, 0));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window_seconds"));
    }

    #[test]
    fn rate_limit_override_replaces_default() {
        let mut config = SearchConfig::default();
        assert_eq!(
            config.rate_limit_for(ProviderName::DuckDuckGo),
            RateLimit::new(40, 60)
        );
        config.duckduckgo.rate_limit = Some(RateLimit::new(2, 10));
        assert_eq!(
            config.rate_limit_for(ProviderName::DuckDuckGo),
            RateLimit::new(2, 10)
        );
    }

    #[test]
    fn empty_google_engine_id_rejected() {
        let mut config = SearchConfig::default();
        config.google.credentials = Some(GoogleCredentials {
            api_key: "key".into(),
            engine_id: " ".into(),
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("engine_id"));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = GoogleCredentials {
            api_key: "super-secret".into(),
            engine_id: "cx-123".into(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));

        let bing = BingCredentials {
            api_key: "bing-secret".into(),
        };
        assert!(!format!("{bing:?}").contains("bing-secret"));
    }

    #[test]
    fn deserializes_from_partial_json() {
        let json = r#"{
            "priority": ["Google", "DuckDuckGo"],
            "bing": { "credentials": { "api_key": "k" } },
            "timeout_seconds": 4
        }"#;
        let config: SearchConfig = serde_json::from_str(json).expect("deserialize");
        assert_eq!(
            config.priority,
            vec![ProviderName::Google, ProviderName::DuckDuckGo]
        );
        assert_eq!(config.timeout_seconds, 4);
        assert_eq!(config.bing.endpoint, BING_ENDPOINT);
        assert!(config.bing.credentials.is_some());
        assert!(config.validate().is_ok());
    }
}
