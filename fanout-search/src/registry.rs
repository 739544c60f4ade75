//! Provider registry: configured backends, their priority and call windows.
//!
//! Built once at startup and shared by `Arc` between the router, the
//! research orchestrator and the status reporter. Each provider has an
//! independent sliding window of call instants guarded by its own mutex,
//! so concurrent routes never over-admit calls to a busy provider.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::{RateLimit, SearchConfig};
use crate::error::{ProviderFailure, SearchError};
use crate::provider::{Provider, SearchProvider};
use crate::types::ProviderName;

/// Snapshot of one provider's static properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub name: ProviderName,
    pub requires_credentials: bool,
    pub credentials_present: bool,
    /// Lower is tried first.
    pub priority: u32,
    pub rate_limit: RateLimit,
}

impl ProviderDescriptor {
    /// `true` when the provider can be called, ignoring rate limits.
    pub fn is_configured(&self) -> bool {
        !self.requires_credentials || self.credentials_present
    }
}

/// Read-only view of a provider's call window at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindowSnapshot {
    /// Calls recorded inside the current window.
    pub used: u32,
    pub max_calls: u32,
    pub window: Duration,
    /// Time until the oldest call ages out, when the window is full.
    pub retry_after: Option<Duration>,
}

impl RateWindowSnapshot {
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max_calls
    }

    pub fn remaining(&self) -> u32 {
        self.max_calls.saturating_sub(self.used)
    }
}

/// Sliding window of call instants for one provider.
#[derive(Debug)]
struct RateWindow {
    limit: RateLimit,
    calls: VecDeque<Instant>,
}

impl RateWindow {
    fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            calls: VecDeque::new(),
        }
    }

    /// Drop instants that have aged out of the window ending at `now`.
    fn prune(&mut self, now: Instant) {
        let window = self.limit.window();
        while let Some(&first) = self.calls.front() {
            if now.saturating_duration_since(first) >= window {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }

    fn snapshot(&mut self, now: Instant) -> RateWindowSnapshot {
        self.prune(now);
        let used = u32::try_from(self.calls.len()).unwrap_or(u32::MAX);
        let retry_after = if used >= self.limit.max_calls {
            self.calls.front().map(|&oldest| {
                self.limit
                    .window()
                    .saturating_sub(now.saturating_duration_since(oldest))
            })
        } else {
            None
        };
        RateWindowSnapshot {
            used,
            max_calls: self.limit.max_calls,
            window: self.limit.window(),
            retry_after,
        }
    }

    /// Record a call if the window has room, otherwise report the wait.
    fn try_record(&mut self, now: Instant) -> Result<(), Duration> {
        let snapshot = self.snapshot(now);
        if snapshot.is_exhausted() {
            return Err(snapshot.retry_after.unwrap_or(snapshot.window));
        }
        self.calls.push_back(now);
        Ok(())
    }

    fn record(&mut self, now: Instant) {
        self.prune(now);
        self.calls.push_back(now);
    }
}

#[derive(Debug)]
struct RegistryEntry<P> {
    provider: P,
    priority: u32,
    window: Mutex<RateWindow>,
}

impl<P: SearchProvider> RegistryEntry<P> {
    fn descriptor(&self) -> ProviderDescriptor {
        let window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        ProviderDescriptor {
            name: self.provider.name(),
            requires_credentials: self.provider.requires_credentials(),
            credentials_present: self.provider.credentials_present(),
            priority: self.priority,
            rate_limit: window.limit,
        }
    }

    fn snapshot(&self, now: Instant) -> RateWindowSnapshot {
        self.window
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot(now)
    }
}

/// Formats a retry delay for failure details.
pub(crate) fn retry_detail(retry_after: Duration) -> String {
    format!(
        "call window full, retry in {}s",
        retry_after.as_secs().saturating_add(1)
    )
}

/// The set of providers the router may call, in priority order.
///
/// Generic over the provider type so routing can be exercised with mock
/// backends; production code uses the default [`Provider`] enum.
#[derive(Debug)]
pub struct ProviderRegistry<P: SearchProvider = Provider> {
    entries: Vec<RegistryEntry<P>>,
    call_timeout: Duration,
}

impl ProviderRegistry<Provider> {
    /// Build the registry for every provider listed in `config.priority`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid, or
    /// [`SearchError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let entries = config
            .priority
            .iter()
            .map(|&name| {
                Provider::from_config(name, config)
                    .map(|provider| (provider, config.rate_limit_for(name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let registry = Self::with_entries(entries, config.timeout());
        tracing::debug!(
            providers = ?registry.names(),
            "provider registry built"
        );
        Ok(registry)
    }
}

impl<P: SearchProvider> ProviderRegistry<P> {
    /// Build a registry from providers already in priority order.
    pub fn with_entries(entries: Vec<(P, RateLimit)>, call_timeout: Duration) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(idx, (provider, limit))| RegistryEntry {
                provider,
                priority: u32::try_from(idx).unwrap_or(u32::MAX),
                window: Mutex::new(RateWindow::new(limit)),
            })
            .collect();
        Self {
            entries,
            call_timeout,
        }
    }

    /// Upper bound on one provider call.
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Names of all configured providers in priority order.
    pub fn names(&self) -> Vec<ProviderName> {
        self.entries.iter().map(|e| e.provider.name()).collect()
    }

    pub fn provider(&self, name: ProviderName) -> Option<&P> {
        self.entry(name).map(|e| &e.provider)
    }

    /// Descriptors for every configured provider, eligible or not.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.entries.iter().map(RegistryEntry::descriptor).collect()
    }

    pub fn descriptor(&self, name: ProviderName) -> Option<ProviderDescriptor> {
        self.entry(name).map(RegistryEntry::descriptor)
    }

    /// Providers that may be called right now, in priority order.
    pub fn eligible_providers(&self) -> Vec<ProviderDescriptor> {
        self.eligible_providers_at(Instant::now())
    }

    /// [`Self::eligible_providers`] evaluated at `now`.
    pub fn eligible_providers_at(&self, now: Instant) -> Vec<ProviderDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.provider.is_configured() && !e.snapshot(now).is_exhausted())
            .map(RegistryEntry::descriptor)
            .collect()
    }

    /// Why `name` cannot be called at `now`, or `None` if it can.
    ///
    /// Providers that are not configured at all report
    /// [`crate::error::FailureKind::MissingCredentials`].
    pub fn ineligibility(&self, name: ProviderName, now: Instant) -> Option<ProviderFailure> {
        let Some(entry) = self.entry(name) else {
            return Some(ProviderFailure::missing_credentials(
                name,
                "provider not enabled in configuration",
            ));
        };
        if !entry.provider.is_configured() {
            return Some(ProviderFailure::missing_credentials(
                name,
                "credentials not configured",
            ));
        }
        let snapshot = entry.snapshot(now);
        if snapshot.is_exhausted() {
            let wait = snapshot.retry_after.unwrap_or(snapshot.window);
            return Some(ProviderFailure::rate_limited(name, retry_detail(wait)));
        }
        None
    }

    /// Atomically check the call window and record a call at `now`.
    ///
    /// # Errors
    ///
    /// Returns a `RateLimited` failure, recording nothing, when the window
    /// is already full.
    pub fn try_record_call(&self, name: ProviderName, now: Instant) -> Result<(), ProviderFailure> {
        let Some(entry) = self.entry(name) else {
            return Err(ProviderFailure::missing_credentials(
                name,
                "provider not enabled in configuration",
            ));
        };
        entry
            .window
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .try_record(now)
            .map_err(|wait| ProviderFailure::rate_limited(name, retry_detail(wait)))
    }

    /// Record a call at `now` without checking the window.
    pub fn record_call(&self, name: ProviderName, now: Instant) {
        if let Some(entry) = self.entry(name) {
            entry
                .window
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .record(now);
        }
    }

    /// Note a successful call. Observational only.
    pub fn record_success(&self, name: ProviderName, items: usize) {
        tracing::debug!(provider = %name, items, "provider call succeeded");
    }

    /// Note a failed call. Observational only: failures never change
    /// eligibility beyond what the call window already says.
    pub fn record_failure(&self, failure: &ProviderFailure) {
        tracing::warn!(
            provider = %failure.provider,
            kind = %failure.kind,
            detail = %failure.detail,
            "provider call failed"
        );
    }

    /// Call-window occupancy for `name` at `now`.
    pub fn rate_window(&self, name: ProviderName, now: Instant) -> Option<RateWindowSnapshot> {
        self.entry(name).map(|e| e.snapshot(now))
    }

    fn entry(&self, name: ProviderName) -> Option<&RegistryEntry<P>> {
        self.entries.iter().find(|e| e.provider.name() == name)
    }
}
