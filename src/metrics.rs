//! Translator observability counters.
//!
//! Counts credential exchanges, translation calls and news searches so the
//! HTTP API can report how often the bearer token is refreshed and how
//! reliable the upstream services are.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Translator metrics. Use [`TranslationMetrics::global`] in production code.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Credential exchanges started against the identity endpoint
    token_exchanges: AtomicUsize,

    /// Credential exchanges that failed
    token_exchange_failures: AtomicUsize,

    /// Single-language calls to the translation endpoint
    api_calls: AtomicUsize,

    /// Translation calls that failed (transport, upstream or protocol)
    api_failures: AtomicUsize,

    /// Calls to the news search endpoint
    search_calls: AtomicUsize,

    /// News searches that failed
    search_failures: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<TranslationMetrics> = OnceLock::new();

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the global translation metrics instance.
    pub fn global() -> &'static TranslationMetrics {
        METRICS.get_or_init(TranslationMetrics::new)
    }

    pub fn record_token_exchange(&self) {
        self.token_exchanges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_token_exchange_failure(&self) {
        self.token_exchange_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_call(&self) {
        self.search_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_failure(&self) {
        self.search_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn token_exchanges(&self) -> usize {
        self.token_exchanges.load(Ordering::Relaxed)
    }

    pub fn token_exchange_failures(&self) -> usize {
        self.token_exchange_failures.load(Ordering::Relaxed)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::Relaxed)
    }

    pub fn search_failures(&self) -> usize {
        self.search_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let calls = self.api_calls();
        // Counters are read independently, so clamp in case a failure landed
        // between the two loads
        let failures = self.api_failures().min(calls);
        let api_success_rate = if calls > 0 {
            ((calls - failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            token_exchanges: self.token_exchanges(),
            token_exchange_failures: self.token_exchange_failures(),
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
            search_calls: self.search_calls(),
            search_failures: self.search_failures(),
        }
    }
}

/// Snapshot of the translator counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub token_exchanges: usize,
    pub token_exchange_failures: usize,
    pub api_calls: usize,
    pub api_failures: usize,

    /// API success rate as a percentage (0-100)
    pub api_success_rate: f64,

    pub search_calls: usize,
    pub search_failures: usize,
}
