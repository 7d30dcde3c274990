//! Counters for translation lookups and dictionary loads.
//!
//! Each `I18n` service owns its own metrics instance, so tests and multiple
//! services never share counters.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct I18nMetrics {
    /// Lookups that resolved to a translation
    lookup_hits: AtomicUsize,

    /// Lookups that fell back to the caller's default
    lookup_misses: AtomicUsize,

    /// Dictionary fetches attempted (one per load, retries not counted)
    fetches: AtomicUsize,

    /// Dictionary fetches that failed after retries
    fetch_failures: AtomicUsize,

    /// Loads that fell back to the default language
    fallbacks: AtomicUsize,
}

impl I18nMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lookup_hit(&self) {
        self.lookup_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_miss(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Snapshot of all counters.
    pub fn report(&self) -> MetricsReport {
        let hits = self.lookup_hits.load(Ordering::Relaxed);
        let misses = self.lookup_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let lookup_hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookup_hits: hits,
            lookup_misses: misses,
            lookup_hit_rate,
            fetches: self.fetches(),
            fetch_failures: self.fetch_failures(),
            fallbacks: self.fallbacks(),
        }
    }
}

/// Point-in-time view of the i18n counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub lookup_hits: usize,
    pub lookup_misses: usize,

    /// Lookup hit rate as a percentage (0-100)
    pub lookup_hit_rate: f64,

    pub fetches: usize,
    pub fetch_failures: usize,
    pub fallbacks: usize,
}
