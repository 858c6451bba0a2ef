//! Translation metrics and observability module.
//!
//! Tracks cache hit rates, upstream calls, cold starts and fallbacks.
//! One instance is owned by the gateway and shared with its pipeline, so
//! tests get fresh counters per gateway.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for translation operations.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Number of times a translation was found in cache
    cache_hits: AtomicUsize,

    /// Number of times a translation was not found in cache
    cache_misses: AtomicUsize,

    /// Number of translations requested from the upstream (retries excluded)
    api_calls: AtomicUsize,

    /// Number of upstream translations that ended in an error
    api_failures: AtomicUsize,

    /// Number of "model loading" responses seen from the upstream
    cold_starts: AtomicUsize,

    /// Number of results that fell back to the original text
    fallbacks: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cold_start(&self) {
        self.cold_starts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    pub fn cold_starts(&self) -> usize {
        self.cold_starts.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.api_calls();
        let failures = self.api_failures();
        let api_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
            cold_starts: self.cold_starts(),
            fallbacks: self.fallbacks(),
        }
    }
}

/// Metrics report containing current translation statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub cache_hits: usize,

    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub api_calls: usize,

    pub api_failures: usize,

    /// API success rate as a percentage (0-100)
    pub api_success_rate: f64,

    pub cold_starts: usize,

    pub fallbacks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_cache_hit() {
        let metrics = TranslationMetrics::new();

        assert_eq!(metrics.cache_hits(), 0);
        metrics.record_cache_hit();
        assert_eq!(metrics.cache_hits(), 1);
        metrics.record_cache_hit();
        assert_eq!(metrics.cache_hits(), 2);
    }

    #[test]
    fn test_record_cold_start_and_fallback() {
        let metrics = TranslationMetrics::new();

        metrics.record_cold_start();
        metrics.record_cold_start();
        metrics.record_fallback();

        assert_eq!(metrics.cold_starts(), 2);
        assert_eq!(metrics.fallbacks(), 1);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = TranslationMetrics::new().report();

        assert_eq!(report.cache_hits, 0);
        assert_eq!(report.cache_misses, 0);
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.api_calls, 0);
        assert_eq!(report.api_success_rate, 0.0);
    }

    #[test]
    fn test_report_cache_hit_rate() {
        let metrics = TranslationMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_report_api_success_rate() {
        let metrics = TranslationMetrics::new();

        // 4 calls, 1 failure = 75% success rate
        for _ in 0..4 {
            metrics.record_api_call();
        }
        metrics.record_api_failure();

        let report = metrics.report();
        assert_eq!(report.api_calls, 4);
        assert_eq!(report.api_failures, 1);
        assert_eq!(report.api_success_rate, 75.0);
    }

    #[test]
    fn test_report_all_api_failures() {
        let metrics = TranslationMetrics::new();

        metrics.record_api_call();
        metrics.record_api_failure();
        metrics.record_api_call();
        metrics.record_api_failure();

        assert_eq!(metrics.report().api_success_rate, 0.0);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let metrics = TranslationMetrics::new();
        metrics.record_cache_hit();

        let json = serde_json::to_value(metrics.report()).expect("Should serialize");
        assert_eq!(json["cacheHits"], 1);
        assert!(json.get("coldStarts").is_some());
    }

    #[test]
    fn test_instances_are_independent() {
        let a = TranslationMetrics::new();
        let b = TranslationMetrics::new();
        a.record_api_call();
        assert_eq!(a.api_calls(), 1);
        assert_eq!(b.api_calls(), 0);
    }
}
