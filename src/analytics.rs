//! Running usage statistics.
//!
//! Counters (cache hits/misses, backend calls/failures) are lock-free atomics.
//! Per-pair and global averages live behind one mutex so a single `record`
//! updates them together; averages are true incremental means.

use crate::types::{TranslationRequest, TranslationResult};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for one `source-target` pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairStats {
    pub requests: u64,
    pub average_quality: f64,
    pub average_confidence: f64,
    /// Average source text length in characters
    pub average_length: f64,
}

impl PairStats {
    fn record(&mut self, quality: f64, confidence: f64, length: f64) {
        self.requests += 1;
        let n = self.requests as f64;
        self.average_quality += (quality - self.average_quality) / n;
        self.average_confidence += (confidence - self.average_confidence) / n;
        self.average_length += (length - self.average_length) / n;
    }
}

#[derive(Debug, Default)]
struct Aggregates {
    pairs: BTreeMap<String, PairStats>,
    translations: u64,
    average_quality: f64,
    average_processing_ms: f64,
    total_cost: f64,
}

/// Read-only copy of the analytics state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    /// Translations that ran the full pipeline (cache hits excluded)
    pub total_translations: u64,
    /// Keyed by `source-target`
    pub language_pairs: BTreeMap<String, PairStats>,
    pub average_quality: f64,
    pub average_processing_time_ms: f64,
    pub total_cost: f64,

    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Percentage (0-100)
    pub cache_hit_rate: f64,

    pub backend_calls: u64,
    pub backend_failures: u64,
    /// Percentage (0-100)
    pub backend_success_rate: f64,
}

#[derive(Default)]
pub struct AnalyticsAggregator {
    aggregates: Mutex<Aggregates>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    backend_calls: AtomicU64,
    backend_failures: AtomicU64,
}

impl AnalyticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed, non-cached translation.
    pub fn record(&self, request: &TranslationRequest, result: &TranslationResult) {
        let pair = format!(
            "{}-{}",
            result.metadata.source_language, result.metadata.target_language
        );
        let length = request.source_text.chars().count() as f64;

        let mut aggregates = self.aggregates.lock();
        aggregates.pairs.entry(pair).or_default().record(
            result.quality.overall,
            result.confidence,
            length,
        );

        aggregates.translations += 1;
        let n = aggregates.translations as f64;
        aggregates.average_quality += (result.quality.overall - aggregates.average_quality) / n;
        aggregates.average_processing_ms +=
            (result.metadata.processing_time_ms as f64 - aggregates.average_processing_ms) / n;
        aggregates.total_cost += result.metadata.cost;
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend_call(&self) {
        self.backend_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend_failure(&self) {
        self.backend_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Analytics {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let cache_hit_rate = percentage(hits, hits + misses);

        let calls = self.backend_calls.load(Ordering::Relaxed);
        let failures = self.backend_failures.load(Ordering::Relaxed);
        let backend_success_rate = percentage(calls.saturating_sub(failures), calls);

        let aggregates = self.aggregates.lock();
        Analytics {
            total_translations: aggregates.translations,
            language_pairs: aggregates.pairs.clone(),
            average_quality: aggregates.average_quality,
            average_processing_time_ms: aggregates.average_processing_ms,
            total_cost: aggregates.total_cost,
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            backend_calls: calls,
            backend_failures: failures,
            backend_success_rate,
        }
    }

    /// Reset everything to zero.
    pub fn reset(&self) {
        *self.aggregates.lock() = Aggregates::default();
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.backend_calls.store(0, Ordering::Relaxed);
        self.backend_failures.store(0, Ordering::Relaxed);
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
