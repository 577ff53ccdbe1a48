//! Weighted backend ranking.
//!
//! `score = 0.5·quality + 0.2·costEfficiency + 0.15·speed + 0.15·specialization`
//!
//! - `costEfficiency = max(0, (COST_CEILING - cost) / COST_CEILING)`
//! - `speed = min(1, chars_per_second / SPEED_CEILING)`
//! - `specialization` is [`SPECIALIZATION_BONUS`] when the backend is a cultural
//!   specialist and either language of the pair has a culturally rich context

use crate::backend::{BackendProfile, BackendRegistry, RegisteredBackend};
use crate::catalog::LanguageCatalog;
use crate::error::TranslateError;
use std::cmp::Ordering;
use std::sync::Arc;

const QUALITY_WEIGHT: f64 = 0.5;
const COST_WEIGHT: f64 = 0.2;
const SPEED_WEIGHT: f64 = 0.15;
const SPECIALIZATION_WEIGHT: f64 = 0.15;

/// Reference cost per character; anything at or above it earns no cost credit
pub const COST_CEILING: f64 = 0.00005;
/// Reference throughput in characters per second
pub const SPEED_CEILING: f64 = 1000.0;
pub const SPECIALIZATION_BONUS: f64 = 1.0;

/// Pure scoring function over a profile.
pub fn score(profile: &BackendProfile, culturally_rich_pair: bool) -> f64 {
    let cost_efficiency = ((COST_CEILING - profile.cost_per_char) / COST_CEILING).max(0.0);
    let speed = (profile.chars_per_second / SPEED_CEILING).clamp(0.0, 1.0);
    let specialization = if profile.cultural_specialist && culturally_rich_pair {
        SPECIALIZATION_BONUS
    } else {
        0.0
    };

    QUALITY_WEIGHT * profile.quality
        + COST_WEIGHT * cost_efficiency
        + SPEED_WEIGHT * speed
        + SPECIALIZATION_WEIGHT * specialization
}

/// A candidate backend and its score.
#[derive(Debug, Clone)]
pub struct RankedBackend {
    pub entry: RegisteredBackend,
    pub score: f64,
}

pub struct EngineSelector {
    backends: Arc<BackendRegistry>,
    catalog: Arc<LanguageCatalog>,
}

impl EngineSelector {
    pub fn new(backends: Arc<BackendRegistry>, catalog: Arc<LanguageCatalog>) -> Self {
        Self { backends, catalog }
    }

    /// Every enabled backend covering the pair, best first.
    ///
    /// Ordering is by score descending, then backend id ascending.
    pub fn rank(&self, source: &str, target: &str) -> Vec<RankedBackend> {
        let rich =
            self.catalog.is_culturally_rich(source) || self.catalog.is_culturally_rich(target);

        let mut ranked: Vec<RankedBackend> = self
            .backends
            .snapshot()
            .into_iter()
            .filter(|entry| entry.profile.enabled && entry.profile.supports(source, target))
            .map(|entry| RankedBackend {
                score: score(&entry.profile, rich),
                entry,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.entry.profile.id.cmp(&b.entry.profile.id))
        });
        ranked
    }

    /// The best backend for the pair.
    pub fn select(&self, source: &str, target: &str) -> Result<RegisteredBackend, TranslateError> {
        self.rank(source, target)
            .into_iter()
            .next()
            .map(|ranked| ranked.entry)
            .ok_or_else(|| TranslateError::no_engine(source, target))
    }
}
