//! Translation backends.
//!
//! The pipeline never translates by itself. It ranks the registered backends
//! and invokes the chosen one through [`TranslationBackend::translate`].
//!
//! - [`HttpBackend`] talks to a LibreTranslate-compatible HTTP service
//! - [`MockBackend`] is deterministic and network-free, for tests and demos
//! - [`BackendRegistry`] holds the registered backends and their enabled flags

mod http;
mod mock;
mod registry;

pub use http::{load_descriptors, BackendDescriptor, HttpBackend};
pub use mock::{MockBackend, MockMode};
pub use registry::{BackendRegistry, RegisteredBackend};

use crate::error::{BackendError, TranslateError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Static description of a backend, used for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendProfile {
    pub id: String,

    /// Engine family reported in result metadata (e.g., "neural", "llm")
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    /// Language codes this backend can translate between
    pub languages: BTreeSet<String>,

    /// Quality rating in [0,1]
    pub quality: f64,

    /// Cost per source character
    #[serde(default)]
    pub cost_per_char: f64,

    /// Throughput in characters per second
    #[serde(default)]
    pub chars_per_second: f64,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether the backend is tuned for culturally rich language pairs
    #[serde(default)]
    pub cultural_specialist: bool,
}

fn default_kind() -> String {
    "neural".to_string()
}

fn default_true() -> bool {
    true
}

impl BackendProfile {
    pub fn new(id: impl Into<String>, languages: &[&str], quality: f64) -> Self {
        Self {
            id: id.into(),
            kind: default_kind(),
            languages: languages.iter().map(|code| code.to_string()).collect(),
            quality,
            cost_per_char: 0.0,
            chars_per_second: 0.0,
            enabled: true,
            cultural_specialist: false,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_cost(mut self, cost_per_char: f64) -> Self {
        self.cost_per_char = cost_per_char;
        self
    }

    pub fn with_speed(mut self, chars_per_second: f64) -> Self {
        self.chars_per_second = chars_per_second;
        self
    }

    pub fn with_specialist(mut self, cultural_specialist: bool) -> Self {
        self.cultural_specialist = cultural_specialist;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Rejects profiles that would make ranking meaningless: an empty id, a
    /// quality outside [0,1], or a negative or non-finite cost or speed.
    pub fn validate(&self) -> Result<(), TranslateError> {
        if self.id.trim().is_empty() {
            return Err(TranslateError::Validation("backend id must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(TranslateError::Validation(format!(
                "backend '{}': quality must be within [0, 1], got {}",
                self.id, self.quality
            )));
        }
        for (field, value) in [
            ("costPerChar", self.cost_per_char),
            ("charsPerSecond", self.chars_per_second),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TranslateError::Validation(format!(
                    "backend '{}': {} must be a finite non-negative number, got {}",
                    self.id, field, value
                )));
            }
        }
        Ok(())
    }

    /// Whether both codes are in the supported set.
    pub fn supports(&self, source: &str, target: &str) -> bool {
        self.languages.contains(source) && self.languages.contains(target)
    }

    /// Estimated cost of translating `text`.
    pub fn estimate_cost(&self, text: &str) -> f64 {
        self.cost_per_char * text.chars().count() as f64
    }
}

/// Uniform raw machine translation contract.
///
/// Implementations must be cancel-safe: the pipeline drops the future when the
/// per-backend timeout elapses.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn profile(&self) -> &BackendProfile;

    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, BackendError>;
}
