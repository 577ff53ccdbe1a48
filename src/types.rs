//! Request and result value types exchanged with callers.
//!
//! Field names serialize in camelCase to match the JSON envelopes of the HTTP
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A translation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub source_text: String,

    /// Empty or `"auto"` asks for auto-detection
    #[serde(default)]
    pub source_language: String,

    pub target_language: String,

    /// Requested formality tier (e.g., "formal")
    #[serde(default)]
    pub formality: Option<String>,

    /// Domain tag (e.g., "medical", "legal")
    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default = "default_true")]
    pub cultural_adaptation: bool,

    /// Whether alternative phrasings are wanted
    #[serde(default)]
    pub alternatives: bool,

    /// Term -> forced translation
    #[serde(default)]
    pub glossary: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl TranslationRequest {
    pub fn new(
        source_text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            formality: None,
            domain: None,
            cultural_adaptation: true,
            alternatives: false,
            glossary: BTreeMap::new(),
        }
    }

    pub fn with_formality(mut self, tier: impl Into<String>) -> Self {
        self.formality = Some(tier.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_cultural_adaptation(mut self, enabled: bool) -> Self {
        self.cultural_adaptation = enabled;
        self
    }

    pub fn with_glossary_term(mut self, term: impl Into<String>, forced: impl Into<String>) -> Self {
        self.glossary.insert(term.into(), forced.into());
        self
    }

    /// Whether the source language should be detected.
    pub fn wants_detection(&self) -> bool {
        let code = self.source_language.trim();
        code.is_empty() || code.eq_ignore_ascii_case("auto")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationType {
    FormalityAdjustment,
    CulturalReference,
    TabooAvoidance,
    ReligiousSensitivity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

/// A recorded transformation or annotation of a translation.
///
/// Only `FormalityAdjustment` is merged into the returned text. The other types
/// are advisory and reported as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalAdaptation {
    #[serde(rename = "type")]
    pub kind: AdaptationType,
    pub original: String,
    pub adapted: String,
    pub reasoning: String,
    pub importance: Importance,
}

/// Quality sub-scores and their weighted combination, all in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationQuality {
    pub fluency: f64,
    pub accuracy: f64,
    pub cultural_appropriate: f64,
    pub formality: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub text: String,
    /// Use-case label (e.g., "formal", "literal")
    pub use_case: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    CulturalSensitivity,
    Ambiguity,
    Preservation,
    LowQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationMetadata {
    /// Id of the backend that produced the raw translation
    pub engine: String,
    /// Kind of that backend (e.g., "neural", "llm")
    pub engine_type: String,
    pub source_language: String,
    pub target_language: String,
    pub processing_time_ms: u64,
    pub token_count: usize,
    pub cost: f64,
    pub cache_hit: bool,
    /// Number of backend invocations, including failed ones
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
    pub confidence: f64,
    pub quality: TranslationQuality,
    pub adaptations: Vec<CulturalAdaptation>,
    pub alternatives: Vec<Alternative>,
    pub warnings: Vec<Warning>,
    pub metadata: TranslationMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageScore {
    pub language: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub detected_language: String,
    pub confidence: f64,
    /// Next-best candidates, at most three
    pub alternatives: Vec<LanguageScore>,
    /// Dominant script of the input, if any tracked script was seen
    pub script: Option<String>,
    pub region: Option<String>,
}

/// Rough token estimate used for reporting: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
