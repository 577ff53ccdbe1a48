//! Translation quality assessment.
//!
//! Deterministic heuristics only: length-ratio plausibility, glossary
//! compliance, preservation of untranslatable tokens (URLs, @handles,
//! #hashtags, numbers), repetition, and the adaptations the chain reported.

use crate::types::{AdaptationType, CulturalAdaptation, Importance, TranslationQuality, TranslationRequest};
use regex::Regex;
use std::sync::OnceLock;

const FLUENCY_WEIGHT: f64 = 0.30;
const ACCURACY_WEIGHT: f64 = 0.35;
const CULTURAL_WEIGHT: f64 = 0.20;
const FORMALITY_WEIGHT: f64 = 0.15;

/// Target/source character ratio band considered plausible.
const MIN_LENGTH_RATIO: f64 = 0.4;
const MAX_LENGTH_RATIO: f64 = 3.0;

const HIGH_ADAPTATION_PENALTY: f64 = 0.15;
const MEDIUM_ADAPTATION_PENALTY: f64 = 0.05;

/// Each lost URL/handle/hashtag/number group costs this much accuracy.
const PRESERVATION_PENALTY: f64 = 0.1;

/// Formality score when a register was requested but none could be applied.
const FORMALITY_UNMET: f64 = 0.6;
/// Formality score when no register was requested.
const FORMALITY_UNSPECIFIED: f64 = 0.85;

/// Accuracy multiplier when the output is the untouched source text.
const UNTRANSLATED_FACTOR: f64 = 0.6;

/// Quality plus the findings that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub quality: TranslationQuality,
    /// Preservation mismatches between source and translation
    pub preservation_issues: Vec<String>,
    /// Glossary terms present in the source whose forced translation is missing
    pub untranslated_terms: Vec<String>,
}

/// Scores a translation. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityAssessor;

impl QualityAssessor {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(
        &self,
        source_text: &str,
        translated_text: &str,
        request: &TranslationRequest,
        adaptations: &[CulturalAdaptation],
    ) -> TranslationQuality {
        self.report(source_text, translated_text, request, adaptations)
            .quality
    }

    pub fn report(
        &self,
        source_text: &str,
        translated_text: &str,
        request: &TranslationRequest,
        adaptations: &[CulturalAdaptation],
    ) -> QualityReport {
        let length = length_plausibility(source_text, translated_text);
        let preservation_issues = check_preservation(source_text, translated_text);
        let untranslated_terms = untranslated_glossary_terms(source_text, translated_text, request);

        let fluency = if translated_text.trim().is_empty() {
            0.0
        } else {
            (1.0 - 0.5 * repetition_ratio(translated_text)) * (0.5 + 0.5 * length)
        };

        let glossary_terms = glossary_terms_in_source(source_text, request);
        let glossary = if glossary_terms == 0 {
            1.0
        } else {
            1.0 - 0.5 * untranslated_terms.len() as f64 / glossary_terms as f64
        };
        let preservation =
            (1.0 - PRESERVATION_PENALTY * preservation_issues.len() as f64).max(0.5);
        let untranslated = if request.source_language != request.target_language
            && !source_text.trim().is_empty()
            && source_text.trim() == translated_text.trim()
        {
            UNTRANSLATED_FACTOR
        } else {
            1.0
        };
        let accuracy = length * glossary * preservation * untranslated;

        let cultural_appropriate = cultural_score(adaptations);

        let formality = match request.formality {
            Some(_) if adaptations
                .iter()
                .any(|a| a.kind == AdaptationType::FormalityAdjustment) =>
            {
                1.0
            }
            Some(_) => FORMALITY_UNMET,
            None => FORMALITY_UNSPECIFIED,
        };

        let quality = combine(fluency, accuracy, cultural_appropriate, formality);
        QualityReport {
            quality,
            preservation_issues,
            untranslated_terms,
        }
    }
}

/// Weighted combination of clamped sub-scores.
fn combine(fluency: f64, accuracy: f64, cultural: f64, formality: f64) -> TranslationQuality {
    let fluency = fluency.clamp(0.0, 1.0);
    let accuracy = accuracy.clamp(0.0, 1.0);
    let cultural_appropriate = cultural.clamp(0.0, 1.0);
    let formality = formality.clamp(0.0, 1.0);
    let overall = (FLUENCY_WEIGHT * fluency
        + ACCURACY_WEIGHT * accuracy
        + CULTURAL_WEIGHT * cultural_appropriate
        + FORMALITY_WEIGHT * formality)
        .clamp(0.0, 1.0);

    TranslationQuality {
        fluency,
        accuracy,
        cultural_appropriate,
        formality,
        overall,
    }
}

/// 1.0 inside the plausible band, decaying proportionally outside it.
fn length_plausibility(source: &str, translated: &str) -> f64 {
    let source_len = source.trim().chars().count();
    let translated_len = translated.trim().chars().count();
    if source_len == 0 || translated_len == 0 {
        return 0.0;
    }
    let ratio = translated_len as f64 / source_len as f64;
    if ratio < MIN_LENGTH_RATIO {
        ratio / MIN_LENGTH_RATIO
    } else if ratio > MAX_LENGTH_RATIO {
        MAX_LENGTH_RATIO / ratio
    } else {
        1.0
    }
}

/// Share of tokens that repeat the token right before them.
fn repetition_ratio(text: &str) -> f64 {
    let tokens: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    if tokens.len() < 2 {
        return 0.0;
    }
    let repeats = tokens.windows(2).filter(|pair| pair[0] == pair[1]).count();
    repeats as f64 / (tokens.len() - 1) as f64
}

fn cultural_score(adaptations: &[CulturalAdaptation]) -> f64 {
    let high = adaptations
        .iter()
        .filter(|a| a.importance == Importance::High)
        .count() as f64;
    let medium = adaptations
        .iter()
        .filter(|a| a.importance == Importance::Medium)
        .count() as f64;
    (1.0 - HIGH_ADAPTATION_PENALTY * high - MEDIUM_ADAPTATION_PENALTY * medium).clamp(0.0, 1.0)
}

fn glossary_terms_in_source(source: &str, request: &TranslationRequest) -> usize {
    let source = source.to_lowercase();
    request
        .glossary
        .keys()
        .filter(|term| !term.is_empty() && source.contains(&term.to_lowercase()))
        .count()
}

fn untranslated_glossary_terms(
    source: &str,
    translated: &str,
    request: &TranslationRequest,
) -> Vec<String> {
    let source = source.to_lowercase();
    let translated = translated.to_lowercase();
    request
        .glossary
        .iter()
        .filter(|(term, forced)| {
            !term.is_empty()
                && source.contains(&term.to_lowercase())
                && !translated.contains(&forced.to_lowercase())
        })
        .map(|(term, _)| term.clone())
        .collect()
}

// Regex patterns for extraction (cached for performance)
static HANDLE_REGEX: OnceLock<Regex> = OnceLock::new();
static HASHTAG_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Report elements of `original` that did not survive into `translated`.
///
/// Order is ignored since translation may move tokens around; only the
/// multiset of each kind of token is compared.
pub fn check_preservation(original: &str, translated: &str) -> Vec<String> {
    let mut issues = Vec::new();

    let checks: [(&str, fn(&str) -> Vec<String>); 4] = [
        ("Handle", extract_handles),
        ("Hashtag", extract_hashtags),
        ("URL", extract_urls),
        ("Number", extract_numbers),
    ];

    for (label, extract) in checks {
        let mut orig = extract(original);
        let mut trans = extract(translated);
        orig.sort();
        trans.sort();
        if orig != trans {
            issues.push(format!(
                "{} mismatch: original has {:?}, translation has {:?}",
                label, orig, trans
            ));
        }
    }

    issues
}

fn find_all(regex: &Regex, text: &str) -> Vec<String> {
    regex.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn extract_handles(text: &str) -> Vec<String> {
    let regex = HANDLE_REGEX.get_or_init(|| Regex::new(r"@[a-zA-Z0-9_]+").expect("static regex"));
    find_all(regex, text)
}

fn extract_hashtags(text: &str) -> Vec<String> {
    let regex = HASHTAG_REGEX.get_or_init(|| Regex::new(r"#[a-zA-Z0-9_]+").expect("static regex"));
    find_all(regex, text)
}

fn extract_urls(text: &str) -> Vec<String> {
    let regex = URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s)\]]+").expect("static regex"));
    find_all(regex, text)
}

fn extract_numbers(text: &str) -> Vec<String> {
    let regex = NUMBER_REGEX
        .get_or_init(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)*").expect("static regex"));
    // Skip digits that are part of a URL; those are covered by the URL check
    let url_free = URL_REGEX
        .get_or_init(|| Regex::new(r"https?://[^\s)\]]+").expect("static regex"))
        .replace_all(text, " ");
    find_all(regex, &url_free)
}
