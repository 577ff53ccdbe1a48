//! Deterministic language detection.
//!
//! Each catalog language is scored from the share of the input's letters that
//! fall inside its scripts' Unicode blocks. A small lexical hint (function
//! words and marker characters) separates languages that share a script. The
//! score is a pure function of the text and the catalog.

use crate::catalog::{Language, LanguageCatalog, Script};
use crate::error::TranslateError;
use crate::types::{DetectionResult, LanguageScore};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Share of the score that comes from script coverage alone.
const SCRIPT_WEIGHT: f64 = 0.85;

/// Share of the score that lexical hints can add on top of coverage.
const HINT_WEIGHT: f64 = 0.15;

/// Hits needed for the full hint bonus.
const HINTS_FOR_FULL_BONUS: f64 = 3.0;

const MAX_ALTERNATIVES: usize = 3;

struct LexicalHints {
    words: &'static [&'static str],
    markers: &'static [char],
}

fn hints_for(code: &str) -> Option<LexicalHints> {
    let hints = match code {
        "en" => LexicalHints {
            words: &[
                "the", "and", "is", "are", "you", "hello", "hi", "thank", "thanks", "what", "this",
                "of", "to", "with",
            ],
            markers: &[],
        },
        "es" => LexicalHints {
            words: &["el", "la", "los", "que", "y", "es", "hola", "gracias", "por", "usted"],
            markers: &['ñ', '¿', '¡'],
        },
        "fr" => LexicalHints {
            words: &["le", "la", "les", "et", "est", "bonjour", "merci", "vous", "une", "je"],
            markers: &['ç', 'œ', 'è', 'ê'],
        },
        "de" => LexicalHints {
            words: &["der", "die", "das", "und", "ist", "ich", "nicht", "danke", "hallo", "sie"],
            markers: &['ß', 'ä', 'ö', 'ü'],
        },
        "ja" => LexicalHints {
            words: &["の", "は", "です", "ます", "を"],
            markers: &[],
        },
        "zh" => LexicalHints {
            words: &["的", "是", "了", "我们", "在", "你好"],
            markers: &[],
        },
        _ => return None,
    };
    Some(hints)
}

/// Scores catalog languages against an input text.
#[derive(Clone)]
pub struct LanguageDetector {
    catalog: Arc<LanguageCatalog>,
}

impl LanguageDetector {
    pub fn new(catalog: Arc<LanguageCatalog>) -> Self {
        Self { catalog }
    }

    /// Rank every catalog language for `text`.
    ///
    /// Fails with `Validation` when the text is blank.
    pub fn detect(&self, text: &str) -> Result<DetectionResult, TranslateError> {
        if text.trim().is_empty() {
            return Err(TranslateError::Validation(
                "cannot detect the language of empty text".to_string(),
            ));
        }

        let languages = self.catalog.list_languages();
        if languages.is_empty() {
            return Err(TranslateError::Internal(
                "language catalog is empty".to_string(),
            ));
        }

        let mut ranked: Vec<(&Language, f64)> = languages
            .iter()
            .map(|language| (language, Self::score(language, text)))
            .collect();
        ranked.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .partial_cmp(a_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.code.cmp(&b.code))
        });

        let (best, confidence) = ranked[0];
        let alternatives = ranked
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .map(|(language, score)| LanguageScore {
                language: language.code.clone(),
                confidence: *score,
            })
            .collect();

        Ok(DetectionResult {
            detected_language: best.code.clone(),
            confidence,
            alternatives,
            script: dominant_script(text).map(|s| s.name().to_string()),
            region: best.primary_region().map(str::to_string),
        })
    }

    /// Compatibility of `text` with `language`, in [0,1].
    ///
    /// Zero when none of the text's letters belong to the language's scripts.
    pub fn score(language: &Language, text: &str) -> f64 {
        let mut letters = 0usize;
        let mut covered = 0usize;
        for c in text.chars() {
            if Script::of(c).is_some() {
                letters += 1;
                if language.writes_with(c) {
                    covered += 1;
                }
            }
        }
        if letters == 0 || covered == 0 {
            return 0.0;
        }

        let coverage = covered as f64 / letters as f64;
        let hint = hints_for(&language.code)
            .map(|hints| hint_ratio(&hints, text))
            .unwrap_or(0.0);

        (coverage * (SCRIPT_WEIGHT + HINT_WEIGHT * hint)).clamp(0.0, 1.0)
    }
}

fn hint_ratio(hints: &LexicalHints, text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let mut hits = hints
        .words
        .iter()
        .filter(|&&word| {
            let unspaced = word.chars().all(|c| {
                matches!(
                    Script::of(c),
                    Some(Script::Han | Script::Hiragana | Script::Katakana)
                )
            });
            if unspaced {
                lowered.contains(word)
            } else {
                tokens.contains(&word)
            }
        })
        .count();

    if hints.markers.iter().any(|m| lowered.contains(*m)) {
        hits += 1;
    }

    (hits as f64 / HINTS_FOR_FULL_BONUS).min(1.0)
}

/// Most frequent tracked script in `text`; ties go to the earlier script in
/// [`Script::ALL`].
fn dominant_script(text: &str) -> Option<Script> {
    let mut counts: HashMap<Script, usize> = HashMap::new();
    for script in text.chars().filter_map(Script::of) {
        *counts.entry(script).or_default() += 1;
    }
    Script::ALL
        .into_iter()
        .filter_map(|script| counts.get(&script).map(|count| (script, *count)))
        .fold(None, |best: Option<(Script, usize)>, (script, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((script, count)),
        })
        .map(|(script, _)| script)
}
