use super::{AdaptationInput, CulturalAdapter};
use crate::catalog::Substitution;
use crate::types::{AdaptationType, CulturalAdaptation, Importance};
use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Retags the translation into the requested formality tier of the target
/// culture. Emits at most one `formality_adjustment`.
pub struct FormalityAdapter;

impl CulturalAdapter for FormalityAdapter {
    fn name(&self) -> &'static str {
        "formality"
    }

    fn adapt(&self, input: &AdaptationInput<'_>) -> Vec<CulturalAdaptation> {
        let Some(tier) = input.request.formality.as_deref() else {
            return Vec::new();
        };
        let Some(target) = input.target else {
            return Vec::new();
        };
        if target.formality_levels.is_empty() {
            debug!("Formality '{}' requested but target culture defines no levels", tier);
            return Vec::new();
        }
        let Some(level) = target.find_formality(tier) else {
            debug!("No formality level matching '{}' in target culture", tier);
            return Vec::new();
        };

        let adapted = apply_substitutions(input.text, &level.substitutions);
        let changed = adapted != input.text;
        let reasoning = if changed {
            format!("Rewritten into the '{}' register: {}", level.name, level.description)
        } else {
            format!(
                "Text already fits the '{}' register: {}",
                level.name, level.description
            )
        };

        vec![CulturalAdaptation {
            kind: AdaptationType::FormalityAdjustment,
            original: input.text.to_string(),
            adapted,
            reasoning,
            importance: if changed {
                Importance::Medium
            } else {
                Importance::Low
            },
        }]
    }
}

/// Apply whole-word substitutions in order, case-insensitively. A match that
/// starts with an uppercase letter gets a capitalised replacement.
pub fn apply_substitutions(text: &str, substitutions: &[Substitution]) -> String {
    let mut result = text.to_string();
    for substitution in substitutions {
        if substitution.from.trim().is_empty() {
            continue;
        }
        let pattern = format!(r"(?i)\b{}\b", regex::escape(&substitution.from));
        let regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(e) => {
                warn!("Skipping substitution '{}': {}", substitution.from, e);
                continue;
            }
        };
        result = regex
            .replace_all(&result, |caps: &Captures| {
                let matched = &caps[0];
                if matched.chars().next().is_some_and(char::is_uppercase) {
                    capitalize(&substitution.to)
                } else {
                    substitution.to.clone()
                }
            })
            .into_owned();
    }
    result
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::MatchMode;
    use crate::catalog::LanguageCatalog;
    use crate::types::TranslationRequest;

    fn sub(from: &str, to: &str) -> Substitution {
        Substitution {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    fn run(text: &str, target: &str, tier: Option<&str>) -> Vec<CulturalAdaptation> {
        let catalog = LanguageCatalog::with_defaults();
        let target = catalog.get_cultural_context(target, None).unwrap();
        let mut request = TranslationRequest::new(text, "en", "xx");
        request.formality = tier.map(str::to_string);
        FormalityAdapter.adapt(&AdaptationInput {
            text,
            source: None,
            target: Some(&target),
            request: &request,
            match_mode: MatchMode::Substring,
        })
    }

    // ==================== Substitution Tests ====================

    #[test]
    fn test_substitution_whole_words_only() {
        let out = apply_substitutions("hi, this is him", &[sub("hi", "hello")]);
        assert_eq!(out, "hello, this is him");
    }

    #[test]
    fn test_substitution_preserves_capitalisation() {
        let out = apply_substitutions("Hi there. hi again", &[sub("hi", "hello")]);
        assert_eq!(out, "Hello there. hello again");
    }

    #[test]
    fn test_substitution_malayalam() {
        let out = apply_substitutions("നീ എവിടെ പോകുന്നു", &[sub("നീ", "നിങ്ങൾ")]);
        assert_eq!(out, "നിങ്ങൾ എവിടെ പോകുന്നു");
    }

    #[test]
    fn test_substitution_skips_empty_source() {
        assert_eq!(apply_substitutions("abc", &[sub("", "x")]), "abc");
    }

    // ==================== Adapter Tests ====================

    #[test]
    fn test_formal_request_yields_one_adjustment() {
        let adaptations = run("നീ വരുമോ", "ml", Some("formal"));
        assert_eq!(adaptations.len(), 1);
        assert_eq!(adaptations[0].kind, AdaptationType::FormalityAdjustment);
        assert_eq!(adaptations[0].adapted, "നിങ്ങൾ വരുമോ");
        assert_eq!(adaptations[0].importance, Importance::Medium);
    }

    #[test]
    fn test_unchanged_text_still_reported() {
        let adaptations = run("നിങ്ങൾ വരുമോ", "ml", Some("formal"));
        assert_eq!(adaptations.len(), 1);
        assert_eq!(adaptations[0].adapted, "നിങ്ങൾ വരുമോ");
        assert_eq!(adaptations[0].importance, Importance::Low);
    }

    #[test]
    fn test_no_formality_requested() {
        assert!(run("നീ വരുമോ", "ml", None).is_empty());
    }

    #[test]
    fn test_unknown_tier() {
        assert!(run("നീ വരുമോ", "ml", Some("royal")).is_empty());
    }
}
