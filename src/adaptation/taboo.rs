use super::{AdaptationInput, CulturalAdapter};
use crate::catalog::Severity;
use crate::types::{AdaptationType, CulturalAdaptation, Importance};

/// Placeholder proposed when a taboo lists no alternative.
const GENERIC_REDACTION: &str = "[omitted]";

/// Flags target-culture taboos present in the translation and proposes the
/// first listed alternative.
pub struct TabooAdapter;

impl CulturalAdapter for TabooAdapter {
    fn name(&self) -> &'static str {
        "taboo"
    }

    fn adapt(&self, input: &AdaptationInput<'_>) -> Vec<CulturalAdaptation> {
        let Some(target) = input.target else {
            return Vec::new();
        };

        target
            .taboos
            .iter()
            .filter(|taboo| input.match_mode.matches(input.text, &taboo.description))
            .map(|taboo| CulturalAdaptation {
                kind: AdaptationType::TabooAvoidance,
                original: taboo.description.clone(),
                adapted: taboo
                    .alternatives
                    .first()
                    .cloned()
                    .unwrap_or_else(|| GENERIC_REDACTION.to_string()),
                reasoning: format!(
                    "'{}' is a {} {} taboo in the target culture",
                    taboo.description,
                    taboo.severity.as_str(),
                    taboo.category
                ),
                importance: match taboo.severity {
                    Severity::Severe => Importance::High,
                    Severity::Moderate | Severity::Mild => Importance::Medium,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::MatchMode;
    use crate::catalog::{CulturalContext, LanguageCatalog, Taboo};
    use crate::types::TranslationRequest;

    fn run_with(text: &str, target: &CulturalContext, mode: MatchMode) -> Vec<CulturalAdaptation> {
        let request = TranslationRequest::new(text, "en", "xx");
        TabooAdapter.adapt(&AdaptationInput {
            text,
            source: None,
            target: Some(target),
            request: &request,
            match_mode: mode,
        })
    }

    #[test]
    fn test_severe_taboo_is_high_importance() {
        let catalog = LanguageCatalog::with_defaults();
        let target = catalog.get_cultural_context("ml", None).unwrap();
        let adaptations = run_with("എടാ, വാ", &target, MatchMode::Substring);
        assert_eq!(adaptations.len(), 1);
        assert_eq!(adaptations[0].importance, Importance::High);
        assert_eq!(adaptations[0].adapted, "സുഹൃത്തേ");
    }

    #[test]
    fn test_moderate_taboo_is_medium_importance() {
        let catalog = LanguageCatalog::with_defaults();
        let target = catalog.get_cultural_context("hi", None).unwrap();
        let adaptations = run_with("pass it with the left hand", &target, MatchMode::Substring);
        assert_eq!(adaptations.len(), 1);
        assert_eq!(adaptations[0].importance, Importance::Medium);
        assert_eq!(adaptations[0].adapted, "right hand");
    }

    #[test]
    fn test_missing_alternative_uses_redaction() {
        let target = CulturalContext {
            taboos: vec![Taboo {
                category: "topic".into(),
                description: "politics".into(),
                severity: Severity::Mild,
                alternatives: vec![],
            }],
            ..Default::default()
        };
        let adaptations = run_with("talk about politics", &target, MatchMode::Substring);
        assert_eq!(adaptations[0].adapted, GENERIC_REDACTION);
    }

    #[test]
    fn test_substring_mode_false_positive_and_word_mode_fix() {
        let catalog = LanguageCatalog::with_defaults();
        let target = catalog.get_cultural_context("ar", None).unwrap();
        // "pig" inside "pigment" is a coincidental substring
        assert_eq!(run_with("red pigment", &target, MatchMode::Substring).len(), 1);
        assert!(run_with("red pigment", &target, MatchMode::Word).is_empty());
    }
}
