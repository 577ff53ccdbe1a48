use super::{AdaptationInput, CulturalAdapter};
use crate::types::{AdaptationType, CulturalAdaptation, Importance};

/// Maps celebrations and other references of the source culture that survive
/// into the translation onto a same-type equivalent of the target culture.
pub struct CulturalReferenceAdapter;

impl CulturalAdapter for CulturalReferenceAdapter {
    fn name(&self) -> &'static str {
        "cultural_reference"
    }

    fn adapt(&self, input: &AdaptationInput<'_>) -> Vec<CulturalAdaptation> {
        let (Some(source), Some(target)) = (input.source, input.target) else {
            return Vec::new();
        };

        source
            .references
            .iter()
            .filter(|reference| input.match_mode.matches(input.text, &reference.name))
            .filter_map(|reference| {
                let equivalent = target.references.iter().find(|candidate| {
                    candidate.kind == reference.kind
                        && !candidate.name.eq_ignore_ascii_case(&reference.name)
                })?;
                let traditions = if equivalent.traditions.is_empty() {
                    String::new()
                } else {
                    format!(" (traditions: {})", equivalent.traditions.join(", "))
                };
                Some(CulturalAdaptation {
                    kind: AdaptationType::CulturalReference,
                    original: reference.name.clone(),
                    adapted: equivalent.name.clone(),
                    reasoning: format!(
                        "'{}' is a {} in the source culture; '{}' is the closest equivalent in the target culture{}",
                        reference.name, reference.kind, equivalent.name, traditions
                    ),
                    importance: Importance::Low,
                })
            })
            .collect()
    }
}
