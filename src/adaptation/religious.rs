use super::{AdaptationInput, CulturalAdapter};
use crate::types::{AdaptationType, CulturalAdaptation, Importance};

/// Flags content that touches a target-culture dietary restriction for human
/// review. One record per religious context, on its first matching keyword.
pub struct ReligiousSensitivityAdapter;

impl CulturalAdapter for ReligiousSensitivityAdapter {
    fn name(&self) -> &'static str {
        "religious_sensitivity"
    }

    fn adapt(&self, input: &AdaptationInput<'_>) -> Vec<CulturalAdaptation> {
        let Some(target) = input.target else {
            return Vec::new();
        };

        target
            .religious_contexts
            .iter()
            .filter_map(|context| {
                let keyword = context
                    .dietary_restrictions
                    .iter()
                    .find(|keyword| input.match_mode.matches(input.text, keyword))?;
                Some(CulturalAdaptation {
                    kind: AdaptationType::ReligiousSensitivity,
                    original: keyword.clone(),
                    adapted: keyword.clone(),
                    reasoning: format!(
                        "Mentions '{}', a dietary restriction in {}; review before publishing",
                        keyword, context.religion
                    ),
                    importance: Importance::High,
                })
            })
            .collect()
    }
}
