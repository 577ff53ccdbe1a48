//! Cultural adaptation chain.
//!
//! Four independent adapters inspect a raw translation against the source and
//! target cultural contexts and report [`CulturalAdaptation`] records. Their
//! outputs are concatenated in a fixed order: formality, cultural reference,
//! taboo, religious sensitivity.
//!
//! Only the formality adjustment is ever merged back into the returned text
//! (by the pipeline). Every other adaptation is advisory.

mod formality;
mod reference;
mod religious;
mod taboo;

pub use formality::{apply_substitutions, FormalityAdapter};
pub use reference::CulturalReferenceAdapter;
pub use religious::ReligiousSensitivityAdapter;
pub use taboo::TabooAdapter;

use crate::catalog::CulturalContext;
use crate::types::{CulturalAdaptation, TranslationRequest};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How cultural phrases are located in free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive substring match. Can fire on coincidental substrings
    /// ("pig" inside "pigment").
    #[default]
    Substring,
    /// Case-insensitive match that must start and end on a word boundary.
    Word,
}

impl MatchMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "substring" => Some(MatchMode::Substring),
            "word" => Some(MatchMode::Word),
            _ => None,
        }
    }

    /// Whether `phrase` occurs in `text` under this mode.
    pub fn matches(&self, text: &str, phrase: &str) -> bool {
        if phrase.trim().is_empty() {
            return false;
        }
        match self {
            MatchMode::Substring => text.to_lowercase().contains(&phrase.to_lowercase()),
            MatchMode::Word => {
                let pattern = format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(phrase));
                match Regex::new(&pattern) {
                    Ok(regex) => regex.is_match(text),
                    Err(e) => {
                        warn!("Unusable phrase '{}' for word matching: {}", phrase, e);
                        false
                    }
                }
            }
        }
    }
}

/// Everything an adapter may look at.
pub struct AdaptationInput<'a> {
    /// Raw translation
    pub text: &'a str,
    pub source: Option<&'a CulturalContext>,
    pub target: Option<&'a CulturalContext>,
    pub request: &'a TranslationRequest,
    pub match_mode: MatchMode,
}

/// A single stage of the chain. Adapters hold no mutable state.
pub trait CulturalAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn adapt(&self, input: &AdaptationInput<'_>) -> Vec<CulturalAdaptation>;
}

/// Ordered set of adapters.
pub struct CulturalAdaptationChain {
    adapters: Vec<Box<dyn CulturalAdapter>>,
}

impl Default for CulturalAdaptationChain {
    fn default() -> Self {
        Self {
            adapters: vec![
                Box::new(FormalityAdapter),
                Box::new(CulturalReferenceAdapter),
                Box::new(TabooAdapter),
                Box::new(ReligiousSensitivityAdapter),
            ],
        }
    }
}

impl CulturalAdaptationChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the adapters in execution order.
    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Run every adapter and concatenate their outputs in chain order.
    pub fn run(&self, input: &AdaptationInput<'_>) -> Vec<CulturalAdaptation> {
        let mut adaptations = Vec::new();
        for adapter in &self.adapters {
            let found = adapter.adapt(input);
            if !found.is_empty() {
                debug!("{} produced {} adaptation(s)", adapter.name(), found.len());
            }
            adaptations.extend(found);
        }
        adaptations
    }
}
