//! Language and cultural-context types.
//!
//! A [`Language`] is plain data: it is published into the
//! [`LanguageCatalog`](crate::catalog::LanguageCatalog) and never mutated in
//! place afterwards, only replaced through `add_language`/`update_language`.

use serde::{Deserialize, Serialize};

/// A supported language and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "ml")
    pub code: String,

    /// English name of the language (e.g., "Malayalam")
    pub name: String,

    /// Native name of the language (e.g., "മലയാളം")
    pub native_name: String,

    /// Language family (e.g., "Dravidian")
    pub family: String,

    /// Region codes where the language is spoken (e.g., "IN")
    #[serde(default)]
    pub regions: Vec<String>,

    /// Writing systems used to write the language
    pub scripts: Vec<Script>,

    #[serde(default)]
    pub direction: TextDirection,

    /// Cultural context indexed under `code` when the language is published
    #[serde(default)]
    pub cultural_context: Option<CulturalContext>,

    #[serde(default)]
    pub dialects: Vec<Dialect>,
}

impl Language {
    /// Whether any character of `c` belongs to one of this language's scripts.
    pub fn writes_with(&self, c: char) -> bool {
        self.scripts.iter().any(|script| script.contains(c))
    }

    /// First listed region, used as the detected region.
    pub fn primary_region(&self) -> Option<&str> {
        self.regions.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialect {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Unicode script, identified by the code-point blocks it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Greek,
    Cyrillic,
    Hebrew,
    Arabic,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Thai,
    Hangul,
    Hiragana,
    Katakana,
    Han,
}

impl Script {
    pub const ALL: [Script; 18] = [
        Script::Latin,
        Script::Greek,
        Script::Cyrillic,
        Script::Hebrew,
        Script::Arabic,
        Script::Devanagari,
        Script::Bengali,
        Script::Gurmukhi,
        Script::Gujarati,
        Script::Tamil,
        Script::Telugu,
        Script::Kannada,
        Script::Malayalam,
        Script::Thai,
        Script::Hangul,
        Script::Hiragana,
        Script::Katakana,
        Script::Han,
    ];

    /// Inclusive code-point ranges covered by this script.
    pub fn ranges(&self) -> &'static [(u32, u32)] {
        match self {
            Script::Latin => &[
                (0x0041, 0x005A),
                (0x0061, 0x007A),
                (0x00C0, 0x024F),
                (0x1E00, 0x1EFF),
            ],
            Script::Greek => &[(0x0370, 0x03FF), (0x1F00, 0x1FFF)],
            Script::Cyrillic => &[(0x0400, 0x04FF), (0x0500, 0x052F)],
            Script::Hebrew => &[(0x0590, 0x05FF)],
            Script::Arabic => &[
                (0x0600, 0x06FF),
                (0x0750, 0x077F),
                (0xFB50, 0xFDFF),
                (0xFE70, 0xFEFF),
            ],
            Script::Devanagari => &[(0x0900, 0x097F), (0xA8E0, 0xA8FF)],
            Script::Bengali => &[(0x0980, 0x09FF)],
            Script::Gurmukhi => &[(0x0A00, 0x0A7F)],
            Script::Gujarati => &[(0x0A80, 0x0AFF)],
            Script::Tamil => &[(0x0B80, 0x0BFF)],
            Script::Telugu => &[(0x0C00, 0x0C7F)],
            Script::Kannada => &[(0x0C80, 0x0CFF)],
            Script::Malayalam => &[(0x0D00, 0x0D7F)],
            Script::Thai => &[(0x0E00, 0x0E7F)],
            Script::Hangul => &[(0x1100, 0x11FF), (0x3130, 0x318F), (0xAC00, 0xD7AF)],
            Script::Hiragana => &[(0x3040, 0x309F)],
            Script::Katakana => &[(0x30A0, 0x30FF), (0x31F0, 0x31FF)],
            Script::Han => &[(0x3400, 0x4DBF), (0x4E00, 0x9FFF), (0xF900, 0xFAFF)],
        }
    }

    pub fn contains(&self, c: char) -> bool {
        let cp = c as u32;
        self.ranges()
            .iter()
            .any(|&(start, end)| cp >= start && cp <= end)
    }

    /// The script a character belongs to, if it is one we track.
    pub fn of(c: char) -> Option<Script> {
        Script::ALL.into_iter().find(|script| script.contains(c))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Script::Latin => "latin",
            Script::Greek => "greek",
            Script::Cyrillic => "cyrillic",
            Script::Hebrew => "hebrew",
            Script::Arabic => "arabic",
            Script::Devanagari => "devanagari",
            Script::Bengali => "bengali",
            Script::Gurmukhi => "gurmukhi",
            Script::Gujarati => "gujarati",
            Script::Tamil => "tamil",
            Script::Telugu => "telugu",
            Script::Kannada => "kannada",
            Script::Malayalam => "malayalam",
            Script::Thai => "thai",
            Script::Hangul => "hangul",
            Script::Hiragana => "hiragana",
            Script::Katakana => "katakana",
            Script::Han => "han",
        }
    }
}

/// Cultural norms of a language (optionally region-qualified).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalContext {
    #[serde(default)]
    pub formality_levels: Vec<FormalityLevel>,
    #[serde(default)]
    pub taboos: Vec<Taboo>,
    #[serde(default)]
    pub references: Vec<CulturalReference>,
    #[serde(default)]
    pub religious_contexts: Vec<ReligiousContext>,
}

impl CulturalContext {
    /// A culture with taboos or religious sensitivities to respect. Backends
    /// flagged as culturally specialised get a selection bonus for these.
    pub fn is_culturally_rich(&self) -> bool {
        !self.taboos.is_empty() || !self.religious_contexts.is_empty()
    }

    /// Level whose name equals `tier`, else the first whose name contains it.
    pub fn find_formality(&self, tier: &str) -> Option<&FormalityLevel> {
        let tier = tier.trim().to_lowercase();
        if tier.is_empty() {
            return None;
        }
        self.formality_levels
            .iter()
            .find(|level| level.name.to_lowercase() == tier)
            .or_else(|| {
                self.formality_levels
                    .iter()
                    .find(|level| level.name.to_lowercase().contains(&tier))
            })
    }
}

/// A named register of language with its behavioural profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormalityLevel {
    pub name: String,
    pub description: String,
    /// Behavioural descriptors (e.g., "use honorific pronouns")
    #[serde(default)]
    pub markers: Vec<String>,
    /// Whole-word rewrites that move a text into this register
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taboo {
    pub category: String,
    /// Phrase to look for in translated text
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

/// A celebration or other culturally loaded reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalReference {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub traditions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReligiousContext {
    pub religion: String,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub practices: Vec<String>,
}
