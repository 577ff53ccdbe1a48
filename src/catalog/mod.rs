//! Language catalog.
//!
//! # Architecture
//!
//! - `language`: Language, Script and CulturalContext data types
//! - `registry`: the shared, lock-protected `LanguageCatalog`
//! - `data`: the built-in languages and cultural contexts

mod data;
mod language;
mod registry;

pub use language::{
    CulturalContext, CulturalReference, Dialect, FormalityLevel, Language, ReligiousContext,
    Script, Severity, Substitution, Taboo, TextDirection,
};
pub use registry::LanguageCatalog;
