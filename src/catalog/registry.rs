//! Language catalog: single source of truth for supported languages.
//!
//! Read-mostly shared state. Reads take a shared lock and never block on each
//! other; `add_language`/`update_language` take the exclusive lock.

use super::data;
use super::language::{CulturalContext, Language};
use crate::error::TranslateError;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::info;

#[derive(Default)]
struct CatalogState {
    languages: HashMap<String, Language>,
    /// Keyed by `code` or region-qualified `code_region`
    contexts: HashMap<String, CulturalContext>,
}

impl CatalogState {
    fn publish(&mut self, language: Language) {
        match &language.cultural_context {
            Some(context) => {
                self.contexts.insert(language.code.clone(), context.clone());
            }
            None => {
                self.contexts.remove(&language.code);
            }
        }
        info!("Published language {} ({})", language.code, language.name);
        self.languages.insert(language.code.clone(), language);
    }
}

/// Registry of languages and their cultural contexts.
#[derive(Default)]
pub struct LanguageCatalog {
    state: RwLock<CatalogState>,
}

impl LanguageCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the built-in languages and regional contexts.
    pub fn with_defaults() -> Self {
        let catalog = Self::new();
        for language in data::default_languages() {
            catalog.add_language(language);
        }
        for (key, context) in data::regional_contexts() {
            catalog.add_cultural_context(&key, context);
        }
        catalog
    }

    /// Get a language by its code.
    pub fn get_language(&self, code: &str) -> Option<Language> {
        self.state.read().languages.get(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.state.read().languages.contains_key(code)
    }

    /// Look up `code_region` first, then the bare `code`.
    pub fn get_cultural_context(&self, code: &str, region: Option<&str>) -> Option<CulturalContext> {
        let state = self.state.read();
        region
            .filter(|r| !r.is_empty())
            .and_then(|r| state.contexts.get(&format!("{}_{}", code, r)))
            .or_else(|| state.contexts.get(code))
            .cloned()
    }

    /// Insert or overwrite a language. Its cultural context, if any, is
    /// indexed under the language code; a language published without one
    /// drops the previous bare-code context. Regional contexts are kept.
    pub fn add_language(&self, language: Language) {
        self.state.write().publish(language);
    }

    /// Replace an existing language. Fails if the code is unknown.
    pub fn update_language(&self, language: Language) -> Result<(), TranslateError> {
        let mut state = self.state.write();
        if !state.languages.contains_key(&language.code) {
            return Err(TranslateError::Validation(format!(
                "cannot update unknown language '{}'",
                language.code
            )));
        }
        state.publish(language);
        Ok(())
    }

    /// Index a context under an arbitrary key, typically `code_region`.
    pub fn add_cultural_context(&self, key: &str, context: CulturalContext) {
        self.state.write().contexts.insert(key.to_string(), context);
    }

    /// Snapshot of every language, sorted by code.
    pub fn list_languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.state.read().languages.values().cloned().collect();
        languages.sort_by(|a, b| a.code.cmp(&b.code));
        languages
    }

    /// Whether the language's own context carries taboos or religious norms.
    pub fn is_culturally_rich(&self, code: &str) -> bool {
        self.state
            .read()
            .contexts
            .get(code)
            .map(CulturalContext::is_culturally_rich)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.state.read().languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
