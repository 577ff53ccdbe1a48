//! The translation pipeline service.
//!
//! [`TranslationPipeline::translate`] runs a request through these stages:
//!
//! 1. validate the pair against the catalog and the enabled languages
//! 2. cache lookup
//! 3. preprocess (NFC, whitespace, tatweel)
//! 4. rank backends
//! 5. invoke backends in rank order, each under a timeout
//! 6. cultural adaptation chain
//! 7. merge the formality adjustment into the text
//! 8. quality assessment
//! 9. alternatives
//! 10. warnings
//! 11. assemble and cache
//! 12. analytics
//!
//! Concurrent identical requests share a single run. Panics inside a run are
//! reported as [`TranslateError::Internal`].

use crate::adaptation::{apply_substitutions, AdaptationInput, CulturalAdaptationChain};
use crate::analytics::{Analytics, AnalyticsAggregator};
use crate::backend::{BackendProfile, BackendRegistry, TranslationBackend};
use crate::cache::{CacheKey, ResultCache};
use crate::catalog::{CulturalContext, Language, LanguageCatalog, Script};
use crate::config::{Configuration, ConfigurationUpdate};
use crate::detection::LanguageDetector;
use crate::error::{BackendError, TranslateError};
use crate::quality::QualityAssessor;
use crate::selection::EngineSelector;
use crate::types::{
    estimate_tokens, AdaptationType, Alternative, CulturalAdaptation, DetectionResult, Importance,
    TranslationMetadata, TranslationRequest, TranslationResult, Warning, WarningKind,
};
use chrono::Utc;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use regex::{NoExpand, RegexBuilder};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

/// Each adaptation costs this much confidence, up to [`MAX_ADAPTATION_PENALTY`]
const ADAPTATION_PENALTY: f64 = 0.05;
const MAX_ADAPTATION_PENALTY: f64 = 0.3;

/// Confidence decay per alternative rank
const ALTERNATIVE_DECAY: f64 = 0.9;

const LITERAL_USE_CASE: &str = "literal";

/// U+0640 ARABIC TATWEEL, a purely typographic elongation
const TATWEEL: char = '\u{0640}';

type RunOutcome = Result<TranslationResult, TranslateError>;
type SharedRun = Shared<BoxFuture<'static, RunOutcome>>;

/// Cheaply cloneable handle to the pipeline service.
#[derive(Clone)]
pub struct TranslationPipeline {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<LanguageCatalog>,
    backends: Arc<BackendRegistry>,
    detector: LanguageDetector,
    selector: EngineSelector,
    chain: CulturalAdaptationChain,
    assessor: QualityAssessor,
    cache: ResultCache,
    analytics: AnalyticsAggregator,
    config: RwLock<Configuration>,
    in_flight: Mutex<HashMap<CacheKey, SharedRun>>,
}

impl TranslationPipeline {
    /// Build a pipeline over a catalog and a backend registry.
    ///
    /// Fails with `Validation` if `config` is invalid.
    pub fn new(
        catalog: Arc<LanguageCatalog>,
        backends: Arc<BackendRegistry>,
        config: Configuration,
    ) -> Result<Self, TranslateError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                detector: LanguageDetector::new(catalog.clone()),
                selector: EngineSelector::new(backends.clone(), catalog.clone()),
                chain: CulturalAdaptationChain::new(),
                assessor: QualityAssessor::new(),
                cache: ResultCache::new(config.cache_capacity),
                analytics: AnalyticsAggregator::new(),
                config: RwLock::new(config),
                in_flight: Mutex::new(HashMap::new()),
                catalog,
                backends,
            }),
        })
    }

    // ==================== Translation ====================

    pub async fn translate(&self, request: TranslationRequest) -> RunOutcome {
        if request.source_text.trim().is_empty() {
            return Err(TranslateError::Validation(
                "sourceText must not be empty".to_string(),
            ));
        }
        if request.target_language.trim().is_empty() {
            return Err(TranslateError::Validation(
                "targetLanguage must not be empty".to_string(),
            ));
        }

        let config = self.inner.config.read().clone();
        let mut request = request;
        request.source_language = self.resolve_source(&request, &config)?;
        let source = request.source_language.clone();
        let target = request.target_language.clone();

        if !self.inner.is_supported(&source, &config) || !self.inner.is_supported(&target, &config) {
            debug!("Rejected unsupported pair {} -> {}", source, target);
            return Err(TranslateError::unsupported_pair(&source, &target));
        }

        let adapt = config.cultural_adaptation && request.cultural_adaptation;
        let key = CacheKey::for_request(&source, &request, adapt);

        if config.cache_enabled {
            if let Some(mut cached) = self.inner.cache.get(&key) {
                self.inner.analytics.record_cache_hit();
                debug!("Cache hit for {} -> {}", source, target);
                cached.metadata.cache_hit = true;
                return Ok(cached);
            }
            self.inner.analytics.record_cache_miss();
        }

        self.join_or_start(key, request, config, adapt).await
    }

    /// Resolve `auto`/empty source codes.
    fn resolve_source(
        &self,
        request: &TranslationRequest,
        config: &Configuration,
    ) -> Result<String, TranslateError> {
        if !request.wants_detection() {
            return Ok(request.source_language.trim().to_string());
        }
        if !config.auto_detection {
            return Ok(config.default_language.clone());
        }

        let detection = self.inner.detector.detect(&request.source_text)?;
        if detection.confidence <= 0.0 {
            debug!(
                "Detection inconclusive, falling back to '{}'",
                config.fallback_language
            );
            return Ok(config.fallback_language.clone());
        }
        debug!(
            "Detected source language '{}' ({:.2})",
            detection.detected_language, detection.confidence
        );
        Ok(detection.detected_language)
    }

    /// Attach to an identical in-flight run or start a new one.
    ///
    /// The run is spawned, so it finishes (caching, analytics, removing its
    /// key) even when every caller is dropped.
    async fn join_or_start(
        &self,
        key: CacheKey,
        request: TranslationRequest,
        config: Configuration,
        adapt: bool,
    ) -> RunOutcome {
        let run = {
            let mut in_flight = self.inner.in_flight.lock();
            match in_flight.get(&key) {
                Some(existing) => {
                    debug!("Joining in-flight translation");
                    existing.clone()
                }
                None => {
                    let inner = self.inner.clone();
                    let run_key = key.clone();
                    let handle = tokio::spawn(async move {
                        let outcome = AssertUnwindSafe(inner.execute(&request, &config, adapt, &run_key))
                            .catch_unwind()
                            .await
                            .unwrap_or_else(|panic| {
                                let message = panic_message(panic.as_ref());
                                warn!("Translation run panicked: {}", message);
                                Err(TranslateError::Internal(message))
                            });
                        inner.in_flight.lock().remove(&run_key);
                        outcome
                    });
                    let run = async move {
                        handle.await.unwrap_or_else(|e| {
                            warn!("Translation task failed: {}", e);
                            Err(TranslateError::Internal(e.to_string()))
                        })
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(key, run.clone());
                    run
                }
            }
        };
        run.await
    }

    // ==================== Detection ====================

    pub fn detect_language(&self, text: &str) -> Result<DetectionResult, TranslateError> {
        self.inner.detector.detect(text)
    }

    // ==================== Catalog ====================

    pub fn list_languages(&self) -> Vec<Language> {
        self.inner.catalog.list_languages()
    }

    pub fn get_language(&self, code: &str) -> Option<Language> {
        self.inner.catalog.get_language(code)
    }

    pub fn get_cultural_context(&self, code: &str, region: Option<&str>) -> Option<CulturalContext> {
        self.inner.catalog.get_cultural_context(code, region)
    }

    /// Insert or overwrite a language.
    pub fn add_language(&self, language: Language) -> Result<(), TranslateError> {
        validate_language(&language)?;
        self.inner.catalog.add_language(language);
        Ok(())
    }

    /// Replace a known language. Fails with `Validation` if the code is unknown.
    pub fn update_language(&self, language: Language) -> Result<(), TranslateError> {
        validate_language(&language)?;
        self.inner.catalog.update_language(language)
    }

    // ==================== Configuration ====================

    pub fn get_configuration(&self) -> Configuration {
        self.inner.config.read().clone()
    }

    /// Merge a partial update and return the resulting configuration.
    pub fn update_configuration(
        &self,
        update: ConfigurationUpdate,
    ) -> Result<Configuration, TranslateError> {
        let mut config = self.inner.config.write();
        let merged = config.merged(&update)?;
        if merged.cache_capacity != config.cache_capacity {
            let evicted = self.inner.cache.set_capacity(merged.cache_capacity);
            if evicted > 0 {
                info!("Cache capacity lowered, evicted {} entries", evicted);
            }
        }
        *config = merged.clone();
        info!("Configuration updated: {:?}", update);
        Ok(merged)
    }

    // ==================== Cache & Analytics ====================

    /// Drop every cached result. Returns how many were removed.
    pub fn clear_cache(&self) -> usize {
        let cleared = self.inner.cache.clear();
        info!("Cleared {} cached translations", cleared);
        cleared
    }

    pub fn get_analytics(&self) -> Analytics {
        self.inner.analytics.snapshot()
    }

    pub fn reset_analytics(&self) {
        self.inner.analytics.reset();
        info!("Analytics reset");
    }

    // ==================== Backends ====================

    /// Register a backend, replacing any entry with the same id.
    pub fn register_backend(&self, backend: Arc<dyn TranslationBackend>) -> Result<(), TranslateError> {
        self.inner.backends.register(backend)
    }

    pub fn set_backend_enabled(&self, id: &str, enabled: bool) -> Result<(), TranslateError> {
        if self.inner.backends.set_enabled(id, enabled) {
            Ok(())
        } else {
            Err(TranslateError::Validation(format!("unknown backend '{}'", id)))
        }
    }

    pub fn list_backends(&self) -> Vec<BackendProfile> {
        self.inner.backends.profiles()
    }
}

impl Inner {
    fn is_supported(&self, code: &str, config: &Configuration) -> bool {
        self.catalog.contains(code) && config.is_language_enabled(code)
    }

    async fn execute(
        &self,
        request: &TranslationRequest,
        config: &Configuration,
        adapt: bool,
        key: &CacheKey,
    ) -> RunOutcome {
        let started = Instant::now();
        let source = request.source_language.as_str();
        let target = request.target_language.as_str();

        let arabic_script = self
            .catalog
            .get_language(source)
            .is_some_and(|language| language.scripts.contains(&Script::Arabic));
        let text = preprocess(&request.source_text, arabic_script);

        let (profile, raw, attempts) = self.invoke_backends(&text, source, target, config).await?;
        let raw = enforce_glossary(&raw, &text, request);

        let source_context = self.catalog.get_cultural_context(source, None);
        let target_context = self.catalog.get_cultural_context(target, None);

        let adaptations = if adapt {
            self.chain.run(&AdaptationInput {
                text: &raw,
                source: source_context.as_ref(),
                target: target_context.as_ref(),
                request,
                match_mode: config.adaptation_match,
            })
        } else {
            Vec::new()
        };

        let translated_text = adaptations
            .iter()
            .rev()
            .find(|a| a.kind == AdaptationType::FormalityAdjustment)
            .map(|a| a.adapted.clone())
            .unwrap_or_else(|| raw.clone());

        let report = self
            .assessor
            .report(&text, &translated_text, request, &adaptations);
        let quality = report.quality;
        let penalty = (ADAPTATION_PENALTY * adaptations.len() as f64).min(MAX_ADAPTATION_PENALTY);
        let confidence = quality.overall * (1.0 - penalty);

        let alternatives = if request.alternatives {
            build_alternatives(
                &raw,
                &translated_text,
                target_context.as_ref(),
                confidence,
                config.max_alternatives,
            )
        } else {
            Vec::new()
        };

        let mut warnings = collect_warnings(&text, &adaptations, &report.preservation_issues);
        if quality.overall < config.quality_threshold {
            warnings.push(Warning {
                kind: WarningKind::LowQuality,
                message: format!(
                    "Quality {:.2} is below the threshold {:.2}",
                    quality.overall, config.quality_threshold
                ),
            });
        }

        let result = TranslationResult {
            translated_text,
            confidence,
            quality,
            adaptations,
            alternatives,
            warnings,
            metadata: TranslationMetadata {
                engine: profile.id.clone(),
                engine_type: profile.kind.clone(),
                source_language: source.to_string(),
                target_language: target.to_string(),
                processing_time_ms: started.elapsed().as_millis() as u64,
                token_count: estimate_tokens(&text),
                cost: profile.estimate_cost(&text),
                cache_hit: false,
                attempts,
                timestamp: Utc::now(),
            },
        };

        if config.cache_enabled {
            if quality.overall >= config.quality_threshold {
                self.cache.insert(key.clone(), result.clone());
            } else {
                debug!(
                    "Not caching {} -> {} result: quality {:.2} below {:.2}",
                    source, target, quality.overall, config.quality_threshold
                );
            }
        }
        self.analytics.record(request, &result);

        info!(
            "Translated {} -> {} via '{}' (quality {:.2}, {} adaptations, {}ms)",
            source,
            target,
            profile.id,
            quality.overall,
            result.adaptations.len(),
            result.metadata.processing_time_ms
        );
        Ok(result)
    }

    /// Try ranked backends in order until one succeeds or the attempt budget
    /// runs out. Returns the profile used, the raw text and the attempt count.
    async fn invoke_backends(
        &self,
        text: &str,
        source: &str,
        target: &str,
        config: &Configuration,
    ) -> Result<(BackendProfile, String, u32), TranslateError> {
        let ranked = self.selector.rank(source, target);
        if ranked.is_empty() {
            warn!("No enabled backend covers {} -> {}", source, target);
            return Err(TranslateError::no_engine(source, target));
        }

        let timeout = config.backend_timeout();
        let mut attempts = 0;
        let mut last_failure: Option<(String, BackendError)> = None;

        for candidate in ranked.iter().take(config.max_backend_attempts as usize) {
            let profile = &candidate.entry.profile;
            attempts += 1;
            self.analytics.record_backend_call();
            debug!(
                "Invoking backend '{}' (score {:.3}) for {} -> {}",
                profile.id, candidate.score, source, target
            );

            let outcome =
                match tokio::time::timeout(timeout, candidate.entry.backend.translate(text, source, target)).await {
                    Ok(Ok(raw)) if raw.trim().is_empty() => Err(BackendError::InvalidResponse(
                        "empty translation".to_string(),
                    )),
                    Ok(outcome) => outcome,
                    Err(_) => Err(BackendError::Timeout(timeout)),
                };

            match outcome {
                Ok(raw) => return Ok((profile.clone(), raw, attempts)),
                Err(err) => {
                    self.analytics.record_backend_failure();
                    warn!(
                        "Backend '{}' failed for {} -> {}: {}",
                        profile.id, source, target, err
                    );
                    last_failure = Some((profile.id.clone(), err));
                }
            }
        }

        let (backend, err) = last_failure.unwrap_or_else(|| {
            (
                String::new(),
                BackendError::Unavailable("no backend attempted".to_string()),
            )
        });
        Err(TranslateError::Backend {
            backend,
            message: err.to_string(),
            retryable: err.is_retryable(),
        })
    }
}

fn validate_language(language: &Language) -> Result<(), TranslateError> {
    if language.code.trim().is_empty() || language.name.trim().is_empty() {
        return Err(TranslateError::Validation(
            "language code and name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// NFC, collapse whitespace runs, and strip tatweel from Arabic-script text.
pub(crate) fn preprocess(text: &str, arabic_script: bool) -> String {
    let normalized: String = text.nfc().collect();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if arabic_script {
        collapsed.chars().filter(|&c| c != TATWEEL).collect()
    } else {
        collapsed
    }
}

/// Replace glossary terms the backend left untranslated with their forced
/// translation.
fn enforce_glossary(raw: &str, source_text: &str, request: &TranslationRequest) -> String {
    let source_lower = source_text.to_lowercase();
    let mut output = raw.to_string();

    for (term, forced) in &request.glossary {
        if term.trim().is_empty() || !source_lower.contains(&term.to_lowercase()) {
            continue;
        }
        let output_lower = output.to_lowercase();
        if output_lower.contains(&forced.to_lowercase()) || !output_lower.contains(&term.to_lowercase()) {
            continue;
        }
        match RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build() {
            Ok(regex) => {
                output = regex.replace_all(&output, NoExpand(forced)).into_owned();
                debug!("Glossary enforced '{}' -> '{}'", term, forced);
            }
            Err(e) => warn!("Skipping glossary term '{}': {}", term, e),
        }
    }
    output
}

/// Alternatives from the target culture's other formality tiers, topped up
/// with the literal backend output when there is room.
fn build_alternatives(
    raw: &str,
    translated_text: &str,
    target_context: Option<&CulturalContext>,
    confidence: f64,
    max: usize,
) -> Vec<Alternative> {
    let mut candidates: Vec<(String, String)> = Vec::new();

    for level in target_context.map(|c| c.formality_levels.as_slice()).unwrap_or_default() {
        let text = apply_substitutions(raw, &level.substitutions);
        // A tier that leaves the text untouched offers nothing new
        if text != raw && text != translated_text && !candidates.iter().any(|(t, _)| *t == text) {
            candidates.push((text, level.name.clone()));
        }
    }
    if candidates.len() < max && raw != translated_text {
        candidates.push((raw.to_string(), LITERAL_USE_CASE.to_string()));
    }

    candidates
        .into_iter()
        .take(max)
        .enumerate()
        .map(|(i, (text, use_case))| Alternative {
            text,
            use_case,
            confidence: confidence * ALTERNATIVE_DECAY.powi(i as i32 + 1),
        })
        .collect()
}

fn collect_warnings(
    source_text: &str,
    adaptations: &[CulturalAdaptation],
    preservation_issues: &[String],
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let sensitive: Vec<&str> = adaptations
        .iter()
        .filter(|a| a.importance == Importance::High)
        .map(|a| a.original.as_str())
        .collect();
    if !sensitive.is_empty() {
        warnings.push(Warning {
            kind: WarningKind::CulturalSensitivity,
            message: format!(
                "Culturally sensitive content needs review: {}",
                sensitive.join(", ")
            ),
        });
    }

    let questions = count_question_marks(source_text);
    if questions >= 2 {
        warnings.push(Warning {
            kind: WarningKind::Ambiguity,
            message: format!(
                "Source contains {} questions; the intended reading may be ambiguous",
                questions
            ),
        });
    }

    warnings.extend(preservation_issues.iter().map(|issue| Warning {
        kind: WarningKind::Preservation,
        message: issue.clone(),
    }));
    warnings
}

/// Question marks that end a sentence: followed by whitespace or the end of
/// the text. A `?` inside a URL query does not count.
fn count_question_marks(text: &str) -> usize {
    let mut chars = text.chars().peekable();
    let mut count = 0;
    while let Some(c) = chars.next() {
        if matches!(c, '?' | '？' | '؟') && chars.peek().map_or(true, |next| next.is_whitespace()) {
            count += 1;
        }
    }
    count
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "translation run panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockBackend, MockMode};
    use std::time::Duration;

    fn mock(profile: BackendProfile, mode: MockMode) -> Arc<MockBackend> {
        Arc::new(MockBackend::new(profile, mode))
    }

    fn pipeline_with<B: TranslationBackend + 'static>(
        backends: Vec<Arc<B>>,
        config: Configuration,
    ) -> TranslationPipeline {
        let registry = Arc::new(BackendRegistry::new());
        for backend in backends {
            registry.register(backend).unwrap();
        }
        TranslationPipeline::new(Arc::new(LanguageCatalog::with_defaults()), registry, config).unwrap()
    }

    fn malayalam_mappings() -> MockMode {
        let mut map = HashMap::new();
        map.insert(("Hello".to_string(), "ml".to_string()), "നമസ്കാരം".to_string());
        map.insert(
            ("Hello, come here".to_string(), "ml".to_string()),
            "നീ ഇവിടെ വരൂ".to_string(),
        );
        MockMode::Mappings(map)
    }

    // ==================== Preprocess Tests ====================

    #[test]
    fn test_preprocess_collapses_whitespace() {
        assert_eq!(preprocess("  Hello \n\t world  ", false), "Hello world");
    }

    #[test]
    fn test_preprocess_nfc() {
        // "e" + combining acute becomes a single code point
        assert_eq!(preprocess("Cafe\u{0301}", false), "Caf\u{00e9}");
    }

    #[test]
    fn test_preprocess_strips_tatweel_only_for_arabic() {
        assert_eq!(preprocess("مـرحـبا", true), "مرحبا");
        assert_eq!(preprocess("مـرحـبا", false), "مـرحـبا");
    }

    // ==================== Glossary Tests ====================

    #[test]
    fn test_enforce_glossary_replaces_untranslated_term() {
        let request = TranslationRequest::new("Welcome to Kerala", "en", "ml")
            .with_glossary_term("Kerala", "കേരളം");
        assert_eq!(
            enforce_glossary("kerala ലേക്ക് സ്വാഗതം", "Welcome to Kerala", &request),
            "കേരളം ലേക്ക് സ്വാഗതം"
        );
    }

    #[test]
    fn test_enforce_glossary_leaves_compliant_output() {
        let request = TranslationRequest::new("Welcome to Kerala", "en", "ml")
            .with_glossary_term("Kerala", "കേരളം");
        let raw = "കേരളം ലേക്ക് സ്വാഗതം";
        assert_eq!(enforce_glossary(raw, "Welcome to Kerala", &request), raw);
    }

    #[test]
    fn test_enforce_glossary_ignores_terms_absent_from_source() {
        let request = TranslationRequest::new("Hello", "en", "ml").with_glossary_term("Kerala", "കേരളം");
        assert_eq!(enforce_glossary("Kerala", "Hello", &request), "Kerala");
    }

    // ==================== Warning Tests ====================

    #[test]
    fn test_ambiguity_needs_two_question_marks() {
        assert!(collect_warnings("Why?", &[], &[]).is_empty());
        let warnings = collect_warnings("Why? Who？", &[], &[]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Ambiguity);
    }

    #[test]
    fn test_ambiguity_ignores_url_queries() {
        let text = "See https://example.com/search?a=1&b=2?c=3 for details.";
        assert_eq!(count_question_marks(text), 0);
        assert!(collect_warnings(text, &[], &[]).is_empty());

        assert_eq!(count_question_marks("Why? Who?"), 2);
        assert_eq!(count_question_marks("لماذا؟ من؟"), 2);
    }

    // ==================== Alternative Tests ====================

    #[test]
    fn test_alternatives_include_other_tiers_and_literal() {
        let catalog = LanguageCatalog::with_defaults();
        let context = catalog.get_cultural_context("ml", None).unwrap();
        let formal = context.find_formality("formal").unwrap();
        let raw = "നീ വരൂ";
        let formal_text = apply_substitutions(raw, &formal.substitutions);

        let alternatives = build_alternatives(raw, &formal_text, Some(&context), 0.8, 2);
        assert_eq!(alternatives.len(), 2);
        assert_eq!(alternatives[0].use_case, "respectful");
        assert_eq!(alternatives[0].text, "താങ്കൾ വരൂ");
        assert_eq!(alternatives[1].use_case, LITERAL_USE_CASE);
        assert_eq!(alternatives[1].text, raw);
        assert!((alternatives[0].confidence - 0.72).abs() < 1e-9);
        assert!(alternatives[1].confidence < alternatives[0].confidence);
    }

    #[test]
    fn test_alternatives_respect_zero_max() {
        assert!(build_alternatives("a", "b", None, 0.9, 0).is_empty());
        // Nothing differs from the returned text
        assert!(build_alternatives("a", "a", None, 0.9, 2).is_empty());
    }

    // ==================== Translate Tests ====================

    #[tokio::test]
    async fn test_translate_then_cache_hit() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml"], 0.8), malayalam_mappings());
        let pipeline = pipeline_with(vec![backend.clone()], Configuration::default());

        let request = TranslationRequest::new("Hello", "en", "ml");
        let first = pipeline.translate(request.clone()).await.unwrap();
        let second = pipeline.translate(request).await.unwrap();

        assert!(!first.metadata.cache_hit);
        assert!(second.metadata.cache_hit);
        assert_eq!(first.translated_text, second.translated_text);
        assert_eq!(backend.calls(), 1);

        let analytics = pipeline.get_analytics();
        assert_eq!(analytics.total_translations, 1);
        assert_eq!(analytics.cache_hits, 1);
        assert_eq!(analytics.cache_misses, 1);
    }

    #[tokio::test]
    async fn test_cache_disabled_always_runs() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml"], 0.8), malayalam_mappings());
        let config = Configuration {
            cache_enabled: false,
            ..Default::default()
        };
        let pipeline = pipeline_with(vec![backend.clone()], config);

        let request = TranslationRequest::new("Hello", "en", "ml");
        pipeline.translate(request.clone()).await.unwrap();
        let second = pipeline.translate(request).await.unwrap();
        assert!(!second.metadata.cache_hit);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_low_quality_result_is_not_cached() {
        // NoOp output equals the source, which lowers accuracy
        let backend = mock(BackendProfile::new("echo", &["en", "ml"], 0.8), MockMode::NoOp);
        let config = Configuration {
            quality_threshold: 0.95,
            ..Default::default()
        };
        let pipeline = pipeline_with(vec![backend.clone()], config);

        let request = TranslationRequest::new("Hello", "en", "ml");
        let first = pipeline.translate(request.clone()).await.unwrap();
        assert!(first.warnings.iter().any(|w| w.kind == WarningKind::LowQuality));

        let second = pipeline.translate(request).await.unwrap();
        assert!(!second.metadata.cache_hit);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_backend() {
        let failing = mock(
            BackendProfile::new("best", &["en", "ml"], 1.0),
            MockMode::Error(BackendError::Http {
                status: 503,
                body: "busy".into(),
            }),
        );
        let working = mock(BackendProfile::new("backup", &["en", "ml"], 0.5), malayalam_mappings());
        let pipeline = pipeline_with(vec![failing.clone(), working.clone()], Configuration::default());

        let result = pipeline
            .translate(TranslationRequest::new("Hello", "en", "ml"))
            .await
            .unwrap();
        assert_eq!(result.metadata.engine, "backup");
        assert_eq!(result.metadata.attempts, 2);
        assert_eq!(failing.calls(), 1);

        let analytics = pipeline.get_analytics();
        assert_eq!(analytics.backend_calls, 2);
        assert_eq!(analytics.backend_failures, 1);
    }

    #[tokio::test]
    async fn test_all_backends_fail() {
        let failing = |id: &str, retryable_status: u16| {
            mock(
                BackendProfile::new(id, &["en", "ml"], 0.5),
                MockMode::Error(BackendError::Http {
                    status: retryable_status,
                    body: String::new(),
                }),
            )
        };
        let pipeline = pipeline_with(
            vec![failing("a", 500), failing("b", 400)],
            Configuration::default(),
        );

        let err = pipeline
            .translate(TranslationRequest::new("Hello", "en", "ml"))
            .await
            .unwrap_err();
        match err {
            TranslateError::Backend { backend, retryable, .. } => {
                assert_eq!(backend, "b");
                assert!(!retryable);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(pipeline.get_analytics().total_translations, 0);
    }

    #[tokio::test]
    async fn test_attempt_budget_limits_fallback() {
        let backends: Vec<Arc<MockBackend>> = (0..3)
            .map(|i| {
                mock(
                    BackendProfile::new(format!("b{}", i), &["en", "ml"], 0.5),
                    MockMode::Error(BackendError::Unavailable("down".into())),
                )
            })
            .collect();
        let config = Configuration {
            max_backend_attempts: 2,
            ..Default::default()
        };
        let pipeline = pipeline_with(backends, config);

        let err = pipeline
            .translate(TranslationRequest::new("Hello", "en", "ml"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(pipeline.get_analytics().backend_calls, 2);
    }

    #[tokio::test]
    async fn test_backend_timeout_falls_back() {
        let slow = Arc::new(
            MockBackend::new(BackendProfile::new("slow", &["en", "ml"], 1.0), MockMode::Suffix)
                .with_delay(Duration::from_millis(500)),
        );
        let fast = mock(BackendProfile::new("fast", &["en", "ml"], 0.5), malayalam_mappings());
        let config = Configuration {
            backend_timeout_ms: 20,
            ..Default::default()
        };
        let pipeline = pipeline_with(vec![slow, fast], config);

        let result = pipeline
            .translate(TranslationRequest::new("Hello", "en", "ml"))
            .await
            .unwrap();
        assert_eq!(result.metadata.engine, "fast");
    }

    #[tokio::test]
    async fn test_unsupported_and_disabled_languages() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml", "ja"], 0.8), MockMode::Suffix);
        let config = Configuration {
            enabled_languages: vec!["en".into(), "ml".into()],
            ..Default::default()
        };
        let pipeline = pipeline_with(vec![backend], config);

        let err = pipeline
            .translate(TranslationRequest::new("Hi", "en", "xx"))
            .await
            .unwrap_err();
        assert_eq!(err, TranslateError::unsupported_pair("en", "xx"));

        let err = pipeline
            .translate(TranslationRequest::new("Hi", "en", "ja"))
            .await
            .unwrap_err();
        assert_eq!(err, TranslateError::unsupported_pair("en", "ja"));
    }

    #[tokio::test]
    async fn test_no_engine_available() {
        let backend = mock(BackendProfile::new("fr", &["en", "fr"], 0.8), MockMode::Suffix);
        let pipeline = pipeline_with(vec![backend], Configuration::default());

        let err = pipeline
            .translate(TranslationRequest::new("Hi", "en", "ml"))
            .await
            .unwrap_err();
        assert_eq!(err, TranslateError::no_engine("en", "ml"));
    }

    #[tokio::test]
    async fn test_empty_text_is_validation_error() {
        let pipeline = pipeline_with::<MockBackend>(vec![], Configuration::default());
        let err = pipeline
            .translate(TranslationRequest::new("   ", "en", "ml"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Validation(_)));
    }

    #[tokio::test]
    async fn test_formality_is_merged_into_text() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml"], 0.8), malayalam_mappings());
        let pipeline = pipeline_with(vec![backend], Configuration::default());

        let result = pipeline
            .translate(
                TranslationRequest::new("Hello, come here", "en", "ml")
                    .with_formality("formal")
                    .with_alternatives(true),
            )
            .await
            .unwrap();

        assert_eq!(result.translated_text, "നിങ്ങൾ ഇവിടെ വരൂ");
        assert_eq!(result.adaptations[0].kind, AdaptationType::FormalityAdjustment);
        assert_eq!(result.quality.formality, 1.0);
        assert!(result
            .alternatives
            .iter()
            .any(|a| a.use_case == LITERAL_USE_CASE && a.text == "നീ ഇവിടെ വരൂ"));
    }

    #[tokio::test]
    async fn test_adaptation_disabled_by_request_or_config() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml"], 0.8), malayalam_mappings());
        let pipeline = pipeline_with(vec![backend], Configuration::default());

        let request = TranslationRequest::new("Hello, come here", "en", "ml").with_formality("formal");
        let result = pipeline
            .translate(request.clone().with_cultural_adaptation(false))
            .await
            .unwrap();
        assert!(result.adaptations.is_empty());
        assert_eq!(result.translated_text, "നീ ഇവിടെ വരൂ");

        pipeline
            .update_configuration(ConfigurationUpdate {
                cultural_adaptation: Some(false),
                ..Default::default()
            })
            .unwrap();
        let result = pipeline.translate(request).await.unwrap();
        assert!(result.adaptations.is_empty());
    }

    #[tokio::test]
    async fn test_confidence_penalised_by_adaptations() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml"], 0.8), MockMode::Suffix);
        let pipeline = pipeline_with(vec![backend], Configuration::default());

        // "beef" and "pork" trip two religious contexts in Malayalam culture
        let result = pipeline
            .translate(TranslationRequest::new("beef and pork", "en", "ml"))
            .await
            .unwrap();
        assert_eq!(result.adaptations.len(), 2);
        assert!((result.confidence - result.quality.overall * 0.9).abs() < 1e-9);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::CulturalSensitivity));
    }

    #[tokio::test]
    async fn test_auto_detection() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml"], 0.8), MockMode::Suffix);
        let pipeline = pipeline_with(vec![backend], Configuration::default());

        let result = pipeline
            .translate(TranslationRequest::new("നമസ്കാരം സുഹൃത്തേ", "auto", "en"))
            .await
            .unwrap();
        assert_eq!(result.metadata.source_language, "ml");
    }

    #[tokio::test]
    async fn test_detection_fallback_and_default() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml", "ja"], 0.8), MockMode::Suffix);
        let config = Configuration {
            fallback_language: "ja".into(),
            default_language: "en".into(),
            ..Default::default()
        };
        let pipeline = pipeline_with(vec![backend], config);

        // Digits only: no catalog script covers them
        let result = pipeline
            .translate(TranslationRequest::new("12345", "", "ml"))
            .await
            .unwrap();
        assert_eq!(result.metadata.source_language, "ja");

        pipeline
            .update_configuration(ConfigurationUpdate {
                auto_detection: Some(false),
                ..Default::default()
            })
            .unwrap();
        let result = pipeline
            .translate(TranslationRequest::new("നമസ്കാരം", "auto", "ja"))
            .await
            .unwrap();
        assert_eq!(result.metadata.source_language, "en");
    }

    #[tokio::test]
    async fn test_concurrent_identical_requests_share_one_run() {
        let backend = Arc::new(
            MockBackend::new(BackendProfile::new("nmt", &["en", "ml"], 0.8), malayalam_mappings())
                .with_delay(Duration::from_millis(50)),
        );
        let pipeline = pipeline_with(vec![backend.clone()], Configuration::default());

        let request = TranslationRequest::new("Hello", "en", "ml");
        let runs = (0..5).map(|_| pipeline.translate(request.clone()));
        let results = futures::future::join_all(runs).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(backend.calls(), 1);
        assert_eq!(pipeline.get_analytics().total_translations, 1);
        assert!(pipeline.inner.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let backend = mock(BackendProfile::new("nmt", &["en", "ml"], 0.8), malayalam_mappings());
        let pipeline = pipeline_with(vec![backend], Configuration::default());

        let request = TranslationRequest::new("Hello", "en", "ml");
        pipeline.translate(request.clone()).await.unwrap();
        assert_eq!(pipeline.clear_cache(), 1);
        let result = pipeline.translate(request).await.unwrap();
        assert!(!result.metadata.cache_hit);
    }

    #[tokio::test]
    async fn test_cancelled_callers_do_not_leak_runs() {
        let backend = Arc::new(
            MockBackend::new(BackendProfile::new("nmt", &["en", "ml"], 0.8), MockMode::Suffix)
                .with_delay(Duration::from_millis(200)),
        );
        let pipeline = pipeline_with(vec![backend.clone()], Configuration::default());

        for i in 0..20 {
            let request = TranslationRequest::new(format!("message number {}", i), "en", "ml");
            let outcome = tokio::time::timeout(Duration::from_millis(5), pipeline.translate(request)).await;
            assert!(outcome.is_err());
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(pipeline.inner.in_flight.lock().is_empty());
        assert_eq!(backend.calls(), 20);
        assert_eq!(pipeline.inner.cache.len(), 20);
        assert_eq!(pipeline.get_analytics().total_translations, 20);
    }

    // ==================== Panic Tests ====================

    struct PanickingBackend(BackendProfile);

    #[async_trait::async_trait]
    impl TranslationBackend for PanickingBackend {
        fn profile(&self) -> &BackendProfile {
            &self.0
        }

        async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, BackendError> {
            panic!("backend exploded");
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let backend = Arc::new(PanickingBackend(BackendProfile::new("boom", &["en", "ml"], 0.8)));
        let pipeline = pipeline_with(vec![backend], Configuration::default());

        let err = pipeline
            .translate(TranslationRequest::new("Hello", "en", "ml"))
            .await
            .unwrap_err();
        assert_eq!(err, TranslateError::Internal("backend exploded".to_string()));
        assert!(pipeline.inner.in_flight.lock().is_empty());
    }

    // ==================== Management Tests ====================

    #[test]
    fn test_update_configuration_validates() {
        let pipeline = pipeline_with::<MockBackend>(vec![], Configuration::default());
        let err = pipeline
            .update_configuration(ConfigurationUpdate {
                quality_threshold: Some(2.0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TranslateError::Validation(_)));
        assert_eq!(pipeline.get_configuration().quality_threshold, 0.7);
    }

    #[test]
    fn test_backend_management() {
        let pipeline = pipeline_with::<MockBackend>(vec![], Configuration::default());
        pipeline
            .register_backend(mock(BackendProfile::new("nmt", &["en", "ml"], 0.8), MockMode::Suffix))
            .unwrap();
        assert!(pipeline
            .register_backend(mock(BackendProfile::new("bad", &["en", "ml"], f64::NAN), MockMode::Suffix))
            .is_err());
        assert_eq!(pipeline.list_backends().len(), 1);

        pipeline.set_backend_enabled("nmt", false).unwrap();
        assert!(!pipeline.list_backends()[0].enabled);
        assert!(pipeline.set_backend_enabled("missing", true).is_err());
    }

    #[test]
    fn test_language_management() {
        let pipeline = pipeline_with::<MockBackend>(vec![], Configuration::default());
        let mut swahili = pipeline.get_language("en").unwrap();
        swahili.code = "sw".into();
        swahili.name = "Swahili".into();

        assert!(pipeline.update_language(swahili.clone()).is_err());
        pipeline.add_language(swahili.clone()).unwrap();
        assert_eq!(pipeline.get_language("sw").unwrap().name, "Swahili");

        swahili.native_name = "Kiswahili".into();
        pipeline.update_language(swahili).unwrap();
        assert_eq!(pipeline.get_language("sw").unwrap().native_name, "Kiswahili");
    }
}
