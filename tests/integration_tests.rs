//! Integration tests for the translation pipeline
//!
//! These tests drive the public API end to end: catalog, backend registry,
//! pipeline and the HTTP backend against a mock LibreTranslate server.

use std::sync::Arc;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use cultural_translator::analytics::Analytics;
use cultural_translator::backend::{
    BackendDescriptor, BackendProfile, BackendRegistry, HttpBackend, MockBackend, MockMode,
};
use cultural_translator::catalog::LanguageCatalog;
use cultural_translator::retry::RetryConfig;
use cultural_translator::selection::EngineSelector;
use cultural_translator::{
    Configuration, ErrorKind, TranslateError, TranslationPipeline, TranslationRequest,
};

// ==================== Test Helpers ====================

fn catalog() -> Arc<LanguageCatalog> {
    Arc::new(LanguageCatalog::with_defaults())
}

fn pipeline(backends: Vec<Arc<MockBackend>>) -> TranslationPipeline {
    let registry = Arc::new(BackendRegistry::new());
    for backend in backends {
        registry.register(backend).unwrap();
    }
    TranslationPipeline::new(catalog(), registry, Configuration::default())
        .expect("default configuration is valid")
}

fn suffix_backend(id: &str) -> Arc<MockBackend> {
    Arc::new(MockBackend::new(
        BackendProfile::new(id, &["en", "ml", "es", "ar"], 0.8),
        MockMode::Suffix,
    ))
}

// ==================== Translation Scenarios ====================

#[tokio::test]
async fn test_hello_english_to_malayalam() {
    let pipeline = pipeline(vec![suffix_backend("nmt")]);

    let result = pipeline
        .translate(TranslationRequest::new("Hello", "en", "ml").with_cultural_adaptation(true))
        .await
        .unwrap();

    assert!(!result.translated_text.is_empty());
    assert_eq!(result.metadata.engine, "nmt");
    assert_eq!(result.metadata.source_language, "en");
    assert_eq!(result.metadata.target_language, "ml");
    assert!((0.0..=1.0).contains(&result.quality.overall));
    assert!((0.0..=1.0).contains(&result.confidence));
}

#[tokio::test]
async fn test_unknown_target_leaves_no_trace() {
    let pipeline = pipeline(vec![suffix_backend("nmt")]);

    let err = pipeline
        .translate(TranslationRequest::new("Hi", "en", "xx"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedLanguagePair);
    assert_eq!(pipeline.clear_cache(), 0);
    assert_eq!(pipeline.get_analytics(), Analytics::default());
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let backend = suffix_backend("nmt");
    let pipeline = pipeline(vec![backend.clone()]);
    let request = TranslationRequest::new("Good morning", "en", "es");

    let first = pipeline.translate(request.clone()).await.unwrap();
    let second = pipeline.translate(request.clone()).await.unwrap();

    assert!(!first.metadata.cache_hit);
    assert!(second.metadata.cache_hit);
    assert_eq!(second.translated_text, first.translated_text);
    assert_eq!(backend.calls(), 1);

    // A different formality is a different cache entry
    pipeline
        .translate(request.clone().with_formality("formal"))
        .await
        .unwrap();
    assert_eq!(backend.calls(), 2);

    assert_eq!(pipeline.clear_cache(), 2);
    let third = pipeline.translate(request).await.unwrap();
    assert!(!third.metadata.cache_hit);
    assert_eq!(backend.calls(), 3);
}

#[tokio::test]
async fn test_auto_detected_source_language() {
    let pipeline = pipeline(vec![suffix_backend("nmt")]);

    let result = pipeline
        .translate(TranslationRequest::new("مرحبا بكم في المدينة", "", "en"))
        .await
        .unwrap();

    assert_eq!(result.metadata.source_language, "ar");
}

#[tokio::test]
async fn test_analytics_track_pairs() {
    let pipeline = pipeline(vec![suffix_backend("nmt")]);
    for text in ["one", "two", "three"] {
        pipeline
            .translate(TranslationRequest::new(text, "en", "ml"))
            .await
            .unwrap();
    }
    pipeline
        .translate(TranslationRequest::new("one", "en", "es"))
        .await
        .unwrap();

    let analytics = pipeline.get_analytics();
    assert_eq!(analytics.total_translations, 4);
    assert_eq!(analytics.language_pairs["en-ml"].requests, 3);
    assert_eq!(analytics.language_pairs["en-es"].requests, 1);
    assert_eq!(analytics.backend_calls, 4);
    assert_eq!(analytics.backend_success_rate, 100.0);

    pipeline.reset_analytics();
    assert_eq!(pipeline.get_analytics().total_translations, 0);
}

// ==================== Selection Scenarios ====================

#[test]
fn test_specialist_beats_higher_quality_generic() {
    let registry = Arc::new(BackendRegistry::new());
    registry.register(Arc::new(MockBackend::new(
        BackendProfile::new("generic", &["en", "ml"], 0.9)
            .with_cost(0.00002)
            .with_speed(1000.0),
        MockMode::Suffix,
    ))).unwrap();
    registry.register(Arc::new(MockBackend::new(
        BackendProfile::new("indic", &["en", "ml"], 0.8)
            .with_cost(0.00002)
            .with_speed(1000.0)
            .with_specialist(true),
        MockMode::Suffix,
    ))).unwrap();

    let selector = EngineSelector::new(registry, catalog());
    let ranked = selector.rank("en", "ml");
    assert_eq!(ranked[0].entry.profile.id, "indic");
    assert!((ranked[0].score - 0.82).abs() < 1e-9);
    assert!((ranked[1].score - 0.72).abs() < 1e-9);
    assert_eq!(selector.select("en", "ml").unwrap().profile.id, "indic");
}

#[tokio::test]
async fn test_disabling_the_only_backend() {
    let pipeline = pipeline(vec![suffix_backend("nmt")]);
    pipeline.set_backend_enabled("nmt", false).unwrap();

    let err = pipeline
        .translate(TranslationRequest::new("Hello", "en", "ml"))
        .await
        .unwrap_err();
    assert!(matches!(err, TranslateError::NoEngineAvailable { .. }));

    pipeline.set_backend_enabled("nmt", true).unwrap();
    assert!(pipeline
        .translate(TranslationRequest::new("Hello", "en", "ml"))
        .await
        .is_ok());
}

// ==================== HTTP Backend Scenarios ====================

fn http_pipeline(url: &str) -> TranslationPipeline {
    let descriptor = BackendDescriptor {
        profile: BackendProfile::new("libre", &["en", "es"], 0.75),
        url: url.to_string(),
        api_key: None,
    };
    let backend = HttpBackend::new(descriptor, std::time::Duration::from_secs(5))
        .unwrap()
        .with_retry(RetryConfig::none());

    let registry = Arc::new(BackendRegistry::new());
    registry.register(Arc::new(backend)).unwrap();
    TranslationPipeline::new(catalog(), registry, Configuration::default()).unwrap()
}

#[tokio::test]
async fn test_translate_through_http_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(serde_json::json!({
            "q": "Good morning",
            "source": "en",
            "target": "es"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translatedText": "Buenos días"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = http_pipeline(&server.uri());
    let result = pipeline
        .translate(TranslationRequest::new("Good morning", "en", "es").with_cultural_adaptation(false))
        .await
        .unwrap();

    assert_eq!(result.translated_text, "Buenos días");
    assert_eq!(result.metadata.engine, "libre");
    assert_eq!(result.metadata.attempts, 1);
}

#[tokio::test]
async fn test_http_backend_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let pipeline = http_pipeline(&server.uri());
    let err = pipeline
        .translate(TranslationRequest::new("Good morning", "en", "es"))
        .await
        .unwrap_err();

    match err {
        TranslateError::Backend { backend, retryable, .. } => {
            assert_eq!(backend, "libre");
            assert!(retryable);
        }
        other => panic!("expected backend error, got {:?}", other),
    }
    assert_eq!(pipeline.get_analytics().backend_failures, 1);
}
