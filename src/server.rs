//! HTTP routes over the pipeline.
//!
//! Every response uses the envelope
//! `{success, data?, error?: {kind, message}, timestamp}`.

use crate::analytics::Analytics;
use crate::backend::BackendProfile;
use crate::catalog::{CulturalContext, Language};
use crate::config::{Configuration, ConfigurationUpdate};
use crate::error::{ErrorKind, TranslateError};
use crate::pipeline::TranslationPipeline;
use crate::types::{DetectionResult, TranslationRequest, TranslationResult};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Largest accepted batch.
pub const MAX_BATCH_SIZE: usize = 100;

/// Standard response wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: String,
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn err(err: &TranslateError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                kind: err.kind().as_str().to_string(),
                message: err.to_string(),
            }),
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// An error on its way out, with its HTTP status.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    error: TranslateError,
}

impl ApiFailure {
    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: TranslateError::Validation(message),
        }
    }
}

impl From<TranslateError> for ApiFailure {
    fn from(error: TranslateError) -> Self {
        Self {
            status: status_for(&error),
            error,
        }
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        TranslateError::Validation(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(Envelope::<()>::err(&self.error))).into_response()
    }
}

pub fn status_for(error: &TranslateError) -> StatusCode {
    match error.kind() {
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::UnsupportedLanguagePair => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NoEngineAvailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::TranslationBackendError => StatusCode::BAD_GATEWAY,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

type ApiResult<T> = Result<Envelope<T>, ApiFailure>;

/// Build the router. The pipeline is the only state.
pub fn router(pipeline: TranslationPipeline) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/translate", post(translate))
        .route("/api/translate/batch", post(translate_batch))
        .route("/api/detect", post(detect))
        .route("/api/languages", get(list_languages).post(add_language))
        .route("/api/languages/:code", get(get_language).put(update_language))
        .route("/api/languages/:code/context", get(get_context))
        .route("/api/config", get(get_config).patch(update_config))
        .route("/api/cache", delete(clear_cache))
        .route("/api/analytics", get(analytics).delete(reset_analytics))
        .route("/api/backends", get(list_backends))
        .route("/api/backends/:id", patch(set_backend_enabled))
        .route("/api/feedback", post(feedback))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub languages: usize,
    pub backends: usize,
}

async fn health(State(pipeline): State<TranslationPipeline>) -> Envelope<Health> {
    Envelope::ok(Health {
        status: "ok".to_string(),
        languages: pipeline.list_languages().len(),
        backends: pipeline.list_backends().iter().filter(|b| b.enabled).count(),
    })
}

async fn translate(
    State(pipeline): State<TranslationPipeline>,
    body: Result<Json<TranslationRequest>, JsonRejection>,
) -> ApiResult<TranslationResult> {
    let Json(request) = body?;
    Ok(Envelope::ok(pipeline.translate(request).await?))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub requests: Vec<TranslationRequest>,
}

/// Each item carries its own envelope; one failure does not fail the batch.
async fn translate_batch(
    State(pipeline): State<TranslationPipeline>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<Vec<Envelope<TranslationResult>>> {
    let Json(batch) = body?;
    if batch.requests.is_empty() || batch.requests.len() > MAX_BATCH_SIZE {
        return Err(TranslateError::Validation(format!(
            "batch must contain between 1 and {} requests, got {}",
            MAX_BATCH_SIZE,
            batch.requests.len()
        ))
        .into());
    }

    let runs = batch
        .requests
        .into_iter()
        .map(|request| pipeline.translate(request));
    let items = futures::future::join_all(runs)
        .await
        .into_iter()
        .map(|outcome| match outcome {
            Ok(result) => Envelope::ok(result),
            Err(err) => Envelope::err(&err),
        })
        .collect();
    Ok(Envelope::ok(items))
}

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

async fn detect(
    State(pipeline): State<TranslationPipeline>,
    body: Result<Json<DetectRequest>, JsonRejection>,
) -> ApiResult<DetectionResult> {
    let Json(request) = body?;
    Ok(Envelope::ok(pipeline.detect_language(&request.text)?))
}

async fn list_languages(State(pipeline): State<TranslationPipeline>) -> Envelope<Vec<Language>> {
    Envelope::ok(pipeline.list_languages())
}

async fn get_language(
    State(pipeline): State<TranslationPipeline>,
    Path(code): Path<String>,
) -> ApiResult<Language> {
    pipeline
        .get_language(&code)
        .map(Envelope::ok)
        .ok_or_else(|| ApiFailure::not_found(format!("unknown language '{}'", code)))
}

#[derive(Debug, Deserialize)]
pub struct ContextQuery {
    pub region: Option<String>,
}

async fn get_context(
    State(pipeline): State<TranslationPipeline>,
    Path(code): Path<String>,
    Query(query): Query<ContextQuery>,
) -> ApiResult<CulturalContext> {
    pipeline
        .get_cultural_context(&code, query.region.as_deref())
        .map(Envelope::ok)
        .ok_or_else(|| ApiFailure::not_found(format!("no cultural context for '{}'", code)))
}

async fn add_language(
    State(pipeline): State<TranslationPipeline>,
    body: Result<Json<Language>, JsonRejection>,
) -> ApiResult<Language> {
    let Json(language) = body?;
    pipeline.add_language(language.clone())?;
    Ok(Envelope::ok(language))
}

async fn update_language(
    State(pipeline): State<TranslationPipeline>,
    Path(code): Path<String>,
    body: Result<Json<Language>, JsonRejection>,
) -> ApiResult<Language> {
    let Json(language) = body?;
    if language.code != code {
        return Err(TranslateError::Validation(format!(
            "path code '{}' does not match body code '{}'",
            code, language.code
        ))
        .into());
    }
    pipeline.update_language(language.clone())?;
    Ok(Envelope::ok(language))
}

async fn get_config(State(pipeline): State<TranslationPipeline>) -> Envelope<Configuration> {
    Envelope::ok(pipeline.get_configuration())
}

async fn update_config(
    State(pipeline): State<TranslationPipeline>,
    body: Result<Json<ConfigurationUpdate>, JsonRejection>,
) -> ApiResult<Configuration> {
    let Json(update) = body?;
    Ok(Envelope::ok(pipeline.update_configuration(update)?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Cleared {
    pub cleared: usize,
}

async fn clear_cache(State(pipeline): State<TranslationPipeline>) -> Envelope<Cleared> {
    Envelope::ok(Cleared {
        cleared: pipeline.clear_cache(),
    })
}

async fn analytics(State(pipeline): State<TranslationPipeline>) -> Envelope<Analytics> {
    Envelope::ok(pipeline.get_analytics())
}

async fn reset_analytics(State(pipeline): State<TranslationPipeline>) -> Envelope<Analytics> {
    pipeline.reset_analytics();
    Envelope::ok(pipeline.get_analytics())
}

async fn list_backends(State(pipeline): State<TranslationPipeline>) -> Envelope<Vec<BackendProfile>> {
    Envelope::ok(pipeline.list_backends())
}

#[derive(Debug, Deserialize)]
pub struct BackendToggle {
    pub enabled: bool,
}

async fn set_backend_enabled(
    State(pipeline): State<TranslationPipeline>,
    Path(id): Path<String>,
    body: Result<Json<BackendToggle>, JsonRejection>,
) -> ApiResult<Vec<BackendProfile>> {
    let Json(toggle) = body?;
    pipeline.set_backend_enabled(&id, toggle.enabled)?;
    Ok(Envelope::ok(pipeline.list_backends()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub source_language: String,
    pub target_language: String,
    /// 1 (poor) to 5 (excellent)
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

async fn feedback(body: Result<Json<Feedback>, JsonRejection>) -> ApiResult<()> {
    let Json(feedback) = body?;
    if !(1..=5).contains(&feedback.rating) {
        return Err(TranslateError::Validation(format!(
            "rating must be between 1 and 5, got {}",
            feedback.rating
        ))
        .into());
    }
    info!(
        "Feedback for {} -> {}: rating {} ({})",
        feedback.source_language,
        feedback.target_language,
        feedback.rating,
        feedback.comment.as_deref().unwrap_or("no comment")
    );
    Ok(Envelope::ok(()))
}
