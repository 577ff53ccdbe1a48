//! Error taxonomy for the translation pipeline.
//!
//! Every fatal error returned by a public pipeline operation carries a stable
//! machine-readable [`ErrorKind`] plus a human-readable message.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the public pipeline operations.
///
/// The type is `Clone` so that a single in-flight translation can hand the same
/// outcome to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslateError {
    /// Malformed request (empty text, bad configuration value, ...)
    #[error("invalid request: {0}")]
    Validation(String),

    /// One or both language codes are unknown or disabled
    #[error("unsupported language pair: {source_language} -> {target_language}")]
    UnsupportedLanguagePair {
        source_language: String,
        target_language: String,
    },

    /// No enabled backend covers both languages
    #[error("no translation engine available for {source_language} -> {target_language}")]
    NoEngineAvailable {
        source_language: String,
        target_language: String,
    },

    /// Every backend attempt failed
    #[error("translation backend '{backend}' failed: {message}")]
    Backend {
        backend: String,
        message: String,
        retryable: bool,
    },

    /// A panic or other unexpected fault inside the pipeline
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable machine-readable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    UnsupportedLanguagePair,
    NoEngineAvailable,
    TranslationBackendError,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::UnsupportedLanguagePair => "unsupported_language_pair",
            ErrorKind::NoEngineAvailable => "no_engine_available",
            ErrorKind::TranslationBackendError => "translation_backend_error",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl TranslateError {
    pub fn unsupported_pair(source: &str, target: &str) -> Self {
        TranslateError::UnsupportedLanguagePair {
            source_language: source.to_string(),
            target_language: target.to_string(),
        }
    }

    pub fn no_engine(source: &str, target: &str) -> Self {
        TranslateError::NoEngineAvailable {
            source_language: source.to_string(),
            target_language: target.to_string(),
        }
    }

    /// The machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::Validation(_) => ErrorKind::ValidationError,
            TranslateError::UnsupportedLanguagePair { .. } => ErrorKind::UnsupportedLanguagePair,
            TranslateError::NoEngineAvailable { .. } => ErrorKind::NoEngineAvailable,
            TranslateError::Backend { .. } => ErrorKind::TranslationBackendError,
            TranslateError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Whether retrying the same request later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TranslateError::Backend { retryable: true, .. })
    }
}

/// Failure reported by a single translation backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Rate limits (429), server errors (5xx), timeouts and network failures are
    /// transient. Other 4xx client errors and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Timeout(_) | BackendError::Network(_) | BackendError::Unavailable(_) => {
                true
            }
            BackendError::Http { status, .. } => *status == 429 || *status >= 500,
            BackendError::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(Duration::ZERO)
        } else if err.is_decode() {
            BackendError::InvalidResponse(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}
