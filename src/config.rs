use crate::adaptation::MatchMode;
use crate::error::TranslateError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration consumed by the pipeline.
///
/// Readable and partially updatable while the service runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Codes allowed in requests; empty allows every catalog language
    pub enabled_languages: Vec<String>,
    /// Source language used for auto requests when detection is off
    pub default_language: String,
    /// Source language used when detection finds nothing
    pub fallback_language: String,
    pub auto_detection: bool,
    /// Master switch for the adaptation chain
    pub cultural_adaptation: bool,
    /// Minimum overall quality for a result to be cached
    pub quality_threshold: f64,
    pub cache_enabled: bool,
    /// Maximum cached results; 0 means unbounded
    pub cache_capacity: usize,
    pub backend_timeout_ms: u64,
    /// Ranked backends tried per request before giving up
    pub max_backend_attempts: u32,
    pub max_alternatives: usize,
    pub adaptation_match: MatchMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            enabled_languages: Vec::new(),
            default_language: "en".to_string(),
            fallback_language: "en".to_string(),
            auto_detection: true,
            cultural_adaptation: true,
            quality_threshold: 0.7,
            cache_enabled: true,
            cache_capacity: 10_000,
            backend_timeout_ms: 10_000,
            max_backend_attempts: 3,
            max_alternatives: 2,
            adaptation_match: MatchMode::Substring,
        }
    }
}

impl Configuration {
    /// Read pipeline settings from the environment, defaulting anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let adaptation_match = match std::env::var("ADAPTATION_MATCH") {
            Ok(value) => MatchMode::parse(&value)
                .with_context(|| format!("ADAPTATION_MATCH must be 'substring' or 'word', got '{}'", value))?,
            Err(_) => defaults.adaptation_match,
        };

        let config = Self {
            enabled_languages: std::env::var("ENABLED_LANGUAGES")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .unwrap_or(defaults.default_language),
            fallback_language: std::env::var("FALLBACK_LANGUAGE")
                .unwrap_or(defaults.fallback_language),
            auto_detection: env_or("AUTO_DETECTION", defaults.auto_detection),
            cultural_adaptation: env_or("CULTURAL_ADAPTATION", defaults.cultural_adaptation),
            quality_threshold: env_or("QUALITY_THRESHOLD", defaults.quality_threshold),
            cache_enabled: env_or("CACHE_ENABLED", defaults.cache_enabled),
            cache_capacity: env_or("CACHE_CAPACITY", defaults.cache_capacity),
            backend_timeout_ms: env_or("BACKEND_TIMEOUT_MS", defaults.backend_timeout_ms),
            max_backend_attempts: env_or("MAX_BACKEND_ATTEMPTS", defaults.max_backend_attempts),
            max_alternatives: env_or("MAX_ALTERNATIVES", defaults.max_alternatives),
            adaptation_match,
        };

        config.validate().context("Invalid pipeline configuration")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TranslateError> {
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(TranslateError::Validation(format!(
                "qualityThreshold must be within [0, 1], got {}",
                self.quality_threshold
            )));
        }
        if self.max_backend_attempts == 0 {
            return Err(TranslateError::Validation(
                "maxBackendAttempts must be at least 1".to_string(),
            ));
        }
        if self.backend_timeout_ms == 0 {
            return Err(TranslateError::Validation(
                "backendTimeoutMs must be at least 1".to_string(),
            ));
        }
        if self.default_language.trim().is_empty() || self.fallback_language.trim().is_empty() {
            return Err(TranslateError::Validation(
                "defaultLanguage and fallbackLanguage must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the merged configuration, or a validation error leaving `self`
    /// untouched.
    pub fn merged(&self, update: &ConfigurationUpdate) -> Result<Self, TranslateError> {
        let mut merged = self.clone();
        if let Some(enabled) = &update.enabled_languages {
            merged.enabled_languages = enabled.clone();
        }
        if let Some(code) = &update.default_language {
            merged.default_language = code.clone();
        }
        if let Some(code) = &update.fallback_language {
            merged.fallback_language = code.clone();
        }
        if let Some(value) = update.auto_detection {
            merged.auto_detection = value;
        }
        if let Some(value) = update.cultural_adaptation {
            merged.cultural_adaptation = value;
        }
        if let Some(value) = update.quality_threshold {
            merged.quality_threshold = value;
        }
        if let Some(value) = update.cache_enabled {
            merged.cache_enabled = value;
        }
        if let Some(value) = update.cache_capacity {
            merged.cache_capacity = value;
        }
        if let Some(value) = update.backend_timeout_ms {
            merged.backend_timeout_ms = value;
        }
        if let Some(value) = update.max_backend_attempts {
            merged.max_backend_attempts = value;
        }
        if let Some(value) = update.max_alternatives {
            merged.max_alternatives = value;
        }
        if let Some(value) = update.adaptation_match {
            merged.adaptation_match = value;
        }
        merged.validate()?;
        Ok(merged)
    }

    /// Whether the code may appear in a request.
    pub fn is_language_enabled(&self, code: &str) -> bool {
        self.enabled_languages.is_empty() || self.enabled_languages.iter().any(|c| c == code)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}

/// Partial [`Configuration`]; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationUpdate {
    pub enabled_languages: Option<Vec<String>>,
    pub default_language: Option<String>,
    pub fallback_language: Option<String>,
    pub auto_detection: Option<bool>,
    pub cultural_adaptation: Option<bool>,
    pub quality_threshold: Option<f64>,
    pub cache_enabled: Option<bool>,
    pub cache_capacity: Option<usize>,
    pub backend_timeout_ms: Option<u64>,
    pub max_backend_attempts: Option<u32>,
    pub max_alternatives: Option<usize>,
    pub adaptation_match: Option<MatchMode>,
}

/// Process configuration for the server binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,

    // Backends
    /// JSON array of backend descriptors
    pub backends_file: Option<PathBuf>,
    /// Single generic LibreTranslate backend, used when no file is given
    pub libretranslate_url: Option<String>,
    pub libretranslate_api_key: Option<String>,

    pub pipeline: Configuration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),

            backends_file: std::env::var("BACKENDS_FILE").ok().map(PathBuf::from),
            libretranslate_url: std::env::var("LIBRETRANSLATE_URL").ok(),
            libretranslate_api_key: std::env::var("LIBRETRANSLATE_API_KEY").ok(),

            pipeline: Configuration::from_env()?,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}
