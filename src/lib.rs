//! Multi-language translation with backend selection and cultural adaptation.
//!
//! A [`TranslationPipeline`] resolves the source language, picks the best
//! registered backend, adapts the output to the target culture, scores it
//! and caches results worth reusing. [`server::router`] exposes the pipeline
//! over HTTP.

pub mod adaptation;
pub mod analytics;
pub mod backend;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod detection;
pub mod error;
pub mod pipeline;
pub mod quality;
pub mod retry;
pub mod selection;
pub mod server;
pub mod types;

pub use config::{AppConfig, Configuration, ConfigurationUpdate};
pub use error::{BackendError, ErrorKind, TranslateError};
pub use pipeline::TranslationPipeline;
pub use types::{DetectionResult, TranslationRequest, TranslationResult};
