//! Deterministic, network-free backend.

use super::{BackendProfile, TranslationBackend};
use crate::error::BackendError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Behaviour of a [`MockBackend`].
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target code: "Hello" -> "Hello_ml"
    Suffix,

    /// (text, target) -> translation, falling back to [`MockMode::Suffix`]
    Mappings(HashMap<(String, String), String>),

    /// Always fail with this error
    Error(BackendError),

    /// Return the input unchanged
    NoOp,
}

/// Mock backend with an optional simulated latency and a call counter.
#[derive(Debug)]
pub struct MockBackend {
    profile: BackendProfile,
    mode: MockMode,
    delay: Duration,
    calls: AtomicU64,
}

impl MockBackend {
    pub fn new(profile: BackendProfile, mode: MockMode) -> Self {
        Self {
            profile,
            mode,
            delay: Duration::ZERO,
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `translate` invocations so far, failed ones included.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn profile(&self) -> &BackendProfile {
        &self.profile
    }

    async fn translate(
        &self,
        text: &str,
        _source: &str,
        target: &str,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => Ok(map
                .get(&(text.to_string(), target.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", text, target))),
            MockMode::Error(err) => Err(err.clone()),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BackendProfile {
        BackendProfile::new("mock", &["en", "ml"], 0.8)
    }

    #[tokio::test]
    async fn test_suffix_mode() {
        let backend = MockBackend::new(profile(), MockMode::Suffix);
        assert_eq!(backend.translate("Hello", "en", "ml").await.unwrap(), "Hello_ml");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_mappings_mode_with_fallback() {
        let mut map = HashMap::new();
        map.insert(("Hello".to_string(), "ml".to_string()), "നമസ്കാരം".to_string());
        let backend = MockBackend::new(profile(), MockMode::Mappings(map));

        assert_eq!(backend.translate("Hello", "en", "ml").await.unwrap(), "നമസ്കാരം");
        assert_eq!(backend.translate("Bye", "en", "ml").await.unwrap(), "Bye_ml");
    }

    #[tokio::test]
    async fn test_error_mode_counts_calls() {
        let backend = MockBackend::new(
            profile(),
            MockMode::Error(BackendError::Unavailable("down".into())),
        );
        let err = backend.translate("Hello", "en", "ml").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_noop_mode() {
        let backend = MockBackend::new(profile(), MockMode::NoOp);
        assert_eq!(backend.translate("Hello", "en", "ml").await.unwrap(), "Hello");
    }
}
