use super::{BackendProfile, TranslationBackend};
use crate::error::TranslateError;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// A backend together with the profile the registry currently holds for it.
///
/// The registry's copy of the profile is authoritative for the enabled flag, so
/// toggling a backend never needs to touch the backend itself.
#[derive(Clone)]
pub struct RegisteredBackend {
    pub profile: BackendProfile,
    pub backend: Arc<dyn TranslationBackend>,
}

impl std::fmt::Debug for RegisteredBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredBackend")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// Read-mostly set of registered backends, in registration order.
#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<Vec<RegisteredBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend, replacing any entry with the same id. Fails with
    /// `Validation` if its profile is unusable for ranking.
    pub fn register(&self, backend: Arc<dyn TranslationBackend>) -> Result<(), TranslateError> {
        let profile = backend.profile().clone();
        profile.validate()?;
        let mut backends = self.backends.write();
        info!(
            "Registered backend '{}' ({} languages, quality {:.2})",
            profile.id,
            profile.languages.len(),
            profile.quality
        );
        let entry = RegisteredBackend { profile, backend };
        match backends.iter_mut().find(|b| b.profile.id == entry.profile.id) {
            Some(existing) => *existing = entry,
            None => backends.push(entry),
        }
        Ok(())
    }

    /// Returns false if no backend has this id.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let mut backends = self.backends.write();
        match backends.iter_mut().find(|b| b.profile.id == id) {
            Some(entry) => {
                entry.profile.enabled = enabled;
                info!("Backend '{}' enabled={}", id, enabled);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<RegisteredBackend> {
        self.backends
            .read()
            .iter()
            .find(|b| b.profile.id == id)
            .cloned()
    }

    /// Consistent copy of every entry, for ranking outside the lock.
    pub fn snapshot(&self) -> Vec<RegisteredBackend> {
        self.backends.read().clone()
    }

    pub fn profiles(&self) -> Vec<BackendProfile> {
        self.backends
            .read()
            .iter()
            .map(|b| b.profile.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.backends.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.read().is_empty()
    }
}
