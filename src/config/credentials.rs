use std::fmt;
use std::sync::Arc;

use super::persistence::{KeyValueStore, StoreResult};
use crate::providers::deepseek::API_KEY_ENV_VAR;
use crate::providers::types::ApiKey;

pub const API_KEY_STORAGE_KEY: &str = "deepseek_api_key";

/// Where the active key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Store,
}

/// API key lookup: the environment variable wins over the stored value.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn KeyValueStore>,
}

impl Credentials {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> StoreResult<Option<(ApiKey, KeySource)>> {
        self.resolve(std::env::var(API_KEY_ENV_VAR).ok().as_deref())
    }

    /// Same as [`Self::load`] with an explicit environment value.
    pub fn resolve(&self, env_value: Option<&str>) -> StoreResult<Option<(ApiKey, KeySource)>> {
        if let Some(key) = env_value.and_then(ApiKey::parse) {
            return Ok(Some((key, KeySource::Environment)));
        }
        Ok(self
            .load_stored()?
            .map(|key| (key, KeySource::Store)))
    }

    pub fn load_stored(&self) -> StoreResult<Option<ApiKey>> {
        Ok(self
            .store
            .get(API_KEY_STORAGE_KEY)?
            .as_deref()
            .and_then(ApiKey::parse))
    }

    pub fn save(&self, key: &ApiKey) -> StoreResult<()> {
        self.store.set(API_KEY_STORAGE_KEY, key.as_str())
    }

    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove(API_KEY_STORAGE_KEY)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::persistence::MemoryStore;

    fn credentials() -> Credentials {
        Credentials::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_absent_key() {
        assert!(credentials().resolve(None).expect("resolve").is_none());
    }

    #[test]
    fn test_saved_key_loaded() {
        let credentials = credentials();
        credentials
            .save(&ApiKey::new("sk-stored"))
            .expect("save");

        let (key, source) = credentials.resolve(None).expect("resolve").expect("key");
        assert_eq!(key.as_str(), "sk-stored");
        assert_eq!(source, KeySource::Store);
    }

    #[test]
    fn test_environment_overrides_store() {
        let credentials = credentials();
        credentials.save(&ApiKey::new("sk-stored")).expect("save");

        let (key, source) = credentials
            .resolve(Some("  sk-env  "))
            .expect("resolve")
            .expect("key");
        assert_eq!(key.as_str(), "sk-env");
        assert_eq!(source, KeySource::Environment);

        let (key, _) = credentials.resolve(Some("   ")).expect("resolve").expect("key");
        assert_eq!(key.as_str(), "sk-stored");
    }

    #[test]
    fn test_clear() {
        let credentials = credentials();
        credentials.save(&ApiKey::new("sk-1")).expect("save");
        credentials.clear().expect("clear");
        assert!(credentials.load_stored().expect("load").is_none());
    }
}
