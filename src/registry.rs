// src/registry.rs
// =============================================================================
// Maps configurations to profiles.
//
// Two structurally equal configs (after canonicalization) get the same
// Profile, and with it the same cache and scheduler. Different configs
// never share anything, so a result probed with one user agent can't leak
// into a run that uses another.
//
// The registry is an ordinary value: whoever drives the runs owns it,
// passes it around, and drops it (or calls `clear`) to tear everything down.
// =============================================================================

use crate::checker::{Fetcher, ReqwestFetcher};
use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::Profile;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

type FetcherFactory = Box<dyn Fn(&Config) -> Result<Arc<dyn Fetcher>> + Send + Sync>;

pub struct ProfileRegistry {
    profiles: Mutex<HashMap<Config, Arc<Profile>>>,
    make_fetcher: FetcherFactory,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::with_fetcher_factory(|config| {
            let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::from_config(config)?);
            Ok(fetcher)
        })
    }

    // For swapping the transport, e.g. a scripted one in tests
    pub fn with_fetcher_factory<F>(make_fetcher: F) -> Self
    where
        F: Fn(&Config) -> Result<Arc<dyn Fetcher>> + Send + Sync + 'static,
    {
        Self {
            profiles: Mutex::new(HashMap::new()),
            make_fetcher: Box::new(make_fetcher),
        }
    }

    // Returns the profile for `config`, building it on first use
    pub fn get_or_create(&self, config: &Config) -> Result<Arc<Profile>> {
        let key = config.canonical();
        let mut profiles = self.lock();

        if let Some(profile) = profiles.get(&key) {
            return Ok(Arc::clone(profile));
        }

        let fetcher = (self.make_fetcher)(&key)?;
        let profile = Arc::new(Profile::new(key.clone(), fetcher)?);
        debug!(profiles = profiles.len() + 1, "created link-checking profile");
        profiles.insert(key, Arc::clone(&profile));
        Ok(profile)
    }

    // Drops the registry's handle. Runs still holding the Arc keep going;
    // the next `get_or_create` starts from an empty cache.
    pub fn remove(&self, config: &Config) -> Option<Arc<Profile>> {
        self.lock().remove(&config.canonical())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock only means another thread panicked mid-insert; the
    // map itself is still consistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Config, Arc<Profile>>> {
        self.profiles.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::testing::{FakeFetcher, Reply};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_registry(built: Arc<AtomicUsize>) -> ProfileRegistry {
        ProfileRegistry::with_fetcher_factory(move |_| {
            built.fetch_add(1, Ordering::SeqCst);
            let fetcher: Arc<dyn Fetcher> = Arc::new(FakeFetcher::new(vec![Reply::status(200)]));
            Ok(fetcher)
        })
    }

    #[test]
    fn test_equal_configs_share_a_profile() {
        let built = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(built.clone());

        let a = Config {
            prefer_get: vec!["https://b.test".into(), "https://a.test".into()],
            ..Config::default()
        };
        let b = Config {
            prefer_get: vec!["https://a.test".into(), "https://b.test".into()],
            ..Config::default()
        };

        let first = registry.get_or_create(&a).unwrap();
        let second = registry.get_or_create(&b).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_different_configs_do_not_share() {
        let built = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(built.clone());

        let a = Config::default();
        let b = Config {
            user_agent: "other-agent/2.0".into(),
            ..Config::default()
        };

        let first = registry.get_or_create(&a).unwrap();
        let second = registry.get_or_create(&b).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_starts_fresh() {
        let built = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(built.clone());
        let config = Config::default();

        let profile = registry.get_or_create(&config).unwrap();
        profile.probe_remote("https://a.test/").await;
        assert_eq!(profile.cache().len(), 1);

        assert!(registry.remove(&config).is_some());
        let fresh = registry.get_or_create(&config).unwrap();
        assert!(fresh.cache().is_empty());
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let registry = counting_registry(Arc::new(AtomicUsize::new(0)));
        let config = Config {
            ignore: vec!["a**b".into()],
            ..Config::default()
        };
        assert!(registry.get_or_create(&config).is_err());
        assert!(registry.is_empty());
    }
}
