//! Keyed registry for reusing configured clients.
//!
//! Building an [`HttpClient`] allocates a connection pool, so callers that
//! handle many requests for the same credentials should reuse one client.
//! The registry is an explicit, application-owned cache keyed by
//! [`PcoConfig::cache_key`]; there is no global state, which keeps tests
//! isolated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::clients::http_client::HttpClient;
use crate::config::PcoConfig;

/// An application-owned cache of configured clients.
///
/// # Example
///
/// ```rust
/// use pco_api::{AuthConfig, ClientRegistry, PcoConfig};
///
/// let registry = ClientRegistry::new();
/// let config = PcoConfig::builder()
///     .auth(AuthConfig::oauth("token").unwrap())
///     .build()
///     .unwrap();
///
/// let first = registry.get(&config);
/// let second = registry.get(&config);
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
///
/// registry.invalidate(&config);
/// let third = registry.get(&config);
/// assert!(!std::sync::Arc::ptr_eq(&first, &third));
/// ```
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<u64, Arc<HttpClient>>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the client for this configuration, creating one on a miss.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned, which requires a prior
    /// panic while holding it.
    #[must_use]
    pub fn get(&self, config: &PcoConfig) -> Arc<HttpClient> {
        let key = config.cache_key();
        let mut clients = self.clients.lock().expect("client registry lock poisoned");
        Arc::clone(
            clients
                .entry(key)
                .or_insert_with(|| Arc::new(HttpClient::new(config.clone()))),
        )
    }

    /// Removes the cached client for this configuration, if any.
    ///
    /// In-flight requests on the removed client finish normally; the next
    /// [`get`](Self::get) builds a fresh client.
    pub fn invalidate(&self, config: &PcoConfig) {
        if let Ok(mut clients) = self.clients.lock() {
            clients.remove(&config.cache_key());
        }
    }

    /// Removes every cached client.
    pub fn clear(&self) {
        if let Ok(mut clients) = self.clients.lock() {
            clients.clear();
        }
    }

    /// Returns the number of cached clients.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients
            .lock()
            .expect("client registry lock poisoned")
            .len()
    }

    /// Returns `true` if no clients are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    fn config_with_token(token: &str) -> PcoConfig {
        PcoConfig::builder()
            .auth(AuthConfig::oauth(token).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_get_reuses_client_for_equal_configs() {
        let registry = ClientRegistry::new();
        let config = config_with_token("token-a");

        let first = registry.get(&config);
        let second = registry.get(&config);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_creates_distinct_clients_for_distinct_configs() {
        let registry = ClientRegistry::new();
        let first = registry.get(&config_with_token("token-a"));
        let second = registry.get(&config_with_token("token-b"));

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalidate_forces_fresh_client() {
        let registry = ClientRegistry::new();
        let config = config_with_token("token-a");

        let first = registry.get(&config);
        registry.invalidate(&config);
        let second = registry.get(&config);

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_clear_empties_registry() {
        let registry = ClientRegistry::new();
        let _ = registry.get(&config_with_token("token-a"));
        let _ = registry.get(&config_with_token("token-b"));

        registry.clear();
        assert!(registry.is_empty());
    }
}
