//! Registry of server sources by provider.

use crate::error::{Result, UpdateError};
use crate::providers;
use crate::source::ServerSource;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use vpndir_core::ProviderId;

/// Maps each provider to the source its servers are collected from.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    sources: BTreeMap<ProviderId, Arc<dyn ServerSource>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the live upstream source of every known provider.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(providers::ipvanish::Ipvanish::default()));
        registry.register(Arc::new(providers::ivpn::Ivpn::default()));
        registry.register(Arc::new(providers::mullvad::Mullvad::default()));
        registry.register(Arc::new(providers::nordvpn::Nordvpn::default()));
        registry.register(Arc::new(providers::surfshark::Surfshark::default()));
        registry.register(Arc::new(providers::torguard::Torguard::default()));
        registry.register(Arc::new(providers::vpnsecure::Vpnsecure::default()));
        registry.register(Arc::new(providers::vyprvpn::Vyprvpn::default()));
        registry.register(Arc::new(providers::windscribe::Windscribe::default()));
        debug!(count = registry.len(), "registered server sources");
        registry
    }

    /// Register `source`, replacing any source of the same provider.
    pub fn register(&mut self, source: Arc<dyn ServerSource>) {
        self.sources.insert(source.provider(), source);
    }

    /// Source registered for `provider`.
    pub fn get(&self, provider: ProviderId) -> Result<Arc<dyn ServerSource>> {
        self.sources
            .get(&provider)
            .cloned()
            .ok_or(UpdateError::NoSource(provider))
    }

    /// Registered providers, in name order.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderId> {
        self.sources.keys().copied().collect()
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True when no source is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_provider() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.providers(), ProviderId::ALL.to_vec());

        for provider in ProviderId::ALL {
            let source = registry.get(provider).expect("registered");
            assert_eq!(source.provider(), provider);
            assert!(source.min_servers() > 0);
        }
    }

    #[test]
    fn test_missing_source() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get(ProviderId::Mullvad),
            Err(UpdateError::NoSource(ProviderId::Mullvad))
        ));
    }
}
