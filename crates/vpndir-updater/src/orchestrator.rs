//! Update pipeline for one provider.
//!
//! A run is linear: Fetch, Extract and Merge (delegated to the provider's
//! [`ServerSource`]), a first count check, Resolve, Validate, a second count
//! check and Sort. Any fatal error ends the run; the caller keeps the
//! previous snapshot for that provider.

use crate::error::{Result, UpdateError};
use crate::hosts::HostToServers;
use crate::registry::ProviderRegistry;
use crate::source::ServerSource;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vpndir_core::{ProviderId, ResolverConfig, Server, UpdatesConfig};
use vpndir_extract::Fetcher;
use vpndir_resolver::{ParallelResolver, ParallelSettings, RepeatSettings};

/// Servers and warnings of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Validated servers in directory order
    pub servers: Vec<Server>,
    /// Degraded records and unresolved hosts, in detection order
    pub warnings: Vec<String>,
}

/// Result of updating a single provider.
#[derive(Debug)]
pub struct ProviderUpdate {
    /// Provider that was updated
    pub provider: ProviderId,
    /// Outcome of the run
    pub result: Result<FetchOutcome>,
}

/// Runs provider update pipelines.
#[derive(Clone)]
pub struct Orchestrator {
    /// Shared HTTP client
    client: reqwest::Client,
    /// Resolver for hostnames missing addresses
    resolver: ParallelResolver,
    /// Default resolver budget
    resolver_config: ResolverConfig,
}

impl Orchestrator {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        resolver: ParallelResolver,
        resolver_config: ResolverConfig,
    ) -> Self {
        Self {
            client,
            resolver,
            resolver_config,
        }
    }

    /// Run the whole pipeline for `source`.
    ///
    /// Fails with [`UpdateError::NotEnoughServers`] when fewer than
    /// `min_servers` servers exist after merging or after resolution.
    pub async fn fetch_servers(
        &self,
        source: &dyn ServerSource,
        min_servers: usize,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome> {
        let provider = source.provider();
        let fetcher = Fetcher::new(self.client.clone(), cancel.clone());
        let mut hosts = HostToServers::new();
        let mut warnings = Vec::new();

        source.collect(&fetcher, &mut hosts, &mut warnings).await?;
        debug!(provider = %provider, servers = hosts.len(), "extracted servers");
        ensure_enough(hosts.len(), min_servers)?;

        let missing = hosts.hosts_missing_ips();
        let host_to_ips = if missing.is_empty() {
            BTreeMap::new()
        } else {
            debug!(provider = %provider, hosts = missing.len(), "resolving hosts");
            let settings = ParallelSettings {
                hosts: missing,
                max_fail_ratio: source
                    .max_fail_ratio()
                    .unwrap_or(self.resolver_config.max_fail_ratio),
                repeat: RepeatSettings::from(&self.resolver_config),
            };
            let resolution = self.resolver.resolve(&settings, cancel).await?;
            warnings.extend(resolution.warnings);
            resolution.host_to_ips
        };
        hosts.adapt_with_ips(&host_to_ips);

        let mut servers = hosts.into_servers();
        servers.retain(|server| match server.validate() {
            Ok(()) => true,
            Err(err) => {
                warnings.push(err.to_string());
                false
            }
        });
        ensure_enough(servers.len(), min_servers)?;

        servers.sort_by(Server::directory_cmp);
        info!(
            provider = %provider,
            servers = servers.len(),
            warnings = warnings.len(),
            "provider update succeeded"
        );

        Ok(FetchOutcome { servers, warnings })
    }

    /// Update several providers concurrently, at most `updates.concurrent_updates`
    /// at a time. Results come back in completion order.
    pub async fn update_all(
        &self,
        registry: &ProviderRegistry,
        providers: &[ProviderId],
        updates: &UpdatesConfig,
        cancel: &CancellationToken,
    ) -> Vec<ProviderUpdate> {
        let max_concurrent = updates.concurrent_updates.max(1);
        let mut pending = providers.iter().copied();
        let mut running = FuturesUnordered::new();
        let mut results = Vec::with_capacity(providers.len());

        let start = |provider: ProviderId| {
            let source = registry.get(provider);
            let min_servers = updates.min_servers.get(&provider).copied();
            let cancel = cancel.clone();
            async move {
                let result = match source {
                    Ok(source) => {
                        let min_servers = min_servers.unwrap_or_else(|| source.min_servers());
                        self.fetch_servers(source.as_ref(), min_servers, &cancel)
                            .await
                    }
                    Err(err) => Err(err),
                };
                ProviderUpdate { provider, result }
            }
        };

        for provider in pending.by_ref().take(max_concurrent) {
            running.push(start(provider));
        }

        while let Some(update) = running.next().await {
            if let Err(err) = &update.result {
                warn!(provider = %update.provider, error = %err, "provider update failed");
            }
            results.push(update);

            if let Some(provider) = pending.next() {
                running.push(start(provider));
            }
        }

        results
    }
}

fn ensure_enough(actual: usize, required: usize) -> Result<()> {
    if actual < required {
        return Err(UpdateError::NotEnoughServers { actual, required });
    }
    Ok(())
}

