//! Single-host lookups.
//!
//! [`Lookup`] is the seam between the parallel round logic and an actual DNS
//! client, so the rounds can be driven against a fixed table in tests.

use crate::error::LookupError;
use async_trait::async_trait;
use hickory_resolver::{
    config::{LookupIpStrategy, ResolverConfig},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::collections::HashMap;
use std::net::IpAddr;

/// Resolves one hostname to its addresses.
#[async_trait]
pub trait Lookup: Send + Sync {
    /// Look up `host`. An empty answer should be reported as an error.
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, LookupError>;
}

/// DNS lookups through hickory-dns using the system configuration.
pub struct HickoryLookup {
    resolver: TokioResolver,
}

impl HickoryLookup {
    /// Create a resolver from the system DNS settings, falling back to
    /// hickory's defaults when they cannot be read.
    #[must_use]
    pub fn new() -> Self {
        let mut builder = match TokioResolver::builder_tokio() {
            Ok(builder) => {
                tracing::debug!("Using system DNS configuration");
                builder
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read system DNS config, using defaults");
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
            }
        };

        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        Self {
            resolver: builder.build(),
        }
    }
}

impl Default for HickoryLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lookup for HickoryLookup {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        let answer = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|e| LookupError::new(host, e.to_string()))?;

        let ips: Vec<IpAddr> = answer.iter().collect();
        if ips.is_empty() {
            return Err(LookupError::new(host, "no addresses returned"));
        }
        Ok(ips)
    }
}

/// Lookups answered from a fixed host table.
///
/// Unknown hosts fail like an NXDOMAIN would.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticLookup {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the answer for `host`.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>, ips: Vec<IpAddr>) -> Self {
        self.hosts.insert(host.into(), ips);
        self
    }
}

#[async_trait]
impl Lookup for StaticLookup {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        match self.hosts.get(host) {
            Some(ips) if !ips.is_empty() => Ok(ips.clone()),
            Some(_) => Err(LookupError::new(host, "no addresses returned")),
            None => Err(LookupError::new(host, "no such host")),
        }
    }
}
