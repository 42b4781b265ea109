//! Surfshark clusters from the v4 cluster API.
//!
//! Generic clusters and multi-hop clusters are published as two listings;
//! both are merged into one aggregator and every hostname is resolved.

use crate::hosts::HostToServers;
use crate::providers::decode_records;
use crate::source::ServerSource;
use async_trait::async_trait;
use serde::Deserialize;
use vpndir_core::{ProviderId, Server, VpnType};
use vpndir_extract::{Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://api.surfshark.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Cluster {
    #[serde(default)]
    country: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    connection_name: String,
    #[serde(default)]
    pub_key: String,
}

/// Surfshark server list.
#[derive(Debug, Clone)]
pub struct Surfshark {
    base_url: String,
}

impl Surfshark {
    /// Source reading from `base_url` instead of the live API.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    async fn add_listing(
        &self,
        fetcher: &Fetcher,
        listing: &str,
        multi_hop: bool,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let url = format!("{}/v4/server/clusters/{listing}", self.base_url);
        let records: Vec<serde_json::Value> = fetcher.get_json(&url).await?;
        let clusters: Vec<Cluster> =
            decode_records(records, &format!("{listing} cluster"), warnings);

        for cluster in clusters {
            if cluster.connection_name.is_empty() {
                warnings.push(format!(
                    "{listing} cluster in {:?}: no connection name",
                    cluster.location
                ));
                continue;
            }

            let base = Server {
                country: cluster.country,
                region: cluster.region,
                city: cluster.location,
                hostname: cluster.connection_name.clone(),
                multi_hop,
                ..Server::default()
            };

            hosts.add(
                cluster.connection_name.clone(),
                Server {
                    vpn_type: VpnType::OpenVpn,
                    tcp: true,
                    udp: true,
                    ..base.clone()
                },
            );
            if !cluster.pub_key.is_empty() {
                hosts.add(
                    cluster.connection_name,
                    Server {
                        vpn_type: VpnType::Wireguard,
                        wg_pub_key: cluster.pub_key,
                        ..base
                    },
                );
            }
        }

        Ok(())
    }
}

impl Default for Surfshark {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Surfshark {
    fn provider(&self) -> ProviderId {
        ProviderId::Surfshark
    }

    fn min_servers(&self) -> usize {
        500
    }

    async fn collect(
        &self,
        fetcher: &Fetcher,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        self.add_listing(fetcher, "generic", false, hosts, warnings)
            .await?;
        self.add_listing(fetcher, "double", true, hosts, warnings)
            .await
    }
}
