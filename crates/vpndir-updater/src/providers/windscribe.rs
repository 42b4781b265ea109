//! Windscribe nodes from the mobile server list.
//!
//! The list nests regions, city groups and nodes. A node serves OpenVPN on
//! its `ip2` address and Wireguard on its `ip3` address, with the Wireguard
//! key published once per group.

use crate::hosts::HostToServers;
use crate::providers::{country_from_code, parse_ips};
use crate::source::ServerSource;
use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use vpndir_core::{ProviderId, Server, VpnType};
use vpndir_extract::{Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://assets.windscribe.com";

#[derive(Debug, Deserialize)]
struct ServerList {
    data: Vec<Region>,
}

#[derive(Debug, Deserialize)]
struct Region {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country_code: String,
    #[serde(default)]
    groups: Vec<Group>,
}

#[derive(Debug, Deserialize)]
struct Group {
    #[serde(default)]
    city: String,
    #[serde(default)]
    wg_pubkey: String,
    #[serde(default)]
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    ip2: String,
    #[serde(default)]
    ip3: String,
}

/// Endpoint address of a node for one protocol. The node hostname is never
/// resolved in its place.
fn endpoint_ips(
    ip: &str,
    protocol: &str,
    context: &str,
    warnings: &mut Vec<String>,
) -> Option<Vec<IpAddr>> {
    if ip.trim().is_empty() {
        warnings.push(format!("{context}: no {protocol} IP address"));
        return None;
    }
    parse_ips([ip], context, warnings)
}

/// Windscribe server list.
#[derive(Debug, Clone)]
pub struct Windscribe {
    base_url: String,
}

impl Windscribe {
    /// Source reading from `base_url` instead of the live asset host.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Windscribe {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Windscribe {
    fn provider(&self) -> ProviderId {
        ProviderId::Windscribe
    }

    fn min_servers(&self) -> usize {
        300
    }

    async fn collect(
        &self,
        fetcher: &Fetcher,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let url = format!("{}/serverlist/mob-v2/1/1", self.base_url);
        let list: ServerList = fetcher.get_json(&url).await?;

        for region in list.data {
            let Some(country) =
                country_from_code(&region.country_code, &format!("region {}", region.name), warnings)
            else {
                continue;
            };

            for group in &region.groups {
                for node in &group.nodes {
                    if node.hostname.is_empty() {
                        warnings.push(format!("group {}: node without hostname", group.city));
                        continue;
                    }
                    let location = Server {
                        country: country.clone(),
                        region: region.name.clone(),
                        city: group.city.clone(),
                        hostname: node.hostname.clone(),
                        ..Server::default()
                    };

                    let context = format!("node {}", node.hostname);
                    if let Some(ips) = endpoint_ips(&node.ip2, "OpenVPN", &context, warnings) {
                        hosts.add(
                            node.hostname.clone(),
                            Server {
                                vpn_type: VpnType::OpenVpn,
                                tcp: true,
                                udp: true,
                                ips,
                                ..location.clone()
                            },
                        );
                    }

                    if group.wg_pubkey.is_empty() {
                        continue;
                    }
                    if let Some(ips) = endpoint_ips(&node.ip3, "Wireguard", &context, warnings) {
                        hosts.add(
                            node.hostname.clone(),
                            Server {
                                vpn_type: VpnType::Wireguard,
                                wg_pub_key: group.wg_pubkey.clone(),
                                ips,
                                ..location
                            },
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
