//! Mullvad relays from the public relay API.

use crate::hosts::HostToServers;
use crate::providers::{decode_records, parse_ips};
use crate::source::ServerSource;
use async_trait::async_trait;
use serde::Deserialize;
use vpndir_core::{ProviderId, Server, VpnType};
use vpndir_extract::{Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://api.mullvad.net";

#[derive(Debug, Deserialize)]
struct Relay {
    hostname: String,
    #[serde(default)]
    country_name: String,
    #[serde(default)]
    city_name: String,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    owned: bool,
    #[serde(default)]
    provider: String,
    #[serde(default)]
    ipv4_addr_in: String,
    #[serde(default)]
    ipv6_addr_in: String,
    #[serde(rename = "type")]
    relay_type: String,
    #[serde(default)]
    pubkey: String,
}

/// Mullvad relay list.
#[derive(Debug, Clone)]
pub struct Mullvad {
    base_url: String,
}

impl Mullvad {
    /// Source reading from `base_url` instead of the live API.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Mullvad {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Mullvad {
    fn provider(&self) -> ProviderId {
        ProviderId::Mullvad
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
        let url = format!("{}/www/relays/all/", self.base_url);
        let records: Vec<serde_json::Value> = fetcher.get_json(&url).await?;
        let relays: Vec<Relay> = decode_records(records, "relay", warnings);

        for relay in relays.into_iter().filter(|relay| relay.active) {
            let vpn_type = match relay.relay_type.as_str() {
                "openvpn" => VpnType::OpenVpn,
                "wireguard" => VpnType::Wireguard,
                "bridge" => continue,
                other => {
                    warnings.push(format!("relay {}: unknown relay type {other:?}", relay.hostname));
                    continue;
                }
            };

            let context = format!("relay {}", relay.hostname);
            let Some(ips) = parse_ips(
                [relay.ipv4_addr_in.as_str(), relay.ipv6_addr_in.as_str()],
                &context,
                warnings,
            ) else {
                continue;
            };

            let mut server = Server {
                country: relay.country_name,
                city: relay.city_name,
                isp: relay.provider,
                hostname: relay.hostname.clone(),
                owned: relay.owned,
                ips,
                ..Server::new(vpn_type)
            };
            match vpn_type {
                VpnType::OpenVpn => {
                    server.tcp = true;
                    server.udp = true;
                }
                VpnType::Wireguard => server.wg_pub_key = relay.pubkey,
            }

            hosts.add(relay.hostname, server);
        }

        Ok(())
    }
}
