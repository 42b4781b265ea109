//! IVPN servers from the v4 server API.

use crate::hosts::HostToServers;
use crate::providers::parse_ips;
use crate::source::ServerSource;
use async_trait::async_trait;
use serde::Deserialize;
use vpndir_core::{ProviderId, Server, VpnType};
use vpndir_extract::{Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://api.ivpn.net";

#[derive(Debug, Deserialize)]
struct ServerList {
    #[serde(default)]
    openvpn: Vec<Gateway>,
    #[serde(default)]
    wireguard: Vec<Gateway>,
}

#[derive(Debug, Deserialize)]
struct Gateway {
    #[serde(default)]
    gateway: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    isp: String,
    #[serde(default)]
    hosts: Vec<Host>,
}

#[derive(Debug, Deserialize)]
struct Host {
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    public_key: String,
}

/// IVPN server list.
#[derive(Debug, Clone)]
pub struct Ivpn {
    base_url: String,
}

impl Ivpn {
    /// Source reading from `base_url` instead of the live API.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Ivpn {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Ivpn {
    fn provider(&self) -> ProviderId {
        ProviderId::Ivpn
    }

    fn min_servers(&self) -> usize {
        60
    }

    async fn collect(
        &self,
        fetcher: &Fetcher,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let url = format!("{}/v4/servers/all", self.base_url);
        let list: ServerList = fetcher.get_json(&url).await?;

        let gateways = list
            .openvpn
            .iter()
            .map(|gateway| (VpnType::OpenVpn, gateway))
            .chain(list.wireguard.iter().map(|gateway| (VpnType::Wireguard, gateway)));

        for (vpn_type, gateway) in gateways {
            for host in &gateway.hosts {
                if host.hostname.is_empty() {
                    warnings.push(format!(
                        "{vpn_type} gateway {}: host without hostname",
                        gateway.gateway
                    ));
                    continue;
                }

                // Addresses are optional: hosts without one get resolved
                let context = format!("host {}", host.hostname);
                let Some(ips) = parse_ips([host.host.as_str()], &context, warnings) else {
                    continue;
                };

                let mut server = Server {
                    country: gateway.country.clone(),
                    city: gateway.city.clone(),
                    isp: gateway.isp.clone(),
                    hostname: host.hostname.clone(),
                    ips,
                    ..Server::new(vpn_type)
                };
                match vpn_type {
                    VpnType::OpenVpn => {
                        server.tcp = true;
                        server.udp = true;
                    }
                    VpnType::Wireguard => server.wg_pub_key.clone_from(&host.public_key),
                }

                hosts.add(host.hostname.clone(), server);
            }
        }

        Ok(())
    }
}
