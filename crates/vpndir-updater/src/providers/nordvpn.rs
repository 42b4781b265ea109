//! NordVPN servers from the v1 servers API.

use crate::hosts::HostToServers;
use crate::providers::{decode_records, parse_ips};
use crate::source::ServerSource;
use async_trait::async_trait;
use serde::Deserialize;
use vpndir_core::{ProviderId, Server, VpnType};
use vpndir_extract::{Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://api.nordvpn.com";

#[derive(Debug, Deserialize)]
struct ApiServer {
    #[serde(default)]
    name: String,
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    station: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default)]
    technologies: Vec<Technology>,
    #[serde(default)]
    groups: Vec<Group>,
}

#[derive(Debug, Deserialize)]
struct Location {
    country: Country,
}

#[derive(Debug, Deserialize)]
struct Country {
    #[serde(default)]
    name: String,
    city: Option<City>,
}

#[derive(Debug, Deserialize)]
struct City {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Technology {
    identifier: String,
    #[serde(default)]
    metadata: Vec<Metadata>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct Group {
    #[serde(default)]
    title: String,
}

impl ApiServer {
    fn has_technology(&self, identifier: &str) -> bool {
        self.technologies.iter().any(|t| t.identifier == identifier)
    }

    fn wireguard_key(&self) -> Option<&str> {
        self.technologies
            .iter()
            .find(|t| t.identifier == "wireguard_udp")?
            .metadata
            .iter()
            .find(|m| m.name == "public_key")
            .map(|m| m.value.as_str())
            .filter(|key| !key.is_empty())
    }

    fn in_group(&self, title: &str) -> bool {
        self.groups.iter().any(|g| g.title == title)
    }

    /// Server number, the digits after `#` in names like `Poland #128`.
    fn number(&self) -> Option<u16> {
        self.name.rsplit_once('#')?.1.trim().parse().ok()
    }
}

/// NordVPN server list.
#[derive(Debug, Clone)]
pub struct Nordvpn {
    base_url: String,
}

impl Nordvpn {
    /// Source reading from `base_url` instead of the live API.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Nordvpn {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Nordvpn {
    fn provider(&self) -> ProviderId {
        ProviderId::Nordvpn
    }

    fn min_servers(&self) -> usize {
        2000
    }

    async fn collect(
        &self,
        fetcher: &Fetcher,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let url = format!("{}/v1/servers?limit=0", self.base_url);
        let records: Vec<serde_json::Value> = fetcher.get_json(&url).await?;
        let servers: Vec<ApiServer> = decode_records(records, "server", warnings);

        for api in servers.iter().filter(|api| api.status == "online") {
            if api.hostname.is_empty() {
                warnings.push(format!("server {:?}: no hostname", api.name));
                continue;
            }
            let context = format!("server {}", api.hostname);
            let Some(location) = api.locations.first() else {
                warnings.push(format!("{context}: no location"));
                continue;
            };
            let Some(number) = api.number() else {
                warnings.push(format!("{context}: no server number in name {:?}", api.name));
                continue;
            };
            let Some(ips) = parse_ips([api.station.as_str()], &context, warnings) else {
                continue;
            };

            let base = Server {
                country: location.country.name.clone(),
                city: location
                    .country
                    .city
                    .as_ref()
                    .map(|city| city.name.clone())
                    .unwrap_or_default(),
                server_name: api.name.clone(),
                number,
                hostname: api.hostname.clone(),
                multi_hop: api.in_group("Double VPN"),
                tor: api.in_group("Onion Over VPN"),
                ips,
                ..Server::default()
            };

            let tcp = api.has_technology("openvpn_tcp");
            let udp = api.has_technology("openvpn_udp");
            if tcp || udp {
                hosts.add(
                    api.hostname.clone(),
                    Server {
                        vpn_type: VpnType::OpenVpn,
                        tcp,
                        udp,
                        ..base.clone()
                    },
                );
            }

            if let Some(key) = api.wireguard_key() {
                hosts.add(
                    api.hostname.clone(),
                    Server {
                        vpn_type: VpnType::Wireguard,
                        wg_pub_key: key.to_string(),
                        ..base
                    },
                );
            }
        }

        Ok(())
    }
}
