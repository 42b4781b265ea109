//! Host-to-servers aggregation for one update run.
//!
//! Keys are hostnames, or the stringified IP for providers that publish no
//! hostnames. One key holds at most one server per [`VpnType`], so a box
//! serving both OpenVPN and Wireguard stays two records sharing a key.

use std::collections::BTreeMap;
use std::net::IpAddr;
use vpndir_core::{Server, VpnType};

#[derive(Debug, Default, Clone)]
struct HostEntry {
    servers: BTreeMap<VpnType, Server>,
}

/// Accumulates partial server observations, merging repeats of a host.
#[derive(Debug, Default, Clone)]
pub struct HostToServers {
    entries: BTreeMap<String, HostEntry>,
}

impl HostToServers {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `server` into the entry for `key`.
    ///
    /// Booleans are OR-ed and empty fields filled, so adding the same
    /// observation twice is the same as adding it once.
    pub fn add(&mut self, key: impl Into<String>, server: Server) {
        let entry = self.entries.entry(key.into()).or_default();
        match entry.servers.get_mut(&server.vpn_type) {
            Some(existing) => existing.merge(&server),
            None => {
                entry.servers.insert(server.vpn_type, server);
            }
        }
    }

    /// Server stored for `key` and `vpn_type`.
    #[must_use]
    pub fn get(&self, key: &str, vpn_type: VpnType) -> Option<&Server> {
        self.entries.get(key)?.servers.get(&vpn_type)
    }

    /// Number of servers, counting each VPN type of a key separately.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(|entry| entry.servers.len()).sum()
    }

    /// True when nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct, sorted hostnames of servers that still have no address.
    #[must_use]
    pub fn hosts_missing_ips(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self
            .entries
            .iter()
            .flat_map(|(key, entry)| {
                entry
                    .servers
                    .values()
                    .filter(|server| server.ips.is_empty())
                    .map(move |server| resolution_host(key, server).to_string())
            })
            .collect();
        hosts.sort_unstable();
        hosts.dedup();
        hosts
    }

    /// Copy resolved addresses onto servers lacking them, then drop every
    /// server that still has none. Returns the number of servers dropped.
    pub fn adapt_with_ips(&mut self, host_to_ips: &BTreeMap<String, Vec<IpAddr>>) -> usize {
        let mut dropped = 0;

        for (key, entry) in &mut self.entries {
            for server in entry.servers.values_mut() {
                if server.ips.is_empty() {
                    if let Some(ips) = host_to_ips.get(resolution_host(key, server)) {
                        server.ips.clone_from(ips);
                    }
                }
            }

            let before = entry.servers.len();
            entry.servers.retain(|_, server| !server.ips.is_empty());
            dropped += before - entry.servers.len();
        }

        self.entries.retain(|_, entry| !entry.servers.is_empty());
        if dropped > 0 {
            tracing::debug!(dropped, "dropped servers without IP address");
        }
        dropped
    }

    /// Flatten into the list of servers, in key order. No validation.
    #[must_use]
    pub fn into_servers(self) -> Vec<Server> {
        self.entries
            .into_values()
            .flat_map(|entry| entry.servers.into_values())
            .collect()
    }
}

fn resolution_host<'a>(key: &'a str, server: &'a Server) -> &'a str {
    if server.hostname.is_empty() {
        key
    } else {
        &server.hostname
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openvpn(hostname: &str) -> Server {
        Server {
            hostname: hostname.to_string(),
            ..Server::new(VpnType::OpenVpn)
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().expect("valid IP")
    }

    #[test]
    fn test_add_merges_booleans() {
        let mut hosts = HostToServers::new();
        hosts.add("h1", Server { tcp: true, ..openvpn("h1") });
        hosts.add("h1", Server { udp: true, ..openvpn("h1") });

        assert_eq!(hosts.len(), 1);
        let server = hosts.get("h1", VpnType::OpenVpn).expect("h1 present");
        assert!(server.tcp);
        assert!(server.udp);
    }

    #[test]
    fn test_add_is_idempotent() {
        let record = Server {
            tcp: true,
            country: "Sweden".to_string(),
            ips: vec![ip("192.0.2.1")],
            ..openvpn("h1")
        };

        let mut once = HostToServers::new();
        once.add("h1", record.clone());
        let mut twice = HostToServers::new();
        twice.add("h1", record.clone());
        twice.add("h1", record);

        assert_eq!(once.into_servers(), twice.into_servers());
    }

    #[test]
    fn test_add_keeps_specific_fields() {
        let mut hosts = HostToServers::new();
        hosts.add(
            "h1",
            Server {
                city: "Gothenburg".to_string(),
                ..openvpn("h1")
            },
        );
        hosts.add(
            "h1",
            Server {
                country: "Sweden".to_string(),
                ..openvpn("h1")
            },
        );

        let server = hosts.get("h1", VpnType::OpenVpn).expect("h1 present");
        assert_eq!(server.city, "Gothenburg");
        assert_eq!(server.country, "Sweden");
    }

    #[test]
    fn test_one_server_per_vpn_type() {
        let mut hosts = HostToServers::new();
        hosts.add("h1", Server { udp: true, ..openvpn("h1") });
        hosts.add(
            "h1",
            Server {
                hostname: "h1".to_string(),
                wg_pub_key: "key".to_string(),
                ..Server::new(VpnType::Wireguard)
            },
        );

        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts.hosts_missing_ips(), vec!["h1"]);
    }

    #[test]
    fn test_hosts_missing_ips() {
        let mut hosts = HostToServers::new();
        hosts.add("b", openvpn("b"));
        hosts.add("a", openvpn("a"));
        hosts.add(
            "c",
            Server {
                ips: vec![ip("192.0.2.3")],
                ..openvpn("c")
            },
        );
        hosts.add("192.0.2.4", openvpn(""));

        assert_eq!(hosts.hosts_missing_ips(), vec!["192.0.2.4", "a", "b"]);
    }

    #[test]
    fn test_adapt_drops_unresolved() {
        let mut hosts = HostToServers::new();
        hosts.add("a", openvpn("a"));
        hosts.add("b", openvpn("b"));
        hosts.add(
            "c",
            Server {
                ips: vec![ip("192.0.2.3")],
                ..openvpn("c")
            },
        );

        let host_to_ips = BTreeMap::from([("a".to_string(), vec![ip("192.0.2.1")])]);
        let dropped = hosts.adapt_with_ips(&host_to_ips);

        assert_eq!(dropped, 1);
        let servers = hosts.into_servers();
        let names: Vec<&str> = servers.iter().map(|s| s.hostname.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(servers[0].ips, vec![ip("192.0.2.1")]);
    }

    #[test]
    fn test_adapt_keeps_provided_ips() {
        let mut hosts = HostToServers::new();
        hosts.add(
            "a",
            Server {
                ips: vec![ip("192.0.2.1")],
                ..openvpn("a")
            },
        );

        let host_to_ips = BTreeMap::from([("a".to_string(), vec![ip("192.0.2.99")])]);
        hosts.adapt_with_ips(&host_to_ips);

        assert_eq!(
            hosts.get("a", VpnType::OpenVpn).map(|s| s.ips.clone()),
            Some(vec![ip("192.0.2.1")])
        );
    }
}
