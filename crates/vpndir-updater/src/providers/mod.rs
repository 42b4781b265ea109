//! Server sources of the supported providers.
//!
//! Each provider is a thin adapter composing one extraction channel (JSON
//! API, HTML page or OpenVPN archive) with its own field mapping. Every
//! source takes a base URL so it can be pointed at a mirror.

pub mod ipvanish;
pub mod ivpn;
pub mod mullvad;
pub mod nordvpn;
pub mod surfshark;
pub mod torguard;
pub mod vpnsecure;
pub mod vyprvpn;
pub mod windscribe;

use crate::hosts::HostToServers;
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use vpndir_core::{country_name, Server, VpnType};
use vpndir_extract::openvpn::Protocol;
use vpndir_extract::ConfigFile;

/// Country name for a two-letter code, or a warning naming `context`.
pub(crate) fn country_from_code(
    code: &str,
    context: &str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let name = country_name(code);
    if name.is_none() {
        warnings.push(format!("{context}: unknown country code {code:?}"));
    }
    name.map(ToString::to_string)
}

/// Decode each record on its own, skipping the malformed ones with a warning
/// naming `kind` and the record position.
pub(crate) fn decode_records<T: DeserializeOwned>(
    records: Vec<serde_json::Value>,
    kind: &str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warnings.push(format!("{kind} {index}: {err}"));
                None
            }
        })
        .collect()
}

/// Parse every non-empty address text, or a warning for the first bad one.
pub(crate) fn parse_ips<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    context: &str,
    warnings: &mut Vec<String>,
) -> Option<Vec<IpAddr>> {
    let mut ips = Vec::new();
    for candidate in candidates.into_iter().map(str::trim) {
        if candidate.is_empty() {
            continue;
        }
        match candidate.parse() {
            Ok(ip) if !ips.contains(&ip) => ips.push(ip),
            Ok(_) => {}
            Err(_) => {
                warnings.push(format!("{context}: IP address is not valid: {candidate}"));
                return None;
            }
        }
    }
    Some(ips)
}

/// OpenVPN server described by a configuration file, with its aggregation key.
///
/// The key is the remote hostname, or the IP literal when the remote is one.
pub(crate) fn openvpn_server(config: &ConfigFile) -> (String, Server) {
    let connection = &config.parsed.connection;
    let mut server = Server::new(VpnType::OpenVpn);

    match connection.ip {
        Some(ip) => server.ips.push(ip),
        None => server.hostname.clone_from(&connection.host),
    }

    let ports = match connection.protocol {
        Protocol::Tcp => {
            server.tcp = true;
            &mut server.ports.tcp
        }
        Protocol::Udp => {
            server.udp = true;
            &mut server.ports.udp
        }
    };
    if connection.port != connection.protocol.default_port() {
        ports.push(connection.port);
    }

    (connection.host.clone(), server)
}

/// Add an OpenVPN configuration to `hosts` with location fields already set
/// on `template`.
pub(crate) fn add_openvpn_config(hosts: &mut HostToServers, config: &ConfigFile, template: &Server) {
    let (key, mut server) = openvpn_server(config);
    server.merge(template);
    hosts.add(key, server);
}
