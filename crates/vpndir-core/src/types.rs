//! Shared types used across vpndir.
//!
//! This module defines the normalized server record every provider is
//! mapped onto, along with the closed sets of VPN protocols and providers.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// VPN protocol family a server entry is valid for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VpnType {
    /// OpenVPN over TCP and/or UDP
    #[default]
    OpenVpn,
    /// Wireguard, always UDP
    Wireguard,
}

impl VpnType {
    /// All VPN types, in storage order.
    pub const ALL: [Self; 2] = [Self::OpenVpn, Self::Wireguard];

    /// Stable lowercase name used in logs and snapshots.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenVpn => "openvpn",
            Self::Wireguard => "wireguard",
        }
    }
}

impl fmt::Display for VpnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit non-default ports advertised by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ports {
    /// TCP ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tcp: Vec<u16>,
    /// UDP ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub udp: Vec<u16>,
}

impl Ports {
    /// True when no explicit port is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tcp.is_empty() && self.udp.is_empty()
    }

    /// Union `other` into `self`, keeping first-seen order.
    pub fn merge(&mut self, other: &Self) {
        extend_unique(&mut self.tcp, &other.tcp);
        extend_unique(&mut self.udp, &other.udp);
    }
}

/// One VPN endpoint candidate.
///
/// Free-text fields use the empty string for "unknown" and `number` uses 0,
/// so a later, less informative observation can be merged without erasing
/// what is already known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Server {
    /// Protocol family this entry is for
    pub vpn_type: VpnType,
    /// Country name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    /// Region, state or province
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    /// City
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    /// Hosting company, when published
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub isp: String,
    /// Provider-internal server name, diagnostics only
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_name: String,
    /// Provider-internal server number, diagnostics only
    #[serde(default, skip_serializing_if = "is_zero")]
    pub number: u16,
    /// Domain name; empty for providers publishing bare IPs
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    /// OpenVPN over TCP supported
    #[serde(default, skip_serializing_if = "is_false")]
    pub tcp: bool,
    /// OpenVPN over UDP supported
    #[serde(default, skip_serializing_if = "is_false")]
    pub udp: bool,
    /// Explicit ports, when the provider uses non-default ones
    #[serde(default, skip_serializing_if = "Ports::is_empty")]
    pub ports: Ports,
    /// Wireguard public key, base64
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub wg_pub_key: String,
    /// Available on the free tier
    #[serde(default, skip_serializing_if = "is_false")]
    pub free: bool,
    /// Premium tier only
    #[serde(default, skip_serializing_if = "is_false")]
    pub premium: bool,
    /// Optimized for streaming
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
    /// Secure core routing
    #[serde(default, skip_serializing_if = "is_false")]
    pub secure_core: bool,
    /// Tor over VPN
    #[serde(default, skip_serializing_if = "is_false")]
    pub tor: bool,
    /// Port forwarding available
    #[serde(default, skip_serializing_if = "is_false")]
    pub port_forward: bool,
    /// Multi-hop entry
    #[serde(default, skip_serializing_if = "is_false")]
    pub multi_hop: bool,
    /// Hardware owned by the provider
    #[serde(default, skip_serializing_if = "is_false")]
    pub owned: bool,
    /// Resolved addresses, ordered and without duplicates
    #[serde(default)]
    pub ips: Vec<IpAddr>,
}

impl Server {
    /// Create an empty record for the given VPN type.
    #[must_use]
    pub fn new(vpn_type: VpnType) -> Self {
        Self {
            vpn_type,
            ..Self::default()
        }
    }

    /// Merge another observation of the same server into this one.
    ///
    /// Booleans are OR-ed, scalar text is only filled when currently empty,
    /// addresses and ports are unioned. Merging the same record twice is a
    /// no-op the second time.
    pub fn merge(&mut self, other: &Self) {
        fill(&mut self.country, &other.country);
        fill(&mut self.region, &other.region);
        fill(&mut self.city, &other.city);
        fill(&mut self.isp, &other.isp);
        fill(&mut self.server_name, &other.server_name);
        fill(&mut self.hostname, &other.hostname);
        fill(&mut self.wg_pub_key, &other.wg_pub_key);
        if self.number == 0 {
            self.number = other.number;
        }

        self.tcp |= other.tcp;
        self.udp |= other.udp;
        self.free |= other.free;
        self.premium |= other.premium;
        self.stream |= other.stream;
        self.secure_core |= other.secure_core;
        self.tor |= other.tor;
        self.port_forward |= other.port_forward;
        self.multi_hop |= other.multi_hop;
        self.owned |= other.owned;

        self.ports.merge(&other.ports);
        extend_unique(&mut self.ips, &other.ips);
    }

    /// Check the invariants a server must hold before it is published.
    pub fn validate(&self) -> Result<(), CoreError> {
        let reason = if self.ips.is_empty() {
            Some("no IP address")
        } else if self.vpn_type == VpnType::Wireguard && self.wg_pub_key.is_empty() {
            Some("wireguard server without public key")
        } else if self.vpn_type == VpnType::OpenVpn && !self.tcp && !self.udp {
            Some("openvpn server supports neither TCP nor UDP")
        } else {
            None
        };

        match reason {
            None => Ok(()),
            Some(reason) => Err(CoreError::InvalidServer {
                server: self.label(),
                reason: reason.to_string(),
            }),
        }
    }

    /// Short human label: hostname, else server name, else first IP.
    #[must_use]
    pub fn label(&self) -> String {
        if !self.hostname.is_empty() {
            self.hostname.clone()
        } else if !self.server_name.is_empty() {
            self.server_name.clone()
        } else {
            self.ips
                .first()
                .map_or_else(|| "<unnamed>".to_string(), ToString::to_string)
        }
    }

    /// Directory ordering: country, region, city, hostname, then tie breakers
    /// so that the order is total.
    #[must_use]
    pub fn directory_cmp(&self, other: &Self) -> Ordering {
        self.country
            .cmp(&other.country)
            .then_with(|| self.region.cmp(&other.region))
            .then_with(|| self.city.cmp(&other.city))
            .then_with(|| self.hostname.cmp(&other.hostname))
            .then_with(|| self.vpn_type.cmp(&other.vpn_type))
            .then_with(|| self.server_name.cmp(&other.server_name))
            .then_with(|| self.number.cmp(&other.number))
            .then_with(|| self.ips.cmp(&other.ips))
    }
}

/// VPN providers vpndir knows how to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// IPVanish
    Ipvanish,
    /// IVPN
    Ivpn,
    /// Mullvad
    Mullvad,
    /// `NordVPN`
    Nordvpn,
    /// Surfshark
    Surfshark,
    /// `TorGuard`
    Torguard,
    /// `VPNSecure`
    Vpnsecure,
    /// `VyprVPN`
    Vyprvpn,
    /// Windscribe
    Windscribe,
}

impl ProviderId {
    /// Every supported provider, alphabetically.
    pub const ALL: [Self; 9] = [
        Self::Ipvanish,
        Self::Ivpn,
        Self::Mullvad,
        Self::Nordvpn,
        Self::Surfshark,
        Self::Torguard,
        Self::Vpnsecure,
        Self::Vyprvpn,
        Self::Windscribe,
    ];

    /// Lowercase provider name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipvanish => "ipvanish",
            Self::Ivpn => "ivpn",
            Self::Mullvad => "mullvad",
            Self::Nordvpn => "nordvpn",
            Self::Surfshark => "surfshark",
            Self::Torguard => "torguard",
            Self::Vpnsecure => "vpnsecure",
            Self::Vyprvpn => "vyprvpn",
            Self::Windscribe => "windscribe",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownProvider(s.to_string()))
    }
}

fn fill(target: &mut String, value: &str) {
    if target.is_empty() && !value.is_empty() {
        value.clone_into(target);
    }
}

fn extend_unique<T: PartialEq + Copy>(target: &mut Vec<T>, values: &[T]) {
    for value in values {
        if !target.contains(value) {
            target.push(*value);
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u16) -> bool {
    *value == 0
}
