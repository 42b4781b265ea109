//! OpenVPN client configuration parsing.
//!
//! Only the connection facts are read: the first `remote` directive, the
//! `proto` directive and the `dev` device. Inline blocks such as
//! `<ca>...</ca>` are skipped.

use crate::error::OpenVpnError;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Transport protocol of an OpenVPN connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// UDP, the OpenVPN default
    #[default]
    Udp,
    /// TCP
    Tcp,
}

impl Protocol {
    /// Port used when the `remote` line does not name one.
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Udp => 1194,
            Self::Tcp => 443,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udp => write!(f, "udp"),
            Self::Tcp => write!(f, "tcp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = OpenVpnError;

    /// Accepts `udp`, `tcp` and their `4`/`6`/`-client` variants.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let base = lowered.strip_suffix("-client").unwrap_or(&lowered);
        let base = base.trim_end_matches(['4', '6']);
        match base {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            _ => Err(OpenVpnError::UnsupportedProtocol(s.trim().to_string())),
        }
    }
}

/// The endpoint a configuration connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Host token of the `remote` line, a hostname or an IP literal
    pub host: String,
    /// Set when `host` is an IP literal
    pub ip: Option<IpAddr>,
    /// Remote port
    pub port: u16,
    /// Transport protocol
    pub protocol: Protocol,
}

impl Connection {
    /// Hostname of the endpoint, `None` when the remote is an IP literal.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        if self.ip.is_some() {
            None
        } else {
            Some(&self.host)
        }
    }
}

/// Facts read from one configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfig {
    /// Endpoint of the first `remote` line
    pub connection: Connection,
    /// Value of the `dev` directive, if any
    pub device: Option<String>,
    /// Non-fatal oddities found while parsing
    pub warnings: Vec<String>,
}

/// Parse the connection facts of an OpenVPN configuration.
///
/// The first `remote` line wins; later differing `remote` lines are
/// ignored with a warning. A protocol on the `remote` line overrides the
/// `proto` directive, and UDP is assumed when neither names one.
pub fn parse_connection(text: &str) -> Result<ParsedConfig, OpenVpnError> {
    let mut remote: Option<Vec<&str>> = None;
    let mut proto: Option<Protocol> = None;
    let mut device = None;
    let mut warnings = Vec::new();
    let mut inline_block: Option<String> = None;

    for line in text.lines().map(str::trim) {
        if let Some(tag) = &inline_block {
            if line.eq_ignore_ascii_case(&format!("</{tag}>")) {
                inline_block = None;
            }
            continue;
        }
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(tag) = line.strip_prefix('<').and_then(|l| l.strip_suffix('>')) {
            if !tag.starts_with('/') {
                inline_block = Some(tag.to_string());
            }
            continue;
        }

        let mut fields = line.split_whitespace();
        let Some(directive) = fields.next() else {
            continue;
        };
        let args: Vec<&str> = fields.collect();

        match directive {
            "remote" => {
                if let Some(first) = &remote {
                    if *first != args {
                        warnings.push(format!(
                            "ignoring remote line `{line}` after `remote {}`",
                            first.join(" ")
                        ));
                    }
                } else {
                    remote = Some(args);
                }
            }
            "proto" => {
                let value = args.first().copied().unwrap_or_default();
                proto = Some(value.parse()?);
            }
            "dev" => {
                device = args.first().map(ToString::to_string);
            }
            _ => {}
        }
    }

    let args = remote.ok_or(OpenVpnError::NoRemote)?;
    let connection = parse_remote(&args, proto)?;

    Ok(ParsedConfig {
        connection,
        device,
        warnings,
    })
}

fn parse_remote(args: &[&str], proto: Option<Protocol>) -> Result<Connection, OpenVpnError> {
    let host = args
        .first()
        .ok_or_else(|| OpenVpnError::MissingHost(format!("remote {}", args.join(" "))))?;

    let ip = parse_host(host)?;
    let protocol = match args.get(2) {
        Some(token) => token.parse()?,
        None => proto.unwrap_or_default(),
    };
    let port = match args.get(1) {
        Some(token) => parse_port(token)?,
        None => protocol.default_port(),
    };

    Ok(Connection {
        host: (*host).to_string(),
        ip,
        port,
        protocol,
    })
}

/// A token made of digits and dots, or containing a colon, must be an IP.
fn parse_host(host: &str) -> Result<Option<IpAddr>, OpenVpnError> {
    let looks_numeric = host.chars().all(|c| c.is_ascii_digit() || c == '.');
    if looks_numeric || host.contains(':') {
        return host
            .parse()
            .map(Some)
            .map_err(|_| OpenVpnError::InvalidIp(host.to_string()));
    }
    Ok(None)
}

fn parse_port(token: &str) -> Result<u16, OpenVpnError> {
    match token.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(OpenVpnError::InvalidPort(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_with_ip_and_proto() {
        let config = "client\nproto udp\nremote 1.2.3.4 1194\n";
        let parsed = parse_connection(config).expect("valid config");

        assert_eq!(parsed.connection.host, "1.2.3.4");
        assert_eq!(parsed.connection.ip, Some("1.2.3.4".parse().unwrap()));
        assert_eq!(parsed.connection.port, 1194);
        assert_eq!(parsed.connection.protocol, Protocol::Udp);
        assert_eq!(parsed.connection.hostname(), None);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_unsupported_protocol() {
        let err = parse_connection("proto bad\nremote 1.2.3.4\n").expect_err("bad proto");
        assert_eq!(err, OpenVpnError::UnsupportedProtocol("bad".to_string()));
        assert_eq!(err.to_string(), "protocol not supported: bad");
    }

    #[test]
    fn test_proto_after_remote() {
        let parsed = parse_connection("remote 1.2.3.4\nproto udp").expect("valid config");

        assert_eq!(parsed.connection.host, "1.2.3.4");
        assert_eq!(parsed.connection.ip, Some("1.2.3.4".parse().unwrap()));
        assert_eq!(parsed.connection.port, 1194);
        assert_eq!(parsed.connection.protocol, Protocol::Udp);
    }

    #[test]
    fn test_unsupported_protocol_on_remote_line() {
        let err = parse_connection("remote 1.2.3.4 8000 bad").expect_err("bad proto");
        assert_eq!(err, OpenVpnError::UnsupportedProtocol("bad".to_string()));
    }

    #[test]
    fn test_remote_protocol_overrides_proto() {
        let parsed =
            parse_connection("proto udp\nremote vpn.example.net 443 tcp-client\n").expect("valid");
        assert_eq!(parsed.connection.protocol, Protocol::Tcp);
        assert_eq!(parsed.connection.hostname(), Some("vpn.example.net"));
    }

    #[test]
    fn test_default_ports() {
        let udp = parse_connection("remote vpn.example.net\n").expect("valid");
        assert_eq!(udp.connection.protocol, Protocol::Udp);
        assert_eq!(udp.connection.port, 1194);

        let tcp = parse_connection("proto tcp\nremote vpn.example.net\n").expect("valid");
        assert_eq!(tcp.connection.port, 443);
    }

    #[test]
    fn test_first_remote_wins() {
        let config = "remote a.example.net 1194\nremote a.example.net 1194\nremote b.example.net 1195\n";
        let parsed = parse_connection(config).expect("valid");

        assert_eq!(parsed.connection.host, "a.example.net");
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("b.example.net"));
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!(
            parse_connection("remote 1.2.3.999\n").expect_err("bad ip"),
            OpenVpnError::InvalidIp("1.2.3.999".to_string())
        );
        assert_eq!(
            parse_connection("remote 1.2.3.4 70000\n").expect_err("bad port"),
            OpenVpnError::InvalidPort("70000".to_string())
        );
        assert_eq!(
            parse_connection("client\ndev tun\n").expect_err("no remote"),
            OpenVpnError::NoRemote
        );
        assert!(matches!(
            parse_connection("remote\n").expect_err("no host"),
            OpenVpnError::MissingHost(_)
        ));
    }

    #[test]
    fn test_skips_inline_blocks_and_comments() {
        let config = "\
# remote commented.example.net
dev tun
<ca>
remote inside.example.net
</ca>
remote 2001:db8::1 1194 udp
";
        let parsed = parse_connection(config).expect("valid");
        assert_eq!(parsed.connection.host, "2001:db8::1");
        assert!(parsed.connection.ip.is_some());
        assert_eq!(parsed.device.as_deref(), Some("tun"));
    }
}
