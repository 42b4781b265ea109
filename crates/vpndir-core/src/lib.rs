//! vpndir Core - Foundation crate for the VPN server directory builder.
//!
//! This crate provides the shared server record, provider identifiers,
//! country-code normalization, the persisted directory snapshot, error
//! handling and configuration that all other vpndir crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Server record and enums (`Server`, `VpnType`, `ProviderId`)
//! - [`countries`] - ISO 3166 two-letter code to country name table
//! - [`directory`] - Per-provider snapshot of the final server lists
//!
//! # Example
//!
//! ```rust
//! use vpndir_core::{country_name, Server, VpnType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = Server::new(VpnType::OpenVpn);
//! server.hostname = "nl1.example.net".to_string();
//! server.country = country_name("NL").unwrap_or_default().to_string();
//! server.tcp = true;
//! server.ips.push("198.51.100.7".parse()?);
//! server.validate()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod countries;
pub mod directory;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{HttpConfig, ResolverConfig, UpdaterConfig, UpdatesConfig};
pub use countries::country_name;
pub use directory::{Directory, ProviderSnapshot};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{Ports, ProviderId, Server, VpnType};
