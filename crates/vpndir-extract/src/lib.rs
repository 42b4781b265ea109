//! vpndir Extract - Reading upstream server listings.
//!
//! Providers publish their servers in one of three shapes: a JSON API, an
//! HTML page, or a ZIP archive of OpenVPN client configurations. This crate
//! fetches those payloads under a cancellation token and turns them into
//! values the updater can map onto servers.
//!
//! # Example
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use vpndir_core::HttpConfig;
//! use vpndir_extract::{archive, build_http_client, parse_connection, Fetcher, Protocol};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let parsed = parse_connection("client\nremote 198.51.100.7 1194\nproto udp\n")?;
//! assert_eq!(parsed.connection.protocol, Protocol::Udp);
//!
//! let fetcher = Fetcher::new(build_http_client(&HttpConfig::default())?, CancellationToken::new());
//! let files = fetcher.get_zip("https://example.net/configs.zip").await?;
//! let mut warnings = Vec::new();
//! for config in archive::parse_openvpn_files(&files, &mut warnings) {
//!     println!("{} -> {}", config.file_name, config.parsed.connection.host);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod archive;
pub mod error;
pub mod fetch;
pub mod html;
pub mod openvpn;

// Re-export commonly used types
pub use archive::ConfigFile;
pub use error::{ExtractError, OpenVpnError, Result};
pub use fetch::{build_http_client, Fetcher};
pub use openvpn::{parse_connection, Connection, ParsedConfig, Protocol};
