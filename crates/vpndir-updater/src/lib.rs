//! vpndir Updater - Provider update pipelines.
//!
//! One update run fetches a provider's upstream listing, merges the records
//! by host, resolves hostnames still missing addresses, validates the result
//! against a minimum server count and sorts it into directory order.
//! Malformed records become warnings; only an unavailable source, too many
//! unresolved hosts or too few servers fail a run.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use vpndir_core::{ProviderId, UpdaterConfig};
//! use vpndir_extract::build_http_client;
//! use vpndir_resolver::{HickoryLookup, ParallelResolver};
//! use vpndir_updater::{Orchestrator, ProviderRegistry};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UpdaterConfig::default();
//! let client = build_http_client(&config.http)?;
//! let resolver = ParallelResolver::new(Arc::new(HickoryLookup::new()));
//! let orchestrator = Orchestrator::new(client, resolver, config.resolver.clone());
//! let registry = ProviderRegistry::with_defaults();
//! let source = registry.get(ProviderId::Mullvad)?;
//! let outcome = orchestrator
//!     .fetch_servers(source.as_ref(), source.min_servers(), &CancellationToken::new())
//!     .await?;
//! println!("{} servers", outcome.servers.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod hosts;
pub mod orchestrator;
pub mod providers;
pub mod registry;
pub mod source;

// Re-export commonly used types
pub use error::{Result, UpdateError};
pub use hosts::HostToServers;
pub use orchestrator::{FetchOutcome, Orchestrator, ProviderUpdate};
pub use registry::ProviderRegistry;
pub use source::ServerSource;
