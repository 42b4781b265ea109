//! vpndir Resolver - Parallel hostname resolution under a budget.
//!
//! Resolves hundreds to thousands of VPN server hostnames concurrently while
//! tolerating partial DNS failure. A host that never resolves produces a
//! warning; only a failure ratio above the configured ceiling, or an external
//! cancellation, fails the whole call.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use vpndir_core::ResolverConfig;
//! use vpndir_resolver::{HickoryLookup, ParallelResolver, ParallelSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let hosts = vec!["nl1.example.net".to_string(), "se1.example.net".to_string()];
//! let resolver = ParallelResolver::new(Arc::new(HickoryLookup::new()));
//! let settings = ParallelSettings::from_config(hosts, &ResolverConfig::default());
//! let resolution = resolver.resolve(&settings, &CancellationToken::new()).await?;
//! for warning in &resolution.warnings {
//!     tracing::warn!("{warning}");
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

pub mod error;
pub mod lookup;
pub mod parallel;
pub mod settings;

// Re-export commonly used types
pub use error::{LookupError, ResolveError, Result};
pub use lookup::{HickoryLookup, Lookup, StaticLookup};
pub use parallel::{ParallelResolver, Resolution};
pub use settings::{ParallelSettings, RepeatSettings};
