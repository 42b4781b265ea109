//! The per-provider seam of the update pipeline.

use crate::hosts::HostToServers;
use async_trait::async_trait;
use vpndir_core::ProviderId;
use vpndir_extract::{Fetcher, Result};

/// Where and how one provider publishes its servers.
///
/// Implementations cover the Fetch, Extract and Merge stages: they download
/// their payloads through the given fetcher, map records onto servers and
/// add them to the aggregator. Malformed records are pushed to `warnings`
/// and skipped; only an unavailable or unrecognisable source is an error.
#[async_trait]
pub trait ServerSource: Send + Sync {
    /// Provider served by this source.
    fn provider(&self) -> ProviderId;

    /// Built-in minimum server count for a successful run.
    fn min_servers(&self) -> usize;

    /// Resolver fail ratio for this provider, when it differs from the
    /// configured default.
    fn max_fail_ratio(&self) -> Option<f64> {
        None
    }

    /// Fetch the upstream listing and add every server found to `hosts`.
    async fn collect(
        &self,
        fetcher: &Fetcher,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()>;
}
