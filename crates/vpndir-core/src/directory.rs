//! Persisted server directory.
//!
//! The updater hands each successful provider run over as an immutable list
//! of servers; the directory keeps one snapshot per provider so that a failed
//! run can fall back to the last known-good list.

use crate::error::Result;
use crate::types::{ProviderId, Server};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Current on-disk format version of a provider snapshot.
pub const SNAPSHOT_VERSION: u16 = 1;

/// The final server list of one provider at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSnapshot {
    /// Format version, see [`SNAPSHOT_VERSION`]
    pub version: u16,
    /// Unix timestamp (seconds) of the update run
    pub timestamp: i64,
    /// Sorted servers
    pub servers: Vec<Server>,
}

/// All provider snapshots, keyed by provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Snapshots by provider
    #[serde(default)]
    pub providers: BTreeMap<ProviderId, ProviderSnapshot>,
}

impl Directory {
    /// Read a directory from a JSON file; a missing file yields an empty directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No directory at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the directory as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        tracing::debug!("Saved directory to {}", path.display());
        Ok(())
    }

    /// Replace a provider's snapshot with a freshly fetched server list.
    pub fn replace(&mut self, provider: ProviderId, servers: Vec<Server>, timestamp: i64) {
        self.providers.insert(
            provider,
            ProviderSnapshot {
                version: SNAPSHOT_VERSION,
                timestamp,
                servers,
            },
        );
    }

    /// Snapshot for a provider, if one was ever stored.
    #[must_use]
    pub fn get(&self, provider: ProviderId) -> Option<&ProviderSnapshot> {
        self.providers.get(&provider)
    }
}
