//! Error types for provider update runs.

use thiserror::Error;
use vpndir_core::ProviderId;
use vpndir_extract::ExtractError;
use vpndir_resolver::ResolveError;

/// Fatal errors ending one provider's update run.
///
/// Per-record problems never show up here: they are warnings in the run
/// outcome. Cancellation is a variant of its own so callers can tell it
/// apart from a data-quality failure.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Upstream source unavailable or unreadable
    #[error("fetching servers: {0}")]
    Extract(#[source] ExtractError),

    /// Too many hostnames could not be resolved
    #[error("resolving hosts: {0}")]
    Resolve(#[source] ResolveError),

    /// The run produced fewer servers than the configured floor
    #[error("not enough servers found: {actual} and expected at least {required}")]
    NotEnoughServers {
        /// Servers found
        actual: usize,
        /// Minimum required
        required: usize,
    },

    /// No source is registered for the provider
    #[error("no server source registered for {0}")]
    NoSource(ProviderId),

    /// The run was cancelled
    #[error("update cancelled")]
    Cancelled,
}

impl UpdateError {
    /// True when the run ended because of cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<ExtractError> for UpdateError {
    fn from(err: ExtractError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Extract(err)
        }
    }
}

impl From<ResolveError> for UpdateError {
    fn from(err: ResolveError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Resolve(err)
        }
    }
}

/// Result type for update runs.
pub type Result<T> = std::result::Result<T, UpdateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vpndir_resolver::Resolution;

    #[test]
    fn test_cancellation_is_distinct() {
        assert!(UpdateError::from(ExtractError::Cancelled).is_cancelled());
        assert!(UpdateError::from(ResolveError::Cancelled {
            partial: Resolution::default()
        })
        .is_cancelled());

        let err = UpdateError::from(ExtractError::UnexpectedStatus {
            url: "https://api.example.net".to_string(),
            status: 500,
        });
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_not_enough_servers_message() {
        let err = UpdateError::NotEnoughServers {
            actual: 4,
            required: 5,
        };
        assert_eq!(
            err.to_string(),
            "not enough servers found: 4 and expected at least 5"
        );
    }
}
