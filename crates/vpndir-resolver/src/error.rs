//! Error types for parallel resolution.

use crate::parallel::Resolution;
use thiserror::Error;

/// A single failed lookup. Never fatal on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot resolve {host}: {message}")]
pub struct LookupError {
    /// Host that was looked up
    pub host: String,
    /// Resolver message
    pub message: String,
}

impl LookupError {
    /// Build a lookup error for `host`.
    pub fn new(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            message: message.into(),
        }
    }
}

/// Errors returned by [`ParallelResolver::resolve`](crate::ParallelResolver::resolve).
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Settings rejected before any lookup was made
    #[error("invalid resolver settings: {0}")]
    InvalidSettings(String),

    /// Too large a share of the hosts never resolved
    #[error("{failed} of {total} hosts could not be resolved, above the maximum fail ratio {max_ratio}")]
    TooManyFailures {
        /// Hosts that never resolved
        failed: usize,
        /// Hosts requested
        total: usize,
        /// Configured ceiling
        max_ratio: f64,
        /// What did resolve, with one warning per failed host
        partial: Resolution,
    },

    /// The caller cancelled the resolution
    #[error("resolution cancelled")]
    Cancelled {
        /// Hosts resolved before cancellation
        partial: Resolution,
    },
}

impl ResolveError {
    /// The partial resolution carried by the error, if any.
    #[must_use]
    pub fn partial(&self) -> Option<&Resolution> {
        match self {
            Self::InvalidSettings(_) => None,
            Self::TooManyFailures { partial, .. } | Self::Cancelled { partial } => Some(partial),
        }
    }

    /// True when the error is a cancellation rather than a data problem.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LookupError::new("a.example.net", "NXDOMAIN");
        assert_eq!(err.to_string(), "cannot resolve a.example.net: NXDOMAIN");

        let err = ResolveError::TooManyFailures {
            failed: 2,
            total: 3,
            max_ratio: 0.5,
            partial: Resolution::default(),
        };
        assert_eq!(
            err.to_string(),
            "2 of 3 hosts could not be resolved, above the maximum fail ratio 0.5"
        );
        assert!(!err.is_cancelled());
        assert!(err.partial().is_some());
    }

    #[test]
    fn test_cancelled() {
        let err = ResolveError::Cancelled {
            partial: Resolution::default(),
        };
        assert!(err.is_cancelled());
        assert!(ResolveError::InvalidSettings("x".into()).partial().is_none());
    }
}
