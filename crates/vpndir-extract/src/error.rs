//! Error types for fetching and reading upstream payloads.
//!
//! [`ExtractError`] is fatal for a provider run: the whole source is
//! unavailable or unreadable. [`OpenVpnError`] concerns one configuration
//! file and is demoted to a warning by the archive reader.

use thiserror::Error;

/// Fatal errors while fetching or reading a whole upstream source.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Body is not the JSON document expected
    #[error("cannot decode JSON from {url}: {source}")]
    Decode {
        /// Requested URL
        url: String,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// Body is not a readable ZIP archive
    #[error("cannot unpack archive from {url}: {source}")]
    Archive {
        /// Requested URL
        url: String,
        /// Archive error
        #[source]
        source: zip::result::ZipError,
    },

    /// The page no longer contains the listing it is scraped for
    #[error("{what} not found in page {url}")]
    ContainerNotFound {
        /// Page URL
        url: String,
        /// Description of the missing node
        what: String,
    },

    /// The caller cancelled the fetch
    #[error("fetch cancelled")]
    Cancelled,
}

impl ExtractError {
    /// True when the error is a cancellation rather than an upstream problem.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors parsing a single OpenVPN configuration file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpenVpnError {
    /// No `remote` directive in the file
    #[error("remote line not found")]
    NoRemote,

    /// `remote` directive without a host
    #[error("remote line has no host: {0}")]
    MissingHost(String),

    /// Host token looks like an IP address but does not parse as one
    #[error("IP address is not valid: {0}")]
    InvalidIp(String),

    /// Port token is not a number in 1..=65535
    #[error("port is not valid: {0}")]
    InvalidPort(String),

    /// Protocol other than TCP or UDP
    #[error("protocol not supported: {0}")]
    UnsupportedProtocol(String),

    /// File is not UTF-8 text
    #[error("file is not valid UTF-8")]
    NotText,
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::UnexpectedStatus {
            url: "https://api.example.net/servers".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "unexpected HTTP status 503 from https://api.example.net/servers"
        );
        assert!(!err.is_cancelled());
        assert!(ExtractError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_openvpn_error_display() {
        assert_eq!(
            OpenVpnError::UnsupportedProtocol("bad".to_string()).to_string(),
            "protocol not supported: bad"
        );
    }
}
