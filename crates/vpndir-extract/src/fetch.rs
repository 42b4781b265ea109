//! HTTP fetching with cancellation.
//!
//! Every upstream request of a provider run goes through one [`Fetcher`],
//! which owns the run's cancellation token. A non-success status is always
//! an error: the whole source is considered unavailable.

use crate::archive;
use crate::error::{ExtractError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vpndir_core::HttpConfig;

/// Build the HTTP client shared by all provider runs.
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(ExtractError::ClientBuild)
}

/// HTTP access for one provider run.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    cancel: CancellationToken,
}

impl Fetcher {
    /// Create a fetcher whose requests are abandoned when `cancel` fires.
    #[must_use]
    pub fn new(client: Client, cancel: CancellationToken) -> Self {
        Self { client, cancel }
    }

    /// Cancellation token of the run.
    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// GET `url` and return the body of a success response.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.cancellable(async {
            tracing::debug!(url, "fetching");
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|source| http_error(url, source))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ExtractError::UnexpectedStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|source| http_error(url, source))?;
            tracing::debug!(url, bytes = body.len(), "fetched");
            Ok(body.to_vec())
        })
        .await
    }

    /// GET `url` as text; invalid UTF-8 sequences are replaced.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let body = self.get_bytes(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// GET `url` and decode its JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body).map_err(|source| ExtractError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// GET a ZIP archive at `url` and unpack it into file name to contents.
    pub async fn get_zip(&self, url: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let body = self.get_bytes(url).await?;
        archive::unzip(&body).map_err(|source| ExtractError::Archive {
            url: url.to_string(),
            source,
        })
    }

    async fn cancellable<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ExtractError::Cancelled),
            result = request => result,
        }
    }
}

fn http_error(url: &str, source: reqwest::Error) -> ExtractError {
    ExtractError::Http {
        url: url.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let fetcher = Fetcher::new(Client::new(), cancel);

        let err = fetcher
            .get_bytes("http://127.0.0.1:9/never")
            .await
            .expect_err("cancelled");
        assert!(err.is_cancelled());
    }
}
