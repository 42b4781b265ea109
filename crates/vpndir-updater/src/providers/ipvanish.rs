//! IPVanish servers from the OpenVPN configuration archive.
//!
//! Locations come from file names such as
//! `ipvanish-AU-Sydney-syd-a01.ovpn`; the endpoint comes from the file's
//! `remote` line and is resolved later.

use crate::hosts::HostToServers;
use crate::providers::{add_openvpn_config, country_from_code};
use crate::source::ServerSource;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use vpndir_core::{ProviderId, Server};
use vpndir_extract::archive;
use vpndir_extract::{Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://configs.ipvanish.com";

static FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ipvanish-([A-Za-z]{2})-(.+)-[a-z]{3}-[a-z]\d{2}\.ovpn$")
        .expect("valid file name regex")
});

/// Country code and city encoded in an IPVanish configuration file name.
fn location_from_file_name(file_name: &str) -> Option<(&str, String)> {
    let captures = FILE_NAME.captures(file_name)?;
    let code = captures.get(1)?.as_str();
    let city = captures.get(2)?.as_str().replace('-', " ");
    Some((code, city))
}

/// IPVanish configuration archive.
#[derive(Debug, Clone)]
pub struct Ipvanish {
    base_url: String,
}

impl Ipvanish {
    /// Source reading from `base_url` instead of the live config host.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Ipvanish {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Ipvanish {
    fn provider(&self) -> ProviderId {
        ProviderId::Ipvanish
    }

    fn min_servers(&self) -> usize {
        400
    }

    async fn collect(
        &self,
        fetcher: &Fetcher,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let url = format!("{}/openvpn/configs.zip", self.base_url);
        let files = fetcher.get_zip(&url).await?;

        for config in archive::parse_openvpn_files(&files, warnings) {
            let Some((code, city)) = location_from_file_name(&config.file_name) else {
                warnings.push(format!("{}: unexpected file name", config.file_name));
                continue;
            };
            let Some(country) = country_from_code(code, &config.file_name, warnings) else {
                continue;
            };

            let location = Server {
                country,
                city,
                ..Server::default()
            };
            add_openvpn_config(hosts, &config, &location);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_file_name() {
        assert_eq!(
            location_from_file_name("ipvanish-AU-Sydney-syd-a01.ovpn"),
            Some(("AU", "Sydney".to_string()))
        );
        assert_eq!(
            location_from_file_name("ipvanish-US-New-York-nyc-a12.ovpn"),
            Some(("US", "New York".to_string()))
        );
        assert_eq!(location_from_file_name("ca.ipvanish.com.crt"), None);
        assert_eq!(location_from_file_name("ipvanish-Sydney.ovpn"), None);
    }
}
