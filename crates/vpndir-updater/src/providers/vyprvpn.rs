//! VyprVPN servers from the OpenVPN configuration archive.
//!
//! File names carry the location as `Country - City.ovpn`, or just
//! `Country.ovpn` for single-location countries.

use crate::hosts::HostToServers;
use crate::providers::add_openvpn_config;
use crate::source::ServerSource;
use async_trait::async_trait;
use vpndir_core::{ProviderId, Server};
use vpndir_extract::archive;
use vpndir_extract::{Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://support.vyprvpn.com";

fn location_from_file_name(file_name: &str) -> Option<(String, String)> {
    let stem = file_name.strip_suffix(".ovpn")?.trim();
    if stem.is_empty() {
        return None;
    }
    let (country, city) = match stem.split_once(" - ") {
        Some((country, city)) => (country.trim(), city.trim()),
        None => (stem, ""),
    };
    Some((country.to_string(), city.to_string()))
}

/// VyprVPN configuration archive.
#[derive(Debug, Clone)]
pub struct Vyprvpn {
    base_url: String,
}

impl Vyprvpn {
    /// Source reading from `base_url` instead of the live support site.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Vyprvpn {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Vyprvpn {
    fn provider(&self) -> ProviderId {
        ProviderId::Vyprvpn
    }

    fn min_servers(&self) -> usize {
        50
    }

    async fn collect(
        &self,
        fetcher: &Fetcher,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let url = format!("{}/hc/article_attachments/360052617332/Vypr_OpenVPN.zip", self.base_url);
        let files = fetcher.get_zip(&url).await?;

        for config in archive::parse_openvpn_files(&files, warnings) {
            let Some((country, city)) = location_from_file_name(&config.file_name) else {
                warnings.push(format!("{}: unexpected file name", config.file_name));
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
            location_from_file_name("Australia - Sydney.ovpn"),
            Some(("Australia".to_string(), "Sydney".to_string()))
        );
        assert_eq!(
            location_from_file_name("Iceland.ovpn"),
            Some(("Iceland".to_string(), String::new()))
        );
        assert_eq!(location_from_file_name(".ovpn"), None);
    }
}
