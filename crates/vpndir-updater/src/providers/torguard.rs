//! TorGuard servers from its TCP and UDP configuration archives.
//!
//! The same host appears once per archive; both observations land on the
//! same key and merge into one server supporting TCP and UDP.

use crate::hosts::HostToServers;
use crate::providers::add_openvpn_config;
use crate::source::ServerSource;
use async_trait::async_trait;
use vpndir_core::{country_name, ProviderId, Server};
use vpndir_extract::archive;
use vpndir_extract::{Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://torguard.net";
const ARCHIVES: [&str; 2] = ["OpenVPN-TCP-Linux.zip", "OpenVPN-UDP-Linux.zip"];

/// Country and city from names like `TorGuard.USA-NEW-YORK.ovpn`.
fn location_from_file_name(file_name: &str) -> Option<(String, String)> {
    let stem = file_name
        .strip_prefix("TorGuard.")?
        .strip_suffix(".ovpn")?;
    let (country, city) = stem.split_once('-').unwrap_or((stem, ""));
    if country.is_empty() {
        return None;
    }
    Some((country_from_token(country), title_case(city)))
}

/// Full country name for the abbreviations used in file names.
fn country_from_token(token: &str) -> String {
    match token.to_ascii_uppercase().as_str() {
        "USA" => return "United States".to_string(),
        "UAE" => return "United Arab Emirates".to_string(),
        _ => {}
    }
    if token.len() == 2 {
        if let Some(name) = country_name(token) {
            return name.to_string();
        }
    }
    title_case(token)
}

fn title_case(text: &str) -> String {
    text.split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            if word.len() <= 3 && word.chars().all(|c| c.is_ascii_uppercase()) {
                return word.to_string();
            }
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// TorGuard configuration archives.
#[derive(Debug, Clone)]
pub struct Torguard {
    base_url: String,
}

impl Torguard {
    /// Source reading from `base_url` instead of the live site.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Torguard {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Torguard {
    fn provider(&self) -> ProviderId {
        ProviderId::Torguard
    }

    fn min_servers(&self) -> usize {
        30
    }

    async fn collect(
        &self,
        fetcher: &Fetcher,
        hosts: &mut HostToServers,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        for archive_name in ARCHIVES {
            let url = format!("{}/downloads/{archive_name}", self.base_url);
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
            location_from_file_name("TorGuard.USA-NEW-YORK.ovpn"),
            Some(("United States".to_string(), "New York".to_string()))
        );
        assert_eq!(
            location_from_file_name("TorGuard.Iceland.ovpn"),
            Some(("Iceland".to_string(), String::new()))
        );
        assert_eq!(
            location_from_file_name("TorGuard.SWEDEN.ovpn"),
            Some(("Sweden".to_string(), String::new()))
        );
        assert_eq!(
            location_from_file_name("TorGuard.UK-LONDON.ovpn"),
            Some(("United Kingdom".to_string(), "London".to_string()))
        );
        assert_eq!(
            location_from_file_name("TorGuard.UAE.ovpn"),
            Some(("United Arab Emirates".to_string(), String::new()))
        );
        assert_eq!(location_from_file_name("ca.ovpn"), None);
    }
}
