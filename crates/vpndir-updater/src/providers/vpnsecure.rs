//! VPNSecure servers scraped from the public locations page.
//!
//! The page lists one block per server under a single listing container.
//! Each block carries the hostname in a heading and labeled `City:`,
//! `Region:` and `Premium:` fields. Hostnames start with the country code,
//! as in `au1.isponeder.com`.

use crate::hosts::HostToServers;
use crate::providers::country_from_code;
use crate::source::ServerSource;
use async_trait::async_trait;
use vpndir_core::{ProviderId, Server, VpnType};
use vpndir_extract::html::{self, ElementRef};
use vpndir_extract::{ExtractError, Fetcher, Result};

const DEFAULT_BASE_URL: &str = "https://www.vpnsecure.me";
const LISTING_CLASS: &str = "servers-list";
const ITEM_CLASS: &str = "server-item";

/// VPNSecure locations page.
#[derive(Debug, Clone)]
pub struct Vpnsecure {
    base_url: String,
}

impl Vpnsecure {
    /// Source reading from `base_url` instead of the live site.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for Vpnsecure {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ServerSource for Vpnsecure {
    fn provider(&self) -> ProviderId {
        ProviderId::Vpnsecure
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
        let url = format!("{}/vpn-locations/", self.base_url);
        let body = fetcher.get_text(&url).await?;

        // Scraped synchronously: the parsed document is not Send.
        let servers = parse_page(&body, &url, warnings)?;
        for server in servers {
            hosts.add(server.hostname.clone(), server);
        }
        Ok(())
    }
}

fn parse_page(body: &str, url: &str, warnings: &mut Vec<String>) -> Result<Vec<Server>> {
    let document = html::parse_document(body);
    let listing = html::bfs(document.root_element(), html::has_class_containing(LISTING_CLASS))
        .ok_or_else(|| ExtractError::ContainerNotFound {
            url: url.to_string(),
            what: format!("element with class {LISTING_CLASS:?}"),
        })?;

    Ok(html::bfs_all(listing, html::has_class_containing(ITEM_CLASS))
        .iter()
        .filter_map(|item| parse_item(item, warnings))
        .collect())
}

fn parse_item(item: &ElementRef<'_>, warnings: &mut Vec<String>) -> Option<Server> {
    let Some(heading) = html::bfs(*item, html::has_tag("h4")) else {
        warnings.push(format!("hostname heading not found in {}", html::snippet(item)));
        return None;
    };
    let hostname = html::text_of(&heading);

    let code: String = hostname
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    let country = country_from_code(&code, &format!("server {hostname}"), warnings)?;

    let Some(city) = html::labeled_value(item, "City:") else {
        warnings.push(format!("server {hostname}: city not found"));
        return None;
    };
    let region = html::labeled_value(item, "Region:").unwrap_or_default();
    let premium = html::labeled_value(item, "Premium:")
        .is_some_and(|value| value.eq_ignore_ascii_case("yes"));

    Some(Server {
        country,
        region,
        city,
        hostname,
        tcp: true,
        udp: true,
        premium,
        ..Server::new(VpnType::OpenVpn)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><section class="servers-list">
          <div class="server-item">
            <h4>au1.isponeder.com</h4>
            <div><span>City:</span> <span>Sydney</span></div>
            <div><span>Region:</span> <span>New South Wales</span></div>
            <div><span>Premium:</span> <span>YES</span></div>
          </div>
          <div class="server-item">
            <h4>zz1.isponeder.com</h4>
            <div><span>City:</span> <span>Nowhere</span></div>
          </div>
          <div class="server-item"><p>maintenance</p></div>
        </section></body></html>
    "#;

    #[test]
    fn test_parse_page() {
        let mut warnings = Vec::new();
        let servers = parse_page(PAGE, "https://example.net", &mut warnings).unwrap();

        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].hostname, "au1.isponeder.com");
        assert_eq!(servers[0].country, "Australia");
        assert_eq!(servers[0].region, "New South Wales");
        assert_eq!(servers[0].city, "Sydney");
        assert!(servers[0].premium);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("unknown country code"));
        assert!(warnings[1].contains("hostname heading not found"));
    }

    #[test]
    fn test_missing_listing_is_fatal() {
        let mut warnings = Vec::new();
        let page = "<html><body><p>moved</p></body></html>";
        let err = parse_page(page, "https://example.net", &mut warnings).unwrap_err();
        assert!(matches!(err, ExtractError::ContainerNotFound { .. }));
    }
}
