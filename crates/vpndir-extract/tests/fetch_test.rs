// Integration tests for `Fetcher` using wiremock.

use serde::Deserialize;
use serde_json::json;
use std::io::{Cursor, Write};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use vpndir_extract::{archive, html, ExtractError, Fetcher};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Fetcher) {
    let server = MockServer::start().await;
    let fetcher = Fetcher::new(reqwest::Client::new(), CancellationToken::new());
    (server, fetcher)
}

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[derive(Debug, Deserialize)]
struct Relay {
    hostname: String,
    active: bool,
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_json() {
    let (server, fetcher) = setup().await;

    Mock::given(method("GET"))
        .and(path("/relays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "hostname": "se1-wireguard", "active": true, "extra": 1 },
            { "hostname": "se2-wireguard", "active": false },
        ])))
        .mount(&server)
        .await;

    let relays: Vec<Relay> = fetcher
        .get_json(&format!("{}/relays", server.uri()))
        .await
        .unwrap();

    assert_eq!(relays.len(), 2);
    assert_eq!(relays[0].hostname, "se1-wireguard");
    assert!(!relays[1].active);
}

#[tokio::test]
async fn test_get_text_and_scrape() {
    let (server, fetcher) = setup().await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><ul id="servers"><li>City: Oslo</li></ul></body></html>"#,
        ))
        .mount(&server)
        .await;

    let body = fetcher
        .get_text(&format!("{}/servers", server.uri()))
        .await
        .unwrap();
    let document = html::parse_document(&body);
    let list = html::bfs(document.root_element(), html::has_id("servers")).unwrap();

    assert_eq!(html::labeled_value(&list, "City:").as_deref(), Some("Oslo"));
}

#[tokio::test]
async fn test_get_zip() {
    let (server, fetcher) = setup().await;

    let body = zip_bytes(&[
        ("udp/se-sto.ovpn", "proto udp\nremote se-sto.example.net 1194\n"),
        ("udp/ca.crt", "certificate"),
    ]);
    Mock::given(method("GET"))
        .and(path("/configs.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let files = fetcher
        .get_zip(&format!("{}/configs.zip", server.uri()))
        .await
        .unwrap();
    let mut warnings = Vec::new();
    let configs = archive::parse_openvpn_files(&files, &mut warnings);

    assert_eq!(files.len(), 2);
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].file_name, "se-sto.ovpn");
    assert_eq!(
        configs[0].parsed.connection.hostname(),
        Some("se-sto.example.net")
    );
    assert!(warnings.is_empty());
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_success_status() {
    let (server, fetcher) = setup().await;

    Mock::given(method("GET"))
        .and(path("/relays"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetcher
        .get_bytes(&format!("{}/relays", server.uri()))
        .await
        .unwrap_err();

    match err {
        ExtractError::UnexpectedStatus { status, url } => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/relays"));
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json() {
    let (server, fetcher) = setup().await;

    Mock::given(method("GET"))
        .and(path("/relays"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = fetcher
        .get_json::<Vec<Relay>>(&format!("{}/relays", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Decode { .. }));
}

#[tokio::test]
async fn test_corrupt_archive() {
    let (server, fetcher) = setup().await;

    Mock::given(method("GET"))
        .and(path("/configs.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("PK but not really"))
        .mount(&server)
        .await;

    let err = fetcher
        .get_zip(&format!("{}/configs.zip", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Archive { .. }));
}

#[tokio::test]
async fn test_cancel_during_slow_response() {
    let server = MockServer::start().await;
    let cancel = CancellationToken::new();
    let fetcher = Fetcher::new(reqwest::Client::new(), cancel.clone());

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let err = fetcher
        .get_bytes(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
}
