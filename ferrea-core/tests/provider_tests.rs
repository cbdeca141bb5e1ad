//! Provider adapter tests against stub HTTP backends

use ferrea_core::config::{GoogleSettings, OpenLibrarySettings};
use ferrea_core::{BookProvider, GoogleBooksProvider, OpenLibraryProvider, RequestContext};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISBN: &str = "0060930314";

fn fixture(name: &str) -> Value {
    let raw = match name {
        "google_search" => include_str!("data/google_search.json"),
        "google_volume" => include_str!("data/google_volume.json"),
        "openlibrary_edition" => include_str!("data/openlibrary_edition.json"),
        "openlibrary_author" => include_str!("data/openlibrary_author.json"),
        other => panic!("unknown fixture {other}"),
    };
    serde_json::from_str(raw).expect("fixture is valid JSON")
}

fn ctx() -> RequestContext {
    RequestContext::new("tst", "tst")
}

fn google(base: &str, timeout: Duration) -> GoogleBooksProvider {
    let settings = GoogleSettings {
        api_url: Url::parse(base).unwrap(),
    };
    GoogleBooksProvider::new(&settings, timeout).unwrap()
}

fn openlibrary(base: &str) -> OpenLibraryProvider {
    let settings = OpenLibrarySettings {
        api_url: Url::parse(base).unwrap(),
        cover_url: Url::parse(base).unwrap(),
        health_path: "/health".to_string(),
    };
    OpenLibraryProvider::new(&settings, Duration::from_secs(5)).unwrap()
}

/// A local URL nothing is listening on
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

async fn mount_google(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", format!("isbn:{ISBN}")))
        .and(query_param("projection", "lite"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("google_search")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/volumes/mXPU2T--gPQC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("google_volume")))
        .mount(server)
        .await;
}

async fn mount_openlibrary_edition(server: &MockServer, edition: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/isbn/{ISBN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(edition))
        .mount(server)
        .await;
}

async fn mount_openlibrary_author(server: &MockServer, author_id: &str, name: &str) {
    let mut author = fixture("openlibrary_author");
    author["name"] = json!(name);
    Mock::given(method("GET"))
        .and(path(format!("/authors/{author_id}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(author))
        .mount(server)
        .await;
}

async fn mount_portrait(server: &MockServer, author_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/a/olid/{author_id}-M.jpg")))
        .and(query_param("default", "false"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xD9]),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_google_two_step_lookup() {
    let server = MockServer::start().await;
    mount_google(&server).await;

    let record = google(&server.uri(), Duration::from_secs(5))
        .search(ISBN, &ctx())
        .await
        .expect("record");

    assert_eq!(record.title(), Some("Identity"));
    assert_eq!(record.authors(), ["Milan Kundera".to_string()]);
    assert_eq!(record.publisher(), Some("HarperCollins"));
    assert_eq!(record.published_year(), Some(1999));
    assert!(record.cover_url().is_some());
    assert_eq!(record.languages(), ["en".to_string()]);
    assert_eq!(record.formats(), ["BOOK".to_string()]);
    assert!(record.author_portraits().is_empty());
}

#[tokio::test]
async fn test_google_zero_results_skips_detail_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"kind": "books#volumes", "totalItems": 0})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/volumes/mXPU2T--gPQC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("google_volume")))
        .expect(0)
        .mount(&server)
        .await;

    let record = google(&server.uri(), Duration::from_secs(5))
        .search("123456789", &ctx())
        .await;
    assert!(record.is_none());
}

#[tokio::test]
async fn test_google_error_statuses_are_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let record = google(&server.uri(), Duration::from_secs(5))
        .search(ISBN, &ctx())
        .await;
    assert!(record.is_none());
}

#[tokio::test]
async fn test_google_missing_detail_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("google_search")))
        .mount(&server)
        .await;

    let record = google(&server.uri(), Duration::from_secs(5))
        .search(ISBN, &ctx())
        .await;
    assert!(record.is_none());
}

#[tokio::test]
async fn test_google_malformed_body_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let record = google(&server.uri(), Duration::from_secs(5))
        .search(ISBN, &ctx())
        .await;
    assert!(record.is_none());
}

#[tokio::test]
async fn test_google_transport_failure_is_absent() {
    let provider = google(&closed_port_url(), Duration::from_secs(2));
    assert!(provider.search(ISBN, &ctx()).await.is_none());
    assert!(!provider.healthy(&ctx()).await);
}

#[tokio::test]
async fn test_google_timeout_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixture("google_search"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let record = google(&server.uri(), Duration::from_secs(1))
        .search(ISBN, &ctx())
        .await;
    assert!(record.is_none());
}

#[tokio::test]
async fn test_google_health_is_reachability() {
    let server = MockServer::start().await;
    // Unmatched requests get a 404, which still proves the host answers
    assert!(google(&server.uri(), Duration::from_secs(5)).healthy(&ctx()).await);

    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&failing)
        .await;
    assert!(!google(&failing.uri(), Duration::from_secs(5)).healthy(&ctx()).await);
}

#[tokio::test]
async fn test_openlibrary_end_to_end() {
    let server = MockServer::start().await;
    mount_openlibrary_edition(&server, fixture("openlibrary_edition")).await;
    mount_openlibrary_author(&server, "OL4326321A", "Milan Kundera").await;
    mount_portrait(&server, "OL4326321A").await;

    let record = openlibrary(&server.uri())
        .search(ISBN, &ctx())
        .await
        .expect("record");

    assert_eq!(record.title(), Some("Identity"));
    assert_eq!(record.authors(), ["Milan Kundera".to_string()]);
    assert_eq!(record.publisher(), Some("Harper Perennial"));
    assert_eq!(record.published_year(), Some(1999));
    assert_eq!(record.languages(), ["eng".to_string()]);
    assert_eq!(record.formats(), ["edition".to_string()]);
    assert_eq!(
        record.cover_url().map(|u| u.to_string()),
        Some(format!("{}/b/id/40647-M.jpg", server.uri()))
    );
    assert_eq!(
        record
            .author_portraits()
            .iter()
            .map(|p| p.as_ref().map(|u| u.to_string()))
            .collect::<Vec<_>>(),
        vec![Some(format!("{}/a/olid/OL4326321A-M.jpg", server.uri()))]
    );
}

#[tokio::test]
async fn test_openlibrary_missing_portrait_keeps_alignment() {
    let server = MockServer::start().await;
    mount_openlibrary_edition(&server, fixture("openlibrary_edition")).await;
    mount_openlibrary_author(&server, "OL4326321A", "Milan Kundera").await;

    let record = openlibrary(&server.uri())
        .search(ISBN, &ctx())
        .await
        .expect("record");

    assert_eq!(record.authors(), ["Milan Kundera".to_string()]);
    assert_eq!(record.author_portraits(), [None]);
}

#[tokio::test]
async fn test_openlibrary_authors_keep_listed_order() {
    let server = MockServer::start().await;
    let mut edition = fixture("openlibrary_edition");
    edition["authors"] = json!([
        {"key": "/authors/OL1A"},
        {"key": "/authors/OL2A"},
        {"key": "/authors/OL3A"}
    ]);
    mount_openlibrary_edition(&server, edition).await;
    mount_openlibrary_author(&server, "OL1A", "First Author").await;
    // OL2A has no author record and is dropped with its portrait
    mount_openlibrary_author(&server, "OL3A", "Third Author").await;
    mount_portrait(&server, "OL2A").await;
    mount_portrait(&server, "OL3A").await;

    let record = openlibrary(&server.uri())
        .search(ISBN, &ctx())
        .await
        .expect("record");

    assert_eq!(
        record.authors(),
        ["First Author".to_string(), "Third Author".to_string()]
    );
    let portraits = record.author_portraits();
    assert_eq!(portraits.len(), record.authors().len());
    assert!(portraits[0].is_none());
    assert!(portraits[1]
        .as_ref()
        .is_some_and(|u| u.path() == "/a/olid/OL3A-M.jpg"));
}

#[tokio::test]
async fn test_openlibrary_unknown_isbn_is_absent() {
    let server = MockServer::start().await;
    let record = openlibrary(&server.uri()).search("123456789", &ctx()).await;
    assert!(record.is_none());
}

#[tokio::test]
async fn test_openlibrary_health_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;
    assert!(openlibrary(&server.uri()).healthy(&ctx()).await);

    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&failing)
        .await;
    assert!(!openlibrary(&failing.uri()).healthy(&ctx()).await);
    assert!(!openlibrary(&closed_port_url()).healthy(&ctx()).await);
}

#[tokio::test]
async fn test_openlibrary_health_respects_base_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ol/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = openlibrary(&format!("{}/ol", server.uri()));
    assert!(provider.healthy(&ctx()).await);
}

#[tokio::test]
async fn test_openlibrary_edition_error_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/isbn/{ISBN}")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let record = openlibrary(&server.uri()).search(ISBN, &ctx()).await;
    assert!(record.is_none());
}

#[tokio::test]
async fn test_openlibrary_transport_failure_is_absent() {
    let provider = openlibrary(&closed_port_url());
    assert!(provider.search(ISBN, &ctx()).await.is_none());
}

#[tokio::test]
async fn test_openlibrary_portrait_error_keeps_author() {
    let server = MockServer::start().await;
    mount_openlibrary_edition(&server, fixture("openlibrary_edition")).await;
    mount_openlibrary_author(&server, "OL4326321A", "Milan Kundera").await;
    Mock::given(method("GET"))
        .and(path("/a/olid/OL4326321A-M.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let record = openlibrary(&server.uri())
        .search(ISBN, &ctx())
        .await
        .expect("record");

    assert_eq!(record.authors(), ["Milan Kundera".to_string()]);
    assert_eq!(record.author_portraits(), [None]);
}
