//! HTTP fetcher tests against a mock OAI-PMH endpoint.
//!
//! The fetcher is blocking, so requests run on the blocking pool while the
//! mock server runs on the async runtime.

use std::fs;
use std::path::Path;

use oaipmh_harvester::http::create_client;
use oaipmh_harvester::{
    CachingFetcher, Fetcher, HarvestConfig, Harvester, HarvesterError, HttpFetcher,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/xml; charset=utf-8")
        .set_body_string(body)
}

/// Fetch `url` with a fresh fetcher on the blocking pool.
///
/// The blocking client must be created and dropped outside the runtime.
async fn fetch(url: String) -> oaipmh_harvester::Result<String> {
    tokio::task::spawn_blocking(move || HttpFetcher::with_client(create_client()?).fetch(&url))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oai"))
        .and(query_param("verb", "Identify"))
        .respond_with(xml(load_fixture("identify.xml")))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/oai?verb=Identify", server.uri());
    let body = fetch(url).await.unwrap();

    assert!(body.contains("Example Research Data Repository"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let url = format!("{}/oai?verb=Identify", server.uri());
    let result = fetch(url).await;

    match result {
        Err(HarvesterError::RetriesExhausted { attempts, message }) => {
            assert_eq!(attempts, 3);
            assert!(message.contains("503"), "{message}");
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/oai?verb=Identify", server.uri());
    let result = fetch(url).await;

    assert!(matches!(result, Err(HarvesterError::Http(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_utf8_is_decoded_lossily() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<a>caf\xe9</a>".to_vec()))
        .mount(&server)
        .await;

    let url = format!("{}/oai", server.uri());
    let body = fetch(url).await.unwrap();

    assert_eq!(body, "<a>caf\u{fffd}</a>");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_caching_fetcher_requests_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("verb", "Identify"))
        .respond_with(xml(load_fixture("identify.xml")))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/oai?verb=Identify", server.uri());
    let (first, second, cached) = tokio::task::spawn_blocking(move || {
        let cache = CachingFetcher::new(HttpFetcher::new()?);
        let first = cache.fetch(&url)?;
        let second = cache.fetch(&url)?;
        Ok::<_, HarvesterError>((first, second, cache.len()))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(cached, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_harvest_over_http() {
    let server = MockServer::start().await;
    let host = format!("{}/oai", server.uri());

    Mock::given(method("GET"))
        .and(query_param("verb", "ListMetadataFormats"))
        .respond_with(xml(load_fixture("formats.xml")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("verb", "Identify"))
        .respond_with(xml(load_fixture("identify.xml")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("verb", "ListRecords"))
        .and(query_param("metadataPrefix", "oai_dc"))
        .respond_with(xml(load_fixture("dc_page2.xml")))
        .expect(1)
        .mount(&server)
        .await;

    let output = tokio::task::spawn_blocking(move || {
        let mut harvester =
            Harvester::new(HttpFetcher::new()?, HarvestConfig::new(host, "oai_dc"));
        harvester.harvest()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(output.documents.len(), 2);
    assert_eq!(
        output.documents[0].repository_identifier,
        "Example Research Data Repository"
    );
    assert_eq!(output.report.pages, 1);
}
