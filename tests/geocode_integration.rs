//! End-to-end tests for address resolution across both configured backends.

use aeris::config::GeocodingConfig;
use aeris::geocode::{GeocodeError, GeocodingResolver};
use mockito::{Matcher, Server};
use reqwest::Client;
use std::sync::Arc;

fn test_geocoding_config(primary_url: String, fallback_url: String) -> GeocodingConfig {
    GeocodingConfig {
        primary_base_url: primary_url,
        primary_api_key: Some("gk".to_string()),
        fallback_base_url: fallback_url,
        timeout_secs: 5,
    }
}

// Scenario: keyed backend errors out, free fallback resolves. The label
// must be the fallback's display name, not the raw query string.
#[tokio::test]
async fn test_fallback_backend_display_name_wins() {
    let mut keyed = Server::new_async().await;
    let _mock = keyed
        .mock("GET", "/v1/search")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let mut fallback = Server::new_async().await;
    let _mock = fallback
        .mock("GET", "/v1/search")
        .match_query(Matcher::UrlEncoded("name".into(), "tokyo".into()))
        .with_status(200)
        .with_body(r#"{"results":[{"latitude":35.6762,"longitude":139.6503,"name":"Tokyo"}]}"#)
        .create_async()
        .await;

    let config = test_geocoding_config(keyed.url(), fallback.url());
    let resolver = GeocodingResolver::new(&config, Arc::new(Client::new()));

    let location = resolver.resolve("tokyo").await.unwrap();
    assert_eq!(location.label, "Tokyo");
    assert_eq!(location.latitude, 35.6762);
    assert_eq!(location.longitude, 139.6503);
}

// Keyed backend answers first; the fallback must not be queried at all.
#[tokio::test]
async fn test_keyed_backend_short_circuits() {
    let mut keyed = Server::new_async().await;
    let _mock = keyed
        .mock("GET", "/v1/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"lat":"39.7392","lon":"-104.9903","display_name":"Denver, Colorado, USA"}]"#)
        .create_async()
        .await;

    let mut fallback = Server::new_async().await;
    let fallback_spy = fallback
        .mock("GET", "/v1/search")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = test_geocoding_config(keyed.url(), fallback.url());
    let resolver = GeocodingResolver::new(&config, Arc::new(Client::new()));

    let location = resolver.resolve("Denver").await.unwrap();
    fallback_spy.assert_async().await;
    assert_eq!(location.label, "Denver, Colorado, USA");
}

// Without a key the keyed backend is not configured at all; the free
// fallback alone answers, and a definitive no-match is NotFound.
#[tokio::test]
async fn test_unkeyed_config_uses_fallback_only() {
    let mut fallback = Server::new_async().await;
    let _mock = fallback
        .mock("GET", "/v1/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let config = GeocodingConfig {
        primary_api_key: None,
        fallback_base_url: fallback.url(),
        timeout_secs: 5,
        ..Default::default()
    };
    let resolver = GeocodingResolver::new(&config, Arc::new(Client::new()));

    let result = resolver.resolve("no such place").await;
    assert!(matches!(result, Err(GeocodeError::NotFound(_))));
}
