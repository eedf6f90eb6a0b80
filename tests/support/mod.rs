#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dynapi::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
use dynapi::types::HttpConfig;
use dynapi::{ApiClient, ClientBuilder};

pub const API_KEY: &str = "test-key";

/// YouTube v3 descriptor with its URLs pointed at `server`.
pub fn youtube_descriptor(server: &MockServer) -> Value {
    let mut doc: Value =
        serde_json::from_str(include_str!("../fixtures/youtube_v3.json")).expect("fixture");
    doc["rootUrl"] = json!(format!("{}/", server.uri()));
    doc["baseUrl"] = json!(format!("{}/youtube/v3/", server.uri()));
    doc
}

pub fn directory(server: &MockServer) -> Value {
    json!({
        "kind": "discovery#directoryList",
        "discoveryVersion": "v1",
        "items": [
            {
                "kind": "discovery#directoryItem",
                "id": "youtube:v3",
                "name": "youtube",
                "version": "v3",
                "title": "YouTube Data API v3",
                "discoveryRestUrl": format!("{}/discovery/v1/apis/youtube/v3/rest", server.uri()),
                "preferred": true
            },
            {
                "kind": "discovery#directoryItem",
                "id": "youtube:v2",
                "name": "youtube",
                "version": "v2",
                "discoveryRestUrl": format!("{}/discovery/v1/apis/youtube/v2/rest", server.uri()),
                "preferred": false
            }
        ]
    })
}

/// Mount the directory listing and the v3 descriptor, each expected exactly once.
pub async fn mount_discovery(server: &MockServer) {
    mount_discovery_with_delay(server, Duration::ZERO).await;
}

pub async fn mount_discovery_with_delay(server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis"))
        .and(query_param("name", "youtube"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(directory(server))
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis/youtube/v3/rest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(youtube_descriptor(server))
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub fn client_builder(server: &MockServer) -> ClientBuilder {
    ApiClient::builder("youtube")
        .api_key(API_KEY)
        .discovery_url(format!("{}/discovery/v1", server.uri()))
}

pub fn client(server: &MockServer) -> ApiClient {
    client_builder(server).build().expect("client")
}

/// Decoded query pairs of a received request, sorted.
pub fn sorted_query(request: &wiremock::Request) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    pairs
}

/// Requests received by `server` whose path equals `p`.
pub async fn received_at(server: &MockServer, p: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == p)
        .collect()
}

/// Transport that records every URL before delegating to reqwest.
pub struct CountingTransport {
    inner: ReqwestTransport,
    urls: Mutex<Vec<String>>,
}

impl CountingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: ReqwestTransport::new(&HttpConfig::default()).expect("transport"),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self, needle: &str) -> usize {
        self.urls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(needle))
            .count()
    }

    pub fn total(&self) -> usize {
        self.urls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl HttpTransport for CountingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.urls.lock().unwrap().push(request.url.clone());
        self.inner.send(request).await
    }
}
