mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dynapi::prelude::*;
use support::{
    API_KEY, CountingTransport, client, client_builder, mount_discovery,
    mount_discovery_with_delay, received_at, sorted_query,
};

fn pair(k: &str, v: &str) -> (String, String) {
    (k.to_string(), v.to_string())
}

#[tokio::test]
async fn playlist_items_list_receives_exact_params() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "youtube#playlistItemListResponse",
            "items": [{"id": "item-1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let youtube = client(&server);
    let out = youtube
        .resource("playlistItems")
        .method("list")
        .call(json!({"part": "snippet", "playlistId": "PL123"}))
        .await
        .unwrap();
    assert_eq!(out["items"][0]["id"], "item-1");

    let requests = received_at(&server, "/youtube/v3/playlistItems").await;
    assert_eq!(
        sorted_query(&requests[0]),
        vec![
            pair("key", API_KEY),
            pair("maxResults", "5"),
            pair("part", "snippet"),
            pair("playlistId", "PL123"),
        ]
    );
}

#[tokio::test]
async fn missing_operation_is_reported_by_path() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    let youtube = client(&server);

    let err = api_path!(youtube => videos.rate)
        .call(json!({"id": "abc", "rating": "like"}))
        .await
        .unwrap_err();
    match err {
        ApiError::UnknownOperation { path } => assert_eq!(path, "videos.rate"),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = youtube.operation("videos").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Resolution);
}

#[tokio::test]
async fn invalid_params_never_reach_the_network() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let transport = CountingTransport::new();
    let youtube = client_builder(&server)
        .transport(transport.clone())
        .build()
        .unwrap();

    let err = youtube
        .call("playlistItems.delete", json!({}))
        .await
        .unwrap_err();
    match &err {
        ApiError::Validation {
            method_id,
            violations,
        } => {
            assert_eq!(method_id, "youtube.playlistItems.delete");
            assert!(!violations.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.count("/youtube/v3/playlistItems"), 0);

    let out = youtube
        .call("playlistItems.delete", json!({"id": "abc"}))
        .await
        .unwrap();
    assert!(out.is_null());
    assert_eq!(transport.count("/youtube/v3/playlistItems"), 1);
}

#[tokio::test]
async fn bounds_and_enums_are_enforced() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    let youtube = client(&server);

    let err = youtube
        .call(
            "videos.list",
            json!({"part": "id", "maxResults": "500", "chart": "trending", "regionCode": "usa"}),
        )
        .await
        .unwrap_err();
    assert_eq!(err.violations().len(), 3, "{err}");
}

#[tokio::test]
async fn arrays_and_nulls_serialize_into_the_query() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let youtube = client(&server);
    youtube
        .call(
            "videos.list",
            json!({"part": "snippet", "fields": ["a", "b"], "id": ["x", "y"], "foo": null}),
        )
        .await
        .unwrap();
    youtube
        .call("videos.list", json!({"part": ["snippet", "statistics"], "id": "p,q,r"}))
        .await
        .unwrap();

    let requests = received_at(&server, "/youtube/v3/videos").await;
    assert_eq!(
        sorted_query(&requests[0]),
        vec![
            pair("fields", "a,b"),
            pair("id", "x,y"),
            pair("key", API_KEY),
            pair("maxResults", "2"),
            pair("part", "snippet"),
        ]
    );
    assert_eq!(
        sorted_query(&requests[1]),
        vec![
            pair("id", "p,q,r"),
            pair("key", API_KEY),
            pair("maxResults", "3"),
            pair("part", "snippet"),
            pair("part", "statistics"),
        ]
    );
}

#[tokio::test]
async fn path_parameters_are_expanded() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels/UC%20x/sections"))
        .and(query_param("part", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let youtube = client(&server);
    youtube
        .root()
        .resource("channels")
        .resource("sections")
        .method("list")
        .call(json!({"channelId": "UC x", "part": "id"}))
        .await
        .unwrap();

    let requests = received_at(&server, "/youtube/v3/channels/UC%20x/sections").await;
    assert!(sorted_query(&requests[0]).iter().all(|(k, _)| k != "channelId"));
}

#[tokio::test]
async fn not_found_keeps_status_and_body() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let youtube = client(&server);
    let err = youtube
        .call("playlistItems.list", json!({"part": "id", "playlistId": "missing"}))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.category(), ErrorCategory::Client);
    assert!(!err.is_retryable());
    match err {
        ApiError::Request(RequestError::Response { status, body, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(body, json!({"error": "not found"}));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let youtube = client_builder(&server)
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let err = youtube
        .call("channels.list", json!({"part": "id"}))
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    match err {
        ApiError::Request(RequestError::NoResponse {
            request, timed_out, ..
        }) => {
            assert!(timed_out);
            assert!(request.starts_with("GET "), "{request}");
            assert!(request.ends_with("/youtube/v3/channels"), "{request}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn per_call_timeout_overrides_default() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": []}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let youtube = client_builder(&server)
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let options = CallOptions::new().with_timeout(Duration::from_secs(5));
    let out = youtube
        .resource("channels")
        .method("list")
        .call_with(json!({"part": "id"}), None, &options)
        .await
        .unwrap();
    assert_eq!(out, json!({"items": []}));
}

#[tokio::test]
async fn cancelled_call_leaves_the_client_usable() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1]})))
        .mount(&server)
        .await;

    let youtube = client(&server);
    let cancel = new_cancel_handle();
    let options = CallOptions::new().with_cancel(cancel.clone());
    let call = youtube
        .resource("channels")
        .method("list")
        .call_with(json!({"part": "id"}), None, &options);
    let trigger = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
    };
    let (result, ()) = tokio::join!(call, trigger);
    match result {
        Err(ApiError::Cancelled { operation }) => assert_eq!(operation, "youtube.channels.list"),
        other => panic!("unexpected result: {other:?}"),
    }

    let out = youtube
        .call("channels.list", json!({"part": "id"}))
        .await
        .unwrap();
    assert_eq!(out, json!({"items": [1]}));
}

#[tokio::test]
async fn preconfigured_http_client_is_used() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(wiremock::matchers::header("x-team", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert("x-team", reqwest::header::HeaderValue::from_static("media"));
    let http = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap();
    let youtube = client_builder(&server).http_client(http).build().unwrap();

    let out = youtube
        .call("channels.list", json!({"part": "id"}))
        .await
        .unwrap();
    assert_eq!(out, json!({"items": []}));
}

#[tokio::test]
async fn caller_key_overrides_client_key() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("key", "caller-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let youtube = client(&server);
    youtube
        .call("channels.list", json!({"part": "id", "key": "caller-key"}))
        .await
        .unwrap();

    let requests = received_at(&server, "/youtube/v3/channels").await;
    let keys: Vec<_> = sorted_query(&requests[0])
        .into_iter()
        .filter(|(k, _)| k == "key")
        .collect();
    assert_eq!(keys, vec![pair("key", "caller-key")]);
}

#[tokio::test]
async fn concurrent_first_calls_build_one_tree() {
    let server = MockServer::start().await;
    mount_discovery_with_delay(&server, Duration::from_millis(150)).await;
    let youtube = client(&server);

    let trees = futures::future::join_all((0..6).map(|_| youtube.tree())).await;
    let first = trees[0].as_ref().unwrap();
    for tree in &trees {
        assert!(Arc::ptr_eq(tree.as_ref().unwrap(), first));
    }
    assert!(first.get("playlistItems.list").is_some());
    assert_eq!(first.version(), "v3");
}

#[tokio::test]
async fn concurrent_first_calls_share_a_failed_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(150)))
        .mount(&server)
        .await;
    let youtube = client(&server);

    let started = std::time::Instant::now();
    let trees = futures::future::join_all((0..6).map(|_| youtube.tree())).await;
    for tree in &trees {
        assert!(matches!(tree, Err(ApiError::DiscoveryFetch { .. })));
    }
    assert_eq!(received_at(&server, "/discovery/v1/apis").await.len(), 1);
    assert!(started.elapsed() < Duration::from_millis(600));

    // The failure is not cached; the next call fetches again.
    assert!(youtube.tree().await.is_err());
    assert_eq!(received_at(&server, "/discovery/v1/apis").await.len(), 2);
}

#[tokio::test]
async fn clients_can_share_a_discovery_cache() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    let shared = client(&server).discovery().clone();

    let a = client_builder(&server)
        .discovery_cache(Arc::clone(&shared))
        .build()
        .unwrap();
    let b = client_builder(&server)
        .discovery_cache(Arc::clone(&shared))
        .build()
        .unwrap();
    a.tree().await.unwrap();
    b.tree().await.unwrap();
}

#[tokio::test]
async fn body_is_sent_as_json() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    let body = json!({"snippet": {"playlistId": "PL1", "title": "t"}});
    Mock::given(method("POST"))
        .and(path("/youtube/v3/playlistItems"))
        .and(query_param("part", "snippet"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let youtube = client(&server);
    let out = youtube
        .resource("playlistItems")
        .method("insert")
        .call_with_body(json!({"part": "snippet"}), body)
        .await
        .unwrap();
    assert_eq!(out["id"], "new");
}

#[tokio::test]
async fn schema_checks_validate_bodies_and_responses() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": "not-a-list"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let youtube = client_builder(&server).schema_checks(true).build().unwrap();

    let err = youtube
        .call("videos.list", json!({"part": "id"}))
        .await
        .unwrap_err();
    match &err {
        ApiError::InvalidResponse { method_id, .. } => {
            assert_eq!(method_id, "youtube.videos.list")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = youtube
        .resource("playlistItems")
        .method("insert")
        .call_with_body(json!({"part": "snippet"}), json!({"snippet": {"position": "first"}}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }));
    assert!(err.violations()[0].starts_with("request body:"));
}

#[tokio::test]
async fn invalidate_rebuilds_from_fresh_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::directory(&server)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis/youtube/v3/rest"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(support::youtube_descriptor(&server)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let youtube = client(&server);
    let before = youtube.tree().await.unwrap();
    youtube.invalidate().unwrap();
    let after = youtube.tree().await.unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(
        before.paths().collect::<Vec<_>>(),
        after.paths().collect::<Vec<_>>()
    );
}

#[derive(Default)]
struct Recorder {
    events: std::sync::Mutex<Vec<String>>,
}

impl HttpInterceptor for Recorder {
    fn on_before_send(
        &self,
        ctx: &dynapi::utils::HttpRequestContext,
        mut request: dynapi::transport::HttpRequest,
    ) -> dynapi::Result<dynapi::transport::HttpRequest> {
        self.events.lock().unwrap().push(format!("send {}", ctx.operation));
        request
            .headers
            .insert("x-trace", reqwest::header::HeaderValue::from_static("on"));
        Ok(request)
    }

    fn on_response(
        &self,
        _ctx: &dynapi::utils::HttpRequestContext,
        response: &dynapi::transport::HttpResponse,
    ) {
        self.events
            .lock()
            .unwrap()
            .push(format!("response {}", response.status));
    }

    fn on_error(&self, _ctx: &dynapi::utils::HttpRequestContext, error: &ApiError) {
        self.events
            .lock()
            .unwrap()
            .push(format!("error {:?}", error.status_code()));
    }
}

#[tokio::test]
async fn interceptors_see_every_exchange() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .and(wiremock::matchers::header("x-trace", "on"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "gone"})))
        .mount(&server)
        .await;

    let recorder = Arc::new(Recorder::default());
    let youtube = client_builder(&server)
        .interceptor(Arc::new(LoggingInterceptor))
        .interceptor(recorder.clone())
        .build()
        .unwrap();

    let err = youtube
        .call("playlistItems.list", json!({"part": "id", "playlistId": "PL1"}))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "send youtube.playlistItems.list".to_string(),
            "response 404".to_string(),
            "error Some(404)".to_string(),
        ]
    );
}
