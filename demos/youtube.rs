//! YouTube Data API through discovery
//!
//! Lists a playlist, looks up a video and shows how an unknown operation is
//! reported. Requires an API key:
//!
//! ```bash
//! DYNAPI_API_KEY=... RUST_LOG=dynapi=debug cargo run --example youtube
//! ```

use dynapi::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let youtube = ApiClient::new("youtube", ClientOptions::from_env())?;

    let playlist = youtube
        .resource("playlistItems")
        .method("list")
        .call(json!({
            "playlistId": "PLBCF2DAC6FFB574DE",
            "maxResults": 25,
            "part": "snippet,contentDetails"
        }))
        .await?;
    println!("pageInfo: {}", playlist["pageInfo"]);
    for item in playlist["items"].as_array().into_iter().flatten() {
        println!("  - {}", item["snippet"]["title"]);
    }

    let videos = api_path!(youtube => videos.list)
        .call(json!({"id": "Ks-_Mh1QhMc", "part": "snippet,contentDetails"}))
        .await?;
    for item in videos["items"].as_array().into_iter().flatten() {
        println!("video: {}", item["snippet"]["title"]);
    }

    match youtube.call("videos.frobnicate", json!({"id": "123"})).await {
        Err(ApiError::UnknownOperation { path }) => println!("not available: {path}"),
        other => println!("unexpected: {other:?}"),
    }

    let tree = youtube.tree().await?;
    println!("{} {} exposes {} operations", tree.api(), tree.version(), tree.len());
    Ok(())
}
