//! StationClient against an in-process mock station service.
//!
//! Run with: cargo test -p station-proto --test station_client

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use station_proto::config::StationConfig;
use station_proto::{StationClient, StationError, StationService};
use tokio::net::TcpListener;

async fn now_playing() -> Json<serde_json::Value> {
    Json(json!({
        "now_playing": {
            "elapsed": 42,
            "duration": 180,
            "playlist": "Morna",
            "song": {"id": "x1", "title": "Sodade", "artist": "Cesaria Evora", "album": "Miss Perfumado", "art": ""}
        },
        "song_history": [
            {"sh_id": 2, "played_at": 1700000100, "song": {"id": "x0", "title": "Angola", "artist": "Cesaria Evora"}},
            {"sh_id": 1, "played_at": 1700000000, "song": {"id": "w9", "title": "Mar Azul", "artist": "Cesaria Evora"}}
        ]
    }))
}

async fn requests() -> Json<serde_json::Value> {
    Json(json!([
        {"request_id": "r1", "song": {"title": "Sodade", "artist": "Cesaria Evora"}},
        {"request_id": 7, "song": {"title": "Petit Pays", "artist": "Cesaria Evora"}}
    ]))
}

async fn request(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        "r1" => (StatusCode::OK, Json(json!({"success": true}))).into_response(),
        "r2" => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "You have submitted a request too recently!"})),
        )
            .into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn broken() -> &'static str {
    "{ not json"
}

async fn spawn_mock() -> String {
    let app = Router::new()
        .route("/api/nowplaying/cesaria", get(now_playing))
        .route("/api/nowplaying/broken", get(broken))
        .route("/api/station/cesaria/requests", get(requests))
        .route("/api/station/cesaria/request/:id", post(request));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/api", addr)
}

fn client(api_base: &str, shortcode: &str) -> StationClient {
    StationClient::new(&StationConfig {
        api_base: api_base.to_string(),
        shortcode: shortcode.to_string(),
        ..StationConfig::default()
    })
    .expect("client should build")
}

#[tokio::test]
async fn now_playing_becomes_snapshot() {
    let base = spawn_mock().await;
    let snap = client(&base, "cesaria").now_playing().await.unwrap();

    assert_eq!(snap.current_song().unwrap().title, "Sodade");
    assert_eq!(snap.reported_elapsed(), 42);
    assert_eq!(snap.reported_duration(), 180);
    assert_eq!(snap.playlist_name(), Some("Morna"));
    assert_eq!(snap.history.len(), 2);
    assert_eq!(snap.history[0].song.title, "Angola");
}

#[tokio::test]
async fn unknown_station_is_status_error() {
    let base = spawn_mock().await;
    let err = client(&base, "nobody").now_playing().await.unwrap_err();
    assert!(matches!(err, StationError::Status(404)), "got {err:?}");
}

#[tokio::test]
async fn malformed_payload_is_decode_error() {
    let base = spawn_mock().await;
    let err = client(&base, "broken").now_playing().await.unwrap_err();
    assert!(matches!(err, StationError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_service_is_http_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = client(&format!("http://{}/api", addr), "cesaria")
        .now_playing()
        .await
        .unwrap_err();
    assert!(matches!(err, StationError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn requestable_songs_are_listed() {
    let base = spawn_mock().await;
    let songs = client(&base, "cesaria").requestable_songs().await.unwrap();
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].request_id, "r1");
    assert_eq!(songs[1].request_id, "7");
    assert_eq!(songs[1].song.title, "Petit Pays");
}

#[tokio::test]
async fn request_outcomes_cover_success_refusal_and_failure() {
    let base = spawn_mock().await;
    let c = client(&base, "cesaria");

    let ok = c.submit_request("r1").await.unwrap();
    assert!(ok.success);

    let refused = c.submit_request("r2").await.unwrap();
    assert!(!refused.success);
    assert!(refused.message.unwrap().contains("too recently"));

    let err = c.submit_request("r3").await.unwrap_err();
    assert!(matches!(err, StationError::Status(500)), "got {err:?}");
}
