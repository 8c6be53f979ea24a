//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, header},
};
use tempfile::TempDir;

use calsnap::api::AppState;
use calsnap::api::app;
use calsnap::core::AppConfig;
use calsnap::core::db::open_client_db;
use calsnap::origin::{EndpointSet, resolve_endpoints};

pub const BOUNDARY: &str = "calsnap-test-boundary";

/// A router over a fresh client store. Keep the value alive for the
/// length of the test, dropping it removes the store.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<RwLock<AppState>>,
    _dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

pub fn test_config(dir: &TempDir, assistant_url: &str) -> AppConfig {
    let storage_path = dir.path().display().to_string();
    AppConfig {
        db_path: format!("{}/calsnap.db", storage_path),
        storage_path,
        web_ui_path: dir.path().join("web-ui").display().to_string(),
        on_prem_image_analysis_url: String::from("http://127.0.0.1:1"),
        on_prem_knowledge_base_url: String::from("http://127.0.0.1:1"),
        cloud_gateway_url: String::from("http://127.0.0.1:1"),
        calendar_assistant_url: assistant_url.to_string(),
        calendar_id: String::from("primary"),
        reachability_timeout: Duration::from_millis(200),
        auth_wait_timeout: Duration::from_millis(50),
        auth_poll_interval: Duration::from_millis(10),
        max_upload_bytes: 1024 * 1024,
    }
}

/// Creates a test application talking to the calendar assistant at
/// `assistant_url` (usually a `mockito` server).
pub async fn test_app(assistant_url: &str) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(&dir, assistant_url);
    let endpoints = EndpointSet::on_premise(&config);
    build_app(dir, config, endpoints).await
}

/// Like `test_app` but the endpoints are chosen the way `serve` does,
/// by checking whether `on_prem_url` answers.
pub async fn test_app_resolved(on_prem_url: &str, assistant_url: &str) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = test_config(&dir, assistant_url);
    config.on_prem_image_analysis_url = on_prem_url.to_string();
    let endpoints = resolve_endpoints(&config).await;
    build_app(dir, config, endpoints).await
}

async fn build_app(dir: TempDir, config: AppConfig, endpoints: EndpointSet) -> TestApp {
    std::fs::create_dir_all(&config.web_ui_path).expect("Failed to create web ui dir");
    std::fs::write(
        format!("{}/index.html", config.web_ui_path),
        "<html><body>calsnap</body></html>",
    )
    .expect("Failed to write index.html");

    let db = open_client_db(&config.db_path)
        .await
        .expect("Failed to open client db");
    let state = Arc::new(RwLock::new(AppState::new(db, config, endpoints)));

    TestApp {
        router: app(Arc::clone(&state)),
        state,
        _dir: dir,
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}

/// A multipart form with a single file field
pub fn multipart_request(
    uri: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    content: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A multipart form with only a text field, no file
pub fn text_only_multipart_request(uri: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nJune\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn sign_in_request(user_id: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/session")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "user_id": user_id,
                "email": format!("{}@example.com", user_id),
            })
            .to_string(),
        ))
        .unwrap()
}
