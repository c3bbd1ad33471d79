#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use roiview_api::config::ServerConfig;
use roiview_api::router::build_app_router;
use roiview_api::state::AppState;
use roiview_core::crypto::{derive_key, encrypt_payload, IV_LEN};
use roiview_core::overlay::SVG_DATA_URI_PREFIX;

/// A test application plus the temp directory holding its dataset.
///
/// Keep `dir` alive for as long as the app is used.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub dir: TempDir,
}

/// Build a test `ServerConfig` with safe defaults and the given dataset paths.
pub fn test_config(dataset_paths: Vec<PathBuf>) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        dataset_paths,
        dataset_key: None,
    }
}

/// Two disjoint 100x100 squares: region-1 at the origin, region-2 at (200,200).
pub fn two_square_dataset() -> Value {
    json!({
        "boundaries": [
            {
                "polygon": {"vertices": [
                    {"x": 0, "y": 0}, {"x": 100, "y": 0},
                    {"x": 100, "y": 100}, {"x": 0, "y": 100}
                ]},
                "bbox": [0, 0, 100, 100],
                "score": 0.91,
                "iou": 0.77
            },
            {
                "polygon": {"vertices": [
                    {"x": 200, "y": 200}, {"x": 300, "y": 200},
                    {"x": 300, "y": 300}, {"x": 200, "y": 300}
                ]},
                "bbox": [200, 200, 300, 300],
                "score": 0.64,
                "iou": 0.58
            }
        ]
    })
}

/// Seal `plaintext` with the development key into `dir/name`.
pub fn write_dataset_file(dir: &TempDir, name: &str, plaintext: &[u8]) -> PathBuf {
    let key = derive_key(None).unwrap();
    let sealed = encrypt_payload(plaintext, &key, &[11u8; IV_LEN]).unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, sealed).unwrap();
    path
}

/// Build the full application router over an encrypted copy of `dataset`.
pub fn build_test_app(dataset: &Value) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dataset_file(&dir, "boundaries.enc", &serde_json::to_vec(dataset).unwrap());
    build_test_app_with_paths(dir, vec![path])
}

/// Build the full application router with explicit dataset candidates.
pub fn build_test_app_with_paths(dir: TempDir, paths: Vec<PathBuf>) -> TestApp {
    let state = AppState::new(test_config(paths));
    let app = build_app_router(state.clone());
    TestApp { app, state, dir }
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

/// Send a POST request with a raw body and JSON content type.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Decode a `data:image/svg+xml;base64,...` overlay into SVG markup.
pub fn decode_overlay(uri: &Value) -> String {
    let b64 = uri
        .as_str()
        .and_then(|s| s.strip_prefix(SVG_DATA_URI_PREFIX))
        .expect("overlay must be an SVG data URI");
    String::from_utf8(STANDARD.decode(b64).unwrap()).unwrap()
}

/// Count overlay paths of a given `data-kind`.
pub fn count_kind(markup: &str, kind: &str) -> usize {
    markup.matches(&format!(r#"data-kind="{kind}""#)).count()
}
