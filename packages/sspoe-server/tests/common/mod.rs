#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use sspoe_server::config::Config;

pub fn test_config(data_dir: &Path) -> Config {
    Config {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        log_level: "debug".to_string(),
        data_dir: data_dir.to_path_buf(),
        catalog_path: None,
        log_dir: None,
    }
}

pub fn create_test_app(data_dir: &Path) -> Router {
    sspoe_server::create_app(&test_config(data_dir)).unwrap()
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn act(app: &Router, action: Value) -> Value {
    let (status, json) = send(app, "POST", "/api/actions", Some(action)).await;
    assert_eq!(status, StatusCode::OK, "action rejected: {json}");
    json
}
