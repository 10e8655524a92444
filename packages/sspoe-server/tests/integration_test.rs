use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{act, create_test_app, send};

#[tokio::test]
async fn test_health_root() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_live() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let (status, body) = send(&app, "GET", "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_404_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let (status, body) = send(&app, "GET", "/nonexistent/path", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_initial_view_is_home() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let (status, body) = send(&app, "GET", "/api/view", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["view"]["screen"], "home");
    assert_eq!(body["data"]["view"]["lang"], "fr");
    assert_eq!(body["data"]["view"]["dir"], "ltr");
    assert_eq!(body["data"]["effects"][0]["type"], "setDocumentLanguage");

    let (_, body) = send(&app, "GET", "/api/view", None).await;
    assert_eq!(body["data"]["effects"], json!([]));
}

#[tokio::test]
async fn test_prediction_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    act(&app, json!({"type": "selectLevel", "levelId": "1ac"})).await;
    let body = act(
        &app,
        json!({"type": "selectActivity", "courseId": "1ac_pression", "activityId": "1ac_pression_act1"}),
    )
    .await;
    assert_eq!(body["data"]["view"]["screen"], "player");
    assert_eq!(body["data"]["view"]["stepIndex"], 0);

    let body = act(&app, json!({"type": "validate"})).await;
    assert_eq!(body["data"]["applied"], false);

    act(&app, json!({"type": "selectAnswer", "value": "b"})).await;
    act(&app, json!({"type": "validate"})).await;

    let body = act(&app, json!({"type": "enterFullscreen"})).await;
    assert_eq!(body["data"]["effects"], json!([{"type": "requestFullscreen"}]));

    let body = act(&app, json!({"type": "advanceToExplanation"})).await;
    assert_eq!(body["data"]["effects"], json!([{"type": "exitFullscreen"}]));
    assert_eq!(body["data"]["view"]["stepIndex"], 2);
    assert_eq!(body["data"]["view"]["content"]["feedback"]["verdict"], "correct");
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let (status, body) = send(
        &app,
        "POST",
        "/api/actions",
        Some(json!({"type": "selectLevel", "levelId": "9ac"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, body) = send(&app, "GET", "/api/view", None).await;
    assert_eq!(body["data"]["view"]["screen"], "home");
}

#[tokio::test]
async fn test_malformed_action_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let (status, _) = send(&app, "POST", "/api/actions", Some(json!({"type": "fly"}))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_language_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let (status, body) = send(
        &app,
        "PUT",
        "/api/preferences/language",
        Some(json!({"language": "ar"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["applied"], true);
    assert_eq!(body["data"]["view"]["dir"], "rtl");

    let (_, body) = send(&app, "GET", "/api/preferences/language", None).await;
    assert_eq!(body["data"]["language"], "ar");

    let restarted = create_test_app(dir.path());
    let (_, body) = send(&restarted, "GET", "/api/view", None).await;
    assert_eq!(body["data"]["view"]["lang"], "ar");
}

#[tokio::test]
async fn test_unsupported_language() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let (status, body) = send(
        &app,
        "PUT",
        "/api/preferences/language",
        Some(json!({"language": "de"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_offline_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let (status, body) = send(&app, "GET", "/api/offline/manifest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], "sspoe-v1");
    assert_eq!(body["data"]["assets"][1], "./index.html");
}

#[tokio::test]
async fn test_custom_catalog_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.catalog_path = Some(dir.path().join("missing.json"));

    assert!(sspoe_server::create_app(&config).is_err());
}

#[tokio::test]
async fn test_activity_from_other_level_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    act(&app, json!({"type": "selectLevel", "levelId": "2ac"})).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/actions",
        Some(json!({"type": "selectActivity", "courseId": "1ac_pression", "activityId": "1ac_pression_act1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, body) = send(&app, "GET", "/api/view", None).await;
    assert_eq!(body["data"]["view"]["screen"], "courseList");
}
