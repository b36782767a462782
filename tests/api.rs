mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::CountingStore;
use fitstream::api::create_router;
use fitstream::app_state::AppState;
use fitstream::config::Config;
use fitstream::infrastructure::storage::LocalObjectStorage;

async fn app(media_root: &std::path::Path) -> Router {
    let store = CountingStore::new().await;
    let mut config = Config::default();
    config.storage.media_root = media_root.display().to_string();
    let storage = Arc::new(LocalObjectStorage::new(media_root, "http://localhost:3000"));
    create_router(AppState::with_backends(config, store, storage))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn sign_up(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/signup",
            None,
            json!({
                "email": format!("{}@example.com", username),
                "password": "hunter22",
                "username": username,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let response = app.oneshot(get("/api/v1/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_redirects_to_login_with_return_path() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let response = app.oneshot(get("/api/v1/feed/saved?page=2", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(location, "/login?redirect=%2Fapi%2Fv1%2Ffeed%2Fsaved%3Fpage%3D2");
}

#[tokio::test]
async fn test_unknown_token_is_treated_as_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;
    let bogus = uuid::Uuid::new_v4().to_string();

    let response = app.clone().oneshot(get("/api/v1/me", Some(&bogus))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.oneshot(get("/api/v1/categories", Some(&bogus))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sign_up_then_me_then_sign_out() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;
    let token = sign_up(&app, "lifter_lee").await;

    let response = app.clone().oneshot(get("/api/v1/me", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "lifter_lee");

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/auth/signout", Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/api/v1/me", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;
    sign_up(&app, "taken").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/signup",
            None,
            json!({ "email": "other@example.com", "password": "hunter22", "username": "taken" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_upload_then_view_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;
    let token = sign_up(&app, "uploader").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/videos",
            Some(&token),
            json!({
                "title": "Muay thai clinch",
                "main_category": "combat_sports",
                "sub_category": "muay_thai",
                "tags": "clinch, knees",
                "duration": 95,
                "file_name": "clinch.mp4",
                "content_base64": STANDARD.encode(b"not really a video"),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let video = body_json(response).await;
    let id = video["id"].as_str().unwrap().to_string();
    assert_eq!(video["tags"], json!(["clinch", "knees"]));
    assert!(video["video_url"].as_str().unwrap().starts_with("http://localhost:3000/media/"));

    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/videos/{}", id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["username"], "uploader");
    assert_eq!(detail["video"]["views"], 1);

    let response = app
        .oneshot(get("/api/v1/videos?query=clinch&category=combat_sports", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_rejects_unknown_category_pair() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;
    let token = sign_up(&app, "confused").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/videos",
            Some(&token),
            json!({
                "title": "Wrong shelf",
                "main_category": "cardio",
                "sub_category": "muay_thai",
                "file_name": "x.mp4",
                "content_base64": STANDARD.encode(b"bytes"),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_short_suggestion_query_returns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path()).await;

    let response = app.oneshot(get("/api/v1/search/suggestions?q=c", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}
