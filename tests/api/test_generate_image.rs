// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for the /api/generate proxy against a synthetic Gemini upstream

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use genimage_devserver::{
    api::REQUIRED_FIELDS,
    create_app,
    upstream::{GeminiClient, DEFAULT_MODEL},
    AppState,
};
use mockito::Matcher;
use serde_json::{json, Value};
use std::path::Path;
use tower::util::ServiceExt; // for `oneshot`

const API_KEY: &str = "test-key-123";

/// Nothing listens on port 1, so connecting fails immediately.
const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:1";

fn app_for(upstream_url: &str) -> Router {
    let gemini = GeminiClient::new(upstream_url, None).unwrap();
    create_app(
        AppState::new(gemini, 25 * 1024 * 1024),
        Path::new("no-static-root-in-tests"),
    )
}

fn valid_body() -> Value {
    json!({
        "apiKey": API_KEY,
        "prompt": "put a party hat on the cat",
        "image": {"type": "image/jpeg", "data": "/9j/AAAA"}
    })
}

fn default_model_path() -> Matcher {
    Matcher::Regex(format!(
        "^/models/{}:generateContent",
        regex_escape(DEFAULT_MODEL)
    ))
}

fn regex_escape(s: &str) -> String {
    s.replace('.', "\\.")
}

async fn send(app: Router, method: Method, body: impl Into<Body>) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method(method)
        .uri("/api/generate")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let allow = response
        .headers()
        .get(header::ALLOW)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, allow, json)
}

async fn post_json(app: Router, body: &Value) -> (StatusCode, Value) {
    let (status, _, json) = send(app, Method::POST, body.to_string()).await;
    (status, json)
}

// ============================================================================
// Inbound validation
// ============================================================================

#[tokio::test]
async fn test_non_post_methods_rejected_with_allow_header() {
    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let (status, allow, json) =
            send(app_for(UNREACHABLE_UPSTREAM), method.clone(), Body::empty()).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "method {}", method);
        assert_eq!(allow.as_deref(), Some("POST"));
        assert_eq!(json["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn test_cors_preflight_reaches_method_check() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/generate")
        .header(header::ORIGIN, "https://other-site.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app_for(UNREACHABLE_UPSTREAM).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_oversized_body_returns_400() {
    let gemini = GeminiClient::new(UNREACHABLE_UPSTREAM, None).unwrap();
    let app = create_app(AppState::new(gemini, 64), Path::new("no-static-root-in-tests"));

    let (status, json) = post_json(app, &valid_body()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid JSON payload");
}

#[tokio::test]
async fn test_invalid_json_returns_400() {
    for body in ["", "{", "apiKey=abc", "{\"apiKey\": }"] {
        let (status, _, json) = send(app_for(UNREACHABLE_UPSTREAM), Method::POST, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(json["error"], "Invalid JSON payload");
    }
}

#[tokio::test]
async fn test_missing_fields_return_400_naming_fields() {
    let mut bodies = Vec::new();
    for key in ["apiKey", "prompt"] {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove(key);
        bodies.push(body);
    }
    for key in ["type", "data"] {
        let mut body = valid_body();
        body["image"].as_object_mut().unwrap().remove(key);
        bodies.push(body);
    }
    let mut no_image = valid_body();
    no_image.as_object_mut().unwrap().remove("image");
    bodies.push(no_image);
    bodies.push(json!({}));

    for body in bodies {
        let (status, json) = post_json(app_for(UNREACHABLE_UPSTREAM), &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        let message = json["error"].as_str().unwrap();
        for field in REQUIRED_FIELDS {
            assert!(message.contains(field), "{} missing from {}", field, message);
        }
    }
}

// ============================================================================
// Upstream translation and normalization
// ============================================================================

#[tokio::test]
async fn test_default_model_and_translated_body_sent_upstream() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", default_model_path())
        .match_query(Matcher::UrlEncoded("key".into(), API_KEY.into()))
        .match_body(Matcher::Json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "put a party hat on the cat"}]},
                {"role": "user", "parts": [{"inlineData": {"mimeType": "image/jpeg", "data": "/9j/AAAA"}}]}
            ],
            "generationConfig": {"temperature": 0.7}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#)
        .create_async()
        .await;

    let (status, _) = post_json(app_for(&server.url()), &valid_body()).await;

    assert_eq!(status, StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_explicit_model_is_path_encoded() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock(
            "POST",
            Matcher::Regex("^/models/tunedModels%2Fmy%20model:generateContent".to_string()),
        )
        .match_query(Matcher::UrlEncoded("key".into(), API_KEY.into()))
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#)
        .create_async()
        .await;

    let mut body = valid_body();
    body["model"] = json!("tunedModels/my model");
    let (status, _) = post_json(app_for(&server.url()), &body).await;

    assert_eq!(status, StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_image_and_text_returned_on_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", default_model_path())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                {"text": "ok"}
            ]}}]})
            .to_string(),
        )
        .create_async()
        .await;

    let (status, json) = post_json(app_for(&server.url()), &valid_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"image": {"data": "AAAA", "mimeType": "image/png"}, "text": "ok"})
    );
}

#[tokio::test]
async fn test_snake_case_inline_data_accepted() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", default_model_path())
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"inline_data":{"mime_type":"image/webp","data":"UklG"}}]}}]}"#)
        .create_async()
        .await;

    let (status, json) = post_json(app_for(&server.url()), &valid_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"image": {"data": "UklG", "mimeType": "image/webp"}}));
}

#[tokio::test]
async fn test_text_only_reply_returns_502_with_text() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", default_model_path())
        .with_status(200)
        .with_body(
            json!({"candidates": [{"content": {"parts": [
                {"text": "I can't edit"},
                {"text": "this image"}
            ]}}]})
            .to_string(),
        )
        .create_async()
        .await;

    let (status, json) = post_json(app_for(&server.url()), &valid_body()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "No image data returned by the model");
    assert_eq!(json["text"], "I can't edit\nthis image");
}

#[tokio::test]
async fn test_upstream_error_status_passed_through() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", default_model_path())
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"rate limited"}}"#)
        .create_async()
        .await;

    let (status, json) = post_json(app_for(&server.url()), &valid_body()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json, json!({"error": "rate limited"}));
}

#[tokio::test]
async fn test_upstream_error_without_message_uses_generic_text() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", default_model_path())
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let (status, json) = post_json(app_for(&server.url()), &valid_body()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "Upstream error (status 503)");
}

#[tokio::test]
async fn test_unreachable_upstream_returns_502_without_key() {
    let (status, json) = post_json(app_for(UNREACHABLE_UPSTREAM), &valid_body()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = json["error"].as_str().unwrap();
    assert!(!message.is_empty());
    assert!(
        message.to_lowercase().contains("connect"),
        "expected a connection failure, got: {}",
        message
    );
    assert!(!message.contains(API_KEY), "key leaked: {}", message);
    assert!(json.get("text").is_none());
}

#[tokio::test]
async fn test_repeated_requests_are_independent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", default_model_path())
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"done"},{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#)
        .expect(2)
        .create_async()
        .await;

    let app = app_for(&server.url());
    let first = post_json(app.clone(), &valid_body()).await;
    let second = post_json(app, &valid_body()).await;

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(first, second);
    mock.assert_async().await;
}
