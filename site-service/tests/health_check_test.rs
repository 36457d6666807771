mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use service_core::middleware::REQUEST_ID_HEADER;
use tower::ServiceExt;

#[tokio::test]
async fn health_and_ready_report_ok() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn api_root_returns_banner() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "MITA ICT API - Where Technology Meets Strategy"
    );
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::GET)
                .uri("/health")
                .header(REQUEST_ID_HEADER, "req-123")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-123");
    assert!(response.headers().contains_key("x-content-type-options"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::spawn().await;

    let (status, _) = app.get("/api/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_route_is_rate_limited_per_ip() {
    let mut config = common::test_config();
    config.rate_limit.chat_per_minute = 1;
    let app = TestApp::with_config(config).await;

    let send = || {
        app.router.clone().oneshot(
            axum::http::Request::builder()
                .method(Method::POST)
                .uri("/api/chat/message")
                .header("content-type", "application/json")
                .header("x-forwarded-for", "203.0.113.7")
                .body(axum::body::Body::from(r#"{"message":"hi"}"#))
                .unwrap(),
        )
    };

    assert_eq!(send().await.unwrap().status(), StatusCode::OK);
    assert_eq!(
        send().await.unwrap().status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}
