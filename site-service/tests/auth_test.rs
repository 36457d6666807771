mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, ADMIN_PASSWORD, ADMIN_USERNAME};
use serde_json::json;

#[tokio::test]
async fn login_returns_a_bearer_token() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post_json(
            "/api/admin/login",
            json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 3600);
    let token = body["access_token"].as_str().unwrap();
    assert_eq!(
        app.state.jwt.validate_token(token).unwrap().sub,
        ADMIN_USERNAME
    );
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let app = TestApp::spawn().await;

    let (status, wrong_password) = app
        .post_json(
            "/api/admin/login",
            json!({ "username": ADMIN_USERNAME, "password": "nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = app
        .post_json(
            "/api/admin/login",
            json!({ "username": "ghost", "password": "nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(wrong_password["error"], "Incorrect username or password");
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn malformed_login_body_is_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .post_json("/api/admin/login", json!({ "username": ADMIN_USERNAME }))
        .await;

    assert!(
        status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY,
        "unexpected status {status}"
    );
}

#[tokio::test]
async fn logout_requires_a_token() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .request(Method::POST, "/api/admin/logout", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.admin_token().await;
    let (status, body) = app
        .request(Method::POST, "/api/admin/logout", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out");
}

#[tokio::test]
async fn change_password_rotates_credentials() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/change-password",
            Some(json!({
                "current_password": ADMIN_PASSWORD,
                "new_password": "a-much-better-password"
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    let (status, _) = app
        .post_json(
            "/api/admin/login",
            json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post_json(
            "/api/admin/login",
            json!({ "username": ADMIN_USERNAME, "password": "a-much-better-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn change_password_checks_the_current_one() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/change-password",
            Some(json!({
                "current_password": "not-my-password",
                "new_password": "a-much-better-password"
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Current password is incorrect");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/admin/change-password",
            Some(json!({ "current_password": ADMIN_PASSWORD, "new_password": "short" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
