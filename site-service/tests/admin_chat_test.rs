mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use site_service::models::{MeetingRequest, MeetingStatus};
use site_service::services::ChatStore;

async fn seeded_meeting(app: &TestApp) -> MeetingRequest {
    let request = MeetingRequest::new(
        "session-1".to_string(),
        "Jane Doe".to_string(),
        "jane@example.com".to_string(),
        None,
        "Monday 10am".to_string(),
        "CRM demo".to_string(),
    );
    app.store.insert_meeting_request(&request).await.unwrap();
    request
}

#[tokio::test]
async fn chat_admin_routes_require_a_token() {
    let app = TestApp::spawn().await;

    for uri in ["/api/admin/chat-sessions", "/api/admin/meeting-requests"] {
        let (status, _) = app.get(uri).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, _) = app
        .request(
            Method::GET,
            "/api/admin/chat-sessions",
            None,
            Some("not-a-jwt"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sessions_are_listed_fetched_and_deleted() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (_, first) = app.chat(None, "hello").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (_, second) = app.chat(None, "my email is lead@firm.se").await;
    let first_id = first["session_id"].as_str().unwrap();
    let second_id = second["session_id"].as_str().unwrap();

    let (status, list) = app
        .request(Method::GET, "/api/admin/chat-sessions", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second_id);
    assert_eq!(list[0]["lead_captured"], true);
    assert_eq!(list[0]["lead_email"], "lead@firm.se");
    assert_eq!(list[0]["message_count"], 2);

    let uri = format!("/api/admin/chat-sessions/{}", first_id);
    let (status, detail) = app.request(Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["messages"][0]["role"], "user");
    assert_eq!(detail["messages"][0]["content"], "hello");

    let (status, body) = app.request(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Chat session deleted successfully");

    let (status, body) = app.request(Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");

    let (status, _) = app.request(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn meeting_status_can_be_updated() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let meeting = seeded_meeting(&app).await;

    let uri = format!("/api/admin/meeting-requests/{}/status", meeting.id);
    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "status": "approved", "admin_notes": "Teams link sent" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Meeting request approved successfully");

    let stored = app
        .store
        .get_meeting_request(&meeting.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, MeetingStatus::Approved);
    assert_eq!(stored.admin_notes.as_deref(), Some("Teams link sent"));

    // Transitions are unconstrained.
    let (status, _) = app
        .request(Method::PUT, &uri, Some(json!({ "status": "pending" })), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_meeting_status_leaves_request_unchanged() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let meeting = seeded_meeting(&app).await;

    let uri = format!("/api/admin/meeting-requests/{}/status", meeting.id);
    let (status, body) = app
        .request(Method::PUT, &uri, Some(json!({ "status": "cancelled" })), Some(&token))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status");

    for bad in [
        json!({ "admin_notes": "no status given" }),
        json!({ "status": null }),
        json!({ "status": 3 }),
    ] {
        let (status, body) = app
            .request(Method::PUT, &uri, Some(bad.clone()), Some(&token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
        assert_eq!(body["error"], "Invalid status");
    }

    let stored = app
        .store
        .get_meeting_request(&meeting.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, MeetingStatus::Pending);
}

#[tokio::test]
async fn unknown_meeting_request_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/admin/meeting-requests/missing/status",
            Some(json!({ "status": "rejected" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Meeting request not found");

    let (status, _) = app
        .request(
            Method::DELETE,
            "/api/admin/meeting-requests/missing",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn meeting_requests_list_newest_first_and_delete() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let older = seeded_meeting(&app).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = seeded_meeting(&app).await;

    let (status, list) = app
        .request(Method::GET, "/api/admin/meeting-requests", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["id"], newer.id.as_str());
    assert_eq!(list[1]["id"], older.id.as_str());
    assert_eq!(list[1]["status"], "pending");

    let uri = format!("/api/admin/meeting-requests/{}", older.id);
    let (status, body) = app.request(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Meeting request deleted successfully");
    assert_eq!(app.store.list_meeting_requests().await.unwrap().len(), 1);
}
