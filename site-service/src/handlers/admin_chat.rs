//! Admin views over chat sessions and the meeting requests they produced.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{
        chat::{
            MeetingRequestResponse, SessionDetailResponse, SessionSummary,
            UpdateMeetingStatusRequest,
        },
        MessageResponse,
    },
    middleware::AdminUser,
    models::MeetingStatus,
    AppState,
};

pub async fn list_sessions(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    let sessions = state.stores.chat.list_sessions().await?;
    Ok(Json(sessions.iter().map(SessionSummary::from).collect()))
}

pub async fn get_session(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    state
        .stores
        .chat
        .get_session(&id)
        .await?
        .map(|session| Json(session.into()))
        .ok_or_else(session_not_found)
}

pub async fn delete_session(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.stores.chat.delete_session(&id).await? {
        return Err(session_not_found());
    }
    tracing::info!(session_id = %id, admin = %admin.username(), "Chat session deleted");
    Ok(Json(MessageResponse::new("Chat session deleted successfully")))
}

pub async fn list_meeting_requests(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<MeetingRequestResponse>>, AppError> {
    let requests = state.stores.chat.list_meeting_requests().await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Any of pending/approved/rejected may follow any other.
pub async fn update_meeting_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateMeetingStatusRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let status: MeetingStatus = req
        .status
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid status")))?;
    let notes = req.admin_notes.unwrap_or_default();

    if !state
        .stores
        .chat
        .update_meeting_status(&id, status, &notes)
        .await?
    {
        return Err(meeting_not_found());
    }

    tracing::info!(
        meeting_request_id = %id,
        status = %status,
        admin = %admin.username(),
        "Meeting request status updated"
    );
    Ok(Json(MessageResponse::new(format!(
        "Meeting request {} successfully",
        status
    ))))
}

pub async fn delete_meeting_request(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.stores.chat.delete_meeting_request(&id).await? {
        return Err(meeting_not_found());
    }
    tracing::info!(meeting_request_id = %id, "Meeting request deleted");
    Ok(Json(MessageResponse::new("Meeting request deleted successfully")))
}

fn session_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Session not found"))
}

fn meeting_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Meeting request not found"))
}
