use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    dtos::chat::{ChatRequest, ChatResponse},
    utils::ValidatedJson,
    AppState,
};

/// One visitor turn with the sales assistant.
pub async fn send_message(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let reply = state
        .chat
        .submit_message(req.session_id.as_deref(), &req.message)
        .await?;

    Ok(Json(ChatResponse {
        session_id: reply.session_id,
        message: reply.message,
        lead_captured: reply.lead_captured,
    }))
}
