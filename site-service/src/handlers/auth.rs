use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    dtos::{
        auth::{ChangePasswordRequest, LoginRequest, TokenResponse},
        MessageResponse,
    },
    middleware::AdminUser,
    utils::{hash_password, verify_password, Password, PasswordHashString, ValidatedJson},
    AppState,
};

const BAD_CREDENTIALS: &str = "Incorrect username or password";

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let admin = state
        .stores
        .admins
        .find_admin_by_username(&req.username)
        .await?;

    // Unknown user and wrong password are indistinguishable to the caller.
    let Some(admin) = admin else {
        tracing::warn!(username = %req.username, "Login attempt for unknown admin");
        return Err(AppError::Unauthorized(anyhow::anyhow!(BAD_CREDENTIALS)));
    };

    let valid = verify_password(
        &Password::new(req.password),
        &PasswordHashString::new(admin.password_hash),
    )?;
    if !valid {
        tracing::warn!(username = %admin.username, "Login attempt with wrong password");
        return Err(AppError::Unauthorized(anyhow::anyhow!(BAD_CREDENTIALS)));
    }

    let access_token = state.jwt.generate_token(&admin.username)?;
    tracing::info!(username = %admin.username, "Admin logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.jwt.expiration_seconds(),
    }))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(admin: AdminUser) -> Json<MessageResponse> {
    tracing::info!(username = %admin.username(), "Admin logged out");
    Json(MessageResponse::new("Successfully logged out"))
}

pub async fn change_password(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let stored = state
        .stores
        .admins
        .find_admin_by_username(admin.username())
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Admin user not found")))?;

    let valid = verify_password(
        &Password::new(req.current_password),
        &PasswordHashString::new(stored.password_hash),
    )?;
    if !valid {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Current password is incorrect"
        )));
    }

    let new_hash = hash_password(&Password::new(req.new_password))?;
    let updated = state
        .stores
        .admins
        .update_admin_password(&stored.username, new_hash.as_str())
        .await?;
    if !updated {
        return Err(AppError::NotFound(anyhow::anyhow!("Admin user not found")));
    }

    tracing::info!(username = %stored.username, "Admin password changed");
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
