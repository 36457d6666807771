use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    dtos::social::{SocialIntegrationsResponse, UpdateSocialIntegrationsRequest},
    middleware::AdminUser,
    models::SocialIntegrations,
    utils::ValidatedJson,
    AppState,
};

/// Stored settings, or every platform disabled when nothing has been saved.
pub async fn get_social_integrations(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<SocialIntegrationsResponse>, AppError> {
    let settings = state.stores.content.get_social_integrations().await?;
    Ok(Json(
        settings
            .map(Into::into)
            .unwrap_or_else(SocialIntegrationsResponse::unset),
    ))
}

/// Replace all platform settings, keeping the singleton's id.
pub async fn update_social_integrations(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(req): ValidatedJson<UpdateSocialIntegrationsRequest>,
) -> Result<Json<SocialIntegrationsResponse>, AppError> {
    let settings = match state.stores.content.get_social_integrations().await? {
        Some(existing) => SocialIntegrations {
            id: existing.id,
            ..SocialIntegrations::new(req.platforms)
        },
        None => SocialIntegrations::new(req.platforms),
    };

    state
        .stores
        .content
        .upsert_social_integrations(&settings)
        .await?;

    let p = &settings.platforms;
    tracing::info!(
        admin = %admin.username(),
        facebook = p.facebook.enabled,
        instagram = p.instagram.enabled,
        tiktok = p.tiktok.enabled,
        linkedin = p.linkedin.enabled,
        youtube = p.youtube.enabled,
        "Social integrations updated"
    );
    Ok(Json(settings.into()))
}
