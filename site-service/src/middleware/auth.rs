use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};

use crate::{dtos::ErrorResponse, services::jwt::AdminClaims, AppState};

type AuthRejection = (
    StatusCode,
    [(header::HeaderName, &'static str); 1],
    Json<ErrorResponse>,
);

fn unauthorized(message: &str) -> AuthRejection {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(ErrorResponse::new(message)),
    )
}

/// Require a valid admin bearer token on every route behind this layer.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Err(unauthorized("Missing or invalid Authorization header"));
    };

    let claims = match state.jwt.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected admin token");
            return Err(unauthorized("Could not validate credentials"));
        }
    };

    // Store claims in request extensions so handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Claims of the authenticated admin, placed by `admin_auth_middleware`.
pub struct AdminUser(pub AdminClaims);

impl AdminUser {
    pub fn username(&self) -> &str {
        &self.0.sub
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<AdminClaims>().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(
                "Auth claims missing from request extensions",
            )),
        ))?;

        Ok(AdminUser(claims.clone()))
    }
}
