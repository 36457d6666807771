use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::dtos::ErrorResponse;

/// JSON body that has passed its `validator` rules.
pub struct ValidatedJson<T>(pub T);

/// Why a request body was refused.
#[derive(Debug)]
pub enum BodyRejection {
    /// Not JSON, wrong content type, or the wrong shape for the target type.
    Malformed(JsonRejection),
    /// Well-formed, but one or more fields broke a rule.
    Invalid(ValidationErrors),
}

impl BodyRejection {
    fn status(&self) -> StatusCode {
        match self {
            BodyRejection::Malformed(_) => StatusCode::BAD_REQUEST,
            BodyRejection::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Renders field errors as `field: message` pairs in field order, so the
/// admin UI can show them next to the inputs.
fn describe_fields(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let reason = err
                    .message
                    .as_deref()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("failed {}", err.code));
                format!("{field}: {reason}")
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            BodyRejection::Malformed(rejection) => {
                tracing::debug!(error = %rejection, "Rejected malformed request body");
                ErrorResponse::with_details("Invalid request body", rejection.body_text())
            }
            BodyRejection::Invalid(errors) => {
                ErrorResponse::with_details("Validation error", describe_fields(errors))
            }
        };
        (status, Json(body)).into_response()
    }
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(BodyRejection::Malformed)?;
        value.validate().map_err(BodyRejection::Invalid)?;
        Ok(ValidatedJson(value))
    }
}
