use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{
        contact::{
            ContactListQuery, ContactListResponse, ContactRequest, ContactResponse,
            SubmitContactResponse, UpdateContactRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
        },
        MessageResponse,
    },
    middleware::AdminUser,
    models::Contact,
    services::{
        export::{ContactReport, EXPORT_LIMIT, PDF_CONTENT_TYPE, XLSX_CONTENT_TYPE},
        metrics, ContactQuery,
    },
    utils::ValidatedJson,
    AppState,
};

/// Public contact form. Both emails are best effort: a failed send is logged
/// and counted, never returned to the visitor.
pub async fn submit_contact(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ContactRequest>,
) -> Result<Json<SubmitContactResponse>, AppError> {
    if !state.recaptcha.verify(req.recaptcha_token.as_deref()).await? {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "reCAPTCHA verification failed"
        )));
    }

    let contact = Contact::new(req.name, req.email, req.phone, req.service, req.comment);
    state.stores.contacts.insert_contact(&contact).await?;
    metrics::record_contact_submission();
    tracing::info!(contact_id = %contact.id, service = %contact.service, "Contact form submitted");

    if let Err(e) = state.notifier.send_contact_notification(&contact).await {
        tracing::error!(contact_id = %contact.id, error = %e, "Failed to send contact notification");
        metrics::record_notification_failure("contact_notification");
    }
    if let Err(e) = state.notifier.send_contact_auto_response(&contact).await {
        tracing::error!(contact_id = %contact.id, error = %e, "Failed to send contact auto-response");
        metrics::record_notification_failure("contact_auto_response");
    }

    Ok(Json(SubmitContactResponse {
        success: true,
        message: "Thank you for contacting us. We will get back to you soon!".to_string(),
    }))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<ContactListQuery>,
) -> Result<Json<ContactListResponse>, AppError> {
    let query = ContactQuery {
        page: params.page.unwrap_or(1).max(1),
        limit: params
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT),
        search: params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };

    let page = state.stores.contacts.list_contacts(&query).await?;

    Ok(Json(ContactListResponse {
        data: page.data.into_iter().map(Into::into).collect(),
        total: page.total,
        page: query.page,
        limit: query.limit,
        pages: page.total.div_ceil(query.limit),
    }))
}

pub async fn update_contact(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let mut contact = state
        .stores
        .contacts
        .get_contact(&id)
        .await?
        .ok_or_else(contact_not_found)?;

    if let Some(name) = req.name {
        contact.name = name;
    }
    if let Some(email) = req.email {
        contact.email = email;
    }
    if let Some(phone) = req.phone {
        contact.phone = phone;
    }
    if let Some(service) = req.service {
        contact.service = service;
    }
    if let Some(comment) = req.comment {
        contact.comment = comment;
    }

    if !state.stores.contacts.replace_contact(&contact).await? {
        return Err(contact_not_found());
    }
    Ok(Json(contact.into()))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.stores.contacts.delete_contact(&id).await? {
        return Err(contact_not_found());
    }
    tracing::info!(contact_id = %id, admin = %admin.username(), "Contact deleted");
    Ok(Json(MessageResponse::new("Contact deleted successfully")))
}

#[derive(Debug, Clone, Copy)]
enum ExportFormat {
    Pdf,
    Xlsx,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => PDF_CONTENT_TYPE,
            ExportFormat::Xlsx => XLSX_CONTENT_TYPE,
        }
    }
}

pub async fn export_contacts_pdf(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Response, AppError> {
    export_contacts(&state, &admin, ExportFormat::Pdf).await
}

pub async fn export_contacts_excel(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Response, AppError> {
    export_contacts(&state, &admin, ExportFormat::Xlsx).await
}

/// Newest contacts first, as a file download.
async fn export_contacts(
    state: &AppState,
    admin: &AdminUser,
    format: ExportFormat,
) -> Result<Response, AppError> {
    let query = ContactQuery {
        page: 1,
        limit: EXPORT_LIMIT,
        search: None,
    };
    let contacts = state.stores.contacts.list_contacts(&query).await?.data;
    let rows = contacts.len();
    let report = ContactReport::new(&state.config.company.name, contacts);
    let filename = report.filename(format.extension());

    // Rendering is CPU bound.
    let bytes = tokio::task::spawn_blocking(move || match format {
        ExportFormat::Pdf => report.to_pdf(),
        ExportFormat::Xlsx => report.to_xlsx(),
    })
    .await
    .map_err(|e| AppError::InternalError(e.into()))?
    .map_err(|e| AppError::service("Export", e))?;

    tracing::info!(
        format = format.extension(),
        contacts = rows,
        admin = %admin.username(),
        "Contacts exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn contact_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Contact not found"))
}
