//! Public catalog reads and the admin CRUD behind them.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use service_core::error::AppError;

use crate::{
    dtos::{
        content::{
            AboutResponse, ProductRequest, ProductResponse, ServiceRequest, ServiceResponse,
            UpdateAboutRequest,
        },
        MessageResponse,
    },
    middleware::AdminUser,
    models::{AboutContent, SaasProduct, Service},
    utils::ValidatedJson,
    AppState,
};

pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let services = state.stores.content.list_services().await?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.stores.content.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

pub async fn get_about(State(state): State<AppState>) -> Result<Json<AboutResponse>, AppError> {
    state
        .stores
        .content
        .get_about()
        .await?
        .map(|about| Json(about.into()))
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("About content not found")))
}

pub async fn create_service(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<ServiceRequest>,
) -> Result<Json<ServiceResponse>, AppError> {
    let service = Service::new(req.title, req.description, req.icon);
    state.stores.content.insert_service(&service).await?;
    tracing::info!(service_id = %service.id, "Service created");
    Ok(Json(service.into()))
}

pub async fn update_service(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ServiceRequest>,
) -> Result<Json<ServiceResponse>, AppError> {
    let mut service = state
        .stores
        .content
        .get_service(&id)
        .await?
        .ok_or_else(service_not_found)?;

    service.title = req.title;
    service.description = req.description;
    service.icon = req.icon;
    service.updated_at = Utc::now();

    if !state.stores.content.replace_service(&service).await? {
        return Err(service_not_found());
    }
    Ok(Json(service.into()))
}

pub async fn delete_service(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.stores.content.delete_service(&id).await? {
        return Err(service_not_found());
    }
    tracing::info!(service_id = %id, "Service deleted");
    Ok(Json(MessageResponse::new("Service deleted successfully")))
}

pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = SaasProduct::new(req.name, req.description, req.url, req.features, req.price);
    state.stores.content.insert_product(&product).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok(Json(product.into()))
}

pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let mut product = state
        .stores
        .content
        .get_product(&id)
        .await?
        .ok_or_else(product_not_found)?;

    product.name = req.name;
    product.description = req.description;
    product.url = req.url;
    product.features = req.features;
    product.price = req.price;
    product.updated_at = Utc::now();

    if !state.stores.content.replace_product(&product).await? {
        return Err(product_not_found());
    }
    Ok(Json(product.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.stores.content.delete_product(&id).await? {
        return Err(product_not_found());
    }
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// Merge the supplied fields into the stored about content, creating it when
/// none exists yet.
pub async fn update_about(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(req): ValidatedJson<UpdateAboutRequest>,
) -> Result<Json<AboutResponse>, AppError> {
    let mut about = state
        .stores
        .content
        .get_about()
        .await?
        .unwrap_or_else(AboutContent::empty);

    if let Some(company_name) = req.company_name {
        about.company_name = Some(company_name);
    }
    if let Some(description) = req.description {
        about.description = Some(description);
    }
    if let Some(years) = req.years_experience {
        about.years_experience = Some(years);
    }
    if let Some(story) = req.story {
        about.story = Some(story);
    }
    if let Some(expertise) = req.expertise {
        about.expertise = expertise.into_iter().map(Into::into).collect();
    }
    about.updated_at = Utc::now();

    state.stores.content.upsert_about(&about).await?;
    Ok(Json(about.into()))
}

fn service_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Service not found"))
}

fn product_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Product not found"))
}
