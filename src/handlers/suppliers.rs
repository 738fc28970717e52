use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{errors::ApiError, handlers::AppState, services::suppliers::SupplierDraft};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Acme Wholesale",
    "contact_person": "Dana Reyes",
    "email": "orders@acme-wholesale.example",
    "phone": "+34 600 000 000",
    "address": "Pol. Ind. Norte 12, Valencia"
}))]
pub struct SubmitSupplierRequest {
    /// Supplier display name; resubmitting an existing name merges into it
    #[validate(length(min = 1, message = "Supplier name must not be empty"))]
    #[schema(example = "Acme Wholesale")]
    pub name: String,

    /// Contact person
    pub contact_person: Option<String>,

    /// Contact email
    #[validate(email(message = "Contact email must be a valid address"))]
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,

    /// Postal address
    pub address: Option<String>,
}

// Handler functions

/// Submit a supplier record
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = SubmitSupplierRequest,
    responses(
        (status = 201, description = "Supplier created or merged into an existing record"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate name race lost", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn submit_supplier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let draft = SupplierDraft {
        name: payload.name,
        contact_person: payload.contact_person,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
    };

    let supplier = state
        .services
        .suppliers
        .submit_supplier(draft)
        .await
        .map_err(map_service_error)?;

    info!("Supplier submitted: {} ({})", supplier.name, supplier.id);

    Ok(created_response(supplier))
}

/// List active suppliers
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    responses(
        (status = 200, description = "Active suppliers, alphabetical")
    ),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state
        .services
        .suppliers
        .list_active()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(suppliers))
}

/// Update a supplier
#[utoipa::path(
    put,
    path = "/api/v1/suppliers/:id",
    params(("id" = i64, Path, description = "Supplier id")),
    request_body = SubmitSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "New name already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn update_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let draft = SupplierDraft {
        name: payload.name,
        contact_person: payload.contact_person,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
    };

    let supplier = state
        .services
        .suppliers
        .update_supplier(id, draft)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(supplier))
}

/// Retire a supplier
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/:id",
    params(("id" = i64, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Supplier retired; purchase history retained"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn retire_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .suppliers
        .retire_supplier(id)
        .await
        .map_err(map_service_error)?;

    info!("Supplier retired: {}", id);

    Ok(no_content_response())
}

/// Creates the router for supplier endpoints
pub fn supplier_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(submit_supplier))
        .route("/", get(list_suppliers))
        .route("/:id", put(update_supplier))
        .route("/:id", delete(retire_supplier))
}
