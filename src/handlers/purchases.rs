use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{errors::ApiError, handlers::AppState, services::purchases::PurchaseDraft};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "item_id": null,
    "item_name": "USB-C Dock",
    "description": "Dual-display dock",
    "unit_price": "54.00",
    "quantity": 10,
    "category": "Docking",
    "reference": "PO-2026-081",
    "supplier_id": 2,
    "created_by": 1
}))]
pub struct RecordPurchaseRequest {
    /// Existing catalog item to restock; omit to create one by name
    pub item_id: Option<i64>,

    /// Name for a new (or reactivated) item when no item_id is given
    #[schema(example = "USB-C Dock")]
    pub item_name: Option<String>,

    /// Description applied when the purchase creates the item
    pub description: Option<String>,

    /// Price paid per unit
    #[schema(example = "54.00")]
    pub unit_price: Decimal,

    /// Units received, must be positive
    #[validate(range(min = 1, message = "Purchase quantity must be positive"))]
    #[schema(example = 10)]
    pub quantity: i32,

    /// Declared category, synced back onto the item when it differs
    pub category: Option<String>,

    /// External document reference, e.g. a purchase order number
    pub reference: Option<String>,

    /// Supplier the goods came from; resolved best-effort
    pub supplier_id: Option<i64>,

    /// Actor recording the purchase
    pub created_by: Option<i64>,
}

// Handler functions

/// Record a purchase and receive its stock
#[utoipa::path(
    post,
    path = "/api/v1/purchases",
    request_body = RecordPurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded, stock received"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item or actor not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "purchases"
)]
pub async fn record_purchase(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecordPurchaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let draft = PurchaseDraft {
        item_id: payload.item_id,
        item_name: payload.item_name,
        description: payload.description,
        unit_price: payload.unit_price,
        quantity: payload.quantity,
        category: payload.category,
        reference: payload.reference,
        supplier_id: payload.supplier_id,
        actor: payload.created_by,
    };

    let purchase = state
        .services
        .purchases
        .record_purchase(draft)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({ "purchase": purchase })))
}

/// List purchases
#[utoipa::path(
    get,
    path = "/api/v1/purchases",
    responses(
        (status = 200, description = "Purchases, newest first")
    ),
    tag = "purchases"
)]
pub async fn list_purchases(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let purchases = state
        .services
        .purchases
        .list_purchases()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(purchases))
}

/// Creates the router for purchase endpoints
pub fn purchase_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(record_purchase))
        .route("/", get(list_purchases))
}
