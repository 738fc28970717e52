use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    entities::ledger_entry::StockChangeKind,
    errors::ApiError,
    handlers::AppState,
    services::catalog::{ItemDraft, ItemUpdate},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "HDMI Cable 2m",
    "description": "Gold-plated, 4K capable",
    "price": "9.90",
    "promo_price": "7.50",
    "quantity": 25,
    "category": "Cables",
    "image_url": "https://cdn.example.com/hdmi-2m.jpg",
    "created_by": 1
}))]
pub struct SubmitItemRequest {
    /// Item display name; resubmitting an existing name merges into it
    #[validate(length(min = 1, message = "Item name must not be empty"))]
    #[schema(example = "HDMI Cable 2m")]
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Regular unit price
    #[schema(example = "9.90")]
    pub price: Decimal,

    /// Optional promotional price, never used for sale pricing
    pub promo_price: Option<Decimal>,

    /// Initial stock level, booked as an INITIAL_STOCK ledger entry
    #[serde(default)]
    #[validate(range(min = 0, message = "Initial quantity must not be negative"))]
    #[schema(example = 25)]
    pub quantity: i32,

    /// Category label
    pub category: Option<String>,

    /// Image URL
    pub image_url: Option<String>,

    /// Actor recording the submission (attributed on the initial stock entry)
    pub created_by: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "description": "Gold-plated, 4K capable, braided",
    "price": "8.90",
    "promo_price": null,
    "category": "Cables",
    "image_url": "https://cdn.example.com/hdmi-2m-v2.jpg"
}))]
pub struct UpdateItemRequest {
    /// Replacement description
    pub description: Option<String>,

    /// New regular unit price
    #[schema(example = "8.90")]
    pub price: Decimal,

    /// New promotional price (null clears it)
    pub promo_price: Option<Decimal>,

    /// New category label
    pub category: Option<String>,

    /// New image URL
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "delta": -3,
    "reference": "stocktake 2026-08",
    "created_by": 1
}))]
pub struct AdjustStockRequest {
    /// Signed quantity change; positive restocks, negative writes off
    #[schema(example = -3)]
    pub delta: i32,

    /// Free-form reference tying the entry to an external document
    pub reference: Option<String>,

    /// Actor recording the adjustment
    pub created_by: Option<i64>,
}

// Handler functions

/// Submit an item to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = SubmitItemRequest,
    responses(
        (status = 201, description = "Item created or merged into an existing record"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate name race lost", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn submit_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let initial_quantity = payload.quantity;
    let created_by = payload.created_by;

    let draft = ItemDraft {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        promo_price: payload.promo_price,
        category: payload.category,
        image_url: payload.image_url,
    };

    let mut item = state
        .services
        .catalog
        .submit_item(draft)
        .await
        .map_err(map_service_error)?;

    // Initial stock enters through the ledger so quantity and history
    // reconcile from the item's first moment.
    if initial_quantity > 0 {
        let (updated, _entry) = state
            .services
            .ledger
            .apply_adjustment(
                item.id,
                initial_quantity,
                &StockChangeKind::InitialStock.to_string(),
                None,
                created_by,
            )
            .await
            .map_err(map_service_error)?;
        item = updated;
    }

    info!("Item submitted: {} ({})", item.name, item.id);

    Ok(created_response(item))
}

/// Get an item by id
#[utoipa::path(
    get,
    path = "/api/v1/items/:id",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .catalog
        .get_item(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// List active items
#[utoipa::path(
    get,
    path = "/api/v1/items",
    responses(
        (status = 200, description = "Active items, alphabetical")
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .catalog
        .list_active()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// List all items including retired ones
#[utoipa::path(
    get,
    path = "/api/v1/items/all",
    responses(
        (status = 200, description = "Every item ever submitted, retired included")
    ),
    tag = "items"
)]
pub async fn list_all_items(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .catalog
        .list_all()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// Update an item's descriptive fields and prices
#[utoipa::path(
    put,
    path = "/api/v1/items/:id",
    params(("id" = i64, Path, description = "Item id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let update = ItemUpdate {
        description: payload.description,
        price: payload.price,
        promo_price: payload.promo_price,
        category: payload.category,
        image_url: payload.image_url,
    };

    let item = state
        .services
        .catalog
        .update_item(id, update)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// Manually adjust an item's stock level
#[utoipa::path(
    patch,
    path = "/api/v1/items/:id/stock",
    params(("id" = i64, Path, description = "Item id")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Adjustment applied, updated item and ledger entry returned"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item or actor not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Adjustment would drive stock negative", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn adjust_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    if payload.delta == 0 {
        return Err(ApiError::ValidationError(
            "Stock adjustment delta must not be zero".to_string(),
        ));
    }

    let kind = if payload.delta > 0 {
        StockChangeKind::Restock
    } else {
        StockChangeKind::Adjustment
    };

    let (item, entry) = state
        .services
        .ledger
        .apply_adjustment(
            id,
            payload.delta,
            &kind.to_string(),
            payload.reference,
            payload.created_by,
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "item": item,
        "entry": entry
    })))
}

/// Retire an item from the catalog
#[utoipa::path(
    delete,
    path = "/api/v1/items/:id",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item retired; history and stock retained"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn retire_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .catalog
        .retire(id)
        .await
        .map_err(map_service_error)?;

    info!("Item retired: {}", id);

    Ok(no_content_response())
}

/// Creates the router for item endpoints
pub fn item_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(submit_item))
        .route("/", get(list_items))
        .route("/all", get(list_all_items))
        .route("/:id", get(get_item))
        .route("/:id", put(update_item))
        .route("/:id", delete(retire_item))
        .route("/:id/stock", patch(adjust_stock))
}
