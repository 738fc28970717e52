use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{errors::ApiError, handlers::AppState, services::sales::SaleLineDraft};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

// Request DTOs

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[schema(example = json!({ "item_id": 3, "quantity": 2 }))]
pub struct SaleLineRequest {
    /// Catalog item being sold
    #[schema(example = 3)]
    pub item_id: i64,

    /// Units sold, must be positive
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "lines": [{ "item_id": 3, "quantity": 2 }, { "item_id": 7, "quantity": 1 }],
    "created_by": 1,
    "payment_method": "CASH"
}))]
pub struct RecordSaleRequest {
    /// Items and quantities sold; at least one line
    #[validate(length(min = 1, message = "Sale requires at least one line"))]
    pub lines: Vec<SaleLineRequest>,

    /// Actor recording the sale
    #[schema(example = 1)]
    pub created_by: i64,

    /// Free-form payment method, e.g. "CASH" or "CARD"
    #[schema(example = "CASH")]
    pub payment_method: Option<String>,
}

// Handler functions

/// Record a completed sale
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body = RecordSaleRequest,
    responses(
        (status = 201, description = "Sale recorded, header and priced lines returned"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item or actor not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock on a line", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "sales"
)]
pub async fn record_sale(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecordSaleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let lines = payload
        .lines
        .into_iter()
        .map(|line| SaleLineDraft {
            item_id: line.item_id,
            quantity: line.quantity,
        })
        .collect();

    let (sale, sale_lines) = state
        .services
        .sales
        .record_sale(lines, payload.created_by, payload.payment_method)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "sale": sale,
        "lines": sale_lines
    })))
}

/// List sale headers
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    responses(
        (status = 200, description = "Sale headers, newest first")
    ),
    tag = "sales"
)]
pub async fn list_sales(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let sales = state
        .services
        .sales
        .list_sales()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(sales))
}

/// Get a sale with its lines
#[utoipa::path(
    get,
    path = "/api/v1/sales/:id",
    params(("id" = i64, Path, description = "Sale id")),
    responses(
        (status = 200, description = "Sale header and lines"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "sales"
)]
pub async fn get_sale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let (sale, lines) = state
        .services
        .sales
        .get_sale(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "sale": sale,
        "lines": lines
    })))
}

/// Creates the router for sale endpoints
pub fn sale_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(record_sale))
        .route("/", get(list_sales))
        .route("/:id", get(get_sale))
}
