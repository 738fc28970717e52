use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState};
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

/// List all stock ledger entries
#[utoipa::path(
    get,
    path = "/api/v1/ledger",
    responses(
        (status = 200, description = "Every stock movement, newest first")
    ),
    tag = "ledger"
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .services
        .ledger
        .list_entries()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(entries))
}

/// Creates the router for ledger endpoints
pub fn ledger_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_entries))
}
