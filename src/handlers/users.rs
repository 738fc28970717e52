use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{errors::ApiError, handlers::AppState, services::users::UserDraft};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
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
    "username": "m.garcia",
    "full_name": "Marta García",
    "role": "MANAGER"
}))]
pub struct CreateUserRequest {
    /// Unique login-style handle used for ledger attribution
    #[validate(length(min = 1, message = "Username must not be empty"))]
    #[schema(example = "m.garcia")]
    pub username: String,

    /// Display name
    pub full_name: Option<String>,

    /// Role label, defaults to STAFF
    #[schema(example = "MANAGER")]
    pub role: Option<String>,
}

// Handler functions

/// Create an actor record
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Actor created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Username already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let draft = UserDraft {
        username: payload.username,
        full_name: payload.full_name,
        role: payload.role,
    };

    let user = state
        .services
        .users
        .create_user(draft)
        .await
        .map_err(map_service_error)?;

    info!("User created: {} ({})", user.username, user.id);

    Ok(created_response(user))
}

/// List actor records
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Actors, alphabetical by username")
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .services
        .users
        .list_users()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(users))
}

/// Creates the router for user endpoints
pub fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_user))
        .route("/", get(list_users))
}
