use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Simplified error structure for OpenAPI documentation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Not Found",
    "message": "Item 42 not found",
    "details": null,
    "request_id": null,
    "timestamp": "2026-03-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request", "Internal Server Error")
    #[schema(example = "Not Found")]
    pub error: String,
    /// Human-readable error description
    #[schema(example = "Item 42 not found")]
    pub message: String,
    /// Additional error details (validation errors, field-level hints)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Field 'quantity' must be a positive integer")]
    pub details: Option<String>,
    /// Correlation identifier for support and debugging (set on server faults)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "err-1f3b4c")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    #[schema(example = "2026-03-09T10:30:00.000Z")]
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("Actor {0} not found")]
    ActorNotFound(i64),

    #[error("Supplier {0} not found")]
    SupplierNotFound(i64),

    #[error("Insufficient stock for item {item_id}: adjustment of {delta} would leave quantity at {resulting}")]
    InsufficientStock {
        item_id: i64,
        delta: i32,
        resulting: i32,
    },

    #[error("An active record named '{0}' already exists")]
    DuplicateName(String),

    #[error("Concurrent modification of item {0}")]
    ConcurrentModification(i64),

    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_)
            | Self::ItemNotFound(_)
            | Self::ActorNotFound(_)
            | Self::SupplierNotFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DuplicateName(_) | Self::ConcurrentModification(_) => StatusCode::CONFLICT,
            Self::ValidationError(_) | Self::InvalidOperation(_) | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::DatabaseError(_)
            | Self::TransactionAborted(_)
            | Self::EventError(_)
            | Self::InternalError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            // The caller must assume nothing was applied; the inner cause stays in the logs.
            Self::TransactionAborted(_) => {
                "Transaction aborted; no changes were applied".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = self.response_message();

        // Server faults get a correlation id so responses can be tied back to logs.
        let request_id = if status.is_server_error() {
            let id = format!("err-{}", Uuid::new_v4().simple());
            tracing::error!(request_id = %id, error = %self, "request failed");
            Some(id)
        } else {
            None
        };

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: error_message,
            details: None,
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Delegate to ServiceError's unified status/message methods when applicable
        match self {
            ApiError::ServiceError(service_error) => service_error.into_response(),
            ApiError::ValidationError(msg) => {
                error_response(StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::BadRequest { message } => {
                error_response(StatusCode::BAD_REQUEST, message).into_response()
            }
            ApiError::InternalServerError => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
            .into_response(),
        }
    }
}

fn error_response(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message,
            details: None,
            request_id: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::ItemNotFound(7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ActorNotFound(3).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::SupplierNotFound(9).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::InsufficientStock {
                item_id: 1,
                delta: -10,
                resulting: -3
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::DuplicateName("Widget".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::ConcurrentModification(1).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::TransactionAborted("commit failed".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn insufficient_stock_reports_delta_and_resulting_quantity() {
        let err = ServiceError::InsufficientStock {
            item_id: 12,
            delta: -10,
            resulting: -3,
        };
        let msg = err.response_message();
        assert!(msg.contains("item 12"));
        assert!(msg.contains("-10"));
        assert!(msg.contains("-3"));
    }

    #[test]
    fn service_error_response_message_hides_internal_details() {
        // Internal errors should NOT expose implementation details
        assert_eq!(
            ServiceError::InternalError("pool exhausted".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::TransactionAborted("constraint blew up".into()).response_message(),
            "Transaction aborted; no changes were applied"
        );

        // User-facing errors SHOULD include the actual message
        assert_eq!(
            ServiceError::ItemNotFound(42).response_message(),
            "Item 42 not found"
        );
        assert_eq!(
            ServiceError::ValidationError("quantity must be positive".into()).response_message(),
            "Validation error: quantity must be positive"
        );
    }

    #[tokio::test]
    async fn server_fault_response_carries_correlation_id() {
        let response =
            ServiceError::TransactionAborted("commit failed".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(payload.request_id.is_some());
    }

    #[tokio::test]
    async fn client_error_response_has_no_correlation_id() {
        let response = ServiceError::ItemNotFound(404).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(payload.request_id.is_none());
        assert_eq!(payload.message, "Item 404 not found");
    }

    #[test]
    fn api_error_delegates_to_service_error_status() {
        let service_err = ServiceError::ItemNotFound(5);
        let status = service_err.status_code();
        let api_err = ApiError::ServiceError(service_err);

        let api_status = match &api_err {
            ApiError::ServiceError(se) => se.status_code(),
            _ => panic!("Expected ServiceError variant"),
        };
        assert_eq!(status, api_status);
        assert_eq!(api_status, StatusCode::NOT_FOUND);
    }
}
