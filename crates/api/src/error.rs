//! HTTP error responses.
//!
//! Every failure renders as `{ "error", "message", "item_id" }` so the caller
//! can show it and, for batch operations, correct the named item and retry.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use itinera_core::CommissionError;
use itinera_shared::AppError;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Ledger entry, request or closing the failure refers to.
    pub item_id: Option<Uuid>,
}

/// Error type returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Domain failure from the commission workflow.
    Domain(CommissionError),
    /// Transport-level failure (bad query, missing auth).
    App(AppError),
}

impl ApiError {
    /// Shorthand for a malformed request.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::App(AppError::Validation(message.into()))
    }

    /// HTTP status of the error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Domain(err) => err.status_code(),
            Self::App(err) => err.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Domain(err) => ErrorBody {
                error: err.error_code(),
                message: err.to_string(),
                item_id: err.item_id(),
            },
            Self::App(err) => ErrorBody {
                error: err.error_code(),
                message: err.to_string(),
                item_id: None,
            },
        }
    }
}

impl From<CommissionError> for ApiError {
    fn from(err: CommissionError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = self.body();

        if status.is_server_error() {
            error!(error = %body.message, code = body.error, "Request failed");
            // Internal details stay in the log.
            body.message = "An internal error occurred".to_string();
        } else {
            warn!(error = %body.message, code = body.error, item_id = ?body.item_id, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_domain_error_names_item() {
        let entry_id = Uuid::new_v4();
        let (status, body) = render(CommissionError::UnknownEntry(entry_id).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["item_id"], entry_id.to_string());
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) =
            render(CommissionError::Database("connection reset by peer".to_string()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body["item_id"].is_null());
    }

    #[tokio::test]
    async fn test_app_error() {
        let (status, body) = render(ApiError::validation("bad date")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}
