//! Closing routes: close a batch, browse closings, undo, download invoices.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use itinera_core::CommissionError;
use itinera_core::closing::{CloseRequest, ClosingType};
use itinera_core::invoice::InvoiceDocument;
use itinera_db::repositories::ClosingFilter;
use itinera_db::{ClosingRepository, ReversalRepository};
use itinera_shared::types::PageRequest;

use super::parse_param;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the closing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/closings", get(list_closings).post(create_closing))
        .route("/closings/{closing_id}", get(get_closing))
        .route("/closings/{closing_id}/undo", post(undo_closing))
        .route("/closings/{closing_id}/invoice", get(download_invoice))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing closings.
#[derive(Debug, Deserialize)]
pub struct ListClosingsQuery {
    /// `salesperson`, `agency` or `operator`.
    #[serde(rename = "type")]
    pub closing_type: Option<String>,
    /// Active (`true`) or reversed (`false`) closings only.
    pub active: Option<bool>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for undoing a closing.
#[derive(Debug, Deserialize)]
pub struct UndoRequest {
    /// Why the closing is being reversed.
    pub reason: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/closings` - List closings, newest first.
async fn list_closings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListClosingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ClosingFilter {
        closing_type: parse_param(query.closing_type.as_deref(), "type", ClosingType::parse)?,
        is_active: query.active,
    };
    let page = PageRequest::from_query(query.page, query.per_page);

    let repo = ClosingRepository::new((*state.db).clone());
    Ok(Json(repo.list(filter, &page).await?))
}

/// POST `/closings` - Close a batch of open entries into one invoice.
async fn create_closing(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CloseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    let repo = ClosingRepository::new((*state.db).clone());
    let detail = repo.close(&payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET `/closings/{closing_id}` - Closing with line items and reversal record.
async fn get_closing(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(closing_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ClosingRepository::new((*state.db).clone());
    Ok(Json(repo.detail(closing_id).await?))
}

/// POST `/closings/{closing_id}/undo` - Admin-only reversal.
///
/// Checks run in order: blank reason (400), non-admin (403), unknown id
/// (404 `CLOSING_NOT_FOUND`), already undone (400 `CLOSING_INACTIVE`).
async fn undo_closing(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(closing_id): Path<Uuid>,
    Json(payload): Json<UndoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    let repo = ReversalRepository::new((*state.db).clone());
    let detail = repo.undo(closing_id, &payload.reason, &actor).await?;
    Ok(Json(detail))
}

/// GET `/closings/{closing_id}/invoice` - Invoice PDF download.
async fn download_invoice(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(closing_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ClosingRepository::new((*state.db).clone());
    let detail = repo.detail(closing_id).await?;

    let renderer = state.invoices.clone();
    let document = tokio::task::spawn_blocking(move || renderer.render(&detail))
        .await
        .map_err(|e| CommissionError::Internal(format!("invoice rendering task failed: {e}")))??;

    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, InvoiceDocument::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    ))
}
