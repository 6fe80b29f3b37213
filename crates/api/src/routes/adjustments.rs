//! Adjustment routes: propose, review and decide amount changes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use itinera_core::adjustment::{AdjustmentDecision, AdjustmentRequest, AdjustmentStatus};
use itinera_db::AdjustmentRepository;
use itinera_shared::types::PageRequest;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the adjustment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/adjustments", get(list_adjustments).post(propose_adjustment))
        .route("/adjustments/{request_id}", get(get_adjustment))
        .route("/adjustments/{request_id}/approve", post(approve_adjustment))
        .route("/adjustments/{request_id}/reject", post(reject_adjustment))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing requests.
#[derive(Debug, Deserialize)]
pub struct ListAdjustmentsQuery {
    /// `pending` (default), `approved`, `rejected` or `all`.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

fn status_filter(raw: Option<&str>) -> Result<Option<AdjustmentStatus>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Some(AdjustmentStatus::Pending)),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => AdjustmentStatus::parse(s)
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("invalid status '{s}'"))),
    }
}

/// Request body for a proposal.
#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    /// Entry whose amount should change.
    pub entry_id: Uuid,
    /// Proposed amount.
    pub new_amount: Decimal,
    /// Why the amount should change.
    pub reason: String,
}

/// Request body for an approval. `{}` approves without a note.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    /// Optional note stored on the decision.
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for a rejection.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the request was refused.
    pub reason: String,
}

/// A request with its decision trail.
#[derive(Debug, Serialize)]
pub struct AdjustmentResponse {
    /// The request.
    #[serde(flatten)]
    pub request: AdjustmentRequest,
    /// Decisions taken on it, oldest first.
    pub decisions: Vec<AdjustmentDecision>,
}

/// Result of a decision.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    /// The decided request.
    pub request: AdjustmentRequest,
    /// The appended audit record.
    pub decision: AdjustmentDecision,
    /// Live amount of the entry after approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_amount: Option<Decimal>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/adjustments` - List requests, pending ones by default.
async fn list_adjustments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListAdjustmentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = status_filter(query.status.as_deref())?;
    let page = PageRequest::from_query(query.page, query.per_page);

    let repo = AdjustmentRepository::new((*state.db).clone());
    Ok(Json(repo.list(status, &page).await?))
}

/// POST `/adjustments` - Propose a new amount for an open entry.
async fn propose_adjustment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ProposeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    let repo = AdjustmentRepository::new((*state.db).clone());
    let request = repo
        .propose(payload.entry_id, payload.new_amount, &payload.reason, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET `/adjustments/{request_id}` - Fetch a request and its decisions.
async fn get_adjustment(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = AdjustmentRepository::new((*state.db).clone());
    let request = repo.get(request_id).await?;
    let decisions = repo.decisions(request_id).await?;
    Ok(Json(AdjustmentResponse { request, decisions }))
}

/// POST `/adjustments/{request_id}/approve` - Approve and apply to the live entry.
async fn approve_adjustment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    let note = payload.note.filter(|n| !n.trim().is_empty());

    let repo = AdjustmentRepository::new((*state.db).clone());
    let applied = repo.approve(request_id, note, &actor).await?;
    Ok(Json(DecisionResponse {
        request: applied.request,
        decision: applied.decision,
        applied_amount: Some(applied.applied_amount),
    }))
}

/// POST `/adjustments/{request_id}/reject` - Reject with a reason.
async fn reject_adjustment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    let repo = AdjustmentRepository::new((*state.db).clone());
    let rejected = repo.reject(request_id, &payload.reason, &actor).await?;
    Ok(Json(DecisionResponse {
        request: rejected.request,
        decision: rejected.decision,
        applied_amount: None,
    }))
}
