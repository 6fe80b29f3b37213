//! Ledger routes: listing, recording and payment status.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use itinera_core::ledger::{DateType, EntryKind, EntryStatus, LedgerFilter, NewLedgerEntry};
use itinera_db::LedgerRepository;
use itinera_shared::types::{Currency, PageRequest};

use super::parse_param;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger-entries", get(list_entries).post(record_entry))
        .route("/ledger-entries/{entry_id}", get(get_entry))
        .route("/ledger-entries/{entry_id}/status", patch(update_status))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing ledger entries.
#[derive(Debug, Default, Deserialize)]
pub struct ListLedgerQuery {
    /// Range start (YYYY-MM-DD), inclusive.
    pub date_from: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD), inclusive.
    pub date_to: Option<NaiveDate>,
    /// `sale` or `operation`.
    pub date_type: Option<String>,
    /// Substring matched against subject, reservation, client and tour.
    pub search: Option<String>,
    /// Exact subject name.
    pub subject_name: Option<String>,
    /// Exact tour name.
    pub tour_name: Option<String>,
    /// Comma-separated statuses.
    pub status: Option<String>,
    /// Closed (`true`) or open (`false`) entries only.
    pub is_closed: Option<bool>,
    /// `commission` or `operator`.
    pub kind: Option<String>,
    /// Currency code.
    pub currency: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ListLedgerQuery {
    fn into_filter(self) -> Result<(LedgerFilter, PageRequest), ApiError> {
        let statuses = match self.status.as_deref() {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    EntryStatus::parse(s)
                        .ok_or_else(|| ApiError::validation(format!("invalid status '{s}'")))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        let filter = LedgerFilter {
            date_from: self.date_from,
            date_to: self.date_to,
            date_type: parse_param(self.date_type.as_deref(), "date_type", DateType::parse)?
                .unwrap_or_default(),
            search: self.search,
            subject_name: self.subject_name.filter(|s| !s.trim().is_empty()),
            tour_name: self.tour_name.filter(|s| !s.trim().is_empty()),
            statuses,
            is_closed: self.is_closed,
            kind: parse_param(self.kind.as_deref(), "kind", EntryKind::parse)?,
            currency: parse_param(self.currency.as_deref(), "currency", |s| {
                s.parse::<Currency>().ok()
            })?,
        };

        Ok((filter, PageRequest::from_query(self.page, self.per_page)))
    }
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New payment status.
    pub status: EntryStatus,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/ledger-entries` - List entries with filters.
async fn list_entries(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListLedgerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = query.into_filter()?;
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
        if from > to {
            return Err(ApiError::validation("date_from must not be after date_to"));
        }
    }

    let repo = LedgerRepository::new((*state.db).clone());
    let entries = repo.list(&filter, &page).await?;
    Ok(Json(entries))
}

/// POST `/ledger-entries` - Record a new open entry.
async fn record_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewLedgerEntry>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    let repo = LedgerRepository::new((*state.db).clone());
    let entry = repo.record(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET `/ledger-entries/{entry_id}` - Fetch one entry.
async fn get_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = LedgerRepository::new((*state.db).clone());
    Ok(Json(repo.get(entry_id).await?))
}

/// PATCH `/ledger-entries/{entry_id}/status` - Change the payment status of an open entry.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = auth.actor()?;
    let repo = LedgerRepository::new((*state.db).clone());
    let entry = repo.update_status(entry_id, payload.status, &actor).await?;
    Ok(Json(entry))
}
