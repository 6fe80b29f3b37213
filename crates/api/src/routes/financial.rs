//! Financial entry routes: the payables and receivables produced by closings.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use itinera_core::closing::FinancialEntryKind;
use itinera_db::FinancialRepository;
use itinera_shared::types::PageRequest;

use super::parse_param;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the financial entry routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/financial-entries", get(list_financial_entries))
}

/// Query parameters for listing financial entries.
#[derive(Debug, Deserialize)]
pub struct ListFinancialQuery {
    /// `payable` or `receivable`.
    pub kind: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// GET `/financial-entries` - Payables and receivables of active closings.
async fn list_financial_entries(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListFinancialQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_param(query.kind.as_deref(), "kind", FinancialEntryKind::parse)?;
    let page = PageRequest::from_query(query.page, query.per_page);

    let repo = FinancialRepository::new((*state.db).clone());
    Ok(Json(repo.list(kind, &page).await?))
}
