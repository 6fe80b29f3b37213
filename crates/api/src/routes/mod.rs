//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, error::ApiError, middleware::auth_middleware};

pub mod adjustments;
pub mod closings;
pub mod financial;
pub mod forecast;
pub mod health;
pub mod ledger;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(ledger::routes())
        .merge(adjustments::routes())
        .merge(closings::routes())
        .merge(financial::routes())
        .merge(forecast::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Parses an optional query parameter with `parse`, naming it on failure.
pub(crate) fn parse_param<T>(
    value: Option<&str>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("invalid {name} '{raw}'"))),
    }
}
