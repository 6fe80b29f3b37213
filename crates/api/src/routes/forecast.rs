//! Forecast route.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use itinera_db::ForecastRepository;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the forecast routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/forecast", get(get_forecast))
}

/// GET `/forecast` - Expected income, liabilities and net per currency over open entries.
async fn get_forecast(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ForecastRepository::new((*state.db).clone());
    Ok(Json(repo.forecast().await?))
}
