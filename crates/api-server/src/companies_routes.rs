use analysis_core::Company;
use axum::{extract::State, routing::get, Json, Router};

use crate::{ApiResponse, AppError, AppState};

pub fn companies_routes() -> Router<AppState> {
    Router::new().route("/api/companies", get(list_companies))
}

/// Company directory (falls back to the built-in table when the service is down).
async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Company>>>, AppError> {
    let companies = state.orchestrator.companies().await?;
    Ok(Json(ApiResponse::success(companies)))
}
