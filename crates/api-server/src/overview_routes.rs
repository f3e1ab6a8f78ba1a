use analysis_orchestrator::CompanyOverview;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{ApiResponse, AppState};

pub fn overview_routes() -> Router<AppState> {
    Router::new().route(
        "/api/overview/:cik/:company_name/:ticker/:years",
        get(get_overview),
    )
}

/// Analysis, price chart and sentiment in one call. Each part carries its
/// own `data`/`error`, so the response itself always succeeds.
async fn get_overview(
    State(state): State<AppState>,
    Path((cik, company_name, ticker, years)): Path<(String, String, String, u32)>,
) -> Json<ApiResponse<CompanyOverview>> {
    let overview = state
        .orchestrator
        .company_overview(&cik, &company_name, &ticker, years)
        .await;
    Json(ApiResponse::success(overview))
}
