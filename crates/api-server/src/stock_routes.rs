use analysis_core::StockChartData;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{ApiResponse, AppError, AppState};

pub fn stock_routes() -> Router<AppState> {
    Router::new().route("/api/stock/:ticker/:years", get(get_stock_chart))
}

/// Daily, weekly and monthly closes. An unavailable price service yields
/// empty series rather than an error.
async fn get_stock_chart(
    State(state): State<AppState>,
    Path((ticker, years)): Path<(String, u32)>,
) -> Result<Json<ApiResponse<StockChartData>>, AppError> {
    let chart = state.orchestrator.stock_chart(&ticker, years).await?;
    Ok(Json(ApiResponse::success(chart)))
}
