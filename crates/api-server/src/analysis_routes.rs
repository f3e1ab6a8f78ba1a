//! Company analysis routes
//!
//! Normalized facts, investment ratios, growth series, the five-step score
//! and the income statement summary for one company.

use analysis_core::CompanyAnalysis;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub cik: String,
    pub years: u32,
    pub invalidated: bool,
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analysis/:cik/:company_name/:years", get(get_analysis))
        // second segment is the year count here; the router needs one name per position
        .route("/api/analysis/:cik/:company_name/refresh", post(refresh_analysis))
}

async fn get_analysis(
    State(state): State<AppState>,
    Path((cik, company_name, years)): Path<(String, String, u32)>,
) -> Result<Json<ApiResponse<CompanyAnalysis>>, AppError> {
    let analysis = state
        .orchestrator
        .company_analysis(&cik, &company_name, years)
        .await?;
    Ok(Json(ApiResponse::success(analysis)))
}

/// Drop the cached bundle so the next read goes back to the source.
async fn refresh_analysis(
    State(state): State<AppState>,
    Path((cik, years)): Path<(String, u32)>,
) -> Result<Json<ApiResponse<RefreshResult>>, AppError> {
    let invalidated = state.orchestrator.invalidate_analysis(&cik, years)?;
    Ok(Json(ApiResponse::success(RefreshResult { cik, years, invalidated })))
}
