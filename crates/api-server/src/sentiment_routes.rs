//! Sentiment Routes
//!
//! Per-ticker news sentiment, passed through from the sentiment service.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{ApiResponse, AppError, AppState};

pub fn sentiment_routes() -> Router<AppState> {
    Router::new().route("/api/sentiment/:ticker", get(get_sentiment))
}

async fn get_sentiment(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let sentiment = state.orchestrator.sentiment(&ticker).await?;
    Ok(Json(ApiResponse::success(sentiment)))
}
