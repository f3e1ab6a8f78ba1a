use analysis_core::NewsPage;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{ApiResponse, AppError, AppState};

pub fn news_routes() -> Router<AppState> {
    Router::new().route("/api/news/:query/:page", get(get_news_page))
}

/// One page of articles; `next_page` is null at the end of the feed.
async fn get_news_page(
    State(state): State<AppState>,
    Path((query, page)): Path<(String, u32)>,
) -> Result<Json<ApiResponse<NewsPage>>, AppError> {
    let news = state.orchestrator.news_page(&query, page).await?;
    Ok(Json(ApiResponse::success(news)))
}
