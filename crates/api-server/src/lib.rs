use analysis_core::AnalysisError;
use analysis_orchestrator::{AnalysisOrchestrator, CacheSettings, DataSources};
use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use data_client::{
    ClientConfig, CompanyDirectoryConfig, DirectoryClient, MarketDataClient, MarketEndpoints, SecClient,
};
use fundamental_analysis::FundamentalAnalysisEngine;
use news_feed::RetryPolicy;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
mod analysis_routes;
mod companies_routes;
mod news_routes;
mod overview_routes;
mod request_id;
mod sentiment_routes;
mod stock_routes;

pub use config::AppConfig;
pub use request_id::RequestId;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

/// Envelope for every JSON body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }
}

/// Handler error: a status code plus the underlying cause.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: impl Into<anyhow::Error>) -> Self {
        Self { status, error: error.into() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<AnalysisError> for AppError {
    fn from(error: AnalysisError) -> Self {
        let status = match &error {
            AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AnalysisError::InsufficientData(_) => StatusCode::NOT_FOUND,
            AnalysisError::HttpStatus { status: 404, .. } => StatusCode::NOT_FOUND,
            AnalysisError::HttpStatus { .. }
            | AnalysisError::ApiError(_)
            | AnalysisError::InvalidData(_) => StatusCode::BAD_GATEWAY,
        };
        Self::with_status(status, error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed ({}): {:#}", self.status, self.error);
        } else {
            tracing::warn!("Request rejected ({}): {}", self.status, self.error);
        }
        (self.status, Json(ApiResponse::failure(self.error.to_string()))).into_response()
    }
}

async fn health() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// All routes with tracing, request ids and permissive CORS for the browser client.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(companies_routes::companies_routes())
        .merge(analysis_routes::analysis_routes())
        .merge(stock_routes::stock_routes())
        .merge(news_routes::news_routes())
        .merge(sentiment_routes::sentiment_routes())
        .merge(overview_routes::overview_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Wire the remote clients described by `config` into an orchestrator.
pub fn build_state(config: &AppConfig) -> AppState {
    let client_config = ClientConfig {
        user_agent: config.sec_user_agent.clone(),
        timeout: config.http_timeout,
        requests_per_second: config.data_rate_limit,
        ..ClientConfig::default()
    };

    let market = Arc::new(MarketDataClient::new(
        MarketEndpoints {
            stock: config.stock_api_url.clone(),
            news: config.news_api_url.clone(),
            sentiment: config.sentiment_api_url.clone(),
        },
        &client_config,
    ));

    let sources = DataSources {
        facts: Arc::new(SecClient::new(&config.sec_base_url, &client_config)),
        directory: Arc::new(DirectoryClient::new(
            &config.companies_api_url,
            &client_config,
            CompanyDirectoryConfig::default(),
        )),
        prices: market.clone(),
        news: market.clone(),
        sentiment: market,
    };

    let orchestrator = AnalysisOrchestrator::with_settings(
        sources,
        FundamentalAnalysisEngine::new(),
        RetryPolicy::with_base_delay(config.news_retry_base),
        CacheSettings::default(),
    );

    AppState { orchestrator: Arc::new(orchestrator) }
}

/// Install the global subscriber. `RUST_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        "Starting api-server on {} (facts: {}, stock: {}, news: {})",
        config.bind_addr,
        config.sec_base_url,
        config.stock_api_url,
        config.news_api_url
    );

    let app = app_router(build_state(&config));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
