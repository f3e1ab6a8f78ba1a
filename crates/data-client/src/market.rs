use analysis_core::{
    AnalysisError, Article, NewsSource, PricePoint, PriceSource, SentimentSource,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{endpoint, ClientConfig, ServiceClient};

/// Base URLs of the market-data backends.
#[derive(Debug, Clone)]
pub struct MarketEndpoints {
    pub stock: String,
    pub news: String,
    pub sentiment: String,
}

/// Client for the stock-price, news and sentiment services.
#[derive(Clone)]
pub struct MarketDataClient {
    endpoints: MarketEndpoints,
    http: ServiceClient,
}

impl MarketDataClient {
    pub fn new(endpoints: MarketEndpoints, config: &ClientConfig) -> Self {
        Self {
            endpoints,
            http: ServiceClient::new(config),
        }
    }
}

fn normalize_ticker(ticker: &str) -> Result<String, AnalysisError> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AnalysisError::InvalidInput("Ticker cannot be empty".to_string()));
    }
    if !ticker.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
        return Err(AnalysisError::InvalidInput(format!(
            "Ticker must contain only alphanumeric characters, dots or hyphens: {}",
            ticker
        )));
    }
    Ok(ticker)
}

// Stock service row. Dates may carry a time component ("2024-01-02T00:00:00").
#[derive(Debug, Deserialize)]
struct StockRow {
    date: String,
    close_value: f64,
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

#[async_trait]
impl PriceSource for MarketDataClient {
    async fn price_history(&self, ticker: &str, years: u32) -> Result<Vec<PricePoint>, AnalysisError> {
        let ticker = normalize_ticker(ticker)?;
        if years == 0 {
            return Err(AnalysisError::InvalidInput("years must be positive".to_string()));
        }

        let years = years.to_string();
        let url = endpoint(&self.endpoints.stock, &["getFinData", &ticker, &years], true)?;
        let rows: Vec<StockRow> = self.http.get_json(&url).await?;

        let total = rows.len();
        let points: Vec<PricePoint> = rows
            .into_iter()
            .filter_map(|row| {
                parse_day(&row.date).map(|date| PricePoint { date, close_value: row.close_value })
            })
            .collect();

        if points.len() < total {
            tracing::warn!(
                "Dropped {} price rows with unparseable dates for {}",
                total - points.len(),
                ticker
            );
        }
        Ok(points)
    }
}

#[async_trait]
impl NewsSource for MarketDataClient {
    async fn news_page(&self, query: &str, page: u32) -> Result<Vec<Article>, AnalysisError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AnalysisError::InvalidInput("News query cannot be empty".to_string()));
        }
        if page == 0 {
            return Err(AnalysisError::InvalidInput("News pages start at 1".to_string()));
        }

        let page = page.to_string();
        let url = endpoint(&self.endpoints.news, &["getEventNewsAPI", query, &page], false)?;
        self.http.get_json(&url).await
    }
}

#[async_trait]
impl SentimentSource for MarketDataClient {
    async fn sentiment(&self, ticker: &str) -> Result<serde_json::Value, AnalysisError> {
        let ticker = normalize_ticker(ticker)?;
        let url = endpoint(&self.endpoints.sentiment, &["getSentimentAnalysis", &ticker], true)?;
        self.http.get_json(&url).await
    }
}
