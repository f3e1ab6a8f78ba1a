use analysis_core::{
    pad_cik, AnalysisError, Company, CompanyAnalysis, CompanyDirectory, FactsSource, NewsPage, NewsSource,
    PriceSource, SentimentSource, StockChartData,
};
use fundamental_analysis::FundamentalAnalysisEngine;
use news_feed::{NewsFeed, RetryPolicy};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub mod cache;
pub use cache::{CachePolicy, ResponseCache};

/// The remote collaborators the orchestrator reads from.
#[derive(Clone)]
pub struct DataSources {
    pub facts: Arc<dyn FactsSource>,
    pub directory: Arc<dyn CompanyDirectory>,
    pub prices: Arc<dyn PriceSource>,
    pub news: Arc<dyn NewsSource>,
    pub sentiment: Arc<dyn SentimentSource>,
}

/// Freshness window per endpoint.
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub companies: CachePolicy,
    pub analysis: CachePolicy,
    pub stock: CachePolicy,
    pub news: CachePolicy,
    pub sentiment: CachePolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            companies: CachePolicy::forever(),
            analysis: CachePolicy::stale_while_revalidate(Duration::from_secs(5 * 60)),
            stock: CachePolicy::stale_while_revalidate(Duration::from_secs(60 * 60)),
            news: CachePolicy::fresh_for(Duration::from_secs(60)),
            sentiment: CachePolicy::fresh_for(Duration::from_secs(60 * 60)),
        }
    }
}

/// One independently resolved part of a combined response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartResult<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> From<Result<T, AnalysisError>> for PartResult<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(data) => Self { data: Some(data), error: None },
            Err(e) => Self { data: None, error: Some(e.to_string()) },
        }
    }
}

/// Company page bundle: fundamentals, price chart and news sentiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyOverview {
    pub analysis: PartResult<CompanyAnalysis>,
    pub stock: PartResult<StockChartData>,
    pub sentiment: PartResult<serde_json::Value>,
}

pub struct AnalysisOrchestrator {
    sources: DataSources,
    engine: Arc<FundamentalAnalysisEngine>,
    news_feed: NewsFeed,
    /// Company directory (never stale)
    companies_cache: Arc<ResponseCache<Vec<Company>>>,
    /// Analysis bundles per (cik, years) (5-min, refreshed in background)
    analysis_cache: Arc<ResponseCache<CompanyAnalysis>>,
    /// Chart series per (ticker, years) (1-hour, refreshed in background)
    stock_cache: Arc<ResponseCache<StockChartData>>,
    /// News pages per (query, page) (1-min)
    news_cache: Arc<ResponseCache<NewsPage>>,
    /// Sentiment documents per ticker (1-hour)
    sentiment_cache: Arc<ResponseCache<serde_json::Value>>,
}

fn require_years(years: u32) -> Result<(), AnalysisError> {
    if years == 0 {
        return Err(AnalysisError::InvalidInput("years must be positive".to_string()));
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<String, AnalysisError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AnalysisError::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

impl AnalysisOrchestrator {
    pub fn new(sources: DataSources) -> Self {
        Self::with_settings(
            sources,
            FundamentalAnalysisEngine::new(),
            RetryPolicy::default(),
            CacheSettings::default(),
        )
    }

    pub fn with_settings(
        sources: DataSources,
        engine: FundamentalAnalysisEngine,
        news_retry: RetryPolicy,
        cache: CacheSettings,
    ) -> Self {
        let news_feed = NewsFeed::new(Arc::clone(&sources.news), news_retry);
        Self {
            sources,
            engine: Arc::new(engine),
            news_feed,
            companies_cache: Arc::new(ResponseCache::new("companies", cache.companies)),
            analysis_cache: Arc::new(ResponseCache::new("analysis", cache.analysis)),
            stock_cache: Arc::new(ResponseCache::new("stock", cache.stock)),
            news_cache: Arc::new(ResponseCache::new("news", cache.news)),
            sentiment_cache: Arc::new(ResponseCache::new("sentiment", cache.sentiment)),
        }
    }

    /// Selectable companies.
    pub async fn companies(&self) -> Result<Vec<Company>, AnalysisError> {
        let directory = Arc::clone(&self.sources.directory);
        self.companies_cache
            .get_or_fetch("all".to_string(), move || async move { directory.companies().await })
            .await
    }

    /// Padded so `320193` and `0000320193` share one entry.
    fn analysis_key(cik: &str, years: u32) -> Result<String, AnalysisError> {
        Ok(format!("{}:{}", pad_cik(cik)?, years))
    }

    /// Fetch the company-facts document and derive the analysis bundle
    /// (cached per cik and lookback).
    pub async fn company_analysis(
        &self,
        cik: &str,
        company_name: &str,
        years: u32,
    ) -> Result<CompanyAnalysis, AnalysisError> {
        let cik = require_non_empty("cik", cik)?;
        let company_name = require_non_empty("company name", company_name)?;
        require_years(years)?;

        let facts = Arc::clone(&self.sources.facts);
        let engine = Arc::clone(&self.engine);
        let key = Self::analysis_key(&cik, years)?;

        self.analysis_cache
            .get_or_fetch(key, move || async move {
                let document = facts.company_facts(&cik).await?;
                engine.analyze_now(&document, &cik, &company_name, years)
            })
            .await
    }

    /// Drop the cached analysis for (cik, years) so the next read refetches.
    pub fn invalidate_analysis(&self, cik: &str, years: u32) -> Result<bool, AnalysisError> {
        let removed = self.analysis_cache.invalidate(&Self::analysis_key(cik, years)?);
        tracing::info!("Invalidated analysis for CIK {} ({} years): {}", cik, years, removed);
        Ok(removed)
    }

    /// Daily, weekly and monthly close series. A failed price fetch degrades
    /// to empty series and is not cached.
    pub async fn stock_chart(&self, ticker: &str, years: u32) -> Result<StockChartData, AnalysisError> {
        let ticker = require_non_empty("ticker", ticker)?.to_uppercase();
        require_years(years)?;

        let prices = Arc::clone(&self.sources.prices);
        let key = format!("{}:{}", ticker, years);
        let symbol = ticker.clone();

        let result = self
            .stock_cache
            .get_or_fetch(key, move || async move {
                let points = prices.price_history(&symbol, years).await?;
                Ok(price_series::build_chart_data(points))
            })
            .await;

        match result {
            Ok(chart) => {
                if chart.is_empty() {
                    tracing::warn!("No price history for {} ({} years)", ticker, years);
                }
                Ok(chart)
            }
            Err(e @ AnalysisError::InvalidInput(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Price history for {} unavailable, serving empty series: {}", ticker, e);
                Ok(StockChartData::default())
            }
        }
    }

    /// One page of news for `query`, retried by the news feed.
    pub async fn news_page(&self, query: &str, page: u32) -> Result<NewsPage, AnalysisError> {
        let query = require_non_empty("news query", query)?;
        let feed = self.news_feed.clone();
        let key = format!("{}:{}", query, page);

        self.news_cache
            .get_or_fetch(key, move || async move { feed.page(&query, page).await })
            .await
    }

    pub async fn sentiment(&self, ticker: &str) -> Result<serde_json::Value, AnalysisError> {
        let ticker = require_non_empty("ticker", ticker)?.to_uppercase();
        let source = Arc::clone(&self.sources.sentiment);

        self.sentiment_cache
            .get_or_fetch(ticker.clone(), move || async move { source.sentiment(&ticker).await })
            .await
    }

    /// Analysis, price chart and sentiment fetched concurrently; a failure in
    /// one part leaves the others intact.
    pub async fn company_overview(
        &self,
        cik: &str,
        company_name: &str,
        ticker: &str,
        years: u32,
    ) -> CompanyOverview {
        tracing::info!("Building overview for CIK {} / {} ({} years)", cik, ticker, years);

        let (analysis, stock, sentiment) = tokio::join!(
            self.company_analysis(cik, company_name, years),
            self.stock_chart(ticker, years),
            self.sentiment(ticker),
        );

        if let Err(e) = &analysis {
            tracing::warn!("Overview analysis for CIK {} failed: {}", cik, e);
        }
        if let Err(e) = &sentiment {
            tracing::warn!("Overview sentiment for {} failed: {}", ticker, e);
        }

        CompanyOverview {
            analysis: analysis.into(),
            stock: stock.into(),
            sentiment: sentiment.into(),
        }
    }
}
