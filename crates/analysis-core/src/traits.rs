use async_trait::async_trait;
use crate::{AnalysisError, Article, Company, CompanyFacts, PricePoint};

/// Source of regulatory company-facts documents
#[async_trait]
pub trait FactsSource: Send + Sync {
    async fn company_facts(&self, cik: &str) -> Result<CompanyFacts, AnalysisError>;
}

/// Source of the selectable company list
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn companies(&self) -> Result<Vec<Company>, AnalysisError>;
}

/// Source of daily closing prices covering the last `years` years
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn price_history(&self, ticker: &str, years: u32) -> Result<Vec<PricePoint>, AnalysisError>;
}

/// Source of paginated news articles (1-based pages)
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn news_page(&self, query: &str, page: u32) -> Result<Vec<Article>, AnalysisError>;
}

/// Source of per-ticker news sentiment, passed through as opaque JSON
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn sentiment(&self, ticker: &str) -> Result<serde_json::Value, AnalysisError>;
}
