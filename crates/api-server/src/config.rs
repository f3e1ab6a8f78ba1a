use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Server settings, read from the environment (a `.env` file is honored).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,

    // Remote services
    pub sec_base_url: String,
    pub sec_user_agent: String,
    pub companies_api_url: String,
    pub stock_api_url: String,
    pub news_api_url: String,
    pub sentiment_api_url: String,

    // HTTP client behavior
    pub http_timeout: Duration,
    pub data_rate_limit: usize,     // requests per second per client
    pub news_retry_base: Duration,  // first news retry delay, doubled per retry
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            bind_addr: var("BIND_ADDR", "0.0.0.0:3000")
                .parse()
                .context("BIND_ADDR must be host:port")?,

            sec_base_url: var("SEC_BASE_URL", "https://data.sec.gov"),
            sec_user_agent: var("SEC_USER_AGENT", "FactLens admin@example.com"),
            companies_api_url: var("COMPANIES_API_URL", "http://localhost:8000/companies-api"),
            stock_api_url: var("STOCK_API_URL", "http://localhost:8000/stock-api"),
            news_api_url: var("NEWS_API_URL", "http://localhost:8000/getNews-api"),
            sentiment_api_url: var("SENTIMENT_API_URL", "http://localhost:8000/polarityPress-api"),

            http_timeout: Duration::from_secs(
                var("HTTP_TIMEOUT_SECS", "30")
                    .parse()
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            data_rate_limit: var("DATA_RATE_LIMIT", "10")
                .parse()
                .context("DATA_RATE_LIMIT must be a positive integer")?,
            news_retry_base: Duration::from_millis(
                var("NEWS_RETRY_BASE_MS", "1000")
                    .parse()
                    .context("NEWS_RETRY_BASE_MS must be a whole number of milliseconds")?,
            ),
        };

        if config.data_rate_limit == 0 {
            anyhow::bail!("DATA_RATE_LIMIT must be at least 1");
        }

        Ok(config)
    }
}
