use analysis_core::{AnalysisError, Company, CompanyDirectory};
use async_trait::async_trait;

use crate::{endpoint, ClientConfig, ServiceClient};

/// Companies offered when the directory service is unreachable:
/// (CIK, ticker, title).
const DEFAULT_FALLBACK: &[(&str, &str, &str)] = &[
    ("0001045810", "NVDA", "NVIDIA CORP"),
    ("0000789019", "MSFT", "MICROSOFT CORP"),
    ("0000320193", "AAPL", "Apple Inc."),
    ("0001018724", "AMZN", "AMAZON COM INC"),
    ("0001652044", "GOOGL", "Alphabet Inc."),
    ("0001326801", "META", "Meta Platforms, Inc."),
    ("0001730168", "AVGO", "Broadcom Inc."),
    ("0001318605", "TSLA", "Tesla, Inc."),
    ("0001067983", "BRK-B", "BERKSHIRE HATHAWAY INC"),
    ("0000019617", "JPM", "JPMORGAN CHASE & CO"),
    ("0000104169", "WMT", "Walmart Inc."),
    ("0000059478", "LLY", "ELI LILLY & Co"),
    ("0001403161", "V", "VISA INC."),
    ("0001341439", "ORCL", "ORACLE CORP"),
    ("0001065280", "NFLX", "NETFLIX INC"),
    ("0001141391", "MA", "Mastercard Inc"),
    ("0000034088", "XOM", "EXXON MOBIL CORP"),
    ("0000909832", "COST", "COSTCO WHOLESALE CORP /NEW"),
    ("0001374310", "CBOE", "Cboe Global Markets, Inc."),
    ("0001652044", "GOOG", "Alphabet Inc."),
];

/// Directory settings: the fallback table is data, not logic.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyDirectoryConfig {
    pub fallback: Vec<Company>,
}

impl Default for CompanyDirectoryConfig {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK
                .iter()
                .map(|(cik, ticker, title)| Company {
                    sec_code: cik.to_string(),
                    ticker_code: ticker.to_string(),
                    title: title.to_string(),
                })
                .collect(),
        }
    }
}

/// Client for the company directory service.
#[derive(Clone)]
pub struct DirectoryClient {
    base_url: String,
    http: ServiceClient,
    config: CompanyDirectoryConfig,
}

impl DirectoryClient {
    pub fn new(base_url: &str, client_config: &ClientConfig, config: CompanyDirectoryConfig) -> Self {
        Self {
            base_url: base_url.to_string(),
            http: ServiceClient::new(client_config),
            config,
        }
    }
}

#[async_trait]
impl CompanyDirectory for DirectoryClient {
    /// Never fails: any fetch error falls back to the configured table.
    async fn companies(&self) -> Result<Vec<Company>, AnalysisError> {
        let fetched = match endpoint(&self.base_url, &["getCompanies"], false) {
            Ok(url) => self.http.get_json::<Vec<Company>>(&url).await,
            Err(e) => Err(e),
        };
        match fetched {
            Ok(companies) => {
                tracing::info!("Loaded {} companies from directory service", companies.len());
                Ok(companies)
            }
            Err(e) => {
                tracing::warn!(
                    "Company directory unavailable ({}), using {} fallback entries",
                    e,
                    self.config.fallback.len()
                );
                Ok(self.config.fallback.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use axum::{http::StatusCode, routing::get, Json, Router};

    #[test]
    fn test_default_fallback_table() {
        let config = CompanyDirectoryConfig::default();
        assert_eq!(config.fallback.len(), 20);
        assert!(config.fallback.iter().all(|c| c.sec_code.len() == 10));
        assert!(config.fallback.iter().any(|c| c.ticker_code == "AAPL"));
    }

    #[tokio::test]
    async fn test_companies_from_service() {
        let router = Router::new().route(
            "/getCompanies",
            get(|| async {
                Json(serde_json::json!([
                    {"sec_code": "0000320193", "ticker_code": "AAPL", "title": "Apple Inc."}
                ]))
            }),
        );
        let base = test_server::spawn(router).await;
        let client = DirectoryClient::new(&base, &ClientConfig::default(), CompanyDirectoryConfig::default());

        let companies = client.companies().await.unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].ticker_code, "AAPL");
    }

    #[tokio::test]
    async fn test_companies_fall_back_on_failure() {
        let router = Router::new().route(
            "/getCompanies",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = test_server::spawn(router).await;
        let fallback = vec![Company {
            sec_code: "0000000001".into(),
            ticker_code: "TEST".into(),
            title: "Test Co".into(),
        }];
        let client = DirectoryClient::new(
            &base,
            &ClientConfig::default(),
            CompanyDirectoryConfig { fallback: fallback.clone() },
        );

        assert_eq!(client.companies().await.unwrap(), fallback);
    }
}
