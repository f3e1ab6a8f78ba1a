use analysis_core::{pad_cik, AnalysisError, CompanyFacts, FactsSource};
use async_trait::async_trait;

use crate::{endpoint, ClientConfig, ServiceClient};

pub const SEC_BASE_URL: &str = "https://data.sec.gov";

/// Client for the regulator's company-facts endpoint.
#[derive(Clone)]
pub struct SecClient {
    base_url: String,
    http: ServiceClient,
}

impl SecClient {
    /// The SEC rejects requests without a descriptive User-Agent
    /// ("Company Name contact@email.com"), so `config.user_agent` matters here.
    pub fn new(base_url: &str, config: &ClientConfig) -> Self {
        Self {
            base_url: base_url.to_string(),
            http: ServiceClient::new(config),
        }
    }

    pub fn company_facts_url(&self, cik: &str) -> Result<String, AnalysisError> {
        let file = format!("CIK{}.json", pad_cik(cik)?);
        endpoint(&self.base_url, &["api", "xbrl", "companyfacts", &file], false)
    }
}

impl Default for SecClient {
    fn default() -> Self {
        Self::new(SEC_BASE_URL, &ClientConfig::default())
    }
}

#[async_trait]
impl FactsSource for SecClient {
    async fn company_facts(&self, cik: &str) -> Result<CompanyFacts, AnalysisError> {
        let url = self.company_facts_url(cik)?;
        let facts: CompanyFacts = self.http.get_json(&url).await?;
        tracing::info!(
            "Fetched company facts for CIK {} ({} taxonomies)",
            cik,
            facts.facts.len()
        );
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};

    #[test]
    fn test_company_facts_url_pads_cik() {
        let client = SecClient::new("https://data.sec.gov/", &ClientConfig::default());
        assert_eq!(
            client.company_facts_url("320193").unwrap(),
            "https://data.sec.gov/api/xbrl/companyfacts/CIK0000320193.json"
        );
        assert!(matches!(
            client.company_facts_url("abc"),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_company_facts() {
        let router = Router::new().route(
            "/api/xbrl/companyfacts/:file",
            get(|Path(file): Path<String>| async move {
                if file != "CIK0000000042.json" {
                    return Err(StatusCode::NOT_FOUND);
                }
                Ok(Json(serde_json::json!({
                    "cik": 42,
                    "entityName": "Example Corp",
                    "facts": {"us-gaap": {"Assets": {
                        "label": "Assets",
                        "description": "Total assets.",
                        "units": {"USD": [
                            {"end": "2023-12-31", "val": 1000, "fy": 2023, "fp": "FY",
                             "form": "10-K", "filed": "2024-02-20"}
                        ]}
                    }}}
                })))
            }),
        );
        let base = test_server::spawn(router).await;
        let client = SecClient::new(&base, &ClientConfig::default());

        let facts = client.company_facts("42").await.unwrap();
        assert_eq!(facts.entity_name.as_deref(), Some("Example Corp"));
        assert_eq!(facts.us_gaap().count(), 1);

        let err = client.company_facts("43").await.unwrap_err();
        assert!(matches!(err, AnalysisError::HttpStatus { status: 404, .. }));
    }
}
