use analysis_core::AnalysisError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub mod directory;
pub mod market;
pub mod sec;

pub use directory::{CompanyDirectoryConfig, DirectoryClient};
pub use market::{MarketDataClient, MarketEndpoints};
pub use sec::SecClient;

const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            let oldest = match ts.front() {
                Some(&oldest) if ts.len() >= self.max_requests => oldest,
                _ => {
                    ts.push_back(now);
                    return;
                }
            };

            // Wait until the oldest request falls out of the window
            let sleep_dur = (oldest + self.window).saturating_duration_since(now)
                + Duration::from_millis(10);
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.2}s for a request slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Settings shared by every remote-service client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Requests allowed per second across one client
    pub requests_per_second: usize,
    /// Pause before retrying a 429 response
    pub rate_limit_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "FactLens admin@example.com".to_string(),
            timeout: Duration::from_secs(30),
            requests_per_second: 10,
            rate_limit_backoff: Duration::from_secs(2),
        }
    }
}

/// HTTP plumbing shared by the service clients: rate limiting, 429 retries,
/// status checking and JSON decoding.
#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    rate_limiter: RateLimiter,
    rate_limit_backoff: Duration,
}

impl ServiceClient {
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second, Duration::from_secs(1)),
            rate_limit_backoff: config.rate_limit_backoff,
        }
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        let request = builder.build().map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        for attempt in 0..MAX_RATE_LIMIT_RETRIES {
            self.rate_limiter.acquire().await;
            let req_clone = request.try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self.client.execute(req_clone).await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            tracing::warn!(
                "{} rate limited, waiting {:?} before retry {}/{}",
                request.url(),
                self.rate_limit_backoff,
                attempt + 1,
                MAX_RATE_LIMIT_RETRIES
            );
            tokio::time::sleep(self.rate_limit_backoff).await;
        }

        Err(AnalysisError::ApiError(format!(
            "Rate limited by {} after {} retries",
            request.url().host_str().unwrap_or("remote service"),
            MAX_RATE_LIMIT_RETRIES
        )))
    }

    /// GET `url` and decode the JSON body, surfacing non-success statuses.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AnalysisError> {
        tracing::debug!("GET {}", url);
        let response = self.send_request(self.client.get(url)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AnalysisError::InvalidData(format!("{}: {}", url, e)))
    }
}

/// Build the error for a non-success response. JSON bodies carrying a
/// `detail` or `error` message win over the raw body text.
pub(crate) fn status_error(status: StatusCode, body: &str) -> AnalysisError {
    let from_json = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|v| {
        ["detail", "error"]
            .iter()
            .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(str::to_string))
    });

    let message = from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(200).collect())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    AnalysisError::HttpStatus { status: status.as_u16(), message }
}

/// Append percent-encoded path segments to `base`, optionally keeping a
/// trailing slash (some services route `/x/` and `/x` differently).
pub(crate) fn endpoint(base: &str, segments: &[&str], trailing_slash: bool) -> Result<String, AnalysisError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| AnalysisError::InvalidInput(format!("Invalid base URL {:?}: {}", base, e)))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| AnalysisError::InvalidInput(format!("Base URL cannot carry a path: {}", base)))?;
        path.pop_if_empty();
        path.extend(segments);
        if trailing_slash {
            path.push("");
        }
    }
    Ok(url.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::get, Json, Router};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> ClientConfig {
        ClientConfig {
            rate_limit_backoff: Duration::from_millis(5),
            requests_per_second: 100,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_status_error_prefers_json_detail() {
        let err = status_error(StatusCode::BAD_REQUEST, r#"{"detail": "unknown company"}"#);
        assert_eq!(err, AnalysisError::HttpStatus { status: 400, message: "unknown company".into() });

        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "boom"}"#);
        assert_eq!(err, AnalysisError::HttpStatus { status: 500, message: "boom".into() });

        let err = status_error(StatusCode::NOT_FOUND, "");
        assert_eq!(err, AnalysisError::HttpStatus { status: 404, message: "Not Found".into() });

        let err = status_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err, AnalysisError::HttpStatus { status: 502, message: "upstream down".into() });
    }

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        assert_eq!(
            endpoint("https://data.sec.gov/", &["api", "xbrl"], false).unwrap(),
            "https://data.sec.gov/api/xbrl"
        );
        assert_eq!(
            endpoint("http://localhost:8000/stock-api", &["getFinData", "AAPL", "3"], true).unwrap(),
            "http://localhost:8000/stock-api/getFinData/AAPL/3/"
        );
        assert_eq!(
            endpoint("http://localhost:8000", &["news", "S&P 500/tech"], false).unwrap(),
            "http://localhost:8000/news/S&P%20500%2Ftech"
        );
        assert!(endpoint("not a url", &["x"], false).is_err());
    }

    #[tokio::test]
    async fn test_rate_limiter_admits_burst_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_get_json_retries_rate_limited_requests() {
        let hits = std::sync::Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/data",
            get(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(AxumStatus::TOO_MANY_REQUESTS)
                    } else {
                        Ok(Json(serde_json::json!({"ok": true})))
                    }
                }
            }),
        );
        let base = test_server::spawn(router).await;

        let client = ServiceClient::new(&fast_config());
        let value: serde_json::Value = client.get_json(&format!("{}/data", base)).await.unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_json_surfaces_status_and_decode_errors() {
        let router = Router::new()
            .route("/missing", get(|| async { (AxumStatus::NOT_FOUND, "no such company") }))
            .route("/garbage", get(|| async { "not json" }));
        let base = test_server::spawn(router).await;
        let client = ServiceClient::new(&fast_config());

        let err = client
            .get_json::<serde_json::Value>(&format!("{}/missing", base))
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::HttpStatus { status: 404, message: "no such company".into() });

        let err = client
            .get_json::<serde_json::Value>(&format!("{}/garbage", base))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidData(_)));
    }
}
