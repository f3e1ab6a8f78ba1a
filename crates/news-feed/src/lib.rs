use analysis_core::{AnalysisError, NewsPage, NewsSource};
use std::sync::Arc;
use std::time::Duration;

/// Articles per page served by the news service.
pub const PAGE_SIZE: usize = 20;

/// Retries after the first failed attempt.
pub const MAX_RETRIES: u32 = 3;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Exponential backoff between page retries: `base * 2^attempt`, capped at 30s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn with_base_delay(base_delay: Duration) -> Self {
        Self {
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Page-by-page reader over a news source, as used for infinite scroll.
#[derive(Clone)]
pub struct NewsFeed {
    source: Arc<dyn NewsSource>,
    retry: RetryPolicy,
}

impl NewsFeed {
    pub fn new(source: Arc<dyn NewsSource>, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    /// Fetch one 1-based page. `next_page` is `None` once a page comes back short.
    pub async fn page(&self, query: &str, page: u32) -> Result<NewsPage, AnalysisError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AnalysisError::InvalidInput("News query cannot be empty".to_string()));
        }
        if page == 0 {
            return Err(AnalysisError::InvalidInput("News pages start at 1".to_string()));
        }

        let mut attempt = 0;
        let articles = loop {
            match self.source.news_page(query, page).await {
                Ok(articles) => break articles,
                // 4xx and undecodable bodies will not improve on retry
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= self.retry.max_retries => {
                    tracing::warn!("News page {} for {:?} failed after {} retries: {}", page, query, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.retry.delay(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "News page {} for {:?} failed ({}), retry {}/{} in {:?}",
                        page,
                        query,
                        e,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        };

        // the last representable page ends the feed
        let next_page = page.checked_add(1).filter(|_| articles.len() >= PAGE_SIZE);
        tracing::debug!("News page {} for {:?}: {} articles", page, query, articles.len());

        Ok(NewsPage {
            page,
            articles,
            next_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Article;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then returns `articles` articles.
    struct FlakySource {
        failures: u32,
        articles: usize,
        calls: AtomicU32,
    }

    impl FlakySource {
        fn new(failures: u32, articles: usize) -> Arc<Self> {
            Arc::new(Self { failures, articles, calls: AtomicU32::new(0) })
        }
    }

    #[async_trait]
    impl NewsSource for FlakySource {
        async fn news_page(&self, query: &str, page: u32) -> Result<Vec<Article>, AnalysisError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(AnalysisError::ApiError("connection reset".to_string()));
            }
            Ok((0..self.articles)
                .map(|i| Article {
                    title: format!("{} page {} #{}", query, page, i),
                    content: String::new(),
                    image: None,
                    publish: "2024-05-01".to_string(),
                    url: format!("https://news.example/{}/{}", page, i),
                    source: "Wire".to_string(),
                })
                .collect())
        }
    }

    fn feed(source: Arc<FlakySource>) -> NewsFeed {
        NewsFeed::new(source, RetryPolicy::with_base_delay(Duration::from_millis(1)))
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
        assert_eq!(policy.delay(10), MAX_BACKOFF);
        assert_eq!(policy.delay(40), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn test_full_page_points_to_next() {
        let source = FlakySource::new(0, PAGE_SIZE);
        let page = feed(source).page("apple", 1).await.unwrap();
        assert_eq!(page.articles.len(), PAGE_SIZE);
        assert_eq!(page.next_page, Some(2));
    }

    #[tokio::test]
    async fn test_full_last_page_ends_feed() {
        let source = FlakySource::new(0, PAGE_SIZE);
        let page = feed(source).page("apple", u32::MAX).await.unwrap();
        assert_eq!(page.articles.len(), PAGE_SIZE);
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_short_page_ends_feed() {
        let source = FlakySource::new(0, 7);
        let page = feed(source).page("apple", 3).await.unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_three_failures_then_success() {
        let source = FlakySource::new(3, PAGE_SIZE);
        let page = feed(source.clone()).page("apple", 1).await.unwrap();
        assert_eq!(page.articles.len(), PAGE_SIZE);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_four_failures_surface_error() {
        let source = FlakySource::new(4, PAGE_SIZE);
        let err = feed(source.clone()).page("apple", 1).await.unwrap_err();
        assert!(matches!(err, AnalysisError::ApiError(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    struct MissingSource(AtomicU32);

    #[async_trait]
    impl NewsSource for MissingSource {
        async fn news_page(&self, _query: &str, _page: u32) -> Result<Vec<Article>, AnalysisError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(AnalysisError::HttpStatus { status: 404, message: "no such feed".to_string() })
        }
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let source = Arc::new(MissingSource(AtomicU32::new(0)));
        let news = NewsFeed::new(source.clone(), RetryPolicy::with_base_delay(Duration::from_millis(1)));
        let err = news.page("apple", 1).await.unwrap_err();
        assert!(matches!(err, AnalysisError::HttpStatus { status: 404, .. }));
        assert_eq!(source.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_query_and_page_zero() {
        let source = FlakySource::new(0, 1);
        let news = feed(source.clone());
        assert!(matches!(news.page("   ", 1).await, Err(AnalysisError::InvalidInput(_))));
        assert!(matches!(news.page("apple", 0).await, Err(AnalysisError::InvalidInput(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
