//! Async HTTP client wrapping reqwest.
//!
//! Every fetch resolves to a [`FetchOutcome`]: either a page or a reason it
//! could not be had. Transport errors, timeouts and non-success statuses are
//! all reported the same way and never raised. Retries on 5xx, backoff on
//! 429, and a semaphore caps concurrent requests.

use crate::config::{ScoutConfig, ACCEPT_HTML};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Requested URL.
    pub url: Url,
    /// Final URL after redirects.
    pub final_url: Url,
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl Page {
    /// Whether the body holds anything worth parsing.
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// Why a fetch produced no page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-success status.
    Status(u16),
    /// Connection, TLS, redirect or body decoding failure.
    Transport(String),
    Timeout,
    /// The client's cancellation token fired.
    Cancelled,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(reason) => write!(f, "transport: {reason}"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of a single fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Page(Page),
    Failed(FetchFailure),
}

impl FetchOutcome {
    /// The fetched page, if any.
    pub fn page(&self) -> Option<&Page> {
        match self {
            Self::Page(page) => Some(page),
            Self::Failed(_) => None,
        }
    }

    /// The fetched page, only when its body is non-blank.
    pub fn html(&self) -> Option<&Page> {
        self.page().filter(|p| p.has_body())
    }

    /// HTTP status when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Page(page) => Some(page.status),
            Self::Failed(FetchFailure::Status(code)) => Some(*code),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Page(_) => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

/// Anything that can turn a URL into a [`FetchOutcome`].
///
/// The pipeline only talks to this trait, so it can be driven by
/// [`HttpClient`] in production and by canned pages in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}

/// HTTP client for discovery and extraction.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
    max_retries: u32,
}

impl HttpClient {
    /// Create a client with the configured user agent, `Accept` header,
    /// connection cap, and the given per-request timeout.
    pub fn new(config: &ScoutConfig, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .pool_max_idle_per_host(config.max_connections)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .unwrap_or_default();

        Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_connections.max(1))),
            cancel: CancellationToken::new(),
            max_retries: config.max_retries,
        }
    }

    /// Token that aborts every in-flight and future fetch when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn get_with_retries(&self, url: &Url) -> FetchOutcome {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return FetchOutcome::Failed(FetchFailure::Transport("client closed".into())),
        };

        let mut retries = 0u32;
        loop {
            match self.client.get(url.clone()).send().await {
                Ok(r) => {
                    let status = r.status().as_u16();

                    // Retry on 5xx
                    if status >= 500 && retries < self.max_retries {
                        retries += 1;
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }

                    // Backoff on 429
                    if status == 429 && retries < self.max_retries {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        tokio::time::sleep(Duration::from_secs(retry_after.min(10))).await;
                        continue;
                    }

                    if !r.status().is_success() {
                        return FetchOutcome::Failed(FetchFailure::Status(status));
                    }

                    let final_url = r.url().clone();
                    return match r.text().await {
                        Ok(body) => FetchOutcome::Page(Page {
                            url: url.clone(),
                            final_url,
                            status,
                            body,
                        }),
                        Err(e) => FetchOutcome::Failed(FetchFailure::Transport(e.to_string())),
                    };
                }
                Err(e) => {
                    if retries < self.max_retries && !e.is_timeout() {
                        retries += 1;
                        tokio::time::sleep(backoff(retries)).await;
                        continue;
                    }
                    return FetchOutcome::Failed(if e.is_timeout() {
                        FetchFailure::Timeout
                    } else {
                        FetchFailure::Transport(e.to_string())
                    });
                }
            }
        }
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        if self.cancel.is_cancelled() {
            return FetchOutcome::Failed(FetchFailure::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => FetchOutcome::Failed(FetchFailure::Cancelled),
            outcome = self.get_with_retries(url) => outcome,
        };

        match &outcome {
            FetchOutcome::Page(page) => {
                tracing::debug!(url = %url, status = page.status, bytes = page.body.len(), "fetched")
            }
            FetchOutcome::Failed(reason) => tracing::debug!(url = %url, %reason, "fetch failed"),
        }
        outcome
    }
}

/// Longest wait between retries.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

fn backoff(attempt: u32) -> Duration {
    let factor = 2u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(500u64.saturating_mul(factor)).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(&ScoutConfig::default(), Duration::from_secs(5));
        assert!(!client.cancel_token().is_cancelled());
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_millis(500));
        assert_eq!(backoff(2), Duration::from_millis(1000));
        assert_eq!(backoff(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(backoff(7), MAX_BACKOFF);
        assert_eq!(backoff(56), MAX_BACKOFF);
        assert_eq!(backoff(64), MAX_BACKOFF);
        assert_eq!(backoff(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_outcome_accessors() {
        let url = Url::parse("https://example.edu/").unwrap();
        let ok = FetchOutcome::Page(Page {
            url: url.clone(),
            final_url: url,
            status: 200,
            body: "   ".to_string(),
        });
        assert_eq!(ok.status(), Some(200));
        assert!(ok.page().is_some());
        assert!(ok.html().is_none());

        let failed = FetchOutcome::Failed(FetchFailure::Status(404));
        assert_eq!(failed.status(), Some(404));
        assert_eq!(failed.failure().map(|f| f.to_string()), Some("HTTP 404".into()));
    }

    #[tokio::test]
    async fn test_cancelled_client_short_circuits() {
        let client = HttpClient::new(&ScoutConfig::default(), Duration::from_secs(5));
        client.cancel_token().cancel();
        let url = Url::parse("http://127.0.0.1:9/never").unwrap();
        let outcome = client.fetch(&url).await;
        assert_eq!(outcome.failure(), Some(&FetchFailure::Cancelled));
    }
}
