//! Resilient HTTP fetch engine for job board pages.
//!
//! ### Pacing
//! - A randomized jitter sleep (default 1-3 s) runs before each logical
//!   fetch to avoid bursty, detectable request patterns.
//!
//! ### Retry policy
//! - Up to 3 attempts per logical fetch; exponential backoff between
//!   attempts (2 s, doubling, capped at 8 s).
//! - Retryable: transport errors and statuses 408, 429, 500, 502, 503, 504.
//! - Any other non-success status is terminal and returned immediately.
//!
//! ### Concurrency
//! - A semaphore (default 3 permits) bounds simultaneous in-flight network
//!   calls. The permit covers only the request/response exchange; jitter and
//!   backoff sleeps run outside it so backing-off fetches do not starve the
//!   budget for others.

pub mod orchestrator;
pub mod url;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, Url};
use tokio::sync::Semaphore;
use tokio::time::sleep;

pub use orchestrator::FetchOrchestrator;
pub use url::{UrlError, board_url, canonicalize};

use jobsift_core::{AppConfig, Error};

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUS: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string.
    pub user_agent: String,

    /// Referer header sent with each request.
    pub referer: String,

    /// Request timeout (default: 20s).
    pub timeout: Duration,

    /// Maximum simultaneous in-flight network calls (default: 3).
    pub max_concurrency: usize,

    /// Total attempts per logical fetch, including the first (default: 3).
    pub max_attempts: u32,

    /// Backoff before the first retry (default: 2s); doubles per attempt.
    pub backoff_base: Duration,

    /// Backoff growth cap (default: 8s).
    pub backoff_max: Duration,

    /// Pre-request jitter window (default: 1s..=3s).
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:132.0) Gecko/20100101 Firefox/132.0".to_string(),
            referer: "https://justjoin.it/".to_string(),
            timeout: Duration::from_millis(20_000),
            max_concurrency: 3,
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            backoff_max: Duration::from_secs(8),
            jitter_min: Duration::from_secs(1),
            jitter_max: Duration::from_secs(3),
        }
    }
}

impl FetchConfig {
    /// Derive fetch settings from the loaded application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            referer: format!("{}/", config.board_url.trim_end_matches('/')),
            timeout: config.timeout(),
            max_concurrency: config.max_concurrency,
            max_attempts: config.max_attempts,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_max: Duration::from_millis(config.backoff_max_ms),
            jitter_min: Duration::from_millis(config.jitter_min_ms),
            jitter_max: Duration::from_millis(config.jitter_max_ms),
        }
    }

    /// Random sleep drawn uniformly from the jitter window.
    fn jitter(&self) -> Duration {
        let min = self.jitter_min.as_millis() as u64;
        let max = self.jitter_max.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(min..=max))
    }

    /// Backoff before attempt `attempt` (2-based): base * 2^(attempt - 2),
    /// capped at `backoff_max`.
    fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(2).min(16);
        let wait = self.backoff_base.saturating_mul(1u32 << doublings);
        wait.min(self.backoff_max)
    }
}

/// Result of one logical fetch. Failures are values, never panics or
/// errors, so a batch of fetches always runs to completion.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Fetched (or served from cache) successfully.
    Success { url: Url, body: String },
    /// Failed with a status not worth retrying; returned after one attempt.
    Terminal { url: Url, status: u16, reason: String },
    /// Retried to the configured limit while only retryable failures
    /// occurred; carries the last observed status, if any.
    RetryExhausted { url: Url, last_status: Option<u16>, reason: String },
}

impl FetchOutcome {
    pub fn url(&self) -> &Url {
        match self {
            FetchOutcome::Success { url, .. }
            | FetchOutcome::Terminal { url, .. }
            | FetchOutcome::RetryExhausted { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// Classification of a single attempt, before the retry policy is applied.
enum Attempt {
    Success(String),
    Terminal { status: u16, reason: String },
    Retryable { status: Option<u16>, reason: String },
}

/// Seam between the orchestrator and the network, so batch logic is
/// testable without sockets.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one logical fetch, including pacing and retries.
    async fn fetch(&self, url: Url) -> FetchOutcome;
}

/// HTTP fetch client with jitter, bounded concurrency, and retry/backoff.
pub struct FetchClient {
    http: Client,
    limiter: Arc<Semaphore>,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the underlying HTTP client cannot be
    /// built.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        if let Ok(referer) = HeaderValue::from_str(&config.referer) {
            headers.insert(REFERER, referer);
        }

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;

        let limiter = Arc::new(Semaphore::new(config.max_concurrency.max(1)));

        Ok(Self { http, limiter, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Issue one GET and classify the response. The concurrency permit is
    /// held for the request/response exchange only.
    async fn attempt(&self, url: &Url) -> Attempt {
        let _permit = self
            .limiter
            .acquire()
            .await
            .expect("fetch limiter is never closed");

        let response = match self.http.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Retryable { status: None, reason: format!("transport error: {}", e) },
        };

        let status = response.status();

        if status.is_success() {
            return match response.text().await {
                Ok(body) => Attempt::Success(body),
                // Premature close while reading the body counts as a
                // transport failure.
                Err(e) => Attempt::Retryable {
                    status: Some(status.as_u16()),
                    reason: format!("failed to read response body: {}", e),
                },
            };
        }

        if RETRYABLE_STATUS.contains(&status.as_u16()) {
            Attempt::Retryable {
                status: Some(status.as_u16()),
                reason: format!("retryable status {}", status.as_u16()),
            }
        } else {
            Attempt::Terminal {
                status: status.as_u16(),
                reason: format!("status {} not suitable for retry", status),
            }
        }
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, url: Url) -> FetchOutcome {
        let jitter = self.config.jitter();
        if !jitter.is_zero() {
            tracing::trace!(%url, jitter_ms = jitter.as_millis() as u64, "pre-request jitter");
            sleep(jitter).await;
        }

        let mut last_status = None;
        let mut last_reason = String::from("no attempt made");

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                let wait = self.config.backoff(attempt);
                tracing::debug!(%url, attempt, wait_ms = wait.as_millis() as u64, "backing off before retry");
                sleep(wait).await;
            }

            match self.attempt(&url).await {
                Attempt::Success(body) => {
                    tracing::debug!(%url, attempt, bytes = body.len(), "fetched");
                    return FetchOutcome::Success { url, body };
                }
                Attempt::Terminal { status, reason } => {
                    tracing::debug!(%url, status, "terminal failure, not retrying");
                    return FetchOutcome::Terminal { url, status, reason };
                }
                Attempt::Retryable { status, reason } => {
                    tracing::debug!(%url, attempt, ?status, %reason, "attempt failed");
                    last_status = status;
                    last_reason = reason;
                }
            }
        }

        FetchOutcome::RetryExhausted {
            url,
            last_status,
            reason: format!("retry budget exhausted: {}", last_reason),
        }
    }
}
