//! Fan-out of many fetches with cache-aside semantics.
//!
//! URLs are deduped before dispatch; the recency cache is consulted before
//! every network call and populated after each successful fetch. Results
//! come back in completion order, not submission order, and a failing URL
//! never aborts the batch.

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::Url;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use jobsift_core::RecencyCache;

use super::{FetchOutcome, Fetcher};

/// Drives a batch of fetches through the cache and a [`Fetcher`].
///
/// The cache is the only shared mutable structure in the pipeline; since
/// `get` mutates recency links, all cache operations go through one mutex.
pub struct FetchOrchestrator<F: Fetcher> {
    fetcher: Arc<F>,
    cache: Arc<Mutex<RecencyCache>>,
}

impl<F: Fetcher + 'static> FetchOrchestrator<F> {
    pub fn new(fetcher: Arc<F>, cache: Arc<Mutex<RecencyCache>>) -> Self {
        Self { fetcher, cache }
    }

    /// Fetch every distinct URL, yielding one outcome per distinct input.
    ///
    /// Cache hits are returned as successes without any network call and
    /// bypass the concurrency bound entirely. Outcomes are ordered by
    /// completion time; callers needing input correlation should key off
    /// the URL carried in each outcome.
    pub async fn fetch_all(&self, urls: Vec<Url>) -> Vec<FetchOutcome> {
        let mut seen = HashSet::new();
        let mut outcomes = Vec::new();
        let mut in_flight = JoinSet::new();

        for url in urls {
            if !seen.insert(url.as_str().to_owned()) {
                continue;
            }

            let cached = { self.cache.lock().await.get(url.as_str()).map(str::to_owned) };
            if let Some(body) = cached {
                tracing::debug!(%url, "cache hit, no network call");
                outcomes.push(FetchOutcome::Success { url, body });
                continue;
            }

            let fetcher = Arc::clone(&self.fetcher);
            let cache = Arc::clone(&self.cache);
            in_flight.spawn(async move {
                let outcome = fetcher.fetch(url).await;
                if let FetchOutcome::Success { url, body } = &outcome {
                    cache.lock().await.put(url.as_str(), body);
                }
                outcome
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                // A panicked task loses one outcome but never the batch.
                Err(e) => tracing::warn!(error = %e, "fetch task failed to join"),
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::fetch::{FetchClient, FetchConfig};

    /// Scripted fetcher recording every network-level call.
    struct StubFetcher {
        outcomes: HashMap<String, FetchOutcome>,
        calls: Mutex<Vec<String>>,
        delay: Duration,
    }

    impl StubFetcher {
        fn new(outcomes: Vec<FetchOutcome>) -> Self {
            Self {
                outcomes: outcomes
                    .into_iter()
                    .map(|o| (o.url().as_str().to_owned(), o))
                    .collect(),
                calls: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            }
        }

        async fn call_count(&self) -> usize {
            self.calls.lock().await.len()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: Url) -> FetchOutcome {
            self.calls.lock().await.push(url.as_str().to_owned());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcomes
                .get(url.as_str())
                .cloned()
                .unwrap_or(FetchOutcome::Terminal {
                    url,
                    status: 500,
                    reason: "unscripted".into(),
                })
        }
    }

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://justjoin.it/job-offer/{path}")).unwrap()
    }

    fn success(path: &str, body: &str) -> FetchOutcome {
        FetchOutcome::Success { url: url(path), body: body.into() }
    }

    fn shared_cache(capacity: usize) -> Arc<Mutex<RecencyCache>> {
        Arc::new(Mutex::new(RecencyCache::new(capacity).unwrap()))
    }

    #[tokio::test]
    async fn test_duplicates_fetched_once() {
        let stub = Arc::new(StubFetcher::new(vec![success("a", "body")]));
        let orchestrator = FetchOrchestrator::new(Arc::clone(&stub), shared_cache(4));

        let outcomes = orchestrator.fetch_all(vec![url("a"), url("a"), url("a")]).await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(stub.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_cache_hit_bypasses_fetcher() {
        let stub = Arc::new(StubFetcher::new(vec![]));
        let cache = shared_cache(4);
        cache.lock().await.put(url("a").as_str(), "cached body");
        let orchestrator = FetchOrchestrator::new(Arc::clone(&stub), cache);

        let outcomes = orchestrator.fetch_all(vec![url("a")]).await;

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(&outcomes[0], FetchOutcome::Success { body, .. } if body == "cached body"));
        assert_eq!(stub.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_success_populates_cache() {
        let stub = Arc::new(StubFetcher::new(vec![success("a", "fresh body")]));
        let cache = shared_cache(4);
        let orchestrator = FetchOrchestrator::new(Arc::clone(&stub), Arc::clone(&cache));

        orchestrator.fetch_all(vec![url("a")]).await;
        assert_eq!(cache.lock().await.get(url("a").as_str()), Some("fresh body"));

        // Second run is served from the cache.
        let outcomes = orchestrator.fetch_all(vec![url("a")]).await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_success());
        assert_eq!(stub.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let stub = Arc::new(StubFetcher::new(vec![
            success("ok", "body"),
            FetchOutcome::Terminal { url: url("gone"), status: 404, reason: "status 404".into() },
            FetchOutcome::RetryExhausted {
                url: url("flaky"),
                last_status: Some(429),
                reason: "retry budget exhausted".into(),
            },
        ]));
        let orchestrator = FetchOrchestrator::new(Arc::clone(&stub), shared_cache(4));

        let outcomes = orchestrator
            .fetch_all(vec![url("ok"), url("gone"), url("flaky")])
            .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let stub = Arc::new(StubFetcher::new(vec![FetchOutcome::Terminal {
            url: url("gone"),
            status: 404,
            reason: "status 404".into(),
        }]));
        let cache = shared_cache(4);
        let orchestrator = FetchOrchestrator::new(Arc::clone(&stub), Arc::clone(&cache));

        orchestrator.fetch_all(vec![url("gone")]).await;
        assert!(cache.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_mixed_batch_end_to_end() {
        // 2 URLs already cached, 2 fetched successfully, 1 terminal.
        let stub = Arc::new(StubFetcher::new(vec![
            success("fresh1", "f1"),
            success("fresh2", "f2"),
            FetchOutcome::Terminal { url: url("gone"), status: 404, reason: "status 404".into() },
        ]));
        let cache = shared_cache(8);
        cache.lock().await.put(url("cached1").as_str(), "c1");
        cache.lock().await.put(url("cached2").as_str(), "c2");
        let orchestrator = FetchOrchestrator::new(Arc::clone(&stub), cache);

        let outcomes = orchestrator
            .fetch_all(vec![url("cached1"), url("fresh1"), url("gone"), url("fresh2"), url("cached2")])
            .await;

        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 4);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, FetchOutcome::Terminal { status: 404, .. }))
                .count(),
            1
        );
        // Zero network calls for the cached URLs.
        assert_eq!(stub.call_count().await, 3);
        let calls = stub.calls.lock().await;
        assert!(!calls.iter().any(|u| u.contains("cached")));
    }

    /// Real client against a slow local server: the semaphore must keep
    /// simultaneous in-flight network calls at or below the configured
    /// bound while the whole batch still completes.
    #[tokio::test]
    async fn test_concurrency_bound_is_respected() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                loop {
                    let Ok((mut stream, _)) = listener.accept().await else { break };
                    let active = Arc::clone(&active);
                    let peak = Arc::clone(&peak);
                    tokio::spawn(async move {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);

                        let mut buf = [0u8; 4096];
                        let _ = stream.read(&mut buf).await;
                        tokio::time::sleep(Duration::from_millis(40)).await;
                        let _ = stream
                            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                            .await;
                        let _ = stream.shutdown().await;

                        active.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            });
        }

        let config = FetchConfig {
            max_concurrency: 3,
            jitter_min: Duration::ZERO,
            jitter_max: Duration::ZERO,
            backoff_base: Duration::from_millis(5),
            backoff_max: Duration::from_millis(20),
            ..FetchConfig::default()
        };
        let client = Arc::new(FetchClient::new(config).unwrap());
        let orchestrator = FetchOrchestrator::new(client, shared_cache(16));

        let urls: Vec<Url> = (0..10)
            .map(|i| Url::parse(&format!("http://{}/offer/{}", addr, i)).unwrap())
            .collect();
        let outcomes = orchestrator.fetch_all(urls).await;

        assert_eq!(outcomes.len(), 10);
        assert!(outcomes.iter().all(FetchOutcome::is_success));
        assert!(peak.load(Ordering::SeqCst) <= 3, "peak concurrency {}", peak.load(Ordering::SeqCst));
    }
}
