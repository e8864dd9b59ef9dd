//! Pipeline driver: board index -> candidate links -> bounded fetches ->
//! extraction -> criteria filtering.
//!
//! A run always completes: per-listing fetch and extraction failures are
//! counted and logged, never propagated.

use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;

use jobsift_client::{
    BoardMarkupExtractor, FetchClient, FetchConfig, FetchOrchestrator, FetchOutcome, Fetcher, OfferExtractor,
    board_url, extract_board_links,
};
use jobsift_core::{AppConfig, Error, JobOffer, RecencyCache};

/// Counters reported at the end of every run, even under partial failure.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Offer pages retrieved successfully (network or cache).
    pub fetched: usize,
    /// Offer pages that failed terminally or exhausted their retry budget.
    pub failed: usize,
    /// Retrieved pages dropped because extraction failed.
    pub skipped: usize,
    /// Offers satisfying every configured criterion.
    pub matched: usize,
}

/// Run the full pipeline with a real HTTP client and the board extractor.
pub async fn run(config: &AppConfig) -> Result<(Vec<JobOffer>, RunStats), Error> {
    let client = Arc::new(FetchClient::new(FetchConfig::from_app(config))?);
    run_with(client, &BoardMarkupExtractor, config).await
}

/// Pipeline core, generic over the fetch and extraction seams.
pub async fn run_with<F, E>(fetcher: Arc<F>, extractor: &E, config: &AppConfig) -> Result<(Vec<JobOffer>, RunStats), Error>
where
    F: Fetcher + 'static,
    E: OfferExtractor + ?Sized,
{
    let cache = Arc::new(Mutex::new(RecencyCache::new(config.cache_capacity)?));

    let board = board_url(&config.board_url, &config.language, &config.skills)
        .map_err(|e| Error::InvalidUrl(e.to_string()))?;
    tracing::info!(%board, "fetching board index");

    let index_body = match fetcher.fetch(board).await {
        FetchOutcome::Success { body, .. } => body,
        FetchOutcome::Terminal { status, reason, .. } => {
            return Err(Error::BoardUnavailable(format!("status {status}: {reason}")));
        }
        FetchOutcome::RetryExhausted { reason, .. } => return Err(Error::BoardUnavailable(reason)),
    };

    let base = Url::parse(&config.board_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let candidates = extract_board_links(&index_body, &base);
    tracing::info!(candidates = candidates.len(), "extracted candidate offer links");

    let orchestrator = FetchOrchestrator::new(fetcher, cache);
    let outcomes = orchestrator.fetch_all(candidates).await;

    let mut stats = RunStats::default();
    let mut offers = Vec::new();

    for outcome in outcomes {
        match outcome {
            FetchOutcome::Success { url, body } => {
                stats.fetched += 1;
                match extractor.extract(&body, &url) {
                    Ok(offer) => offers.push(offer),
                    Err(e) => {
                        stats.skipped += 1;
                        tracing::warn!(%url, error = %e, "offer extraction failed, skipping listing");
                    }
                }
            }
            FetchOutcome::Terminal { url, status, reason } => {
                stats.failed += 1;
                tracing::warn!(%url, status, %reason, "offer fetch failed terminally");
            }
            FetchOutcome::RetryExhausted { url, last_status, reason } => {
                stats.failed += 1;
                tracing::warn!(%url, ?last_status, %reason, "offer fetch exhausted retries");
            }
        }
    }

    let matched: Vec<JobOffer> = offers
        .into_iter()
        .filter(|offer| offer.matches_criteria(&config.criteria))
        .collect();
    stats.matched = matched.len();

    tracing::info!(
        fetched = stats.fetched,
        failed = stats.failed,
        skipped = stats.skipped,
        matched = stats.matched,
        "pipeline run complete"
    );

    Ok((matched, stats))
}
