//! Unified error types for jobsift.
//!
//! Ordinary fetch failures are not errors: they are surfaced as outcome
//! values by the client so a batch keeps running. This enum covers
//! construction-time misconfiguration and per-listing extraction failures.

/// Unified error types for the jobsift pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cache misconfiguration. Capacity must be positive.
    #[error("invalid cache capacity: {0}")]
    InvalidCapacity(usize),

    /// Malformed criteria configuration (e.g. empty keyword list).
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// Invalid or unsupported URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to construct the HTTP client.
    #[error("http client error: {0}")]
    Http(String),

    /// The board index page could not be retrieved, so there is nothing
    /// to crawl.
    #[error("board index unavailable: {0}")]
    BoardUnavailable(String),

    /// Offer page markup did not match the expected structure. Isolated
    /// to the single offending listing.
    #[error("offer structure mismatch: {0}")]
    OfferStructure(String),
}
