//! Client code for jobsift.
//!
//! This crate provides the resilient HTTP fetch pipeline (jitter, retry
//! with exponential backoff, bounded concurrency, cache-aside batch
//! orchestration) and the board markup extractors consumed by the CLI.

pub mod extract;
pub mod fetch;

pub use extract::{BoardMarkupExtractor, OfferExtractor, extract_board_links, extract_offer};
pub use fetch::{
    FetchClient, FetchConfig, FetchOrchestrator, FetchOutcome, Fetcher, RETRYABLE_STATUS, UrlError, board_url,
    canonicalize,
};
