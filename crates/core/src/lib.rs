//! Core types and shared functionality for jobsift.
//!
//! This crate provides:
//! - The fixed-capacity recency (LRU) cache
//! - The criteria engine and fuzzy string similarity
//! - Domain models for parsed job listings
//! - Unified error types
//! - Layered application configuration

pub mod cache;
pub mod config;
pub mod criteria;
pub mod error;
pub mod models;

pub use cache::RecencyCache;
pub use config::{AppConfig, ConfigError};
pub use criteria::{Criteria, LocationKeyword, MatchContext, Rule, TechKeyword};
pub use error::Error;
pub use models::{JobOffer, TechStackEntry};
