//! Criteria engine: pure boolean evaluation of fuzzy keyword rules.
//!
//! A criterion is a list of keywords plus a combinator (`all` /
//! `at_least_one`). Technology keywords match against the listing's tech
//! stack; location keywords match the remote-work form and, optionally,
//! the city. Keyword comparison is fuzzy (see [`similarity`]).
//!
//! Criteria are immutable configuration: they own no runtime state and are
//! reused across many listings. A listing qualifies for the pipeline iff it
//! satisfies every configured criterion.

pub mod similarity;

use serde::{Deserialize, Serialize};

pub use similarity::{SIMILARITY_THRESHOLD, similarity_ratio, words_are_similar};

use crate::Error;
use crate::models::TechStackEntry;

/// Combinator over a criterion's keyword list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Every keyword must have at least one similar match.
    All,
    /// At least one keyword must have a similar match.
    AtLeastOne,
}

/// A required technology, e.g. "Rust".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechKeyword {
    pub name: String,
}

/// A required work arrangement: remote-work form plus an optional city.
///
/// When `city` is omitted the keyword matches on the form alone
/// (e.g. fully remote positions have no meaningful city).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationKeyword {
    pub form: String,
    #[serde(default)]
    pub city: Option<String>,
}

/// One configured filtering rule, either over technologies or locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criteria {
    Tech { keywords: Vec<TechKeyword>, rule: Rule },
    Location { keywords: Vec<LocationKeyword>, rule: Rule },
}

/// The listing facts a criterion is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub tech_stack: &'a [TechStackEntry],
    pub remote_form: &'a str,
    pub city: &'a str,
}

impl Criteria {
    /// Reject malformed criteria at construction time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCriteria`] for an empty keyword list or a
    /// keyword with an empty required value.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Criteria::Tech { keywords, .. } => {
                if keywords.is_empty() {
                    return Err(Error::InvalidCriteria("tech criterion has no keywords".into()));
                }
                if keywords.iter().any(|k| k.name.trim().is_empty()) {
                    return Err(Error::InvalidCriteria("tech keyword name is empty".into()));
                }
            }
            Criteria::Location { keywords, .. } => {
                if keywords.is_empty() {
                    return Err(Error::InvalidCriteria("location criterion has no keywords".into()));
                }
                if keywords.iter().any(|k| k.form.trim().is_empty()) {
                    return Err(Error::InvalidCriteria("location keyword form is empty".into()));
                }
            }
        }
        Ok(())
    }

    /// Pure evaluation of this criterion against one listing.
    pub fn is_satisfied(&self, context: &MatchContext<'_>) -> bool {
        match self {
            Criteria::Tech { keywords, rule } => rule.combine(keywords.iter().map(|keyword| {
                context
                    .tech_stack
                    .iter()
                    .any(|entry| words_are_similar(&keyword.name, &entry.technology))
            })),
            Criteria::Location { keywords, rule } => rule.combine(keywords.iter().map(|keyword| {
                words_are_similar(&keyword.form, context.remote_form)
                    && keyword
                        .city
                        .as_deref()
                        .is_none_or(|city| words_are_similar(city, context.city))
            })),
        }
    }
}

impl Rule {
    fn combine(self, mut matches: impl Iterator<Item = bool>) -> bool {
        match self {
            Rule::All => matches.all(|m| m),
            Rule::AtLeastOne => matches.any(|m| m),
        }
    }
}

/// Top-level composition: every criterion must be satisfied.
pub fn all_satisfied(criteria: &[Criteria], context: &MatchContext<'_>) -> bool {
    criteria.iter().all(|c| c.is_satisfied(context))
}
