//! Domain models for parsed job listings.

use serde::{Deserialize, Serialize};

use crate::criteria::{Criteria, MatchContext, all_satisfied};

/// One technology listed on an offer page, with the advertised level of
/// advancement (e.g. "regular", "advanced").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStackEntry {
    pub technology: String,
    pub level: String,
}

/// A structured job listing extracted from one offer page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOffer {
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<TechStackEntry>,
    pub location_country: String,
    pub location_city: String,
    /// Remote-work mode as advertised ("Remote", "Hybrid", "Office").
    pub remote_form: String,
    pub seniority: String,
    pub url: String,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub salary_currency: Option<String>,
    #[serde(default)]
    pub salary_per: Option<String>,
}

impl JobOffer {
    /// The facts the criteria engine evaluates for this offer.
    pub fn match_context(&self) -> MatchContext<'_> {
        MatchContext {
            tech_stack: &self.tech_stack,
            remote_form: &self.remote_form,
            city: &self.location_city,
        }
    }

    /// Whether this offer satisfies every configured criterion.
    pub fn matches_criteria(&self, criteria: &[Criteria]) -> bool {
        all_satisfied(criteria, &self.match_context())
    }
}
