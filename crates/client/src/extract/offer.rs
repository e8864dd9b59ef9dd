//! Structured extraction of a single job-offer page.
//!
//! One offer page carries three sources of truth:
//! - a JSON-LD `JobPosting` script with description, salary, and location
//! - a strip of four "extra data" items (published, contract type,
//!   seniority, remote-work mode)
//! - the tech stack rendered as h4 name / span level pairs
//!
//! The class-name selectors are tied to the board's current markup and are
//! expected to break when the site redesigns; every mismatch is reported
//! as [`Error::OfferStructure`] and isolated to the single listing.

use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use jobsift_core::{Error, JobOffer, TechStackEntry};

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;
const TITLE_SELECTOR: &str = "title";
const EXTRA_DATA_SELECTOR: &str = "div.MuiStack-root.mui-aa3a55";
const TECH_NAME_SELECTOR: &str = "h4.MuiTypography-root.MuiTypography-subtitle2.mui-p733mp";
const TECH_LEVEL_SELECTOR: &str = "span.MuiTypography-root.MuiTypography-subtitle4.mui-1xcqefb";

/// JSON-LD `JobPosting` payload embedded in each offer page.
#[derive(Debug, Deserialize)]
struct LdJobPosting {
    description: String,
    #[serde(rename = "baseSalary", default)]
    base_salary: Option<LdSalary>,
    #[serde(rename = "jobLocation")]
    job_location: LdLocation,
}

#[derive(Debug, Deserialize)]
struct LdSalary {
    currency: String,
    value: LdSalaryValue,
}

#[derive(Debug, Deserialize)]
struct LdSalaryValue {
    #[serde(rename = "unitText")]
    per: String,
    #[serde(rename = "minValue")]
    min: i64,
    #[serde(rename = "maxValue")]
    max: i64,
}

#[derive(Debug, Deserialize)]
struct LdLocation {
    address: LdAddress,
}

#[derive(Debug, Deserialize)]
struct LdAddress {
    #[serde(rename = "addressCountry")]
    country: String,
    #[serde(rename = "addressLocality")]
    city: String,
}

/// Seam between the pipeline and the board's markup, so the driver can be
/// exercised without real pages.
pub trait OfferExtractor: Send + Sync {
    /// Turn one raw offer page into a structured listing.
    fn extract(&self, html: &str, url: &Url) -> Result<JobOffer, Error>;
}

/// Extractor for the board's current markup.
#[derive(Debug, Default)]
pub struct BoardMarkupExtractor;

impl OfferExtractor for BoardMarkupExtractor {
    fn extract(&self, html: &str, url: &Url) -> Result<JobOffer, Error> {
        extract_offer(html, url)
    }
}

/// Extract a structured [`JobOffer`] from one offer page.
///
/// # Errors
///
/// Returns [`Error::OfferStructure`] when the page does not carry the
/// expected JSON-LD script, title, extra-data strip, or tech stack.
pub fn extract_offer(html: &str, url: &Url) -> Result<JobOffer, Error> {
    let document = Html::parse_document(html);

    let posting = parse_ld_json(&document)?;
    let title = select_text(&document, TITLE_SELECTOR)
        .ok_or_else(|| Error::OfferStructure("offer page has no title".into()))?;
    let (seniority, remote_form) = extract_extra_data(&document)?;
    let tech_stack = extract_tech_stack(&document);

    let (salary_min, salary_max, salary_currency, salary_per) = match posting.base_salary {
        Some(salary) => (
            Some(salary.value.min),
            Some(salary.value.max),
            Some(salary.currency),
            Some(salary.value.per),
        ),
        None => (None, None, None, None),
    };

    Ok(JobOffer {
        title,
        description: posting.description,
        tech_stack,
        location_country: posting.job_location.address.country,
        location_city: posting.job_location.address.city,
        remote_form,
        seniority,
        url: url.as_str().to_owned(),
        salary_min,
        salary_max,
        salary_currency,
        salary_per,
    })
}

fn parse_ld_json(document: &Html) -> Result<LdJobPosting, Error> {
    let selector = Selector::parse(LD_JSON_SELECTOR).expect("invalid selector");
    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| Error::OfferStructure("offer page has no JSON-LD script".into()))?;

    let raw = script.text().collect::<String>();
    serde_json::from_str(&raw).map_err(|e| Error::OfferStructure(format!("malformed JSON-LD payload: {}", e)))
}

/// Contract type, experience level, remote work options. The strip always
/// renders exactly four items: published-at, contract, seniority, remote.
fn extract_extra_data(document: &Html) -> Result<(String, String), Error> {
    let selector = Selector::parse(EXTRA_DATA_SELECTOR).expect("invalid selector");
    let items: Vec<String> = document.select(&selector).map(element_text).collect();

    match items.as_slice() {
        [_published, _contract, seniority, remote_form] => Ok((seniority.clone(), remote_form.clone())),
        _ => Err(Error::OfferStructure(format!(
            "expected 4 extra data items, got {}",
            items.len()
        ))),
    }
}

fn extract_tech_stack(document: &Html) -> Vec<TechStackEntry> {
    let names = Selector::parse(TECH_NAME_SELECTOR).expect("invalid selector");
    let levels = Selector::parse(TECH_LEVEL_SELECTOR).expect("invalid selector");

    document
        .select(&names)
        .zip(document.select(&levels))
        .map(|(name, level)| TechStackEntry { technology: element_text(name), level: element_text(level) })
        .collect()
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).expect("invalid selector");
    document.select(&selector).next().map(element_text)
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer_url() -> Url {
        Url::parse("https://justjoin.it/job-offer/acme-rust-engineer").unwrap()
    }

    fn offer_html(ld_json: &str, extra_items: &[&str], tech: &[(&str, &str)]) -> String {
        let extra = extra_items
            .iter()
            .map(|item| format!(r#"<div class="MuiStack-root mui-aa3a55">{item}</div>"#))
            .collect::<String>();
        let tech_names = tech
            .iter()
            .map(|(name, _)| {
                format!(r#"<h4 class="MuiTypography-root MuiTypography-subtitle2 mui-p733mp">{name}</h4>"#)
            })
            .collect::<String>();
        let tech_levels = tech
            .iter()
            .map(|(_, level)| {
                format!(r#"<span class="MuiTypography-root MuiTypography-subtitle4 mui-1xcqefb">{level}</span>"#)
            })
            .collect::<String>();

        format!(
            r#"<html><head>
                <title>Rust Engineer - Acme</title>
                <script type="application/ld+json">{ld_json}</script>
            </head><body>{extra}{tech_names}{tech_levels}</body></html>"#
        )
    }

    fn full_ld_json() -> &'static str {
        r#"{
            "description": "Build systems software.",
            "baseSalary": {
                "currency": "PLN",
                "value": { "unitText": "MONTH", "minValue": 20000, "maxValue": 28000 }
            },
            "jobLocation": {
                "address": { "addressCountry": "Poland", "addressLocality": "Gdańsk" }
            }
        }"#
    }

    #[test]
    fn test_extract_complete_offer() {
        let html = offer_html(
            full_ld_json(),
            &["New", "B2B", "Senior", "Hybrid"],
            &[("Rust", "advanced"), ("Python", "regular")],
        );

        let offer = extract_offer(&html, &offer_url()).unwrap();

        assert_eq!(offer.title, "Rust Engineer - Acme");
        assert_eq!(offer.description, "Build systems software.");
        assert_eq!(offer.seniority, "Senior");
        assert_eq!(offer.remote_form, "Hybrid");
        assert_eq!(offer.location_city, "Gdańsk");
        assert_eq!(offer.location_country, "Poland");
        assert_eq!(offer.salary_min, Some(20_000));
        assert_eq!(offer.salary_max, Some(28_000));
        assert_eq!(offer.salary_currency.as_deref(), Some("PLN"));
        assert_eq!(offer.salary_per.as_deref(), Some("MONTH"));
        assert_eq!(
            offer.tech_stack,
            vec![
                TechStackEntry { technology: "Rust".into(), level: "advanced".into() },
                TechStackEntry { technology: "Python".into(), level: "regular".into() },
            ]
        );
        assert_eq!(offer.url, offer_url().as_str());
    }

    #[test]
    fn test_offer_without_salary() {
        let ld = r#"{
            "description": "No salary disclosed.",
            "jobLocation": { "address": { "addressCountry": "Poland", "addressLocality": "Warszawa" } }
        }"#;
        let html = offer_html(ld, &["New", "B2B", "Mid", "Remote"], &[("Python", "regular")]);

        let offer = extract_offer(&html, &offer_url()).unwrap();
        assert_eq!(offer.salary_min, None);
        assert_eq!(offer.salary_currency, None);
        assert_eq!(offer.remote_form, "Remote");
    }

    #[test]
    fn test_missing_ld_json_is_structure_error() {
        let html = "<html><head><title>t</title></head><body></body></html>";
        let result = extract_offer(html, &offer_url());
        assert!(matches!(result, Err(Error::OfferStructure(_))));
    }

    #[test]
    fn test_malformed_ld_json_is_structure_error() {
        let html = offer_html("{ not json }", &["a", "b", "c", "d"], &[]);
        let result = extract_offer(&html, &offer_url());
        assert!(matches!(result, Err(Error::OfferStructure(_))));
    }

    #[test]
    fn test_wrong_extra_data_count_is_structure_error() {
        let html = offer_html(full_ld_json(), &["New", "B2B", "Senior"], &[]);
        let result = extract_offer(&html, &offer_url());
        assert!(matches!(
            result,
            Err(Error::OfferStructure(msg)) if msg.contains("expected 4 extra data items")
        ));
    }

    #[test]
    fn test_extractor_trait_delegates() {
        let html = offer_html(full_ld_json(), &["New", "B2B", "Senior", "Hybrid"], &[("Rust", "advanced")]);
        let extractor = BoardMarkupExtractor;
        let offer = extractor.extract(&html, &offer_url()).unwrap();
        assert_eq!(offer.title, "Rust Engineer - Acme");
    }
}
