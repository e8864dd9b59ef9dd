//! HTML report rendering for matched offers.

use askama::Template;
use chrono::Local;

use jobsift_core::JobOffer;

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    report_date: String,
    rows: Vec<ReportRow>,
}

/// One offer flattened into display-ready strings.
struct ReportRow {
    title: String,
    url: String,
    location: String,
    remote_form: String,
    seniority: String,
    salary: String,
    tech: String,
}

impl ReportRow {
    fn from_offer(offer: &JobOffer) -> Self {
        Self {
            title: offer.title.clone(),
            url: offer.url.clone(),
            location: format!("{}, {}", offer.location_city, offer.location_country),
            remote_form: offer.remote_form.clone(),
            seniority: offer.seniority.clone(),
            salary: format_salary(offer),
            tech: offer
                .tech_stack
                .iter()
                .map(|entry| format!("{} ({})", entry.technology, entry.level))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn format_salary(offer: &JobOffer) -> String {
    match (offer.salary_min, offer.salary_max, &offer.salary_currency, &offer.salary_per) {
        (Some(min), Some(max), Some(currency), Some(per)) => {
            format!("{} - {} {} / {}", thousands(min), thousands(max), currency, per)
        }
        _ => "Undisclosed".to_owned(),
    }
}

/// Group digits with commas: 20000 -> "20,000".
fn thousands(value: i64) -> String {
    let raw = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, digit) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0 { format!("-{grouped}") } else { grouped }
}

/// Render the matched offers as a standalone HTML document.
///
/// # Errors
///
/// Returns `askama::Error` if template rendering fails.
pub fn render(offers: &[JobOffer]) -> Result<String, askama::Error> {
    ReportTemplate {
        report_date: Local::now().format("%B %d, %Y").to_string(),
        rows: offers.iter().map(ReportRow::from_offer).collect(),
    }
    .render()
}
