//! URL canonicalization and board URL construction.

use url::Url;

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string for consistent cache keys and dedupe.
///
/// Trims whitespace, requires an http(s) scheme, and drops the fragment.
/// The query string is kept intact.
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Build the board index URL for one language plus optional skill filters,
/// e.g. `https://justjoin.it/job-offers/all-locations/python?skills=Rust`.
pub fn board_url(base: &str, language: &str, skills: &[String]) -> Result<Url, UrlError> {
    let base = canonicalize(base)?;
    let mut url = base
        .join(&format!("job-offers/all-locations/{}", language.to_lowercase()))
        .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    if !skills.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for skill in skills {
            pairs.append_pair("skills", &capitalize_skill(skill));
        }
    }

    Ok(url)
}

/// The board expects all-lowercase skills capitalized ("rust" -> "Rust");
/// mixed-case names (e.g. "PostgreSQL") pass through untouched.
fn capitalize_skill(skill: &str) -> String {
    let has_upper = skill.chars().any(char::is_uppercase);
    let has_lower = skill.chars().any(char::is_lowercase);
    if has_upper || !has_lower {
        return skill.to_string();
    }

    let mut chars = skill.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
