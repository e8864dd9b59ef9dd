//! Candidate offer links harvested from the board index page.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

/// Anchor class the board uses for individual offer cards.
const OFFER_CARD_SELECTOR: &str = "a.offer-card[href]";

/// Extract offer URLs from the board index, resolving relative hrefs
/// against the base URL and removing duplicates.
pub fn extract_board_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(OFFER_CARD_SELECTOR).expect("invalid selector");

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else { continue };

        let resolved = match base_url.join(href.trim_start_matches('/')) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(%href, error = %e, "skipping unresolvable offer link");
                continue;
            }
        };

        if seen.insert(resolved.as_str().to_owned()) {
            links.push(resolved);
        }
    }

    links
}
