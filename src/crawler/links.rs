//! Outbound link discovery

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::crawler::normalize::normalize_url;
use crate::crawler::scope::is_valid_url;

/// Extract every in-scope link of a page, resolved against `page_url` and
/// normalized. Duplicates are kept out of the returned list, but nothing is
/// checked against the visited set; that is the scheduler's job.
pub fn extract_links(html: &str, page_url: &Url, base_domain: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let resolved = match page_url.join(href.trim()) {
            Ok(url) => url,
            Err(e) => {
                debug!("Ignoring unresolvable href '{}': {}", href, e);
                continue;
            }
        };

        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        if !is_valid_url(base_domain, &resolved) {
            debug!("Out of scope: {}", resolved);
            continue;
        }

        let canonical = normalize_url(resolved.as_str());
        if !links.contains(&canonical) {
            links.push(canonical);
        }
    }

    links
}
