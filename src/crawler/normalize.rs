//! Canonical URL form used as the visited-set key and for link comparison.
//!
//! Three rewrites are applied, in order:
//! 1. the fragment is dropped,
//! 2. query parameters whose key starts with a tracking prefix are dropped,
//! 3. trailing slashes are stripped from a non-root path.
//!
//! The result is stable under re-application.

use url::{Url, form_urlencoded};

/// Query keys starting with any of these are tracking noise.
const TRACKING_PREFIXES: &[&str] = &["utm_", "fbclid"];

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PREFIXES
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

/// Whether one raw `key=value` query segment carries a tracking key.
fn is_tracking_segment(segment: &str) -> bool {
    let raw_key = segment.split('=').next().unwrap_or_default();
    form_urlencoded::parse(raw_key.as_bytes())
        .next()
        .is_some_and(|(key, _)| is_tracking_param(&key))
}

/// Normalize a parsed absolute URL in place.
///
/// Query segments that survive are kept byte for byte; the query is only
/// rewritten when a tracking parameter was actually removed.
pub fn normalize_parsed(url: &mut Url) {
    url.set_fragment(None);

    if let Some(query) = url.query() {
        let segments: Vec<&str> = query.split('&').collect();
        let kept: Vec<&str> = segments
            .iter()
            .copied()
            .filter(|segment| !is_tracking_segment(segment))
            .collect();

        if kept.len() < segments.len() {
            let rebuilt = kept
                .into_iter()
                .filter(|segment| !segment.is_empty())
                .collect::<Vec<_>>()
                .join("&");
            if rebuilt.is_empty() {
                url.set_query(None);
            } else {
                url.set_query(Some(&rebuilt));
            }
        }
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        url.set_path(&trimmed);
    }
}

/// Canonicalize an absolute URL string.
///
/// Strings that do not parse as absolute URLs are returned with only the
/// fragment stripped, so the function stays total and idempotent.
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            normalize_parsed(&mut url);
            canonical_string(&url)
        }
        Err(_) => raw.split('#').next().unwrap_or_default().to_string(),
    }
}

/// `Url` always serializes the root path as "/"; drop it so that
/// `http://a.com/` and `http://a.com` share one key.
fn canonical_string(url: &Url) -> String {
    let s = url.as_str();
    if url.path() == "/" && url.query().is_none() && s.ends_with('/') {
        s[..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fragment_tracking_and_trailing_slash() {
        assert_eq!(
            normalize_url("http://a.com/page/?utm_source=x&ref=y#frag"),
            "http://a.com/page?ref=y"
        );
    }

    #[test]
    fn test_drops_query_when_only_tracking_params_remain() {
        assert_eq!(
            normalize_url("https://a.com/post?utm_medium=mail&fbclid=abc"),
            "https://a.com/post"
        );
        assert_eq!(
            normalize_url("https://a.com/post?fbclid_extra=1&id=7"),
            "https://a.com/post?id=7"
        );
    }

    #[test]
    fn test_root_forms_collapse() {
        assert_eq!(normalize_url("http://a.com/"), "http://a.com");
        assert_eq!(normalize_url("http://a.com"), "http://a.com");
        assert_eq!(normalize_url("http://a.com/#top"), "http://a.com");
    }

    #[test]
    fn test_repeated_trailing_slashes_are_removed() {
        assert_eq!(normalize_url("http://a.com/docs//"), "http://a.com/docs");
        assert_eq!(normalize_url("http://a.com//"), "http://a.com");
    }

    #[test]
    fn test_non_tracking_query_order_is_preserved() {
        assert_eq!(
            normalize_url("http://a.com/s?b=2&utm_campaign=z&a=1"),
            "http://a.com/s?b=2&a=1"
        );
    }

    #[test]
    fn test_untouched_query_is_kept_verbatim() {
        assert_eq!(normalize_url("http://a.com/s?flag"), "http://a.com/s?flag");
        assert_eq!(
            normalize_url("http://a.com/s?q=hello%20world"),
            "http://a.com/s?q=hello%20world"
        );
        assert_eq!(
            normalize_url("http://a.com/s?path=a/b&utm_source=x&flag"),
            "http://a.com/s?path=a/b&flag"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "http://a.com/page/?utm_source=x&ref=y#frag",
            "http://a.com/",
            "https://a.com/docs//",
            "https://a.com/a/b/?fbclid=1",
            "https://a.com:8080/x/?q=hello%20world#s",
            "https://a.com/?utm_source=x",
            "not a url#frag",
        ];
        for input in inputs {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once, "not idempotent for {input}");
        }
    }
}
