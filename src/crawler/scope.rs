//! Decides which discovered links may enter the frontier.

use url::Url;

/// Extensions that never lead to an HTML document.
const SKIP_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".bmp", ".pdf", ".xml", ".css",
    ".js", ".json", ".zip", ".gz", ".tar", ".rar", ".7z", ".doc", ".docx", ".xls", ".xlsx",
    ".ppt", ".pptx", ".mp3", ".mp4", ".avi", ".woff", ".woff2", ".ttf",
];

/// Host plus explicit port, the part of a URL that has to match the seed.
pub fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

/// Returns true when `link` belongs to `base_domain` and looks like an HTML page.
///
/// `base_domain` is the authority of the seed URL (see [`authority`]).
/// Unparseable links are rejected.
pub fn is_valid_link(base_domain: &str, link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => is_valid_url(base_domain, &url),
        Err(_) => false,
    }
}

/// [`is_valid_link`] for an already-parsed URL.
pub fn is_valid_url(base_domain: &str, url: &Url) -> bool {
    let host = authority(url);
    if !host.is_empty() && !host.eq_ignore_ascii_case(base_domain) {
        return false;
    }

    let path = url.path().to_ascii_lowercase();
    if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }

    // Only the last segment can carry an extension; "/v1.2/guide" has none.
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if last_segment.contains('.') && !last_segment.ends_with(".html") {
        return false;
    }

    true
}
