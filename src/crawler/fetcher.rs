//! Page retrieval for the crawler
//!
//! The scheduler talks to a [`PageFetcher`], so tests can drive it with an
//! in-memory site while production uses [`HttpFetcher`].

use std::future::Future;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use crate::crawler::error::CrawlError;

/// A fetched HTML document
#[derive(Debug, Clone)]
pub struct Page {
    /// Canonical URL the page was requested under
    pub url: String,

    /// Depth at which the page was reached
    pub depth: u32,

    /// Raw response body
    pub raw_html: String,

    /// Declared content type
    pub content_type: String,
}

/// Something that can retrieve the HTML body behind a URL
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetch `url`. Implementations must return [`CrawlError::NotHtml`] for
    /// responses whose content type does not contain `text/html`.
    fn fetch(
        &self,
        url: &str,
        depth: u32,
    ) -> impl Future<Output = Result<Page, CrawlError>> + Send;
}

/// `PageFetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
}

impl HttpFetcher {
    /// Build a fetcher that sends `user_agent` and gives up after `timeout`
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CrawlError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

/// Whether a declared content type is handed to the segmenter
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str, depth: u32) -> Result<Page, CrawlError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !is_html_content_type(&content_type) {
            return Err(CrawlError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let raw_html = response.text().await?;
        debug!("Fetched {} bytes from {}", raw_html.len(), url);

        Ok(Page {
            url: url.to_string(),
            depth,
            raw_html,
            content_type,
        })
    }
}
