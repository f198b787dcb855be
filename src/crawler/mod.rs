//! # Website Crawler Module
//!
//! Breadth-first crawling of a single domain, starting from a seed URL and
//! bounded by a maximum link depth. Every fetched HTML page is run through the
//! [segmenter](crate::segmenter) and reported as a [`CrawledPage`].
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: Configuration for the crawler (depth, concurrency, timeout, etc.)
//! - `normalize_url` / `is_valid_link`: canonical URLs and the link scope rules
//! - `PageFetcher` / `HttpFetcher`: page retrieval with content-type gating
//! - `Frontier`: the BFS queue and the visited set
//! - `Crawler` / `crawl_site`: the scheduler tying it all together
//!
//! ## Failure Model
//!
//! A page that cannot be fetched, is not HTML or answers with an error status
//! is logged and skipped. Only an unusable seed URL fails the whole crawl.

mod config;
mod error;
mod fetcher;
mod frontier;
mod links;
mod normalize;
mod scheduler;
mod scope;

pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use error::CrawlError;
pub use fetcher::{HttpFetcher, Page, PageFetcher, is_html_content_type};
pub use frontier::{Frontier, FrontierEntry, VisitedSet};
pub use links::extract_links;
pub use normalize::{normalize_parsed, normalize_url};
pub use scheduler::{CrawlReport, CrawlStats, Crawler, crawl_site};
pub use scope::{authority, is_valid_link, is_valid_url};

use serde::{Deserialize, Serialize};

use crate::segmenter::ContentBlock;

/// A crawled page with its extracted blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledPage {
    /// Canonical URL of the page
    pub url: String,

    /// Link distance from the seed
    pub depth: u32,

    /// Deduplicated content blocks in document order
    pub blocks: Vec<ContentBlock>,
}
