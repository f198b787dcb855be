//! # Crawler Configuration Module
//!
//! This module provides configuration options for the crawler, including the
//! depth bound, worker pool width, per-request timeout and the segmenter
//! settings used for every fetched page. It uses a builder pattern for
//! flexible configuration.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: The main configuration struct with crawler parameters
//! - `CrawlerConfigBuilder`: Builder pattern implementation for easier configuration

use std::time::Duration;

use crate::config::AppConfig;
use crate::segmenter::SegmenterConfig;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum link depth; the seed is depth 0
    pub max_depth: u32,

    /// Number of pages fetched and segmented concurrently
    pub concurrency: usize,

    /// Timeout for each page request
    pub request_timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,

    /// Optional cap on the number of pages fetched
    pub max_pages: Option<usize>,

    /// Settings for block extraction
    pub segmenter: SegmenterConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            concurrency: 4,
            request_timeout: Duration::from_secs(5),
            user_agent: format!(
                "Mozilla/5.0 (compatible; sitesift/{})",
                env!("CARGO_PKG_VERSION")
            ),
            max_pages: None,
            segmenter: SegmenterConfig::default(),
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum depth to crawl
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set the number of concurrent workers (at least one)
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency.max(1);
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.request_timeout = request_timeout;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Stop after this many pages have been fetched
    pub fn max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the segmenter settings
    pub fn segmenter(mut self, segmenter: SegmenterConfig) -> Self {
        self.config.segmenter = segmenter;
        self
    }

    /// Set the CSS selectors for elements to exclude
    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.segmenter.exclude_selectors = exclude_selectors;
        self
    }

    /// Set the CSS selectors for the main content container
    pub fn content_selectors(mut self, content_selectors: Vec<String>) -> Self {
        self.config.segmenter.content_selectors = content_selectors;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Builder seeded from the process configuration, with the depth already
    /// clamped for this request
    pub fn from_app(app: &AppConfig, requested_depth: Option<u32>) -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
            .max_depth(app.clamp_depth(requested_depth))
            .concurrency(app.concurrency)
            .request_timeout(app.request_timeout)
    }
}
