//! # sitesift - Same-Domain Crawling with Structural Block Extraction
//!
//! This crate crawls a website breadth-first within the seed's domain and turns
//! every fetched page into a clean sequence of (title, content) blocks, with
//! navigation chrome, ads and repeated or nested fragments removed. The blocks
//! are meant for downstream indexing or summarization.
//!
//! ## Features
//!
//! - Breadth-first crawling bounded by link depth, with a visited set keyed on
//!   canonical URLs (fragments and tracking parameters removed)
//! - Concurrent fetch-and-segment workers with per-request timeouts and
//!   job-level cancellation
//! - Heuristic title/content segmentation of arbitrary HTML
//! - Exact, structural and similarity-based block deduplication
//! - Grouping of external OCR detections into lines of text
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitesift::crawler::{CrawlerConfig, crawl_site};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::builder().max_depth(1).build();
//!     let pages = crawl_site("https://example.com", config).await?;
//!
//!     for page in pages {
//!         println!("{} ({} blocks)", page.url, page.blocks.len());
//!         for block in page.blocks {
//!             println!("  {}: {}", block.title, block.content);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
mod error;
pub mod ocr;
pub mod segmenter;

pub use config::AppConfig;
pub use error::{Error, Result};
