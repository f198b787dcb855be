//! Error types for the sitesift crate

use thiserror::Error;

/// Result type for sitesift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sitesift operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// OCR service error
    #[error("OCR error: {0}")]
    Ocr(String),
}
