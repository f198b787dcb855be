//! Error types for the OCR module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for OCR requests
#[derive(Debug, Error)]
pub enum OcrError {
    /// A required setting was not configured
    #[error("OCR is not configured: {0} is missing")]
    MissingConfig(&'static str),

    /// Reading the image failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The OCR service answered with a non-success status
    #[error("OCR service error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },

    /// The OCR service answered with something other than the expected JSON
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

impl From<OcrError> for CrateError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Http(e) => CrateError::Http(e),
            OcrError::Io(e) => CrateError::Io(e),
            _ => CrateError::Ocr(err.to_string()),
        }
    }
}
