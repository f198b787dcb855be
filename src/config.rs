//! # Process Configuration
//!
//! `AppConfig` is read once from the environment at startup and handed to the
//! crawler and OCR client constructors. Nothing here is global or mutable after
//! construction, so tests build their own configurations directly.
//!
//! | Variable            | Default | Meaning                               |
//! |---------------------|---------|---------------------------------------|
//! | `MAX_DEPTH`         | 3       | crawl depth used when none is given   |
//! | `REQUEST_TIMEOUT`   | 5       | per-request timeout in seconds        |
//! | `CRAWL_CONCURRENCY` | 4       | concurrent fetch-and-segment workers  |
//! | `OCR_API_URL`       | unset   | external OCR endpoint                 |
//! | `OCR_MODEL`         | unset   | model identifier sent with the upload |
//! | `OCR_LANG`          | unset   | language code sent with the upload    |

use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Hard ceiling applied to every requested crawl depth.
pub const MAX_DEPTH_CEILING: u32 = 5;

const DEFAULT_MAX_DEPTH: u32 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for the external OCR service. Every field is optional; missing
/// values are reported when an OCR request is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrSettings {
    /// Endpoint accepting the multipart image upload
    pub api_url: Option<String>,

    /// Model identifier forwarded with the upload
    pub model: Option<String>,

    /// Language code forwarded with the upload
    pub lang: Option<String>,
}

/// Immutable process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Depth used when a crawl request does not name one
    pub max_depth: u32,

    /// Timeout applied to each page fetch
    pub request_timeout: Duration,

    /// Width of the crawl worker pool
    pub concurrency: usize,

    /// External OCR service settings
    pub ocr: OcrSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            ocr: OcrSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_depth = parse_or(&lookup, "MAX_DEPTH", DEFAULT_MAX_DEPTH)?;
        let timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let concurrency = parse_or(&lookup, "CRAWL_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(Error::Config(
                "CRAWL_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            max_depth,
            request_timeout: Duration::from_secs(timeout_secs),
            concurrency,
            ocr: OcrSettings {
                api_url: non_empty("OCR_API_URL"),
                model: non_empty("OCR_MODEL"),
                lang: non_empty("OCR_LANG"),
            },
        })
    }

    /// Resolve the depth for one crawl request, never exceeding [`MAX_DEPTH_CEILING`]
    pub fn clamp_depth(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.max_depth)
            .min(MAX_DEPTH_CEILING)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid {key} '{raw}': {e}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.ocr.api_url.is_none());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MAX_DEPTH", "2"),
            ("REQUEST_TIMEOUT", "10"),
            ("CRAWL_CONCURRENCY", "8"),
            ("OCR_API_URL", "http://ocr.local/predict"),
            ("OCR_MODEL", "ppocr"),
            ("OCR_LANG", "vi"),
        ]))
        .unwrap();

        assert_eq!(config.max_depth, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.ocr.api_url.as_deref(), Some("http://ocr.local/predict"));
        assert_eq!(config.ocr.model.as_deref(), Some("ppocr"));
        assert_eq!(config.ocr.lang.as_deref(), Some("vi"));
    }

    #[test]
    fn test_invalid_number_is_a_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("MAX_DEPTH", "deep")]));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("MAX_DEPTH")));

        let result = AppConfig::from_lookup(lookup_from(&[("CRAWL_CONCURRENCY", "0")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_ocr_values_are_treated_as_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[("OCR_MODEL", "  ")])).unwrap();
        assert!(config.ocr.model.is_none());
    }

    #[test]
    fn test_clamp_depth() {
        let config = AppConfig::default();
        assert_eq!(config.clamp_depth(None), 3);
        assert_eq!(config.clamp_depth(Some(1)), 1);
        assert_eq!(config.clamp_depth(Some(5)), 5);
        assert_eq!(config.clamp_depth(Some(9)), config.clamp_depth(Some(5)));

        let deep = AppConfig {
            max_depth: 12,
            ..AppConfig::default()
        };
        assert_eq!(deep.clamp_depth(None), MAX_DEPTH_CEILING);
    }
}
