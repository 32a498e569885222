//! Wallpaper Harvest: a polite single-site wallpaper downloader
//!
//! This crate walks the listing pages of a wallpaper gallery for a category or
//! search keyword, inspects every photo's detail page, keeps desktop-class
//! images only, and stores them under sanitized filenames. A run gives up on
//! the rest of a listing page once it keeps running into images that are
//! already on disk.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod naming;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid crawl request: {0}")]
    InvalidRequest(String),

    #[error("No wallpapers found on the first listing page")]
    EmptyResult,

    #[error("Could not determine the number of listing pages")]
    PaginationUnknown,

    #[error("Session error for {url}: {message}")]
    Session { url: String, message: String },

    #[error("Element `{selector}` not found on {url}")]
    ElementNotFound { url: String, selector: String },

    #[error("Transport error for {url}: {message}")]
    Transport {
        url: String,
        message: String,
        status: Option<u16>,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    /// Returns true if the error ends the whole crawl
    ///
    /// Session, element and transport failures are recovered by skipping the
    /// item or page they happened on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::EmptyResult | Self::PaginationUnknown | Self::Config(_)
        )
    }

    pub(crate) fn session(url: impl ToString, message: impl ToString) -> Self {
        Self::Session {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn transport(url: impl ToString, message: impl ToString) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.to_string(),
            status: None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlRequest, ItemRecord};
pub use output::CrawlSummary;
pub use state::{CrawlState, DownloadOutcome, MAX_DUPLICATE_STREAK};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_crawl_level_errors_are_fatal() {
        assert!(CrawlError::InvalidRequest("empty".into()).is_fatal());
        assert!(CrawlError::EmptyResult.is_fatal());
        assert!(CrawlError::PaginationUnknown.is_fatal());

        assert!(!CrawlError::session("https://example.com/", "closed").is_fatal());
        assert!(!CrawlError::transport("https://example.com/a.jpg", "HTTP 404").is_fatal());
        assert!(!CrawlError::ElementNotFound {
            url: "https://example.com/tupian/1.html".into(),
            selector: "#img img".into(),
        }
        .is_fatal());
    }
}
