//! Image download over HTTP
//!
//! This module handles the full-size image requests, including:
//! - Building the HTTP client used for image downloads
//! - Presenting the same identity, referer and cookies as the page session
//! - Classifying failures (non-2xx status, timeouts, refused connections)

use crate::config::HttpConfig;
use crate::crawler::session::classify_request_error;
use crate::{CrawlError, Result};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, REFERER, USER_AGENT,
};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Everything needed to request one image
#[derive(Debug, Clone)]
pub struct BlobRequest<'a> {
    /// Full-size image URL
    pub url: &'a Url,

    /// Detail page the image was found on
    pub referer: &'a Url,

    /// User agent of the session that found the image
    pub user_agent: &'a str,

    /// Session cookies for the image host
    pub cookie: Option<String>,
}

impl BlobRequest<'_> {
    /// Headers the gallery expects on an image request
    pub fn headers(&self) -> Result<HeaderMap> {
        let invalid = |e: reqwest::header::InvalidHeaderValue| {
            CrawlError::transport(self.url, format!("invalid header value: {}", e))
        };

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(self.user_agent).map_err(invalid)?);
        headers.insert(REFERER, HeaderValue::from_str(self.referer.as_str()).map_err(invalid)?);
        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie).map_err(invalid)?);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("image"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("no-cors"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("same-origin"),
        );
        Ok(headers)
    }
}

/// Downloads image bytes
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    /// Fetches the image; any non-2xx status is a transport error
    async fn fetch(&self, request: &BlobRequest<'_>) -> Result<Vec<u8>>;
}

/// Builds the HTTP client used for image downloads
///
/// No default user agent is set: every request carries the one of the page
/// session that discovered the image.
///
/// # Example
///
/// ```no_run
/// use wallpaper_harvest::config::HttpConfig;
/// use wallpaper_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `BlobFetcher` over a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpBlobFetcher {
    client: Client,
}

impl HttpBlobFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = build_http_client(config)
            .map_err(|e| CrawlError::transport("<client>", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BlobFetcher for HttpBlobFetcher {
    async fn fetch(&self, request: &BlobRequest<'_>) -> Result<Vec<u8>> {
        let headers = request.headers()?;
        let response = self
            .client
            .get(request.url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| CrawlError::transport(request.url, classify_request_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Transport {
                url: request.url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
                status: Some(status.as_u16()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CrawlError::transport(request.url, classify_request_error(&e)))?;
        Ok(bytes.to_vec())
    }
}
