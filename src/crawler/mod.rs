//! Crawler module for listing traversal and image downloads
//!
//! This module contains the core crawling logic, including:
//! - Page-fetching sessions with guaranteed release
//! - Listing and pagination parsing
//! - Detail page inspection
//! - Image downloads with browser-like headers
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod inspector;
mod parser;
mod request;
mod session;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, BlobFetcher, BlobRequest, HttpBlobFetcher};
pub use inspector::{
    parse_detail, DetailInspector, HtmlDetailInspector, ImageDetails, DETAIL_IMAGE_SELECTOR,
};
pub use parser::{parse_listing, parse_pagination_max, ItemRecord};
pub use request::CrawlRequest;
pub use session::{decode_body, HttpPageFetcher, HttpSession, PageFetcher, Session, SessionGuard};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::storage::LocalImageStore;
use crate::Result;

/// Runs a complete crawl against the configured site
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the request (nothing is touched if it is invalid)
/// 2. Open the download directory
/// 3. Build the HTTP session source and image downloader
/// 4. Walk the listing pages and download new wallpapers
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `request` - Category or keyword and page limit
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(CrawlError)` - A fatal condition ended the crawl
pub async fn crawl(config: &Config, request: &CrawlRequest) -> Result<CrawlSummary> {
    request.validate()?;

    let store = LocalImageStore::open(&config.output.download_dir).await?;
    tracing::info!("Saving wallpapers to {}", store.root().display());

    let coordinator = Coordinator::new(
        config,
        HttpPageFetcher::new(config)?,
        HtmlDetailInspector,
        HttpBlobFetcher::new(&config.http)?,
        store,
    )?;

    coordinator.run(request).await
}
