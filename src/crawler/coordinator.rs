//! Crawler coordinator - page-by-page crawl orchestration
//!
//! This module contains the crawl loop that coordinates:
//! - Validating the request before any I/O
//! - Reading the page count from the first listing page
//! - Opening a fresh session for every listing page
//! - Visiting detail pages, filtering, deduplicating and downloading
//! - Abandoning a page after a run of duplicates

use crate::config::{Config, DelayConfig, DelayRange};
use crate::crawler::fetcher::{BlobFetcher, BlobRequest};
use crate::crawler::inspector::DetailInspector;
use crate::crawler::parser::{parse_listing, parse_pagination_max, ItemRecord};
use crate::crawler::session::{PageFetcher, Session, SessionGuard};
use crate::crawler::CrawlRequest;
use crate::filter;
use crate::naming::target_filename;
use crate::output::CrawlSummary;
use crate::state::{CrawlState, DownloadOutcome};
use crate::storage::ImageStore;
use crate::url::{
    extract_search_token, is_search_result, listing_page_url, search_form_body, search_form_url,
    ListingMode,
};
use crate::{CrawlError, Result};
use url::Url;

/// Main crawler coordinator structure
///
/// Generic over its collaborators so the crawl loop can run against a real
/// site or against in-memory fakes.
pub struct Coordinator<F, I, B, S> {
    base_url: Url,
    delays: DelayConfig,
    fetcher: F,
    inspector: I,
    blobs: B,
    store: S,
}

impl<F, I, B, S> Coordinator<F, I, B, S>
where
    F: PageFetcher,
    I: DetailInspector,
    B: BlobFetcher,
    S: ImageStore,
{
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - Site and delay settings
    /// * `fetcher` - Source of page-fetching sessions
    /// * `inspector` - Reads image details from detail pages
    /// * `blobs` - Downloads image bytes
    /// * `store` - Destination of downloaded images
    pub fn new(config: &Config, fetcher: F, inspector: I, blobs: B, store: S) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(&config.site.base_url)?,
            delays: config.delays.clone(),
            fetcher,
            inspector,
            blobs,
            store,
        })
    }

    /// Runs a crawl to completion
    ///
    /// Only an invalid request, an empty first page, an unreadable page count
    /// or a failure to open the first session end the crawl with an error.
    /// Every other failure is logged and the crawl moves on to the next item
    /// or page.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - Outcome counts for the whole run
    /// * `Err(CrawlError)` - One of the fatal conditions above
    pub async fn run(&self, request: &CrawlRequest) -> Result<CrawlSummary> {
        request.validate()?;
        let mode = ListingMode::for_request(request).ok_or_else(|| {
            CrawlError::InvalidRequest("a category or a search keyword is required".to_string())
        })?;

        match mode {
            ListingMode::Category(category) => tracing::info!(
                "Downloading wallpapers from category '{}', up to {} pages",
                category,
                request.page_limit()
            ),
            ListingMode::Search { keyword, category } => tracing::info!(
                "Searching for '{}'{}, up to {} pages",
                keyword,
                category
                    .map(|c| format!(" in category '{}'", c))
                    .unwrap_or_default(),
                request.page_limit()
            ),
        }

        let mut state = CrawlState::new();
        let mut summary = CrawlSummary::start();

        let mut session = SessionGuard::new(self.fetcher.acquire().await?);
        let first_html = match self.load_listing(&mut session, mode, 1, &mut state).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to load the first listing page: {}", e);
                return Err(CrawlError::EmptyResult);
            }
        };

        let first_items = parse_listing(&first_html, &self.page_url(&*session));
        if first_items.is_empty() {
            tracing::warn!("No wallpapers found");
            return Err(CrawlError::EmptyResult);
        }

        let total_pages = parse_pagination_max(&first_html);
        if total_pages == 0 {
            return Err(CrawlError::PaginationUnknown);
        }
        state.set_total_pages(total_pages);
        summary.total_pages = total_pages;

        let effective_pages = state.effective_pages(request.page_limit());
        tracing::info!(
            "Total pages: {}, will download: {}",
            total_pages,
            effective_pages
        );

        let mut first_page = Some((session, first_items));
        for page in 1..=effective_pages {
            let opened = match first_page.take() {
                Some(opened) => Some(opened),
                None => self.open_page(mode, page, &mut state).await,
            };
            let Some((mut session, items)) = opened else {
                summary.pages_skipped += 1;
                continue;
            };

            tracing::info!(
                "Processing page {}/{} ({} wallpapers)",
                page,
                effective_pages,
                items.len()
            );

            let aborted = self
                .process_page(&mut session, page, &items, &mut state, &mut summary)
                .await;
            summary.pages_processed += 1;
            if aborted {
                summary.pages_aborted += 1;
            }

            session.release();
        }

        summary.finish();
        tracing::info!(
            "Crawl finished: {} downloaded, {} duplicates, {} filtered, {} failed",
            summary.downloaded,
            summary.skipped_duplicate,
            summary.skipped_filtered,
            summary.fetch_errors
        );

        Ok(summary)
    }

    /// Opens a fresh session and loads a later listing page
    ///
    /// Returns None when the page has to be skipped; the reason is logged.
    async fn open_page(
        &self,
        mode: ListingMode<'_>,
        page: u32,
        state: &mut CrawlState,
    ) -> Option<(SessionGuard<F::Session>, Vec<ItemRecord>)> {
        let mut session = match self.fetcher.acquire().await {
            Ok(session) => SessionGuard::new(session),
            Err(e) => {
                tracing::warn!("Could not open a session for page {}: {}", page, e);
                return None;
            }
        };

        let html = match self.load_listing(&mut session, mode, page, state).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to load page {}: {}", page, e);
                return None;
            }
        };

        let items = parse_listing(&html, &self.page_url(&*session));
        if items.is_empty() {
            tracing::info!("No wallpapers on page {}, trying the next page", page);
            return None;
        }

        Some((session, items))
    }

    /// Loads the HTML of a listing page in the given session
    async fn load_listing(
        &self,
        session: &mut F::Session,
        mode: ListingMode<'_>,
        page: u32,
        state: &mut CrawlState,
    ) -> Result<String> {
        let html = match mode {
            ListingMode::Search { keyword, category } if page <= 1 => {
                self.submit_search(session, keyword, category, state).await?
            }
            _ => {
                let url = listing_page_url(&self.base_url, mode, page, state)?
                    .ok_or_else(|| CrawlError::session(&self.base_url, "no listing URL"))?;
                tracing::info!("Visiting page: {}", url);
                session.fetch(&url).await?
            }
        };

        self.pause(self.delays.page_load).await;
        Ok(html)
    }

    /// Submits the search form and captures the continuation token
    async fn submit_search(
        &self,
        session: &mut F::Session,
        keyword: &str,
        category: Option<&str>,
        state: &mut CrawlState,
    ) -> Result<String> {
        let form_url = search_form_url(&self.base_url)?;
        session.fetch(&form_url).await?;
        self.pause(self.delays.page_load).await;

        let body = search_form_body(keyword, category);
        let html = session.post_form(&form_url, &body).await?;

        let result_url = session
            .current_url()
            .cloned()
            .ok_or_else(|| CrawlError::session(&form_url, "search returned no page"))?;
        tracing::info!("Search results page: {}", result_url);

        if !is_search_result(&result_url) {
            return Err(CrawlError::session(
                &result_url,
                "search did not reach a result page",
            ));
        }

        match extract_search_token(&result_url) {
            Some(token) => {
                tracing::debug!("Captured search id {}", token);
                state.search_token = Some(token);
            }
            None => tracing::warn!(
                "No search id in {}, later pages will be addressed by keyword",
                result_url
            ),
        }

        Ok(html)
    }

    /// Processes the items of one listing page in order
    ///
    /// Returns true if the page was abandoned because of repeated duplicates.
    async fn process_page(
        &self,
        session: &mut F::Session,
        page: u32,
        items: &[ItemRecord],
        state: &mut CrawlState,
        summary: &mut CrawlSummary,
    ) -> bool {
        state.begin_page(page);

        for (index, item) in items.iter().enumerate() {
            if state.streak_exhausted() {
                tracing::info!(
                    "Too many duplicates ({} in a row), skipping the remaining {} items on page {}",
                    state.duplicate_streak(),
                    items.len() - index,
                    page
                );
                return true;
            }

            self.pause(self.delays.item).await;
            let outcome = self.process_item(session, item).await;
            state.record(outcome);
            summary.record(outcome);
            tracing::debug!(
                "{} -> {} (duplicate streak {})",
                item.detail_url,
                outcome,
                state.duplicate_streak()
            );
            self.pause(self.delays.item).await;
        }

        false
    }

    /// Processes one item; failures become `FetchError`
    async fn process_item(&self, session: &mut F::Session, item: &ItemRecord) -> DownloadOutcome {
        match self.try_item(session, item).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Failed to download '{}': {}", item.title, e);
                DownloadOutcome::FetchError
            }
        }
    }

    async fn try_item(
        &self,
        session: &mut F::Session,
        item: &ItemRecord,
    ) -> Result<DownloadOutcome> {
        let details = self.inspector.inspect(&mut *session, &item.detail_url).await?;

        let title = if details.title_text.is_empty() {
            item.title.as_str()
        } else {
            details.title_text.as_str()
        };
        let verdict = filter::classify(details.pixel_width, details.pixel_height, title);
        if !verdict.is_accepted() {
            tracing::info!("Skipping '{}': {}", item.title, verdict);
            return Ok(DownloadOutcome::SkippedFiltered);
        }
        tracing::debug!("Accepted '{}': {}", item.title, verdict);

        let filename = target_filename(&item.title, &details.image_url);
        if self.store.exists(&filename).await? {
            tracing::info!("File already exists: {}", filename);
            return Ok(DownloadOutcome::SkippedDuplicate);
        }

        let request = BlobRequest {
            url: &details.image_url,
            referer: &item.detail_url,
            user_agent: session.user_agent(),
            cookie: session.cookie_header(&details.image_url),
        };
        let bytes = self.blobs.fetch(&request).await?;
        self.store.write(&filename, &bytes).await?;

        tracing::info!("Downloaded: {}", self.store.location(&filename));
        Ok(DownloadOutcome::Downloaded)
    }

    /// URL relative links on the session's current page resolve against
    fn page_url(&self, session: &F::Session) -> Url {
        session
            .current_url()
            .cloned()
            .unwrap_or_else(|| self.base_url.clone())
    }

    async fn pause(&self, range: DelayRange) {
        let wait = range.sample();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
