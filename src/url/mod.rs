//! URL handling module for Wallpaper Harvest
//!
//! This module builds category and search listing URLs, captures the search
//! continuation token, and encodes keywords for the site's GBK search form.

mod encode;
mod listing;

use crate::crawler::CrawlRequest;
use crate::state::CrawlState;
use crate::Result;
use url::Url;

// Re-export main functions
pub use encode::encode_gbk;
pub use listing::{
    category_page_url, extract_search_token, is_search_result, search_form_body,
    search_form_url, search_page_url, SEARCH_FORM_PATH,
};

/// How a crawl addresses its listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode<'a> {
    /// Browse a category directly
    Category(&'a str),
    /// Submit the search form, optionally restricted to a category
    Search {
        keyword: &'a str,
        category: Option<&'a str>,
    },
}

impl<'a> ListingMode<'a> {
    /// Picks the mode for a request: any non-blank keyword means search
    ///
    /// Returns None when neither a keyword nor a category is usable.
    pub fn for_request(request: &'a CrawlRequest) -> Option<Self> {
        match (request.keyword(), request.category()) {
            (Some(keyword), category) => Some(Self::Search { keyword, category }),
            (None, Some(category)) => Some(Self::Category(category)),
            (None, None) => None,
        }
    }
}

/// Resolves the URL of a listing page that can be fetched directly
///
/// Returns None for the first search page, which is reached by submitting
/// the search form instead.
pub fn listing_page_url(
    base: &Url,
    mode: ListingMode<'_>,
    page: u32,
    state: &CrawlState,
) -> Result<Option<Url>> {
    match mode {
        ListingMode::Category(category) => category_page_url(base, category, page).map(Some),
        ListingMode::Search { .. } if page <= 1 => Ok(None),
        ListingMode::Search { keyword, category } => search_page_url(
            base,
            page,
            state.search_token.as_deref(),
            keyword,
            category,
        )
        .map(Some),
    }
}
