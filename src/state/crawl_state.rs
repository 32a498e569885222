//! Pagination and duplicate-streak bookkeeping for one crawl
//!
//! `CrawlState` is owned by the coordinator and mutated only by it.

use crate::state::DownloadOutcome;

/// Consecutive duplicates that make the coordinator abandon a listing page
pub const MAX_DUPLICATE_STREAK: u32 = 5;

/// Mutable state of a running crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlState {
    current_page: u32,
    total_pages: u32,
    duplicate_streak: u32,
    max_duplicate_streak: u32,

    /// Search continuation token captured from the first result page
    ///
    /// When absent, later search pages are addressed by re-encoding the keyword.
    pub search_token: Option<String>,
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            duplicate_streak: 0,
            max_duplicate_streak: MAX_DUPLICATE_STREAK,
            search_token: None,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn duplicate_streak(&self) -> u32 {
        self.duplicate_streak
    }

    pub fn max_duplicate_streak(&self) -> u32 {
        self.max_duplicate_streak
    }

    pub fn set_total_pages(&mut self, total: u32) {
        self.total_pages = total;
    }

    /// Number of pages a crawl limited to `page_limit` will visit
    pub fn effective_pages(&self, page_limit: u32) -> u32 {
        page_limit.min(self.total_pages)
    }

    /// Moves to `page` and clears the duplicate streak
    pub fn begin_page(&mut self, page: u32) {
        self.current_page = page;
        self.duplicate_streak = 0;
    }

    /// Applies an item outcome to the duplicate streak
    ///
    /// Duplicates extend the streak, downloads reset it, and filtered or
    /// failed items leave it untouched.
    pub fn record(&mut self, outcome: DownloadOutcome) {
        if outcome.is_duplicate() {
            self.duplicate_streak += 1;
        } else if outcome.resets_streak() {
            self.duplicate_streak = 0;
        }
    }

    /// Returns true once the rest of the current page should be abandoned
    pub fn streak_exhausted(&self) -> bool {
        self.duplicate_streak >= self.max_duplicate_streak
    }
}
