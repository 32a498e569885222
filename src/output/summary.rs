//! Crawl summary and its printed report

use crate::state::DownloadOutcome;
use chrono::{DateTime, Utc};

/// Outcome counts and page statistics for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub downloaded: u64,
    pub skipped_duplicate: u64,
    pub skipped_filtered: u64,
    pub fetch_errors: u64,

    /// Pages reported by the pagination bar
    pub total_pages: u32,

    /// Pages whose items were processed (fully or until aborted)
    pub pages_processed: u32,

    /// Pages skipped because the listing could not be loaded or was empty
    pub pages_skipped: u32,

    /// Pages abandoned early after too many duplicates in a row
    pub pages_aborted: u32,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for CrawlSummary {
    fn default() -> Self {
        Self::start()
    }
}

impl CrawlSummary {
    /// Creates an empty summary stamped with the current time
    pub fn start() -> Self {
        Self {
            downloaded: 0,
            skipped_duplicate: 0,
            skipped_filtered: 0,
            fetch_errors: 0,
            total_pages: 0,
            pages_processed: 0,
            pages_skipped: 0,
            pages_aborted: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Counts one item outcome
    pub fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded => self.downloaded += 1,
            DownloadOutcome::SkippedDuplicate => self.skipped_duplicate += 1,
            DownloadOutcome::SkippedFiltered => self.skipped_filtered += 1,
            DownloadOutcome::FetchError => self.fetch_errors += 1,
        }
    }

    /// Returns the count for one outcome
    pub fn count(&self, outcome: DownloadOutcome) -> u64 {
        match outcome {
            DownloadOutcome::Downloaded => self.downloaded,
            DownloadOutcome::SkippedDuplicate => self.skipped_duplicate,
            DownloadOutcome::SkippedFiltered => self.skipped_filtered,
            DownloadOutcome::FetchError => self.fetch_errors,
        }
    }

    /// Total items visited
    pub fn items(&self) -> u64 {
        DownloadOutcome::all().iter().map(|o| self.count(*o)).sum()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Pages:");
    println!("  Available: {}", summary.total_pages);
    println!("  Processed: {}", summary.pages_processed);
    if summary.pages_skipped > 0 {
        println!("  Skipped: {}", summary.pages_skipped);
    }
    if summary.pages_aborted > 0 {
        println!("  Abandoned after repeated duplicates: {}", summary.pages_aborted);
    }
    println!();

    println!("Items ({}):", summary.items());
    println!("  Downloaded: {}", summary.downloaded);
    println!("  Already on disk: {}", summary.skipped_duplicate);
    println!("  Not a desktop wallpaper: {}", summary.skipped_filtered);
    println!("  Failed: {}", summary.fetch_errors);

    if let Some(seconds) = summary.duration_seconds() {
        println!();
        println!("Finished in {}s", seconds);
    }
}
