//! Output module for reporting crawl results
//!
//! This module handles:
//! - Counting item outcomes and page statistics during a crawl
//! - Printing the final summary

mod summary;

pub use summary::{print_summary, CrawlSummary};
