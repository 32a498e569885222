//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: current page, total pages, duplicate streak and search token
//! - `DownloadOutcome`: what happened to a single listing item

mod crawl_state;
mod outcome;

// Re-export main types
pub use crawl_state::{CrawlState, MAX_DUPLICATE_STREAK};
pub use outcome::DownloadOutcome;
