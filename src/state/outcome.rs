/// Download outcome definitions
///
/// Every item visited during a crawl ends in exactly one of these outcomes.
use std::fmt;

/// Result of processing a single listing item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadOutcome {
    /// Image was fetched and written to the destination
    Downloaded,

    /// A file with the target name already exists; nothing was fetched
    SkippedDuplicate,

    /// Image is not a desktop-class wallpaper, or its resolution is unknown
    SkippedFiltered,

    /// Detail page, element lookup, or image transfer failed
    FetchError,
}

impl DownloadOutcome {
    /// Returns true if this outcome extends the duplicate streak
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::SkippedDuplicate)
    }

    /// Returns true if this outcome resets the duplicate streak
    pub fn resets_streak(&self) -> bool {
        matches!(self, Self::Downloaded)
    }

    /// Short label used in log lines and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Downloaded => "downloaded",
            Self::SkippedDuplicate => "skipped_duplicate",
            Self::SkippedFiltered => "skipped_filtered",
            Self::FetchError => "fetch_error",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 4] {
        [
            Self::Downloaded,
            Self::SkippedDuplicate,
            Self::SkippedFiltered,
            Self::FetchError,
        ]
    }
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
