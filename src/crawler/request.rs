use crate::{CrawlError, Result};

/// Caller-supplied description of one crawl
///
/// Blank category or keyword values are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    category: Option<String>,
    keyword: Option<String>,
    page_limit: u32,
}

impl CrawlRequest {
    /// Pages crawled when the caller does not say otherwise
    pub const DEFAULT_PAGE_LIMIT: u32 = 3;

    pub fn new<C, K>(category: Option<C>, keyword: Option<K>, page_limit: u32) -> Self
    where
        C: Into<String>,
        K: Into<String>,
    {
        Self {
            category: category.map(Into::into),
            keyword: keyword.map(Into::into),
            page_limit,
        }
    }

    /// Trimmed category, if any
    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    /// Trimmed keyword, if any
    pub fn keyword(&self) -> Option<&str> {
        non_blank(self.keyword.as_deref())
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Checks the request before any session is opened
    ///
    /// # Returns
    ///
    /// * `Ok(())` - At least one of category/keyword is usable and the page limit is positive
    /// * `Err(CrawlError::InvalidRequest)` - Otherwise
    pub fn validate(&self) -> Result<()> {
        if self.category().is_none() && self.keyword().is_none() {
            return Err(CrawlError::InvalidRequest(
                "a category or a search keyword is required".to_string(),
            ));
        }

        if self.page_limit == 0 {
            return Err(CrawlError::InvalidRequest(
                "page limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
