//! Listing page parser
//!
//! This module turns listing HTML into item records and reads the total page
//! count from the pagination bar. Which selector matched the item grid is an
//! internal detail; callers only see the records.

use crate::naming::strip_tags;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Item grid selectors, tried in order until one matches
const LISTING_SELECTORS: &[&str] = &[
    ".slist ul li",
    "#main .slist ul li",
    ".slist li",
    ".slist .clearfix li",
];

/// Pagination bar selector
const PAGINATION_SELECTOR: &str = "div.page";

/// One thumbnail/title pair from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Absolute URL of the photo's detail page
    pub detail_url: Url,

    /// Title text from the thumbnail's alt attribute, tags stripped
    pub title: String,

    /// Absolute URL of the thumbnail image
    pub thumbnail_url: Url,
}

/// Parses the items of a listing page
///
/// # Arguments
///
/// * `html` - The listing page HTML
/// * `base_url` - The URL relative links are resolved against
///
/// # Returns
///
/// Items in page order. Entries without both a link and an image, or whose
/// URLs do not resolve, are skipped.
///
/// # Example
///
/// ```
/// use url::Url;
/// use wallpaper_harvest::crawler::parse_listing;
///
/// let html = r#"<div class="slist"><ul>
///     <li><a href="/tupian/1.html"><img src="/t/1.jpg" alt="Lake"></a></li>
/// </ul></div>"#;
/// let base = Url::parse("https://pic.example.com/4kfengjing/").unwrap();
/// let items = parse_listing(html, &base);
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].detail_url.as_str(), "https://pic.example.com/tupian/1.html");
/// ```
pub fn parse_listing(html: &str, base_url: &Url) -> Vec<ItemRecord> {
    let document = Html::parse_document(html);
    let (Ok(link_selector), Ok(img_selector)) = (Selector::parse("a[href]"), Selector::parse("img"))
    else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for element in listing_elements(&document) {
        let (Some(link), Some(img)) = (
            element.select(&link_selector).next(),
            element.select(&img_selector).next(),
        ) else {
            continue;
        };

        let Some(detail_url) = link.value().attr("href").and_then(|h| resolve(h, base_url))
        else {
            tracing::debug!("Skipping listing entry with unusable link");
            continue;
        };
        let Some(thumbnail_url) = img.value().attr("src").and_then(|s| resolve(s, base_url))
        else {
            tracing::debug!("Skipping listing entry without thumbnail: {}", detail_url);
            continue;
        };

        let title = strip_tags(img.value().attr("alt").unwrap_or("")).trim().to_string();

        items.push(ItemRecord {
            detail_url,
            title,
            thumbnail_url,
        });
    }

    items
}

/// Determines the number of listing pages from the pagination bar
///
/// The largest index found in `index_<N>` hrefs or purely numeric link
/// text wins. With no usable pagination the result is 1 if the page lists
/// at least one entry and 0 otherwise.
///
/// # Example
///
/// ```
/// use wallpaper_harvest::crawler::parse_pagination_max;
///
/// let html = r#"<div class="page">
///     <a href="/4kdongman/index_2.html">2</a>
///     <a href="/4kdongman/index_171.html">171</a>
/// </div>"#;
/// assert_eq!(parse_pagination_max(html), 171);
/// ```
pub fn parse_pagination_max(html: &str) -> u32 {
    let document = Html::parse_document(html);
    let fallback = u32::from(!listing_elements(&document).is_empty());

    let (Ok(pager_selector), Ok(link_selector)) =
        (Selector::parse(PAGINATION_SELECTOR), Selector::parse("a"))
    else {
        return fallback;
    };

    let Some(pager) = document.select(&pager_selector).next() else {
        return fallback;
    };

    let links: Vec<ElementRef> = pager.select(&link_selector).collect();
    if links.is_empty() {
        return fallback;
    }

    links
        .iter()
        .filter_map(|link| {
            link.value()
                .attr("href")
                .and_then(page_from_href)
                .or_else(|| page_from_text(&link.text().collect::<String>()))
        })
        .fold(1, u32::max)
}

/// Returns the item elements of the first matching grid selector
fn listing_elements(document: &Html) -> Vec<ElementRef<'_>> {
    for raw in LISTING_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let found: Vec<ElementRef> = document.select(&selector).collect();
        if !found.is_empty() {
            tracing::trace!("Listing matched selector '{}' ({} entries)", raw, found.len());
            return found;
        }
    }
    Vec::new()
}

/// Reads N from an `…index_N.html` href
fn page_from_href(href: &str) -> Option<u32> {
    let (_, tail) = href.rsplit_once("index_")?;
    let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Reads a page number from link text made only of digits
fn page_from_text(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn resolve(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") {
        return None;
    }
    base_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
}
