//! Detail page inspection
//!
//! Reads the full-size image element of a photo's detail page: its URL, any
//! pixel dimensions the markup declares, and its title text.

use crate::crawler::Session;
use crate::{CrawlError, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

/// Selector of the full-size image on a detail page
pub const DETAIL_IMAGE_SELECTOR: &str = "#img img";

/// What a detail page says about its image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDetails {
    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,
    pub title_text: String,
    pub image_url: Url,
}

/// Looks up the image behind a detail page
#[async_trait]
pub trait DetailInspector: Send + Sync {
    async fn inspect(&self, session: &mut dyn Session, detail_url: &Url) -> Result<ImageDetails>;
}

/// Inspector that loads the detail page in the session and parses it
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlDetailInspector;

#[async_trait]
impl DetailInspector for HtmlDetailInspector {
    async fn inspect(&self, session: &mut dyn Session, detail_url: &Url) -> Result<ImageDetails> {
        let html = session.fetch(detail_url).await?;
        let page_url = session.current_url().cloned().unwrap_or_else(|| detail_url.clone());
        parse_detail(&html, &page_url)
    }
}

/// Parses a detail page
///
/// # Returns
///
/// * `Ok(ImageDetails)` - The image element was found and has a usable `src`
/// * `Err(CrawlError::ElementNotFound)` - No image element, or an empty `src`
pub fn parse_detail(html: &str, page_url: &Url) -> Result<ImageDetails> {
    let not_found = || CrawlError::ElementNotFound {
        url: page_url.to_string(),
        selector: DETAIL_IMAGE_SELECTOR.to_string(),
    };

    let document = Html::parse_document(html);
    let selector = Selector::parse(DETAIL_IMAGE_SELECTOR).map_err(|_| not_found())?;
    let img = document.select(&selector).next().ok_or_else(not_found)?;
    let attrs = img.value();

    let image_url = attrs
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .and_then(|src| page_url.join(src).ok())
        .ok_or_else(not_found)?;

    let dimension = |names: [&str; 2]| {
        names
            .iter()
            .filter_map(|name| attrs.attr(name))
            .find_map(|value| value.trim().trim_end_matches("px").parse::<u32>().ok())
    };

    let title_text = attrs
        .attr("alt")
        .filter(|alt| !alt.trim().is_empty())
        .or_else(|| attrs.attr("title"))
        .unwrap_or("")
        .trim()
        .to_string();

    Ok(ImageDetails {
        pixel_width: dimension(["width", "data-width"]),
        pixel_height: dimension(["height", "data-height"]),
        title_text,
        image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://pic.example.com/tupian/32518.html").unwrap()
    }

    #[test]
    fn test_parse_detail_with_dimensions() {
        let html = r#"<div class="photo-pic"><a id="img" href=""><img src="/uploads/allimg/231128/1701149.jpg" width="3840" height="2160" alt="Glacier 3840x2160"></a></div>"#;
        let details = parse_detail(html, &page_url()).unwrap();
        assert_eq!(details.pixel_width, Some(3840));
        assert_eq!(details.pixel_height, Some(2160));
        assert_eq!(details.title_text, "Glacier 3840x2160");
        assert_eq!(
            details.image_url.as_str(),
            "https://pic.example.com/uploads/allimg/231128/1701149.jpg"
        );
    }

    #[test]
    fn test_parse_detail_data_attributes() {
        let html = r#"<a id="img"><img src="a.jpg" data-width="2560px" data-height="1440px"></a>"#;
        let details = parse_detail(html, &page_url()).unwrap();
        assert_eq!(details.pixel_width, Some(2560));
        assert_eq!(details.pixel_height, Some(1440));
        assert_eq!(details.image_url.as_str(), "https://pic.example.com/tupian/a.jpg");
    }

    #[test]
    fn test_parse_detail_without_dimensions() {
        let html = r#"<a id="img"><img src="/u/1.jpg" alt="" title="Fox 1920x1080"></a>"#;
        let details = parse_detail(html, &page_url()).unwrap();
        assert_eq!(details.pixel_width, None);
        assert_eq!(details.pixel_height, None);
        assert_eq!(details.title_text, "Fox 1920x1080");
    }

    #[test]
    fn test_parse_detail_missing_element() {
        let html = r#"<div class="photo-pic"><img src="/u/1.jpg"></div>"#;
        let err = parse_detail(html, &page_url()).unwrap_err();
        assert!(matches!(err, CrawlError::ElementNotFound { .. }));
    }

    #[test]
    fn test_parse_detail_empty_src() {
        let html = r#"<a id="img"><img src="  " alt="x"></a>"#;
        assert!(matches!(
            parse_detail(html, &page_url()),
            Err(CrawlError::ElementNotFound { .. })
        ));
    }
}
