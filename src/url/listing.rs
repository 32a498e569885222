use crate::url::encode_gbk;
use crate::Result;
use url::Url;

/// Path of the search form, relative to the site root
pub const SEARCH_FORM_PATH: &str = "e/search/index.php";

/// Builds the listing URL of a category page
///
/// Page 1 is the category root; later pages are `index_N.html` beneath it.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wallpaper_harvest::url::category_page_url;
///
/// let base = Url::parse("https://pic.example.com").unwrap();
/// assert_eq!(
///     category_page_url(&base, "4kdongman", 1).unwrap().as_str(),
///     "https://pic.example.com/4kdongman/"
/// );
/// assert_eq!(
///     category_page_url(&base, "4kdongman", 3).unwrap().as_str(),
///     "https://pic.example.com/4kdongman/index_3.html"
/// );
/// ```
pub fn category_page_url(base: &Url, category: &str, page: u32) -> Result<Url> {
    let path = if page <= 1 {
        format!("{}/", category)
    } else {
        format!("{}/index_{}.html", category, page)
    };
    Ok(base.join(&path)?)
}

/// URL the search form is loaded from and posted to
pub fn search_form_url(base: &Url) -> Result<Url> {
    Ok(base.join(SEARCH_FORM_PATH)?)
}

/// Encodes the search form body
///
/// The keyword is GBK-encoded by hand because the endpoint rejects UTF-8.
pub fn search_form_body(keyword: &str, category: Option<&str>) -> String {
    let mut body = format!("keyboard={}&show=title&tempid=1", encode_gbk(keyword));
    if let Some(category) = category {
        body.push_str("&classid=");
        body.extend(url::form_urlencoded::byte_serialize(category.as_bytes()));
    }
    body
}

/// Builds the URL of a later search result page
///
/// With a captured search token the site's own continuation URL is used;
/// without one the keyword is re-encoded into a direct result URL.
pub fn search_page_url(
    base: &Url,
    page: u32,
    search_token: Option<&str>,
    keyword: &str,
    category: Option<&str>,
) -> Result<Url> {
    let mut url = match search_token {
        Some(token) => {
            let mut url = base.join("e/search/result/index.php")?;
            url.query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("searchid", token);
            url
        }
        None => {
            let mut url = base.join("e/search/result/")?;
            // pre-encoded GBK must not be escaped a second time
            url.set_query(Some(&format!(
                "keyboard={}&page={}",
                encode_gbk(keyword),
                page
            )));
            url
        }
    };

    if let Some(category) = category {
        url.query_pairs_mut().append_pair("classid", category);
    }

    Ok(url)
}

/// Returns true if the URL looks like a search result page
pub fn is_search_result(url: &Url) -> bool {
    let s = url.as_str();
    s.contains("result") || s.contains("search")
}

/// Extracts the `searchid` continuation token from a result URL
pub fn extract_search_token(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "searchid")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
