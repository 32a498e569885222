use encoding_rs::GBK;

/// Percent-encodes a keyword the way the gallery's search endpoint expects
///
/// The keyword is converted to GBK and every byte, ASCII included, is written
/// as `%XX` with uppercase hex digits.
///
/// # Examples
///
/// ```
/// use wallpaper_harvest::url::encode_gbk;
///
/// assert_eq!(encode_gbk("原神"), "%D4%AD%C9%F1");
/// assert_eq!(encode_gbk("ab"), "%61%62");
/// ```
pub fn encode_gbk(keyword: &str) -> String {
    let (bytes, _, had_errors) = GBK.encode(keyword);
    if had_errors {
        tracing::debug!("Keyword '{}' has characters outside GBK", keyword);
    }
    bytes.iter().map(|b| format!("%{:02X}", b)).collect()
}
