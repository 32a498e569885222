//! Target filename derivation
//!
//! Downloads are deduplicated purely by filename, so the same listing title
//! and image URL must always map to the same name.

mod sanitize;

pub use sanitize::{sanitize_filename, strip_tags, NOISE_WORDS};

use url::Url;

/// Extension used when the image URL does not carry one
const DEFAULT_EXTENSION: &str = "jpg";

/// Characters of the image timestamp kept after a readable title
const TIMESTAMP_SUFFIX_LEN: usize = 6;

/// Returns true if the string holds an ASCII letter/digit or a CJK ideograph
pub fn has_meaningful_chars(s: &str) -> bool {
    s.chars()
        .any(|c| c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// Splits the last path segment of an image URL into (timestamp, extension)
///
/// `/uploads/allimg/240101/231512-17041221127a3b.jpg` gives
/// `("231512-17041221127a3b", "jpg")`.
pub fn image_stem(image_url: &Url) -> (String, String) {
    let segment = image_url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let timestamp = segment.split('.').next().unwrap_or("");
    let timestamp = if timestamp.is_empty() {
        "image"
    } else {
        timestamp
    };

    let extension = segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_EXTENSION);

    (timestamp.to_string(), extension.to_string())
}

/// Computes the destination filename for an item
///
/// A readable title becomes `{title}_{last six timestamp chars}.{ext}`; a title
/// with nothing meaningful left after sanitization falls back to
/// `{timestamp}.{ext}`.
///
/// # Example
///
/// ```
/// use url::Url;
/// use wallpaper_harvest::naming::target_filename;
///
/// let image = Url::parse("https://pic.example.com/uploads/allimg/1700000000123456.jpg").unwrap();
/// assert_eq!(target_filename("雪山 4K壁纸", &image), "雪山_123456.jpg");
/// assert_eq!(target_filename("4K壁纸", &image), "1700000000123456.jpg");
/// ```
pub fn target_filename(title: &str, image_url: &Url) -> String {
    let title = sanitize_filename(title);
    let (timestamp, extension) = image_stem(image_url);

    if title.is_empty() || !has_meaningful_chars(&title) {
        return format!("{}.{}", timestamp, extension);
    }

    let chars: Vec<char> = timestamp.chars().collect();
    let suffix: String = chars[chars.len().saturating_sub(TIMESTAMP_SUFFIX_LEN)..]
        .iter()
        .collect();
    format!("{}_{}.{}", title, suffix, extension)
}
