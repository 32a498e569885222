use regex::Regex;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern should compile"));

static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("illegal char pattern should compile"));

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[_\s'"]+"#).expect("separator pattern should compile"));

/// Marketing and resolution noise stripped from titles, longest phrases first
pub const NOISE_WORDS: &[&str] = &[
    "4K壁纸",
    "4k壁纸",
    "高清壁纸",
    "电脑壁纸",
    "超清壁纸",
    "4K",
    "4k",
    "壁纸",
    "图片",
    "font",
    "_font",
    "3840x2400",
    "3840x2160",
    "2560x1600",
    "2400x1080",
    "高清",
    "超清",
    "电脑",
    "color",
    "red",
];

/// Removes HTML tags from a string
pub fn strip_tags(input: &str) -> String {
    HTML_TAG.replace_all(input, "").into_owned()
}

/// Turns a listing title into a filesystem-safe file stem
///
/// Steps, in order:
/// 1. Strip HTML tags
/// 2. Replace `\ / * ? : " < > |` with `_`
/// 3. Remove noise words until none is left
/// 4. Collapse runs of `_`, whitespace and quotes into a single `_`
/// 5. Trim `_`, whitespace and quotes from both ends
///
/// Applying it twice gives the same result as applying it once.
///
/// # Example
///
/// ```
/// use wallpaper_harvest::naming::sanitize_filename;
///
/// assert_eq!(sanitize_filename("<b>雪山</b> 4K壁纸 3840x2160"), "雪山");
/// assert_eq!(sanitize_filename("Night: \"City\" / Lights"), "Night_City_Lights");
/// ```
pub fn sanitize_filename(input: &str) -> String {
    let stripped = strip_tags(input);
    let mut name = ILLEGAL_CHARS.replace_all(&stripped, "_").into_owned();

    // removing one word can splice another together ("4壁纸K" -> "4K")
    loop {
        let before = name.len();
        for word in NOISE_WORDS {
            if name.contains(word) {
                name = name.replace(word, "");
            }
        }
        if name.len() == before {
            break;
        }
    }

    let collapsed = SEPARATOR_RUN.replace_all(&name, "_");
    collapsed
        .trim_matches(|c: char| c == '_' || c == '\'' || c == '"' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<font color=red>Hot</font> pick"), "Hot pick");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_removes_noise_words() {
        assert_eq!(sanitize_filename("唯美风景 高清壁纸"), "唯美风景");
        assert_eq!(sanitize_filename("原神 雷电将军 4K壁纸 3840x2160"), "原神_雷电将军");
    }

    #[test]
    fn test_replaces_illegal_characters() {
        assert_eq!(sanitize_filename(r#"a\b/c*d?e:f"g|h"#), "a_b_c_d_e_f_g_h");
        // an unmatched bracket is not a tag
        assert_eq!(sanitize_filename("a<b"), "a_b");
    }

    #[test]
    fn test_collapses_and_trims_separators() {
        assert_eq!(sanitize_filename("  __ 'sunset'   over   sea__ "), "sunset_over_sea");
    }

    #[test]
    fn test_spliced_noise_is_removed() {
        assert_eq!(sanitize_filename("lake 4壁纸K"), "lake");
    }

    #[test]
    fn test_only_noise_leaves_nothing() {
        assert_eq!(sanitize_filename("4K壁纸 高清 <b></b>"), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<b>雪山</b> 4K壁纸 3840x2160",
            "Night: \"City\" / Lights",
            "4壁纸K 4k",
            "  '  ' _ ",
            "re壁纸d fo图片nt co电脑lor",
            "a<b",
            "<<script>>",
            "fontfont__font",
            "",
        ];
        for input in inputs {
            let once = sanitize_filename(input);
            let twice = sanitize_filename(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }
}
