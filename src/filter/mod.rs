//! Desktop-class wallpaper filter
//!
//! An image qualifies when it is landscape and at least 1920x1080. Pixel
//! dimensions win when the detail page exposes them; otherwise the title is
//! searched for one of a fixed set of desktop resolutions.

use std::fmt;

/// Minimum accepted width in pixels (inclusive)
pub const MIN_WIDTH: u32 = 1920;

/// Minimum accepted height in pixels (inclusive)
pub const MIN_HEIGHT: u32 = 1080;

/// Resolution strings accepted when the title is the only source
///
/// Kept literal: other landscape resolutions in a title are not recognised.
pub const DESKTOP_RESOLUTIONS: &[&str] = &[
    "3840x2160",
    "2560x1440",
    "2560x1600",
    "3440x1440",
    "2880x1800",
    "1920x1080",
    "1920x1200",
    "2560x1080",
];

/// Why an image was accepted or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Pixel dimensions meet the landscape and size thresholds
    Desktop { width: u32, height: u32 },

    /// Title names an allow-listed desktop resolution
    TitleMatch(&'static str),

    /// Height is at least the width
    Portrait { width: u32, height: u32 },

    /// Landscape but smaller than 1920x1080
    LowResolution { width: u32, height: u32 },

    /// Neither dimensions nor title say anything usable
    Undetermined,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Desktop { .. } | Self::TitleMatch(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desktop { width, height } => write!(f, "desktop wallpaper {}x{}", width, height),
            Self::TitleMatch(res) => write!(f, "title advertises {}", res),
            Self::Portrait { width, height } => write!(f, "portrait image {}x{}", width, height),
            Self::LowResolution { width, height } => {
                write!(f, "resolution too low {}x{}", width, height)
            }
            Self::Undetermined => write!(f, "resolution unknown"),
        }
    }
}

/// Classifies an image from its pixel dimensions and title text
///
/// Zero dimensions count as unavailable, the same as missing ones.
pub fn classify(width: Option<u32>, height: Option<u32>, title: &str) -> Verdict {
    match (width.filter(|w| *w > 0), height.filter(|h| *h > 0)) {
        (Some(width), Some(height)) => {
            if width <= height {
                Verdict::Portrait { width, height }
            } else if width >= MIN_WIDTH && height >= MIN_HEIGHT {
                Verdict::Desktop { width, height }
            } else {
                Verdict::LowResolution { width, height }
            }
        }
        _ => DESKTOP_RESOLUTIONS
            .iter()
            .copied()
            .find(|res| title.contains(res))
            .map(Verdict::TitleMatch)
            .unwrap_or(Verdict::Undetermined),
    }
}

/// Returns true if the image is a desktop-class wallpaper
pub fn is_desktop_wallpaper(width: Option<u32>, height: Option<u32>, title: &str) -> bool {
    classify(width, height, title).is_accepted()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_above_threshold_passes() {
        assert!(is_desktop_wallpaper(Some(2560), Some(1440), ""));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        assert_eq!(
            classify(Some(1920), Some(1080), ""),
            Verdict::Desktop {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn test_portrait_rejected() {
        assert_eq!(
            classify(Some(1080), Some(1920), ""),
            Verdict::Portrait {
                width: 1080,
                height: 1920
            }
        );
    }

    #[test]
    fn test_square_counts_as_portrait() {
        assert!(!is_desktop_wallpaper(Some(2048), Some(2048), ""));
    }

    #[test]
    fn test_small_landscape_rejected() {
        assert_eq!(
            classify(Some(1280), Some(720), ""),
            Verdict::LowResolution {
                width: 1280,
                height: 720
            }
        );
    }

    #[test]
    fn test_dimensions_take_precedence_over_title() {
        assert!(!is_desktop_wallpaper(
            Some(1280),
            Some(720),
            "snowy peak 3840x2160"
        ));
    }

    #[test]
    fn test_title_fallback() {
        assert_eq!(
            classify(None, None, "原神 雷电将军 4K壁纸 3840x2160"),
            Verdict::TitleMatch("3840x2160")
        );
        assert!(is_desktop_wallpaper(None, Some(900), "city 2560x1440 night"));
    }

    #[test]
    fn test_title_not_in_allow_list() {
        // a valid desktop size that the allow-list does not know
        assert_eq!(classify(None, None, "ocean 5120x2880"), Verdict::Undetermined);
    }

    #[test]
    fn test_zero_dimensions_fall_back_to_title() {
        assert_eq!(classify(Some(0), Some(0), "no hint"), Verdict::Undetermined);
        assert!(is_desktop_wallpaper(Some(0), Some(0), "forest 1920x1200"));
    }

    #[test]
    fn test_nothing_known_is_rejected() {
        assert!(!is_desktop_wallpaper(None, None, ""));
    }
}
