use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Wallpaper Harvest
///
/// Every section is optional; a missing config file behaves like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub delays: DelayConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Gallery site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root URL of the gallery
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pic.netbian.com".to_string(),
        }
    }
}

/// Politeness delays inserted between operations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Wait after loading a listing page
    #[serde(rename = "page-load")]
    pub page_load: DelayRange,

    /// Jitter before each detail visit and after each item
    pub item: DelayRange,

    /// Wait after a new session has loaded the home page
    pub warmup: DelayRange,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            page_load: DelayRange::new(2000, 3000),
            item: DelayRange::new(2000, 3000),
            warmup: DelayRange::new(2000, 3000),
        }
    }
}

impl DelayConfig {
    /// Delays that never sleep, for tests and local mirrors
    pub fn none() -> Self {
        Self {
            page_load: DelayRange::new(0, 0),
            item: DelayRange::new(0, 0),
            warmup: DelayRange::new(0, 0),
        }
    }
}

/// Inclusive millisecond range a delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    #[serde(rename = "min-ms")]
    pub min_ms: u64,

    #[serde(rename = "max-ms")]
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draws a uniformly random duration from the range
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(fastrand::u64(self.min_ms..=self.max_ms))
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }
}

/// HTTP behaviour for page sessions and image downloads
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout for a single image download (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Timeout for loading a listing or detail page (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Pool of browser user agents, one is picked per session
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            page_timeout_secs: 30,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory downloaded wallpapers are written to
    #[serde(rename = "download-dir")]
    pub download_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: "wallpapers".to_string(),
        }
    }
}
