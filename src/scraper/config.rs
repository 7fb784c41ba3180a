use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scraper::title::TitleConventionKind;

/// Configuration for the channel scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Channel listing scraped when no URL is given
    pub channel_url: String,

    /// Creator name used when a title does not name one (default: "JUSST Tamil")
    pub default_creator: String,

    /// How raw titles are split into title/batch/subject/creator
    pub title_convention: TitleConventionKind,

    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Extra HTTP headers sent with every request
    pub extra_headers: BTreeMap<String, String>,

    /// Browser window size in pixels (default: 1920x1080)
    pub window_width: u32,
    pub window_height: u32,

    /// Navigation timeout in milliseconds (default: 90000)
    pub navigation_timeout_ms: u64,

    /// Wait after navigation for client-side rendering in milliseconds (default: 5000)
    pub post_load_settle_ms: u64,

    /// How long to wait for the listing container to appear (default: 30000)
    pub ready_timeout_ms: u64,

    /// Budget for the whole scrape in milliseconds (default: 180000)
    pub operation_timeout_ms: u64,

    /// Grace period for the browser to exit on release before it is killed (default: 10000)
    pub shutdown_timeout_ms: u64,

    /// Maximum scroll steps before giving up on the feed growing (default: 10)
    pub max_scroll_steps: u32,

    /// Settle delay after each scroll step in milliseconds (default: 2000)
    pub step_delay_ms: u64,

    /// Settle delay after the final full-height scroll (default: 2000)
    pub final_settle_ms: u64,

    /// Upper bound on viewport-sized sub-steps per scroll step (default: 8)
    pub max_sub_steps: u32,

    /// Pause between sub-steps inside the page in milliseconds (default: 50)
    pub sub_step_pause_ms: u64,

    /// Steps after which a stalled item count ends scrolling (default: 3)
    pub stall_check_after: u32,

    /// Characters of body text kept in diagnostics (default: 500)
    pub body_sample_len: usize,

    /// Distinct tag names kept in diagnostics (default: 20)
    pub tag_sample_cap: usize,

    pub selectors: SelectorConfig,
}

/// CSS selectors, each list tried in order until one matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Feed item selectors; the first one matching at least one node wins
    pub items: Vec<String>,

    /// Container that signals the listing has rendered
    pub ready: String,

    pub title: Vec<String>,
    pub link: Vec<String>,
    pub duration: Vec<String>,
    pub image: Vec<String>,

    /// Spans inside the metadata line (views, upload time)
    pub metadata: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            items: strings(&[
                "ytd-rich-item-renderer",
                "ytd-grid-video-renderer",
                "ytd-video-renderer",
            ]),
            ready: "ytd-rich-grid-renderer".to_string(),
            title: strings(&["#video-title"]),
            link: strings(&["a#thumbnail", "a.yt-simple-endpoint", "a[href*='/watch']"]),
            duration: strings(&[
                "span.ytd-thumbnail-overlay-time-status-renderer",
                "span.ytp-time-duration",
                ".duration-text",
            ]),
            image: strings(&["img"]),
            metadata: strings(&[
                "#metadata-line span",
                ".metadata-line span",
                ".ytd-video-meta-block span",
            ]),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            channel_url: "https://www.youtube.com/@jusst1523/videos".to_string(),
            default_creator: "JUSST Tamil".to_string(),
            title_convention: TitleConventionKind::default(),
            headless: true,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            extra_headers: [
                ("Accept-Language", "en-US,en;q=0.9"),
                (
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,\
                     image/webp,image/apng,*/*;q=0.8",
                ),
                ("Cache-Control", "max-age=0"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_ms: 90_000,
            post_load_settle_ms: 5_000,
            ready_timeout_ms: 30_000,
            operation_timeout_ms: 180_000,
            shutdown_timeout_ms: 10_000,
            max_scroll_steps: 10,
            step_delay_ms: 2_000,
            final_settle_ms: 2_000,
            max_sub_steps: 8,
            sub_step_pause_ms: 50,
            stall_check_after: 3,
            body_sample_len: 500,
            tag_sample_cap: 20,
            selectors: SelectorConfig::default(),
        }
    }
}

impl ScraperConfig {
    pub fn post_load_settle(&self) -> Duration {
        Duration::from_millis(self.post_load_settle_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn final_settle(&self) -> Duration {
        Duration::from_millis(self.final_settle_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Per-call options derived from this configuration
    pub fn options(&self) -> ScrapeOptions {
        ScrapeOptions {
            max_scroll_steps: self.max_scroll_steps,
            step_delay_ms: self.step_delay_ms,
            navigation_timeout_ms: self.navigation_timeout_ms,
            operation_timeout_ms: self.operation_timeout_ms,
        }
    }

    /// Create a config optimized for speed (may miss items on long channels)
    pub fn fast() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            post_load_settle_ms: 1_500,
            ready_timeout_ms: 10_000,
            operation_timeout_ms: 60_000,
            max_scroll_steps: 4,
            step_delay_ms: 1_000,
            final_settle_ms: 500,
            ..Default::default()
        }
    }

    /// Create a config optimized for completeness (slower)
    pub fn thorough() -> Self {
        Self {
            operation_timeout_ms: 600_000,
            max_scroll_steps: 50,
            step_delay_ms: 3_000,
            final_settle_ms: 3_000,
            ..Default::default()
        }
    }
}

/// Tuning a caller may override for a single scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub max_scroll_steps: u32,
    pub step_delay_ms: u64,
    pub navigation_timeout_ms: u64,
    pub operation_timeout_ms: u64,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        ScraperConfig::default().options()
    }
}

impl ScrapeOptions {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
