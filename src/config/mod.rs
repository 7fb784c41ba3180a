//! Configuration file for channel-scraper.
//!
//! Configuration is read from `~/.config/channel-scraper/config.toml`.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::scraper::ScraperConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/channel-scraper/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("channel-scraper").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    pub fn default_config_content() -> String {
        r##"# channel-scraper configuration
#
# Every key is optional; missing keys use the values shown here.

[scraper]
# Channel listing scraped when no URL is given on the command line
channel_url = "https://www.youtube.com/@jusst1523/videos"

# Creator used when a title does not name one
default_creator = "JUSST Tamil"

# How titles are split: "pipe_delimited" ("Title | Batch | Subject | Creator")
# or "plain" (title kept verbatim)
title_convention = "pipe_delimited"

# Run browser in headless mode (no visible window)
headless = true

window_width = 1920
window_height = 1080

# Timeouts in milliseconds
navigation_timeout_ms = 90000
ready_timeout_ms = 30000
operation_timeout_ms = 180000
# Grace period for the browser to exit before it is killed
shutdown_timeout_ms = 10000

# Wait after navigation for client-side rendering (milliseconds)
post_load_settle_ms = 5000

# Scrolling: at most max_scroll_steps steps, each followed by step_delay_ms.
# A step that leaves the page height unchanged ends scrolling; from step
# stall_check_after on, so does a step that adds no items.
max_scroll_steps = 10
step_delay_ms = 2000
final_settle_ms = 2000
max_sub_steps = 8
sub_step_pause_ms = 50
stall_check_after = 3

# Diagnostics returned when no items are found
body_sample_len = 500
tag_sample_cap = 20

[scraper.extra_headers]
"Accept-Language" = "en-US,en;q=0.9"
"Accept" = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8"
"Cache-Control" = "max-age=0"

# CSS selectors; each list is tried in order and the first match wins
[scraper.selectors]
items = ["ytd-rich-item-renderer", "ytd-grid-video-renderer", "ytd-video-renderer"]
ready = "ytd-rich-grid-renderer"
title = ["#video-title"]
link = ["a#thumbnail", "a.yt-simple-endpoint", "a[href*='/watch']"]
duration = [
    "span.ytd-thumbnail-overlay-time-status-renderer",
    "span.ytp-time-duration",
    ".duration-text",
]
image = ["img"]
metadata = ["#metadata-line span", ".metadata-line span", ".ytd-video-meta-block span"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::TitleConventionKind;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        let defaults = ScraperConfig::default();
        assert_eq!(config.scraper.channel_url, defaults.channel_url);
        assert_eq!(config.scraper.max_scroll_steps, defaults.max_scroll_steps);
        assert_eq!(config.scraper.extra_headers, defaults.extra_headers);
        assert_eq!(config.scraper.selectors.link, defaults.selectors.link);
        assert_eq!(config.scraper.selectors.metadata, defaults.selectors.metadata);
        assert_eq!(config.scraper.title_convention, TitleConventionKind::PipeDelimited);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[scraper]
max_scroll_steps = 25
title_convention = "plain"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        // Custom values
        assert_eq!(config.scraper.max_scroll_steps, 25);
        assert_eq!(config.scraper.title_convention, TitleConventionKind::Plain);
        // Default values
        assert_eq!(config.scraper.step_delay_ms, 2000);
        assert_eq!(config.scraper.default_creator, "JUSST Tamil");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.scraper.navigation_timeout_ms, 90_000);
        assert_eq!(config.scraper.selectors.ready, "ytd-rich-grid-renderer");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scraper]\nheadless = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.scraper.headless);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scraper]\nmax_scroll_steps = \"many\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_create_default_config_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::create_default_config(&path).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.scraper.tag_sample_cap, 20);
    }
}
