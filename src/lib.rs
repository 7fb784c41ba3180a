//! # channel-scraper
//!
//! Extracts structured video metadata from a channel's infinite-scroll video
//! listing using a headless browser.
//!
//! ## Architecture
//!
//! ```text
//! Navigate → Wait ready → Scroll to stability → Collect nodes → Extract → Shape
//! ```
//!
//! - [`scraper::ChannelScraper`]: owns one browser session per call and
//!   always returns a [`domain::ScrapeOutcome`]
//! - [`scraper::ScrollDriver`]: scrolls until the feed stops growing
//! - [`scraper::FieldExtractor`]: ordered fallback strategies per field
//! - [`scraper::ResultShaper`]: videos, empty-page diagnostics, or failure
//!
//! ## Quick Start
//!
//! ```bash
//! # Scrape the configured default channel
//! channel-scraper scrape
//!
//! # Scrape another channel, scrolling at most 20 times
//! channel-scraper scrape https://www.youtube.com/@somechannel/videos --max-scroll-steps 20
//!
//! # Check selectors against a saved page
//! channel-scraper extract saved.html --base-url https://www.youtube.com/@somechannel/videos
//! ```

/// Error types.
///
/// [`ScraperError`](app::ScraperError) classifies into
/// [`FailureKind`](app::FailureKind) for failure outcomes.
pub mod app;

/// Command-line interface using clap.
///
/// - `scrape [url]` - Scrape a channel listing
/// - `extract <file>` - Run extraction over a saved HTML page
/// - `config` - Show the config file location
pub mod cli;

/// Configuration file management.
///
/// Loads from `~/.config/channel-scraper/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`VideoRecord`](domain::VideoRecord): One extracted video
/// - [`ScrapeOutcome`](domain::ScrapeOutcome): Videos, diagnostics or failure
pub mod domain;

/// Browser-driven channel scraping.
///
/// Uses headless Chrome via chromiumoxide.
///
/// - [`ChannelScraper`](scraper::ChannelScraper): Page session controller
/// - [`ScraperConfig`](scraper::ScraperConfig): Configuration options
/// - [`PageSession`](scraper::PageSession): Async trait for page automation
pub mod scraper;
