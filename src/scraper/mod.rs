//! Channel listing scraper.
//!
//! Drives an infinite-scroll video listing until it stops growing, then
//! extracts one [`VideoRecord`](crate::domain::VideoRecord) per feed item.
//!
//! # Architecture
//!
//! ```text
//! ChannelScraper → navigate → wait ready → ScrollDriver → Collect script
//!                → ResultShaper → FieldExtractor (per node) → ScrapeOutcome
//! ```
//!
//! The browser is reached only through [`SessionProvider`] and
//! [`PageSession`], so everything above them runs against a scripted page in
//! tests and against Chrome ([`ChromeProvider`]) in production.
//!
//! # Usage
//!
//! ```rust,ignore
//! use channel_scraper::scraper::{ChannelScraper, ChromeProvider, ScraperConfig};
//!
//! let scraper = ChannelScraper::new(ChromeProvider, ScraperConfig::default())?;
//! let outcome = scraper.scrape("https://www.youtube.com/@jusst1523/videos").await;
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! ```

mod chrome;
mod config;
mod extractor;
mod script;
mod scroll;
mod session;
mod shaper;
mod title;

#[cfg(test)]
pub(crate) mod testing;

pub use chrome::{ChromeProvider, ChromeSession};
pub use config::{ScrapeOptions, ScraperConfig, SelectorConfig};
pub use extractor::{thumbnail_url, video_id_from_url, FieldExtractor, Source, Strategy};
pub use script::{PageMetrics, PageScript};
pub use scroll::{ScrollDriver, ScrollReport, StopReason};
pub use session::{ChannelScraper, SessionState};
pub use shaper::ResultShaper;
pub use title::{PipeDelimited, Plain, TitleConvention, TitleConventionKind, TitleParts};

use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;

/// One browser page, exclusively owned by a single scrape
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to `url` and wait for the load to finish.
    ///
    /// Callers bound this with their own timeout.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Run a script in document context and return its JSON result.
    ///
    /// Exceptions thrown by the page surface as `ScraperError::Evaluation`.
    async fn evaluate(&self, script: PageScript<'_>) -> Result<serde_json::Value>;

    /// Resolve once `selector` matches an element. Callers bound this with
    /// their own timeout.
    async fn wait_for_selector(&self, selector: &str) -> Result<()>;

    /// Give the page time to inject asynchronous content
    async fn settle(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Acquires and releases [`PageSession`]s
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: PageSession;

    async fn acquire(&self, config: &ScraperConfig) -> Result<Self::Session>;

    /// Tear the session down. Called exactly once per acquired session.
    async fn release(&self, session: Self::Session) -> Result<()>;
}
