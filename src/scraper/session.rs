use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use url::Url;

use crate::app::{Result, ScraperError};
use crate::domain::ScrapeOutcome;
use crate::scraper::config::{ScrapeOptions, ScraperConfig};
use crate::scraper::script::PageScript;
use crate::scraper::scroll::ScrollDriver;
use crate::scraper::shaper::ResultShaper;
use crate::scraper::{PageSession, SessionProvider};

/// Idle time that counts as "network idle" after navigation
const NETWORK_IDLE_MS: u64 = 500;

/// Lifecycle of a single scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Navigating,
    WaitingReady,
    Scrolling,
    Extracting,
    Succeeded,
    EmptyDiagnosed,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Navigating => "navigating",
            Self::WaitingReady => "waiting-ready",
            Self::Scrolling => "scrolling",
            Self::Extracting => "extracting",
            Self::Succeeded => "succeeded",
            Self::EmptyDiagnosed => "empty-diagnosed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl SessionState {
    pub fn terminal(outcome: &ScrapeOutcome) -> Self {
        match outcome {
            ScrapeOutcome::VideoList(_) => Self::Succeeded,
            ScrapeOutcome::EmptyDiagnostic(_) => Self::EmptyDiagnosed,
            ScrapeOutcome::Failure { .. } => Self::Failed,
        }
    }
}

/// Drives one browser session per call from navigation to extracted videos.
///
/// Calls may run concurrently; each acquires its own session from the
/// provider and releases it before returning, whatever the outcome.
pub struct ChannelScraper<P: SessionProvider> {
    provider: P,
    config: ScraperConfig,
    scroll: ScrollDriver,
    shaper: ResultShaper,
}

impl<P: SessionProvider> ChannelScraper<P> {
    /// Fails only when a configured selector cannot be parsed
    pub fn new(provider: P, config: ScraperConfig) -> Result<Self> {
        let scroll = ScrollDriver::new(&config);
        let shaper = ResultShaper::new(&config)?;

        Ok(Self {
            provider,
            config,
            scroll,
            shaper,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Scrape `url` with the configured options
    pub async fn scrape(&self, url: &str) -> ScrapeOutcome {
        self.scrape_channel(url, &self.config.options()).await
    }

    /// Scrape the configured default channel
    pub async fn scrape_default(&self) -> ScrapeOutcome {
        let url = self.config.channel_url.clone();
        self.scrape(&url).await
    }

    /// Scrape `url`, never returning an error: failures become
    /// [`ScrapeOutcome::Failure`].
    pub async fn scrape_channel(&self, url: &str, options: &ScrapeOptions) -> ScrapeOutcome {
        transition(url, SessionState::Idle);

        let target = match Url::parse(url) {
            Ok(target) => target,
            Err(e) => return self.finish(url, ScraperError::from(e).into()),
        };

        let session = match self.provider.acquire(&self.config).await {
            Ok(session) => session,
            Err(e) => return self.finish(url, e.into()),
        };

        let budget = options.operation_timeout();
        let outcome = match tokio::time::timeout(budget, self.run(&session, &target, options)).await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => e.into(),
            Err(_) => ScraperError::Timeout(budget).into(),
        };

        if let Err(e) = self.provider.release(session).await {
            warn!("Failed to release browser session for {}: {}", url, e);
        }

        self.finish(url, outcome)
    }

    async fn run(
        &self,
        session: &P::Session,
        target: &Url,
        options: &ScrapeOptions,
    ) -> Result<ScrapeOutcome> {
        let url = target.as_str();

        transition(url, SessionState::Navigating);
        let nav_timeout = options.navigation_timeout();
        let started = Instant::now();
        info!("Navigating to: {}", url);
        tokio::time::timeout(nav_timeout, session.navigate(url))
            .await
            .map_err(|_| {
                ScraperError::Navigation(format!(
                    "timed out after {}ms loading {}",
                    nav_timeout.as_millis(),
                    url
                ))
            })??;
        wait_for_network_idle(session, url, nav_timeout.saturating_sub(started.elapsed())).await;
        session.settle(self.config.post_load_settle()).await;

        transition(url, SessionState::WaitingReady);
        let ready = &self.config.selectors.ready;
        match tokio::time::timeout(self.config.ready_timeout(), session.wait_for_selector(ready))
            .await
        {
            Ok(Ok(())) => debug!("Found {:?} on {}", ready, url),
            Ok(Err(e)) => warn!("Could not find {:?} on {}: {}", ready, url, e),
            Err(_) => warn!(
                "Could not find {:?} on {} within {}ms",
                ready,
                url,
                self.config.ready_timeout_ms
            ),
        }

        transition(url, SessionState::Scrolling);
        self.scroll
            .drive_to_stability(session, options.max_scroll_steps, options.step_delay())
            .await;

        transition(url, SessionState::Extracting);
        let collected = session
            .evaluate(PageScript::Collect {
                selectors: &self.config.selectors,
                body_sample_len: self.config.body_sample_len,
                tag_sample_cap: self.config.tag_sample_cap,
            })
            .await?;

        self.shaper.shape(collected, target)
    }

    fn finish(&self, url: &str, outcome: ScrapeOutcome) -> ScrapeOutcome {
        let state = SessionState::terminal(&outcome);
        match &outcome {
            ScrapeOutcome::VideoList(videos) => {
                info!("Scraped {} videos from {} ({})", videos.len(), url, state)
            }
            ScrapeOutcome::EmptyDiagnostic(info) => warn!(
                "No videos found on {} ({}), page title {:?}",
                url, state, info.page_title
            ),
            ScrapeOutcome::Failure { kind, message } => {
                warn!("Scrape of {} failed ({}): {:?}: {}", url, state, kind, message)
            }
        }
        outcome
    }
}

/// Best effort: a busy network only delays extraction, it never fails it
async fn wait_for_network_idle<S: PageSession + ?Sized>(session: &S, url: &str, budget: Duration) {
    if budget.is_zero() {
        return;
    }
    let idle = PageScript::NetworkIdle {
        timeout_ms: budget.as_millis().min(u128::from(u64::MAX)) as u64,
        idle_ms: NETWORK_IDLE_MS,
    };
    match tokio::time::timeout(budget, session.evaluate(idle)).await {
        Ok(Ok(result)) => debug!("Network idle check on {}: {}", url, result),
        Ok(Err(e)) => warn!("Network idle check failed on {}: {}", url, e),
        Err(_) => warn!("Network on {} still busy after {}ms", url, budget.as_millis()),
    }
}

fn transition(url: &str, state: SessionState) {
    debug!("Scrape of {} -> {}", url, state);
}
