use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{Result, ScraperError};
use crate::scraper::config::ScraperConfig;
use crate::scraper::script::PageScript;
use crate::scraper::{PageSession, SessionProvider};

/// Interval between element lookups while waiting for a selector
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Flags passed to every launched Chrome process
const BASE_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-software-rasterizer",
    "--disable-notifications",
    "--hide-scrollbars",
];

/// Launches a dedicated Chrome process for every session
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeProvider;

/// A Chrome process with the single page a scrape drives
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    shutdown_grace: Duration,
}

impl ChromeProvider {
    fn launch_args(config: &ScraperConfig) -> Vec<String> {
        let mut args: Vec<String> = BASE_ARGS.iter().map(|arg| arg.to_string()).collect();
        args.push(format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ));
        args
    }

    fn browser_config(config: &ScraperConfig) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().args(Self::launch_args(config));

        if !config.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| ScraperError::Session(format!("Failed to build browser config: {}", e)))
    }

    async fn open_page(browser: &Browser, config: &ScraperConfig) -> Result<Page> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::Session(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua.as_str())
                .await
                .map_err(|e| ScraperError::Session(format!("Failed to set user agent: {}", e)))?;
        }

        if !config.extra_headers.is_empty() {
            let headers = Headers::new(serde_json::to_value(&config.extra_headers)?);
            page.execute(SetExtraHttpHeadersParams::new(headers))
                .await
                .map_err(|e| ScraperError::Session(format!("Failed to set headers: {}", e)))?;
        }

        Ok(page)
    }

    /// Close the browser and wait for the process to exit, killing it if it
    /// outlives `grace`
    async fn shutdown(
        mut browser: Browser,
        handler: JoinHandle<()>,
        grace: Duration,
    ) -> Result<()> {
        let exited = within_grace(grace, async {
            let closed = browser
                .close()
                .await
                .map(|_| ())
                .map_err(|e| ScraperError::Session(format!("Failed to close browser: {}", e)));
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
            closed
        })
        .await;

        let result = match exited {
            Some(closed) => closed,
            None => {
                warn!("Browser did not exit within {:?}, killing it", grace);
                if let Some(Err(e)) = browser.kill().await {
                    warn!("Failed to kill browser: {}", e);
                }
                Err(ScraperError::Session(format!(
                    "Browser did not exit within {:?}",
                    grace
                )))
            }
        };
        handler.abort();
        result
    }
}

#[async_trait]
impl SessionProvider for ChromeProvider {
    type Session = ChromeSession;

    async fn acquire(&self, config: &ScraperConfig) -> Result<ChromeSession> {
        let browser_config = Self::browser_config(config)?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            ScraperError::Session(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Spawn the browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        match Self::open_page(&browser, config).await {
            Ok(page) => Ok(ChromeSession {
                browser,
                page,
                handler,
                shutdown_grace: config.shutdown_timeout(),
            }),
            Err(e) => {
                if let Err(close_err) =
                    Self::shutdown(browser, handler, config.shutdown_timeout()).await
                {
                    warn!("{}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn release(&self, session: ChromeSession) -> Result<()> {
        let ChromeSession {
            browser,
            page,
            handler,
            shutdown_grace,
        } = session;

        match within_grace(shutdown_grace, page.close()).await {
            Some(Err(e)) => debug!("Failed to close page: {}", e),
            None => debug!("Page did not close within {:?}", shutdown_grace),
            Some(Ok(())) => {}
        }
        Self::shutdown(browser, handler, shutdown_grace).await
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;

        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;

        Ok(())
    }

    async fn evaluate(&self, script: PageScript<'_>) -> Result<serde_json::Value> {
        let name = script.name();
        self.page
            .evaluate(script.source())
            .await
            .map_err(|e| ScraperError::Evaluation(format!("{} script failed: {}", name, e)))?
            .into_value()
            .map_err(|e| {
                ScraperError::Evaluation(format!("Failed to parse {} result: {:?}", name, e))
            })
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<()> {
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }
}

/// Run `fut` for at most `grace`; `None` when it did not finish in time
async fn within_grace<F: Future>(grace: Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(grace, fut).await.ok()
}
