//! Scripted in-memory browser used by the scraper tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::app::{Result, ScraperError};
use crate::scraper::config::ScraperConfig;
use crate::scraper::script::PageScript;
use crate::scraper::{PageSession, SessionProvider};

type MetricsFn = Box<dyn Fn(usize) -> Value + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Ok,
    Hang,
    Fail,
}

pub struct FakeSession {
    navigation: Navigation,
    ready: bool,
    metrics: MetricsFn,
    collect: std::result::Result<Value, String>,
    fail_scroll_at: Option<usize>,
    measures: AtomicUsize,
    scrolls: AtomicUsize,
    bottoms: AtomicUsize,
}

impl FakeSession {
    /// A feed that grows by 10 items and 1000px on every measurement
    pub fn growing() -> Self {
        Self::new(Box::new(|n| {
            json!({ "height": 1000 * (n as u64 + 1), "itemCount": 10 * (n + 1) })
        }))
    }

    /// Measurements replayed in order; the last one repeats
    pub fn with_metrics(metrics: Vec<(u64, usize)>) -> Self {
        Self::new(Box::new(move |n| {
            let (height, count) = metrics[n.min(metrics.len() - 1)];
            json!({ "height": height, "itemCount": count })
        }))
    }

    fn new(metrics: MetricsFn) -> Self {
        Self {
            navigation: Navigation::Ok,
            ready: true,
            metrics,
            collect: Ok(json!({ "selector": "ytd-rich-item-renderer", "items": [] })),
            fail_scroll_at: None,
            measures: AtomicUsize::new(0),
            scrolls: AtomicUsize::new(0),
            bottoms: AtomicUsize::new(0),
        }
    }

    pub fn with_raw_metrics(mut self, value: Value) -> Self {
        self.metrics = Box::new(move |_| value.clone());
        self
    }

    pub fn fail_scroll_at(mut self, call: usize) -> Self {
        self.fail_scroll_at = Some(call);
        self
    }

    pub fn navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn never_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Items returned by the collect script, as serialized node markup
    pub fn with_items(mut self, items: &[&str]) -> Self {
        self.collect = Ok(json!({ "selector": "ytd-rich-item-renderer", "items": items }));
        self
    }

    pub fn with_collect(mut self, value: Value) -> Self {
        self.collect = Ok(value);
        self
    }

    pub fn failing_collect(mut self, message: &str) -> Self {
        self.collect = Err(message.to_string());
        self
    }

    pub fn scroll_steps(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn bottom_scrolls(&self) -> usize {
        self.bottoms.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        match self.navigation {
            Navigation::Ok => Ok(()),
            Navigation::Hang => std::future::pending().await,
            Navigation::Fail => Err(ScraperError::Navigation(format!(
                "net::ERR_NAME_NOT_RESOLVED at {}",
                url
            ))),
        }
    }

    async fn evaluate(&self, script: PageScript<'_>) -> Result<Value> {
        match script {
            PageScript::NetworkIdle { .. } => Ok(json!({ "idle": true, "waitedMs": 0 })),
            PageScript::Measure { .. } => {
                let n = self.measures.fetch_add(1, Ordering::SeqCst);
                Ok((self.metrics)(n))
            }
            PageScript::ScrollStep { .. } => {
                let n = self.scrolls.fetch_add(1, Ordering::SeqCst);
                if self.fail_scroll_at == Some(n) {
                    return Err(ScraperError::Evaluation(
                        "Execution context was destroyed".to_string(),
                    ));
                }
                Ok(json!(4))
            }
            PageScript::ScrollToBottom => {
                self.bottoms.fetch_add(1, Ordering::SeqCst);
                Ok(json!(0))
            }
            PageScript::Collect { .. } => {
                self.collect.clone().map_err(ScraperError::Evaluation)
            }
        }
    }

    async fn wait_for_selector(&self, _selector: &str) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            std::future::pending().await
        }
    }
}

type SessionFactory = Box<dyn Fn(usize) -> FakeSession + Send + Sync>;

/// Hands out [`FakeSession`]s and counts acquisitions and releases
pub struct FakeProvider {
    factory: SessionFactory,
    fail_acquire: bool,
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn new(factory: impl Fn(usize) -> FakeSession + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            fail_acquire: false,
            acquired: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_acquire: true,
            ..Self::new(|_| FakeSession::growing())
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for FakeProvider {
    type Session = FakeSession;

    async fn acquire(&self, _config: &ScraperConfig) -> Result<FakeSession> {
        if self.fail_acquire {
            return Err(ScraperError::Session("browser binary not found".to_string()));
        }
        let n = self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok((self.factory)(n))
    }

    async fn release(&self, _session: FakeSession) -> Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
