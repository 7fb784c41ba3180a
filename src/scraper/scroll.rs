use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::{Result, ScraperError};
use crate::scraper::config::ScraperConfig;
use crate::scraper::script::{PageMetrics, PageScript};
use crate::scraper::PageSession;

/// Why the scroll loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Scroll height did not change after a step
    HeightStable,
    /// Item count stopped growing once the stall check became active
    ItemsStalled,
    /// Ran out of steps while the feed was still growing
    MaxSteps,
    /// Scrolling failed; whatever was loaded is used as-is
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollReport {
    pub steps: u32,
    pub final_height: u64,
    pub final_item_count: usize,
    pub stop_reason: StopReason,
}

/// Forces a lazily-loaded feed to materialize by scrolling until it is stable
#[derive(Debug, Clone)]
pub struct ScrollDriver {
    item_selectors: Vec<String>,
    max_sub_steps: u32,
    sub_step_pause_ms: u64,
    stall_check_after: u32,
    final_settle: Duration,
}

impl ScrollDriver {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            item_selectors: config.selectors.items.clone(),
            max_sub_steps: config.max_sub_steps.max(1),
            sub_step_pause_ms: config.sub_step_pause_ms,
            stall_check_after: config.stall_check_after,
            final_settle: config.final_settle(),
        }
    }

    /// Scroll at most `max_steps` times, then once more to the very bottom.
    ///
    /// Never fails: a page error stops scrolling and is reported as
    /// [`StopReason::Aborted`].
    pub async fn drive_to_stability<S>(
        &self,
        page: &S,
        max_steps: u32,
        step_delay: Duration,
    ) -> ScrollReport
    where
        S: PageSession + ?Sized,
    {
        let mut report = ScrollReport {
            steps: 0,
            final_height: 0,
            final_item_count: 0,
            stop_reason: StopReason::MaxSteps,
        };

        match self.scroll_loop(page, max_steps, step_delay, &mut report).await {
            Ok(reason) => report.stop_reason = reason,
            Err(e) => {
                warn!(
                    "Scrolling aborted after {} steps, continuing with loaded items: {}",
                    report.steps, e
                );
                report.stop_reason = StopReason::Aborted(e.to_string());
                return report;
            }
        }

        // Catch trailing lazy content below the last measured height
        match page.evaluate(PageScript::ScrollToBottom).await {
            Ok(_) => page.settle(self.final_settle).await,
            Err(e) => warn!("Final scroll failed: {}", e),
        }

        info!(
            "Scrolling finished after {} steps ({:?}): height {}, {} items",
            report.steps, report.stop_reason, report.final_height, report.final_item_count
        );
        report
    }

    async fn scroll_loop<S>(
        &self,
        page: &S,
        max_steps: u32,
        step_delay: Duration,
        report: &mut ScrollReport,
    ) -> Result<StopReason>
    where
        S: PageSession + ?Sized,
    {
        let mut previous = self.measure(page).await?;
        report.final_height = previous.height;
        report.final_item_count = previous.item_count;
        debug!(
            "Before scrolling: height {}, {} items",
            previous.height, previous.item_count
        );

        for step in 0..max_steps {
            page.evaluate(PageScript::ScrollStep {
                max_sub_steps: self.max_sub_steps,
                pause_ms: self.sub_step_pause_ms,
            })
            .await?;
            page.settle(step_delay).await;

            let current = self.measure(page).await?;
            report.steps = step + 1;
            report.final_height = current.height;
            report.final_item_count = current.item_count;
            debug!(
                "Scroll #{}: height {} -> {}, items {} -> {}",
                step + 1,
                previous.height,
                current.height,
                previous.item_count,
                current.item_count
            );

            if current.height == previous.height {
                return Ok(StopReason::HeightStable);
            }
            if step >= self.stall_check_after && current.item_count <= previous.item_count {
                return Ok(StopReason::ItemsStalled);
            }
            previous = current;
        }

        Ok(StopReason::MaxSteps)
    }

    async fn measure<S>(&self, page: &S) -> Result<PageMetrics>
    where
        S: PageSession + ?Sized,
    {
        let value = page
            .evaluate(PageScript::Measure {
                item_selectors: &self.item_selectors,
            })
            .await?;
        serde_json::from_value(value)
            .map_err(|e| ScraperError::UnexpectedStructure(format!("page metrics: {}", e)))
    }
}
