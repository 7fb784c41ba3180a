use std::path::Path;

use url::Url;

use crate::app::Result;
use crate::config::Config;
use crate::domain::ScrapeOutcome;
use crate::scraper::{ChannelScraper, ChromeProvider, ResultShaper, ScrapeOptions, ScraperConfig};

/// Per-invocation overrides of the configured scrape options
#[derive(Debug, Clone, Default)]
pub struct ScrapeOverrides {
    pub max_scroll_steps: Option<u32>,
    pub step_delay_ms: Option<u64>,
    pub navigation_timeout_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl ScrapeOverrides {
    pub fn apply(&self, mut options: ScrapeOptions) -> ScrapeOptions {
        if let Some(steps) = self.max_scroll_steps {
            options.max_scroll_steps = steps;
        }
        if let Some(delay) = self.step_delay_ms {
            options.step_delay_ms = delay;
        }
        if let Some(timeout) = self.navigation_timeout_ms {
            options.navigation_timeout_ms = timeout;
        }
        if let Some(secs) = self.timeout_secs {
            options.operation_timeout_ms = secs.saturating_mul(1000);
        }
        options
    }
}

pub async fn scrape(
    config: ScraperConfig,
    url: Option<&str>,
    overrides: &ScrapeOverrides,
) -> Result<ScrapeOutcome> {
    let url = url.unwrap_or(&config.channel_url).to_string();
    let options = overrides.apply(config.options());

    let scraper = ChannelScraper::new(ChromeProvider, config)?;
    Ok(scraper.scrape_channel(&url, &options).await)
}

pub fn extract(config: &ScraperConfig, path: &Path, base_url: Option<&str>) -> Result<ScrapeOutcome> {
    let html = std::fs::read_to_string(path)?;
    let base = base_url.map(Url::parse).transpose()?;

    let shaper = ResultShaper::new(config)?;
    Ok(shaper.shape_document(&html, base.as_ref()))
}

pub fn write_outcome(outcome: &ScrapeOutcome, output: Option<&Path>, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(outcome)?
    } else {
        serde_json::to_string_pretty(outcome)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            eprintln!("Wrote {} videos to {}", outcome.videos().len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn show_config(print_default: bool) -> anyhow::Result<()> {
    if print_default {
        print!("{}", Config::default_config_content());
    } else {
        println!("{}", Config::default_config_path()?.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_options() {
        let overrides = ScrapeOverrides {
            max_scroll_steps: Some(3),
            timeout_secs: Some(20),
            ..Default::default()
        };
        let options = overrides.apply(ScraperConfig::default().options());

        assert_eq!(options.max_scroll_steps, 3);
        assert_eq!(options.operation_timeout_ms, 20_000);
        assert_eq!(options.step_delay_ms, 2_000);
        assert_eq!(options.navigation_timeout_ms, 90_000);
    }

    #[test]
    fn test_extract_saved_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.html");
        std::fs::write(
            &path,
            r#"<html><body><ytd-rich-grid-renderer>
                <ytd-rich-item-renderer>
                  <a id="thumbnail" href="/shorts/xyz987?feature=share"></a>
                  <span id="video-title">Short one</span>
                </ytd-rich-item-renderer>
            </ytd-rich-grid-renderer></body></html>"#,
        )
        .unwrap();

        let outcome = extract(
            &ScraperConfig::default(),
            &path,
            Some("https://www.youtube.com/@jusst1523/videos"),
        )
        .unwrap();

        let videos = outcome.videos();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].url, "https://www.youtube.com/shorts/xyz987?feature=share");
        assert_eq!(videos[0].video_id, "xyz987");
        assert_eq!(videos[0].creator, "JUSST Tamil");
    }

    #[test]
    fn test_extract_rejects_invalid_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.html");
        std::fs::write(&path, "<html></html>").unwrap();

        assert!(extract(&ScraperConfig::default(), &path, Some("::nope")).is_err());
    }

    #[test]
    fn test_write_outcome_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_outcome(&ScrapeOutcome::VideoList(vec![]), Some(&path), true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"videos\":[]}\n");
    }
}
