//! Turns the page's collection payload into a [`ScrapeOutcome`].

use ::scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::app::{Result, ScraperError};
use crate::domain::{PageInfo, ScrapeOutcome, VideoRecord};
use crate::scraper::config::ScraperConfig;
use crate::scraper::extractor::{parse_selector, FieldExtractor};

/// Payload produced by the collect script
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Collected {
    Items {
        selector: String,
        items: Vec<String>,
    },
    Diagnostic {
        #[serde(rename = "pageInfo")]
        page_info: RawPageInfo,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawPageInfo {
    page_title: String,
    body_sample: String,
    discovered_tags: Vec<String>,
}

pub struct ResultShaper {
    extractor: FieldExtractor,
    item_selectors: Vec<(String, Selector)>,
    title_selector: Selector,
    body_selector: Selector,
    any_selector: Selector,
    body_sample_len: usize,
    tag_sample_cap: usize,
}

impl ResultShaper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let item_selectors = config
            .selectors
            .items
            .iter()
            .map(|s| Ok((s.clone(), parse_selector(s)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extractor: FieldExtractor::new(config)?,
            item_selectors,
            title_selector: parse_selector("title")?,
            body_selector: parse_selector("body")?,
            any_selector: parse_selector("*")?,
            body_sample_len: config.body_sample_len,
            tag_sample_cap: config.tag_sample_cap,
        })
    }

    /// Classify the collect script's result.
    ///
    /// Returns `Err(UnexpectedStructure)` when the payload matches neither
    /// the item nor the diagnostic shape.
    pub fn shape(&self, collected: serde_json::Value, page_url: &Url) -> Result<ScrapeOutcome> {
        let collected: Collected = serde_json::from_value(collected).map_err(|e| {
            ScraperError::UnexpectedStructure(format!("collection payload: {}", e))
        })?;

        match collected {
            Collected::Items { selector, items } => {
                if items.is_empty() {
                    return Err(ScraperError::UnexpectedStructure(format!(
                        "selector {:?} reported a match but returned no nodes",
                        selector
                    )));
                }
                info!("Extracting {} items matched by {:?}", items.len(), selector);
                let videos = items
                    .iter()
                    .map(|html| self.extractor.extract_html(html, Some(page_url)))
                    .collect();
                Ok(self.video_list(videos))
            }
            Collected::Diagnostic { page_info } => Ok(self.diagnostic(page_info, page_url)),
        }
    }

    /// Run item query and extraction over a saved HTML document
    pub fn shape_document(&self, html: &str, page_url: Option<&Url>) -> ScrapeOutcome {
        let document = Html::parse_document(html);

        for (source, selector) in &self.item_selectors {
            let nodes: Vec<_> = document.select(selector).collect();
            if nodes.is_empty() {
                continue;
            }
            info!("Extracting {} items matched by {:?}", nodes.len(), source);
            let videos = nodes
                .into_iter()
                .map(|node| self.extractor.extract(node, page_url))
                .collect();
            return self.video_list(videos);
        }

        let page_title = document
            .select(&self.title_selector)
            .next()
            .map(|title| title.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let body_sample = document
            .select(&self.body_selector)
            .next()
            .map(|body| body.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let discovered_tags = document
            .select(&self.any_selector)
            .map(|el| el.value().name().to_ascii_uppercase())
            .collect();

        let fallback = page_url.map(Url::as_str).unwrap_or("(unknown page)");
        self.diagnostic_with_fallback(
            RawPageInfo {
                page_title,
                body_sample: body_sample.split_whitespace().collect::<Vec<_>>().join(" "),
                discovered_tags,
            },
            fallback,
        )
    }

    fn video_list(&self, videos: Vec<VideoRecord>) -> ScrapeOutcome {
        let untitled = videos.iter().filter(|v| v.title.is_empty()).count();
        if untitled > 0 {
            warn!("{} of {} items had no title", untitled, videos.len());
        }
        ScrapeOutcome::VideoList(videos)
    }

    fn diagnostic(&self, raw: RawPageInfo, page_url: &Url) -> ScrapeOutcome {
        self.diagnostic_with_fallback(raw, page_url.as_str())
    }

    /// Normalize page info: non-empty title, distinct tags, bounded sizes
    fn diagnostic_with_fallback(&self, raw: RawPageInfo, fallback_title: &str) -> ScrapeOutcome {
        let page_title = match raw.page_title.trim() {
            "" => fallback_title.to_string(),
            title => title.to_string(),
        };

        let mut discovered_tags: Vec<String> = Vec::new();
        for tag in raw.discovered_tags {
            if discovered_tags.len() >= self.tag_sample_cap {
                break;
            }
            if !discovered_tags.contains(&tag) {
                discovered_tags.push(tag);
            }
        }

        warn!(
            "No feed items matched any item selector on {:?}; page markup may have changed",
            page_title
        );

        ScrapeOutcome::EmptyDiagnostic(PageInfo {
            page_title,
            body_sample: raw.body_sample.chars().take(self.body_sample_len).collect(),
            discovered_tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ITEM: &str = r#"<ytd-rich-item-renderer><a id="thumbnail" href="/watch?v=abc123"></a><span id="video-title">Algebra | Batch2024 | Math | JUSST Tamil</span></ytd-rich-item-renderer>"#;

    fn shaper() -> ResultShaper {
        ResultShaper::new(&ScraperConfig::default()).unwrap()
    }

    fn page_url() -> Url {
        Url::parse("https://www.youtube.com/@jusst1523/videos").unwrap()
    }

    #[test]
    fn test_items_become_video_list_in_order() {
        let second = ITEM.replace("abc123", "def456").replace("Algebra", "Geometry");
        let outcome = shaper()
            .shape(
                json!({ "selector": "ytd-rich-item-renderer", "items": [ITEM, second] }),
                &page_url(),
            )
            .unwrap();

        let videos = outcome.videos();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].title, "Algebra");
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(videos[1].title, "Geometry");
        assert_eq!(videos[1].video_id, "def456");
        assert_eq!(videos[1].image, "https://i.ytimg.com/vi/def456/hqdefault.jpg");
    }

    #[test]
    fn test_diagnostic_is_capped_and_deduplicated() {
        let tags: Vec<String> = (0..30)
            .flat_map(|i| vec![format!("TAG-{}", i), format!("TAG-{}", i)])
            .collect();
        let outcome = shaper()
            .shape(
                json!({
                    "debug": true,
                    "pageInfo": {
                        "pageTitle": "YouTube",
                        "bodySample": "x".repeat(900),
                        "discoveredTags": tags
                    }
                }),
                &page_url(),
            )
            .unwrap();

        let ScrapeOutcome::EmptyDiagnostic(info) = outcome else {
            panic!("expected diagnostic");
        };
        assert_eq!(info.page_title, "YouTube");
        assert_eq!(info.body_sample.len(), 500);
        assert_eq!(info.discovered_tags.len(), 20);
        assert_eq!(info.discovered_tags[0], "TAG-0");
        assert_eq!(info.discovered_tags[1], "TAG-1");
    }

    #[test]
    fn test_diagnostic_blank_title_falls_back_to_url() {
        let outcome = shaper()
            .shape(json!({ "debug": true, "pageInfo": { "pageTitle": "  " } }), &page_url())
            .unwrap();

        let ScrapeOutcome::EmptyDiagnostic(info) = outcome else {
            panic!("expected diagnostic");
        };
        assert_eq!(info.page_title, "https://www.youtube.com/@jusst1523/videos");
        assert!(info.discovered_tags.is_empty());
    }

    #[test]
    fn test_malformed_payload_is_unexpected_structure() {
        let err = shaper()
            .shape(json!({ "unexpected": 1 }), &page_url())
            .unwrap_err();
        assert!(matches!(err, ScraperError::UnexpectedStructure(_)));

        let err = shaper().shape(json!(null), &page_url()).unwrap_err();
        assert!(matches!(err, ScraperError::UnexpectedStructure(_)));
    }

    #[test]
    fn test_empty_item_list_is_unexpected_structure() {
        let err = shaper()
            .shape(json!({ "selector": "ytd-rich-item-renderer", "items": [] }), &page_url())
            .unwrap_err();
        assert!(matches!(err, ScraperError::UnexpectedStructure(_)));
    }

    #[test]
    fn test_shape_document_uses_first_matching_selector_set() {
        let html = r#"<html><head><title>Channel</title></head><body>
            <ytd-grid-video-renderer><span id="video-title">Grid One</span></ytd-grid-video-renderer>
            <ytd-video-renderer><span id="video-title">List One</span></ytd-video-renderer>
            <ytd-grid-video-renderer><span id="video-title">Grid Two</span></ytd-grid-video-renderer>
        </body></html>"#;
        let outcome = shaper().shape_document(html, None);

        let titles: Vec<_> = outcome.videos().iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["Grid One", "Grid Two"]);
    }

    #[test]
    fn test_shape_document_without_items_reports_page() {
        let html = r#"<html><head><title>Before you continue to YouTube</title></head>
            <body><form><button>Accept all</button></form><div>Reject   all</div></body></html>"#;
        let outcome = shaper().shape_document(html, Some(&page_url()));

        let ScrapeOutcome::EmptyDiagnostic(info) = outcome else {
            panic!("expected diagnostic");
        };
        assert_eq!(info.page_title, "Before you continue to YouTube");
        assert_eq!(info.body_sample, "Accept all Reject all");
        assert_eq!(
            info.discovered_tags,
            vec!["HTML", "HEAD", "TITLE", "BODY", "FORM", "BUTTON", "DIV"]
        );
    }
}
