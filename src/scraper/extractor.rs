//! Per-node field extraction.
//!
//! Each output field has an ordered list of [`Strategy`] values; the first
//! one producing a non-empty string wins and a field with no match is the
//! empty string. Extraction never fails once the extractor is built.

use ::scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::app::{Result, ScraperError};
use crate::domain::VideoRecord;
use crate::scraper::config::ScraperConfig;
use crate::scraper::script::{LIVE_SRC_ATTR, RENDERED_TEXT_ATTR, RESOLVED_HREF_ATTR};
use crate::scraper::title::TitleConvention;

/// Where a strategy reads its value from once its selector matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Text as rendered by the browser (stamped during collection)
    RenderedText,
    /// Raw text content of the element and its descendants
    TextContent,
    /// Absolute link target; relative hrefs are resolved against the page URL
    ResolvedHref,
    Attr(&'static str),
}

/// One `(selector, source)` pair
#[derive(Debug, Clone)]
pub struct Strategy {
    selector: Selector,
    source: Source,
    verbatim: bool,
}

impl Strategy {
    pub fn new(selector: &str, source: Source) -> Result<Self> {
        Ok(Self {
            selector: parse_selector(selector)?,
            source,
            verbatim: false,
        })
    }

    /// Keep surrounding whitespace in the value. Whitespace-only values still
    /// count as missing.
    pub fn verbatim(mut self) -> Self {
        self.verbatim = true;
        self
    }

    /// Read this strategy's value from the first element under `node`
    /// matching the selector
    pub fn apply(&self, node: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
        let element = node.select(&self.selector).next()?;
        let value = read(element, self.source, base)?;
        if value.trim().is_empty() {
            None
        } else if self.verbatim {
            Some(value)
        } else {
            Some(value.trim().to_string())
        }
    }
}

pub struct FieldExtractor {
    title: Vec<Strategy>,
    link: Vec<Strategy>,
    duration: Vec<Strategy>,
    image: Vec<Strategy>,
    metadata: Vec<Selector>,
    convention: Box<dyn TitleConvention>,
    default_creator: String,
}

impl FieldExtractor {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let selectors = &config.selectors;

        // Raw title text goes to the convention untrimmed so edge separators
        // survive the split
        let title = strategies(
            &selectors.title,
            &[Source::RenderedText, Source::TextContent, Source::Attr("title")],
        )?
        .into_iter()
        .map(Strategy::verbatim)
        .collect();
        let link = strategies(&selectors.link, &[Source::ResolvedHref])?;
        let duration = strategies(
            &selectors.duration,
            &[Source::RenderedText, Source::TextContent],
        )?;
        let image = strategies(
            &selectors.image,
            &[
                Source::Attr("data-thumb"),
                Source::Attr(LIVE_SRC_ATTR),
                Source::Attr("src"),
            ],
        )?;
        let metadata = selectors
            .metadata
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            title,
            link,
            duration,
            image,
            metadata,
            convention: config.title_convention.build(),
            default_creator: config.default_creator.clone(),
        })
    }

    /// Build a [`VideoRecord`] from one feed-item node
    pub fn extract(&self, node: ElementRef<'_>, base: Option<&Url>) -> VideoRecord {
        let raw_title = first_match(&self.title, node, base);
        let parts = self.convention.decompose(&raw_title, &self.default_creator);

        let url = first_match(&self.link, node, base);
        let video_id = video_id_from_url(&url);

        let duration = first_match(&self.duration, node, base);

        let mut image = first_match(&self.image, node, base);
        if image.is_empty() && !video_id.is_empty() {
            image = thumbnail_url(&video_id);
        }

        let (views, upload_time) = self.metadata_line(node);

        VideoRecord {
            title: parts.title,
            url,
            video_id,
            duration,
            image,
            creator: parts.creator,
            batch: parts.batch,
            subject: parts.subject,
            views,
            upload_time,
        }
    }

    /// Extract from a serialized node snapshot
    pub fn extract_html(&self, html: &str, base: Option<&Url>) -> VideoRecord {
        let fragment = Html::parse_fragment(html);
        self.extract(fragment.root_element(), base)
    }

    /// Views and upload time from the first metadata container with spans
    fn metadata_line(&self, node: ElementRef<'_>) -> (String, String) {
        let Some(spans) = self
            .metadata
            .iter()
            .map(|selector| node.select(selector).collect::<Vec<_>>())
            .find(|spans| !spans.is_empty())
        else {
            return (String::new(), String::new());
        };

        let views = spans
            .first()
            .map(|span| span_text(*span))
            .and_then(|text| text.split_whitespace().next().map(str::to_string))
            .unwrap_or_default();
        let upload_time = spans.get(1).map(|span| span_text(*span)).unwrap_or_default();

        (views, upload_time)
    }
}

/// Video id from a watch or shorts URL, or empty if neither pattern matches
pub fn video_id_from_url(url: &str) -> String {
    if let Some((_, rest)) = url.split_once("watch?v=") {
        rest.split('&').next().unwrap_or_default().to_string()
    } else if let Some((_, rest)) = url.split_once("/shorts/") {
        rest.split('?').next().unwrap_or_default().to_string()
    } else {
        String::new()
    }
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScraperError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

fn strategies(selectors: &[String], sources: &[Source]) -> Result<Vec<Strategy>> {
    let mut out = Vec::with_capacity(selectors.len() * sources.len());
    for selector in selectors {
        let parsed = parse_selector(selector)?;
        for source in sources {
            out.push(Strategy {
                selector: parsed.clone(),
                source: *source,
                verbatim: false,
            });
        }
    }
    Ok(out)
}

fn first_match(strategies: &[Strategy], node: ElementRef<'_>, base: Option<&Url>) -> String {
    strategies
        .iter()
        .find_map(|strategy| strategy.apply(node, base))
        .unwrap_or_default()
}

fn read(element: ElementRef<'_>, source: Source, base: Option<&Url>) -> Option<String> {
    let value = match source {
        Source::RenderedText => element.value().attr(RENDERED_TEXT_ATTR)?.to_string(),
        Source::TextContent => element.text().collect::<String>(),
        Source::ResolvedHref => match element.value().attr(RESOLVED_HREF_ATTR) {
            Some(href) => href.to_string(),
            None => resolve_href(element.value().attr("href")?.trim(), base),
        },
        Source::Attr(name) => element.value().attr(name)?.to_string(),
    };
    Some(value)
}

fn resolve_href(href: &str, base: Option<&Url>) -> String {
    match base.map(|base| base.join(href)) {
        Some(Ok(url)) => url.to_string(),
        _ => href.to_string(),
    }
}

fn span_text(span: ElementRef<'_>) -> String {
    [Source::RenderedText, Source::TextContent]
        .into_iter()
        .filter_map(|source| read(span, source, None))
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}
