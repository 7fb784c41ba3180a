//! JavaScript evaluated inside the page.
//!
//! Scripts are generated from selector data so that selector changes never
//! require touching the JavaScript itself.

use serde::Deserialize;

use crate::scraper::config::SelectorConfig;

/// Attribute holding an element's rendered `innerText`
pub const RENDERED_TEXT_ATTR: &str = "data-scrape-text";
/// Attribute holding an anchor's resolved absolute `href`
pub const RESOLVED_HREF_ATTR: &str = "data-scrape-href";
/// Attribute holding an image's live `src`
pub const LIVE_SRC_ATTR: &str = "data-scrape-src";

/// A script the scraper runs in document context
#[derive(Debug, Clone, Copy)]
pub enum PageScript<'a> {
    /// Poll resource timing until no new requests for `idle_ms`
    NetworkIdle { timeout_ms: u64, idle_ms: u64 },
    /// Scroll height and item count, as [`PageMetrics`]
    Measure { item_selectors: &'a [String] },
    /// Scroll to the bottom in viewport-sized sub-steps
    ScrollStep { max_sub_steps: u32, pause_ms: u64 },
    /// One jump to the current bottom of the document
    ScrollToBottom,
    /// Snapshot every item node, or describe the page if none match
    Collect {
        selectors: &'a SelectorConfig,
        body_sample_len: usize,
        tag_sample_cap: usize,
    },
}

/// Result of [`PageScript::Measure`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    pub height: u64,
    pub item_count: usize,
}

impl PageScript<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NetworkIdle { .. } => "network-idle",
            Self::Measure { .. } => "measure",
            Self::ScrollStep { .. } => "scroll-step",
            Self::ScrollToBottom => "scroll-to-bottom",
            Self::Collect { .. } => "collect",
        }
    }

    pub fn source(&self) -> String {
        match *self {
            Self::NetworkIdle {
                timeout_ms,
                idle_ms,
            } => format!(
                r#"
                (async () => {{
                    const timeoutMs = {timeout_ms};
                    const idleMs = {idle_ms};
                    const interval = 100;
                    const count = () => {{
                        try {{ return performance.getEntriesByType('resource').length; }}
                        catch (_) {{ return 0; }}
                    }};

                    const start = Date.now();
                    let last = count();
                    let stable = 0;
                    while (Date.now() - start < timeoutMs) {{
                        await new Promise(r => setTimeout(r, interval));
                        const current = count();
                        if (document.readyState === 'complete' && current === last) {{
                            stable += interval;
                            if (stable >= idleMs) {{
                                return {{ idle: true, waitedMs: Date.now() - start }};
                            }}
                        }} else {{
                            stable = 0;
                        }}
                        last = current;
                    }}
                    return {{ idle: false, waitedMs: Date.now() - start }};
                }})()
                "#
            ),
            Self::Measure { item_selectors } => {
                let item_selectors = js_array(item_selectors);
                format!(
                    r#"
                    (() => {{
                        const itemSelectors = {item_selectors};
                        let itemCount = 0;
                        for (const selector of itemSelectors) {{
                            const n = document.querySelectorAll(selector).length;
                            if (n > 0) {{
                                itemCount = n;
                                break;
                            }}
                        }}
                        return {{
                            height: document.documentElement.scrollHeight,
                            itemCount
                        }};
                    }})()
                    "#
                )
            }
            Self::ScrollStep {
                max_sub_steps,
                pause_ms,
            } => format!(
                r#"
                (async () => {{
                    const height = document.documentElement.scrollHeight;
                    const viewport = Math.max(window.innerHeight, 1);
                    const steps = Math.min({max_sub_steps}, Math.max(1, Math.ceil(height / viewport)));
                    for (let i = 1; i <= steps; i++) {{
                        window.scrollTo(0, (height / steps) * i);
                        if ({pause_ms} > 0) {{
                            await new Promise(r => setTimeout(r, {pause_ms}));
                        }}
                    }}
                    return steps;
                }})()
                "#
            ),
            Self::ScrollToBottom => r#"
                (() => {
                    window.scrollTo(0, document.documentElement.scrollHeight);
                    return document.documentElement.scrollHeight;
                })()
                "#
            .to_string(),
            Self::Collect {
                selectors,
                body_sample_len,
                tag_sample_cap,
            } => {
                let item_selectors = js_array(&selectors.items);
                let text_selectors = js_array(
                    &[&selectors.title, &selectors.duration, &selectors.metadata]
                        .into_iter()
                        .flatten()
                        .cloned()
                        .collect::<Vec<_>>(),
                );
                format!(
                    r#"
                    (() => {{
                        const itemSelectors = {item_selectors};
                        const textSelectors = {text_selectors};

                        // Copy live DOM properties onto attributes so they survive serialization
                        const snapshot = (node) => {{
                            const clone = node.cloneNode(true);
                            const live = [node, ...node.querySelectorAll('*')];
                            const copy = [clone, ...clone.querySelectorAll('*')];
                            const index = new Map(live.map((el, i) => [el, i]));
                            const stamp = (el, attr, value) => {{
                                const target = copy[index.get(el)];
                                if (target && value) target.setAttribute(attr, value);
                            }};
                            for (const selector of textSelectors) {{
                                for (const el of node.querySelectorAll(selector)) {{
                                    stamp(el, '{RENDERED_TEXT_ATTR}', el.innerText);
                                }}
                            }}
                            for (const a of node.querySelectorAll('a[href]')) {{
                                stamp(a, '{RESOLVED_HREF_ATTR}', a.href);
                            }}
                            for (const img of node.querySelectorAll('img')) {{
                                stamp(img, '{LIVE_SRC_ATTR}', img.currentSrc || img.src);
                            }}
                            return clone.outerHTML;
                        }};

                        for (const selector of itemSelectors) {{
                            const nodes = Array.from(document.querySelectorAll(selector));
                            if (nodes.length > 0) {{
                                return {{ selector, items: nodes.map(snapshot) }};
                            }}
                        }}

                        const tags = [];
                        for (const el of document.querySelectorAll('*')) {{
                            if (tags.length >= {tag_sample_cap}) break;
                            if (!tags.includes(el.tagName)) tags.push(el.tagName);
                        }}
                        const body = document.body ? document.body.innerText : '';
                        return {{
                            debug: true,
                            pageInfo: {{
                                pageTitle: document.title,
                                bodySample: body.substring(0, {body_sample_len}),
                                discoveredTags: tags
                            }}
                        }};
                    }})()
                    "#
                )
            }
        }
    }
}

/// Render strings as a JavaScript array literal
fn js_array(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}
