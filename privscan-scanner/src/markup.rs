//! Markup parsing for rendered pages
//!
//! Extracts the anchors the transparency check looks at and the
//! sub-resource URLs a browser would request while rendering the page.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// An anchor element on the rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub text: String,
    pub href: String,
}

impl LinkRecord {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("static selector"));

static SRC_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[src], img[src], iframe[src], source[src], video[src], audio[src], embed[src]")
        .expect("static selector")
});

static OBJECT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("object[data]").expect("static selector"));

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[href]").expect("static selector"));

static INLINE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script:not([src]), noscript").expect("static selector"));

// Absolute or protocol-relative URLs embedded in inline snippets
static INLINE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?:)?//[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}(?::\d+)?[^\s"'<>\\)`]*"#)
        .expect("static regex")
});

/// `rel` values for which a browser issues a request
const FETCHING_RELS: [&str; 6] = [
    "stylesheet",
    "icon",
    "preload",
    "modulepreload",
    "prefetch",
    "manifest",
];

/// Every `<a>` element with its collapsed visible text and raw href.
pub fn extract_links(markup: &str) -> Vec<LinkRecord> {
    let document = Html::parse_document(markup);

    document
        .select(&ANCHOR_SELECTOR)
        .map(|element| LinkRecord {
            text: collapsed_text(&element),
            href: element.value().attr("href").unwrap_or_default().to_string(),
        })
        .collect()
}

/// Sub-resource URLs referenced by the page, resolved against `base` and
/// de-duplicated in document order.
pub fn extract_resource_urls(markup: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(markup);
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    let mut push = |reference: &str| {
        if let Some(url) = resolve_reference(base, reference)
            && seen.insert(url.to_string())
        {
            urls.push(url);
        }
    };

    for element in document.select(&SRC_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            push(src);
        }
    }

    for element in document.select(&OBJECT_SELECTOR) {
        if let Some(data) = element.value().attr("data") {
            push(data);
        }
    }

    for element in document.select(&LINK_SELECTOR) {
        let rel = element.value().attr("rel").unwrap_or_default().to_lowercase();
        let fetches = rel
            .split_whitespace()
            .any(|token| FETCHING_RELS.contains(&token));
        if fetches && let Some(href) = element.value().attr("href") {
            push(href);
        }
    }

    // Tag managers and pixels inject their requests from inline snippets
    for element in document.select(&INLINE_SELECTOR) {
        let body: String = element.text().collect();
        for found in INLINE_URL_RE.find_iter(&body) {
            push(found.as_str());
        }
    }

    debug!("Found {} sub-resources on {}", urls.len(), base);
    urls
}

fn collapsed_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_reference(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty()
        || reference.starts_with('#')
        || reference.starts_with("data:")
        || reference.starts_with("javascript:")
        || reference.starts_with("blob:")
        || reference.starts_with("about:")
    {
        return None;
    }

    let mut url = base.join(reference).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;
    url.set_fragment(None);
    Some(url)
}
