//! Page metadata extraction
//!
//! Turns a fetched HTML body into a [`PageResult`]: title, meta description
//! and keywords, headings, links, and images, plus the fetch bookkeeping the
//! scheduler cares about (status, timing, depth, parentage).

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// A link found on a page
#[derive(Debug, Clone, Serialize)]
pub struct LinkRef {
    /// Absolute URL the link points at
    pub url: String,
    /// Visible link text, trimmed
    pub text: String,
    /// The anchor's title attribute, if present
    pub title: Option<String>,
}

/// An image found on a page
#[derive(Debug, Clone, Serialize)]
pub struct ImageRef {
    /// Absolute URL of the image source
    pub url: String,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Everything harvested from one successfully fetched page
///
/// Immutable once produced; appended exactly once to the run's results.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    /// Effective URL, after any redirects
    pub url: String,
    /// The URL as it was queued
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    /// Heading text by tag ("h1" through "h6"); levels absent from the page
    /// have no entry
    pub headings: HashMap<String, Vec<String>>,
    pub links: Vec<LinkRef>,
    pub images: Vec<ImageRef>,
    pub status_code: u16,
    pub content_length: usize,
    pub content_type: String,
    /// Wall time of the successful fetch attempt, in milliseconds
    pub crawl_time_ms: u64,
    /// Link hops from the seed URL
    pub depth: u32,
    /// URL of the page this one was discovered on
    pub parent: Option<String>,
    /// When the page was captured
    pub timestamp: DateTime<Utc>,
}

/// Fetch bookkeeping handed to [`extract_page`] alongside the body
pub struct ExtractContext<'a> {
    /// Post-redirect URL; also the base for resolving relative hrefs
    pub final_url: &'a Url,
    pub original_url: &'a Url,
    pub status_code: u16,
    pub content_type: &'a str,
    pub content_length: usize,
    pub crawl_time_ms: u64,
    pub depth: u32,
    pub parent: Option<&'a Url>,
}

/// Extracts page metadata from an HTML body
pub fn extract_page(html: &str, ctx: ExtractContext<'_>) -> PageResult {
    let document = Html::parse_document(html);

    PageResult {
        url: ctx.final_url.to_string(),
        original_url: ctx.original_url.to_string(),
        title: select_text(&document, "title"),
        description: select_meta(&document, "meta[name='description']"),
        keywords: select_meta(&document, "meta[name='keywords']"),
        headings: extract_headings(&document),
        links: extract_links(&document, ctx.final_url),
        images: extract_images(&document, ctx.final_url),
        status_code: ctx.status_code,
        content_length: ctx.content_length,
        content_type: ctx.content_type.to_string(),
        crawl_time_ms: ctx.crawl_time_ms,
        depth: ctx.depth,
        parent: ctx.parent.map(Url::to_string),
        timestamp: Utc::now(),
    }
}

/// Text of the first element matching the selector, trimmed, None if empty
fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Content attribute of the first element matching the selector
fn select_meta(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects h1 through h6 text, keeping document order within each level
fn extract_headings(document: &Html) -> HashMap<String, Vec<String>> {
    let mut headings = HashMap::new();

    for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        let selector = match Selector::parse(tag) {
            Ok(s) => s,
            Err(_) => continue,
        };

        let texts: Vec<String> = document
            .select(&selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if !texts.is_empty() {
            headings.insert(tag.to_string(), texts);
        }
    }

    headings
}

/// Collects every anchor with a resolvable href
fn extract_links(document: &Html, base: &Url) -> Vec<LinkRef> {
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let resolved = base.join(href.trim()).ok()?;

            Some(LinkRef {
                url: resolved.to_string(),
                text: element.text().collect::<String>().trim().to_string(),
                title: element.value().attr("title").map(str::to_string),
            })
        })
        .collect()
}

/// Collects every image with a resolvable src
fn extract_images(document: &Html, base: &Url) -> Vec<ImageRef> {
    let selector = match Selector::parse("img[src]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let src = element.value().attr("src")?;
            let resolved = base.join(src.trim()).ok()?;
            let attr = |name: &str| element.value().attr(name).map(str::to_string);

            Some(ImageRef {
                url: resolved.to_string(),
                alt: attr("alt"),
                title: attr("title"),
                width: attr("width"),
                height: attr("height"),
            })
        })
        .collect()
}
