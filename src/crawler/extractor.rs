//! HTML extractor for readable text, links and images
//!
//! This module pulls from rendered markup:
//! - The page title (from the first <title> tag)
//! - Article text (every non-blank <p>, in document order)
//! - Outbound links to follow (from <a href> tags)
//! - Image sources for OCR (from <img src> tags)

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Title used when a page has none
pub const UNTITLED: &str = "untitled";

/// Readable content extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,

    /// Paragraph texts joined by newlines; empty if the page has none
    pub body_text: String,

    /// Absolute http(s) links, deduplicated, in first-seen order
    pub links: Vec<String>,

    /// Absolute image URLs in document order
    pub image_sources: Vec<String>,
}

/// Extracts title, article text, links and image sources from markup
///
/// Relative references are resolved against `source_url`. If `source_url`
/// itself does not parse, only absolute references survive.
///
/// # Example
///
/// ```
/// use pagescribe::crawler::extract;
///
/// let html = r#"<html><head><title>Test</title></head>
///     <body><p>Hello</p><a href="/next">Next</a></body></html>"#;
/// let page = extract(html, "https://example.com/start");
/// assert_eq!(page.title, "Test");
/// assert_eq!(page.body_text, "Hello");
/// assert_eq!(page.links, vec!["https://example.com/next".to_string()]);
/// ```
pub fn extract(html: &str, source_url: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    let base_url = Url::parse(source_url).ok();

    ExtractedPage {
        title: extract_title(&document),
        body_text: extract_body_text(&document),
        links: extract_links(&document, base_url.as_ref()),
        image_sources: extract_image_sources(&document, base_url.as_ref()),
    }
}

/// Extracts only the outbound links from markup
pub fn extract_links_only(html: &str, source_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let base_url = Url::parse(source_url).ok();
    extract_links(&document, base_url.as_ref())
}

/// Extracts the page title, falling back to `UNTITLED` when there is no
/// title element; a blank title element yields an empty title
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return UNTITLED.to_string();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| normalized_text(&element))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Joins the text of all non-blank paragraphs, one per line
fn extract_body_text(document: &Html) -> String {
    let Ok(paragraph_selector) = Selector::parse("p") else {
        return String::new();
    };

    document
        .select(&paragraph_selector)
        .map(|element| normalized_text(&element))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts all followable links from the document
fn extract_links(document: &Html, base_url: Option<&Url>) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_reference(href, base_url) {
                    if absolute_url.starts_with("http") && seen.insert(absolute_url.clone()) {
                        links.push(absolute_url);
                    }
                }
            }
        }
    }

    tracing::debug!("Extracted {} links", links.len());
    links
}

/// Extracts absolute image sources from the document
fn extract_image_sources(document: &Html, base_url: Option<&Url>) -> Vec<String> {
    let mut sources = Vec::new();

    if let Ok(img_selector) = Selector::parse("img[src]") {
        for element in document.select(&img_selector) {
            if let Some(src) = element.value().attr("src") {
                if let Some(absolute_url) = resolve_reference(src, base_url) {
                    sources.push(absolute_url);
                }
            }
        }
    }

    sources
}

/// Resolves an href/src against the page URL
///
/// Returns None when the reference cannot be turned into a URL.
fn resolve_reference(reference: &str, base_url: Option<&Url>) -> Option<String> {
    let reference = reference.trim();

    let resolved = match base_url {
        Some(base) => base.join(reference),
        None => Url::parse(reference),
    };

    resolved.ok().map(|url| url.to_string())
}

/// Element text with whitespace runs collapsed and ends trimmed
fn normalized_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
