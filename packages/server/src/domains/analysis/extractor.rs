//! Page extractor - one GET, then deterministic signal extraction
//!
//! Field rules:
//! - `title`: text of every `<title>` concatenated, untrimmed
//! - `metaDescription` / `canonical`: first matching tag's attribute, or ""
//! - `h1s` / `h2s`: heading text in document order
//! - `images`: `src` (optional) and `alt` (defaults to "")
//! - `links`: `href` (optional) and trimmed text
//! - `structuredData`: raw text of each `application/ld+json` script
//! - `wordCount`: body text split on whitespace runs, pieces counted
//!
//! The word count keeps the empty leading/trailing pieces a split produces,
//! so an empty body counts as 1 and padded text counts one extra per side.
//! Stored scores were computed this way; do not "fix" it.
//!
//! No retries here. Redelivery is the queue's job.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::errors::FetchError;
use crate::common::{ExtractedPage, ImageRef, LinkRef};
use crate::kernel::BasePageFetcher;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Fetches a page and turns it into an [`ExtractedPage`].
#[derive(Clone)]
pub struct PageExtractor {
    fetcher: Arc<dyn BasePageFetcher>,
}

impl PageExtractor {
    pub fn new(fetcher: Arc<dyn BasePageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch `url` once and extract its SEO signals.
    pub async fn extract(&self, url: &str) -> Result<ExtractedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !(200..300).contains(&fetched.status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: fetched.status,
            });
        }

        debug!(
            url = %url,
            final_url = %fetched.final_url,
            bytes = fetched.body.len(),
            "Fetched page"
        );

        Ok(parse_page(url, fetched.body))
    }
}

/// Extract signals from already-fetched markup. Pure.
pub fn parse_page(url: &str, html: String) -> ExtractedPage {
    let document = Html::parse_document(&html);

    let title = select_all(&document, "title")
        .into_iter()
        .map(element_text)
        .collect::<String>();

    let meta_description = first_attr(&document, r#"meta[name="description"]"#, "content");
    let canonical = first_attr(&document, r#"link[rel="canonical"]"#, "href");

    let h1s = select_all(&document, "h1").into_iter().map(element_text).collect();
    let h2s = select_all(&document, "h2").into_iter().map(element_text).collect();

    let images = select_all(&document, "img")
        .into_iter()
        .map(|el| ImageRef {
            src: el.value().attr("src").map(str::to_string),
            alt: el.value().attr("alt").unwrap_or_default().to_string(),
        })
        .collect();

    let links = select_all(&document, "a")
        .into_iter()
        .map(|el| LinkRef {
            href: el.value().attr("href").map(str::to_string),
            text: element_text(el).trim().to_string(),
        })
        .collect();

    let structured_data = select_all(&document, r#"script[type="application/ld+json"]"#)
        .into_iter()
        .map(element_text)
        .collect();

    let body_text = select_all(&document, "body")
        .into_iter()
        .map(element_text)
        .collect::<String>();

    ExtractedPage {
        title,
        meta_description,
        canonical,
        h1s,
        h2s,
        images,
        links,
        structured_data,
        word_count: count_words(&body_text),
        url: url.to_string(),
        html,
    }
}

/// Number of pieces produced by splitting on whitespace runs.
pub fn count_words(text: &str) -> usize {
    WHITESPACE_RUN.split(text).count()
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn first_attr(document: &Html, css: &str, attr: &str) -> String {
    select_all(document, css)
        .into_iter()
        .next()
        .and_then(|el| el.value().attr(attr))
        .unwrap_or_default()
        .to_string()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>Acme Widgets | Handmade widgets since 1999</title>
  <meta name="description" content="We build durable widgets.">
  <link rel="canonical" href="https://acme.test/">
  <script type="application/ld+json">{"@type":"Organization","name":"Acme"}</script>
</head>
<body>
  <h1>Widgets</h1>
  <h2>Steel</h2><h2>Brass</h2>
  <img src="/a.png" alt="A steel widget">
  <img src="/b.png">
  <img alt="">
  <a href="/about">  About us  </a>
  <a>No href</a>
</body>
</html>"#;

    #[test]
    fn extracts_head_signals() {
        let page = parse_page("https://acme.test/", PAGE.to_string());
        assert_eq!(page.title, "Acme Widgets | Handmade widgets since 1999");
        assert_eq!(page.meta_description, "We build durable widgets.");
        assert_eq!(page.canonical, "https://acme.test/");
        assert_eq!(page.structured_data.len(), 1);
        assert!(page.structured_data[0].contains("\"Organization\""));
        assert_eq!(page.url, "https://acme.test/");
        assert_eq!(page.html, PAGE);
    }

    #[test]
    fn extracts_headings_in_order() {
        let page = parse_page("https://acme.test/", PAGE.to_string());
        assert_eq!(page.h1s, vec!["Widgets"]);
        assert_eq!(page.h2s, vec!["Steel", "Brass"]);
    }

    #[test]
    fn image_alt_defaults_to_empty() {
        let page = parse_page("https://acme.test/", PAGE.to_string());
        assert_eq!(page.images.len(), 3);
        assert_eq!(page.images[0].alt, "A steel widget");
        assert_eq!(page.images[1].alt, "");
        assert_eq!(page.images[2].src, None);
    }

    #[test]
    fn link_text_is_trimmed_and_href_optional() {
        let page = parse_page("https://acme.test/", PAGE.to_string());
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].href.as_deref(), Some("/about"));
        assert_eq!(page.links[0].text, "About us");
        assert_eq!(page.links[1].href, None);
    }

    #[test]
    fn missing_tags_give_empty_strings() {
        let page = parse_page("https://x.test/", "<html><body><p>hi</p></body></html>".into());
        assert_eq!(page.title, "");
        assert_eq!(page.meta_description, "");
        assert_eq!(page.canonical, "");
        assert!(page.h1s.is_empty());
        assert!(page.structured_data.is_empty());
    }

    #[test]
    fn empty_body_counts_one_word() {
        let page = parse_page("https://x.test/", "<html><body></body></html>".into());
        assert_eq!(page.word_count, 1);
    }

    #[test]
    fn count_words_keeps_edge_pieces() {
        assert_eq!(count_words(""), 1);
        assert_eq!(count_words("one two  three"), 3);
        assert_eq!(count_words("  one two "), 4);
    }
}
