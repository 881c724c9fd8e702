//! HTML pages with known scores.

#![allow(dead_code)]

pub const FULL_MARKS_URL: &str = "https://acme.test/";
pub const EMPTY_URL: &str = "https://empty.test/";

/// Title 25 chars, description 60 chars, one h1, one h2, canonical,
/// 900+ words, 2 images with alt, 15 links, 1 JSON-LD block. Scores 100.
pub fn full_marks_page() -> String {
    let links = (0..15)
        .map(|i| format!(r#"<a href="/p/{i}">Page {i}</a>"#))
        .collect::<Vec<_>>()
        .join("\n");
    let copy = "widget ".repeat(900);

    format!(
        r#"<!doctype html>
<html>
<head>
  <title>Acme Widgets Online Store</title>
  <meta name="description" content="Durable steel widgets, handmade in Ohio since 1999. Shop now">
  <link rel="canonical" href="https://acme.test/">
  <script type="application/ld+json">{{"@context":"https://schema.org","@type":"Organization","name":"Acme"}}</script>
</head>
<body>
  <h1>Acme Widgets</h1>
  <h2>Why steel?</h2>
  <img src="/a.png" alt="Steel widget">
  <img src="/b.png" alt="Brass widget">
  <p>{copy}</p>
  {links}
</body>
</html>"#
    )
}

/// Nothing but an empty body. Scores 20.
pub fn empty_page() -> String {
    "<html><head></head><body></body></html>".to_string()
}

/// JSON body for `POST /scrape`.
pub fn scrape_body(url: &str, email: &str) -> serde_json::Value {
    serde_json::json!({ "url": url, "email": email })
}
