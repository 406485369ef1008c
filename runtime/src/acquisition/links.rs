//! Anchor extraction from parsed HTML.
//!
//! Synchronous on purpose: `scraper` documents are `!Send`, so callers parse
//! and collect owned [`Anchor`]s before the next `.await`.

use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// An outbound link with its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Absolute http(s) URL.
    pub href: Url,
    /// Visible text, whitespace-collapsed.
    pub text: String,
}

impl Anchor {
    pub fn text_lower(&self) -> String {
        self.text.to_lowercase()
    }
}

fn anchor_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("a[href]").expect("anchor selector is valid"))
}

/// All anchors in a document, in document order.
pub fn document_anchors(document: &Html, base: &Url) -> Vec<Anchor> {
    collect(document.select(anchor_selector()), base)
}

/// All anchors under an element, in document order.
pub fn element_anchors(element: ElementRef<'_>, base: &Url) -> Vec<Anchor> {
    collect(element.select(anchor_selector()), base)
}

/// Resolve an `href` against `base`, keeping only http(s) targets.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }
    let resolved = base.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// Visible text of an element: text nodes joined by single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect<'a>(elements: impl Iterator<Item = ElementRef<'a>>, base: &Url) -> Vec<Anchor> {
    elements
        .filter_map(|el| {
            let href = resolve_href(base, el.value().attr("href")?)?;
            Some(Anchor {
                href,
                text: element_text(el),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_anchors_resolve_and_filter() {
        let html = r##"
        <html><body>
        <a href="/athletics">Go  <b>Athletics</b></a>
        <a href="https://external.edu/foo">External</a>
        <a href="#section">Anchor</a>
        <a href="javascript:void(0)">JS</a>
        <a href="mailto:ad@example.edu">Mail</a>
        <a href="//cdn.example.com/x">Protocol relative</a>
        </body></html>
        "##;

        let base = Url::parse("https://www.example.edu/about/").unwrap();
        let doc = Html::parse_document(html);
        let anchors = document_anchors(&doc, &base);

        assert_eq!(anchors.len(), 3);
        assert_eq!(anchors[0].href.as_str(), "https://www.example.edu/athletics");
        assert_eq!(anchors[0].text, "Go Athletics");
        assert_eq!(anchors[1].href.host_str(), Some("external.edu"));
        assert_eq!(anchors[2].href.as_str(), "https://cdn.example.com/x");
    }

    #[test]
    fn test_resolve_href_rejects_other_schemes() {
        let base = Url::parse("https://example.edu/").unwrap();
        assert!(resolve_href(&base, "ftp://example.edu/file").is_none());
        assert!(resolve_href(&base, "  ").is_none());
        assert_eq!(
            resolve_href(&base, "roster").map(|u| u.to_string()),
            Some("https://example.edu/roster".to_string())
        );
    }
}
