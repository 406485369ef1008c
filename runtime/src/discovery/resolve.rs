//! Athletics-site resolution for candidates without a direct link.
//!
//! Order of attempts:
//! 1. the athletics link already on the directory row;
//! 2. the best-scoring external link on the institution's reference page
//!    (infobox links first);
//! 3. a scan of the institution homepage for an athletics-looking link.

use super::scoring::{LinkScorer, EXCLUDED};
use super::types::ProgramCandidate;
use crate::acquisition::links::{document_anchors, element_anchors, Anchor};
use crate::acquisition::PageSource;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Lowest score a reference-page link needs to be taken as the athletics
/// site. A bare `.edu` host scores 1 and is treated as the homepage instead.
const REFERENCE_SCORE_FLOOR: i32 = 2;

/// Score at or above which a homepage link counts even without athletics
/// wording in its text.
const HOMEPAGE_SCORE_FLOOR: i32 = 5;

/// Links read off an institution reference page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceLinks {
    /// Best outbound link scoring at least [`REFERENCE_SCORE_FLOOR`].
    pub athletics: Option<Url>,
    /// The institution's own site: first `.edu` link, else first outbound link.
    pub homepage: Option<Url>,
}

pub struct LinkResolver<'a, S: ?Sized> {
    source: &'a S,
    scorer: &'a LinkScorer,
}

impl<'a, S: PageSource + ?Sized> LinkResolver<'a, S> {
    pub fn new(source: &'a S, scorer: &'a LinkScorer) -> Self {
        Self { source, scorer }
    }

    /// The candidate's athletics homepage, or `None` when every strategy
    /// comes up empty.
    pub async fn resolve(&self, candidate: &ProgramCandidate) -> Option<Url> {
        if let Some(url) = &candidate.athletics_url {
            return Some(url.clone());
        }

        let reference = candidate.reference_url.as_ref()?;
        let outcome = self.source.fetch(reference).await;
        let Some(page) = outcome.html() else {
            tracing::debug!(school = %candidate.school, url = %reference, "reference page unavailable");
            return None;
        };
        let links = reference_links(&page.body, &page.final_url, self.scorer);

        if let Some(athletics) = links.athletics {
            return Some(athletics);
        }

        let homepage = links.homepage?;
        let outcome = self.source.fetch(&homepage).await;
        let page = outcome.html()?;
        let found = homepage_athletics_link(&page.body, &page.final_url, self.scorer);
        if found.is_none() {
            tracing::debug!(school = %candidate.school, homepage = %homepage, "no athletics link on homepage");
        }
        found
    }
}

fn infobox_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table.infobox").expect("infobox selector is valid"))
}

/// Outbound links of a reference page, infobox links first.
pub fn reference_links(html: &str, base: &Url, scorer: &LinkScorer) -> ReferenceLinks {
    let document = Html::parse_document(html);

    let mut anchors: Vec<Anchor> = document
        .select(infobox_selector())
        .flat_map(|table| element_anchors(table, base))
        .collect();
    anchors.extend(document_anchors(&document, base));

    let external: Vec<&Url> = anchors
        .iter()
        .map(|a| &a.href)
        .filter(|u| !scorer.is_excluded(u))
        .collect();

    let athletics = scorer
        .best(external.iter().copied(), REFERENCE_SCORE_FLOOR)
        .map(|(url, _)| url.clone());
    let homepage = external
        .iter()
        .find(|u| u.host_str().is_some_and(|h| h.to_lowercase().ends_with(".edu")))
        .or_else(|| external.first())
        .map(|u| Url::clone(u));

    ReferenceLinks {
        athletics,
        homepage,
    }
}

/// Best athletics-looking link on an institution homepage.
///
/// A link qualifies when its text mentions athletics or sports, or when its
/// URL alone scores at least [`HOMEPAGE_SCORE_FLOOR`].
pub fn homepage_athletics_link(html: &str, base: &Url, scorer: &LinkScorer) -> Option<Url> {
    let document = Html::parse_document(html);
    let anchors = document_anchors(&document, base);

    let qualifying = anchors.iter().filter(|a| {
        let text = a.text_lower();
        text.contains("athletic")
            || text.contains("sports")
            || scorer.score(&a.href) >= HOMEPAGE_SCORE_FLOOR
    });

    scorer
        .best(qualifying.map(|a| &a.href), EXCLUDED + 1)
        .map(|(url, _)| url.clone())
}
