//! Roster-page probing.
//!
//! For each sport slug, in order, a fixed list of URL patterns is tried
//! against the athletics homepage. A 2xx response counts when either the
//! URL path or the body mentions "roster". Failing that, the sport landing
//! pages and finally the homepage itself are scanned for an anchor whose
//! text mentions "roster".

use crate::acquisition::links::document_anchors;
use crate::acquisition::{FetchOutcome, PageSource};
use scraper::Html;
use std::collections::HashMap;
use url::Url;

/// Probe targets for one slug, in the order they are tried.
pub fn probe_urls(home: &Url, slug: &str) -> Vec<Url> {
    let base = home_base(home);
    [
        format!("{base}/sports/{slug}/roster"),
        format!("{base}/{slug}/roster"),
        format!("{base}/roster.aspx?path={slug}"),
        format!("{base}/sports/{slug}"),
        format!("{base}/{slug}"),
    ]
    .iter()
    .filter_map(|u| Url::parse(u).ok())
    .collect()
}

/// Sport landing pages scanned for a roster anchor when no pattern hits.
pub fn landing_urls(home: &Url, slug: &str) -> Vec<Url> {
    let base = home_base(home);
    [format!("{base}/sports/{slug}"), format!("{base}/{slug}")]
        .iter()
        .filter_map(|u| Url::parse(u).ok())
        .collect()
}

/// Homepage without query, fragment or trailing slash.
fn home_base(home: &Url) -> String {
    let mut home = home.clone();
    home.set_query(None);
    home.set_fragment(None);
    home.as_str().trim_end_matches('/').to_string()
}

/// First anchor whose visible text mentions "roster".
pub fn roster_anchor(html: &str, base: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    document_anchors(&document, base)
        .into_iter()
        .find(|a| a.text_lower().contains("roster"))
        .map(|a| a.href)
}

fn mentions_roster(text: &str) -> bool {
    const NEEDLE: &[u8] = b"roster";
    text.as_bytes()
        .windows(NEEDLE.len())
        .any(|w| w.eq_ignore_ascii_case(NEEDLE))
}

/// Whether a fetched pattern URL is a roster page.
fn is_roster_hit(url: &Url, outcome: &FetchOutcome) -> bool {
    match outcome.page() {
        Some(page) => {
            url.path().to_lowercase().contains("roster") || mentions_roster(&page.body)
        }
        None => false,
    }
}

pub struct RosterProber<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: PageSource + ?Sized> RosterProber<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Roster URL for the first slug that yields one, or `None`.
    ///
    /// Each URL is fetched at most once per call.
    pub async fn probe(&self, home: &Url, slugs: &[String]) -> Option<Url> {
        let mut seen = HashMap::new();
        for slug in slugs {
            if let Some(url) = self.probe_slug(home, slug, &mut seen).await {
                tracing::debug!(home = %home, slug, roster = %url, "roster page found");
                return Some(url);
            }
        }
        tracing::debug!(home = %home, "no roster page");
        None
    }

    async fn probe_slug(
        &self,
        home: &Url,
        slug: &str,
        seen: &mut HashMap<Url, FetchOutcome>,
    ) -> Option<Url> {
        for url in probe_urls(home, slug) {
            let outcome = self.fetch_once(&url, seen).await;
            if is_roster_hit(&url, &outcome) {
                return Some(url);
            }
        }

        for url in landing_urls(home, slug).iter().chain(std::iter::once(home)) {
            let outcome = self.fetch_once(url, seen).await;
            if let Some(page) = outcome.html() {
                if let Some(found) = roster_anchor(&page.body, &page.final_url) {
                    return Some(found);
                }
            }
        }

        None
    }

    async fn fetch_once(&self, url: &Url, seen: &mut HashMap<Url, FetchOutcome>) -> FetchOutcome {
        if let Some(outcome) = seen.get(url) {
            return outcome.clone();
        }
        let outcome = self.source.fetch(url).await;
        seen.insert(url.clone(), outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::testing::StaticPages;

    fn home() -> Url {
        Url::parse("https://gobatesbobcats.com/").unwrap()
    }

    fn slugs(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_probe_url_order() {
        let urls: Vec<String> = probe_urls(&home(), "baseball")
            .iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://gobatesbobcats.com/sports/baseball/roster",
                "https://gobatesbobcats.com/baseball/roster",
                "https://gobatesbobcats.com/roster.aspx?path=baseball",
                "https://gobatesbobcats.com/sports/baseball",
                "https://gobatesbobcats.com/baseball",
            ]
        );
    }

    #[test]
    fn test_probe_urls_drop_query_and_trailing_slash() {
        let home = Url::parse("https://www.colby.edu/athletics/?ref=nav#top").unwrap();
        assert_eq!(
            probe_urls(&home, "mbb")[0].as_str(),
            "https://www.colby.edu/athletics/sports/mbb/roster"
        );
    }

    #[test]
    fn test_mentions_roster_is_case_insensitive() {
        assert!(mentions_roster("<h1>2025-26 Men's Basketball ROSTER</h1>"));
        assert!(!mentions_roster("<h1>Schedule</h1>"));
    }

    #[tokio::test]
    async fn test_first_pattern_wins() {
        let pages = StaticPages::new()
            .with("https://gobatesbobcats.com/sports/baseball/roster", "<html>ok</html>")
            .with("https://gobatesbobcats.com/baseball/roster", "<html>ok</html>");
        let found = RosterProber::new(&pages).probe(&home(), &slugs(&["baseball", "bsb"])).await;
        assert_eq!(
            found.as_ref().map(Url::as_str),
            Some("https://gobatesbobcats.com/sports/baseball/roster")
        );
        assert_eq!(pages.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_non_roster_path_needs_roster_in_body() {
        let pages = StaticPages::new()
            .with("https://gobatesbobcats.com/sports/baseball", "<h1>Schedule</h1>")
            .with("https://gobatesbobcats.com/baseball", "<h1>Baseball Roster</h1>");
        let found = RosterProber::new(&pages).probe(&home(), &slugs(&["baseball"])).await;
        assert_eq!(
            found.as_ref().map(Url::as_str),
            Some("https://gobatesbobcats.com/baseball")
        );
    }

    #[tokio::test]
    async fn test_later_slug_is_tried() {
        let pages = StaticPages::new().with("https://gobatesbobcats.com/bsb/roster", "<table></table>");
        let found = RosterProber::new(&pages).probe(&home(), &slugs(&["baseball", "bsb"])).await;
        assert_eq!(
            found.as_ref().map(Url::as_str),
            Some("https://gobatesbobcats.com/bsb/roster")
        );
    }

    #[tokio::test]
    async fn test_homepage_anchor_scan() {
        let pages = StaticPages::new().with(
            "https://gobatesbobcats.com/",
            r#"<a href="/schedule">Schedule</a><a href="/teams/mbb/players">Full Roster</a>"#,
        );
        let prober = RosterProber::new(&pages);
        let found = prober.probe(&home(), &slugs(&["mbb", "mbball"])).await;
        assert_eq!(
            found.as_ref().map(Url::as_str),
            Some("https://gobatesbobcats.com/teams/mbb/players")
        );
    }

    #[tokio::test]
    async fn test_exhausted_probe_fetches_each_url_once() {
        let pages = StaticPages::new();
        let found = RosterProber::new(&pages).probe(&home(), &slugs(&["a", "b"])).await;
        assert_eq!(found, None);

        let requested = pages.requested();
        // 5 patterns per slug, landing pages are memoized, homepage once.
        assert_eq!(requested.len(), 11);
        let mut unique = requested.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), requested.len());
    }
}
