//! Candidate enumeration from per-state directory pages.
//!
//! Each state maps to exactly one directory page. Every row of every
//! listing table (`table.wikitable`) becomes at most one
//! [`ProgramCandidate`]: school name from the first cell, association and
//! division from the next two, and links from the row's anchors.

use super::scoring::LinkScorer;
use super::types::{Association, Division, FetchTrace, ProgramCandidate};
use crate::acquisition::links::{element_anchors, element_text};
use crate::acquisition::{FetchOutcome, PageSource};
use crate::config::ScoutConfig;
use crate::normalize::state_name;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::{Origin, Url};

/// The directory site: its per-state URL template and the hosts it owns.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    template: String,
    origin: Option<Origin>,
    hosts: Vec<String>,
}

impl DirectorySource {
    /// `template` must contain a `{state}` placeholder. Links on the
    /// template's origin or under any of `hosts` belong to the directory.
    pub fn new(template: &str, hosts: &[String]) -> Self {
        let origin = Url::parse(&template.replace("{state}", "_"))
            .ok()
            .map(|u| u.origin());
        Self {
            template: template.to_string(),
            origin,
            hosts: hosts.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &ScoutConfig) -> Self {
        Self::new(&config.directory_url_template, &config.directory_hosts)
    }

    /// Directory page for a state code, built from the state's display name
    /// with spaces replaced by underscores.
    pub fn page_url(&self, state: &str) -> Option<Url> {
        let name = state_name(state)?;
        Url::parse(&self.template.replace("{state}", &name.replace(' ', "_"))).ok()
    }

    /// Whether `url` points back into the directory source.
    pub fn owns(&self, url: &Url) -> bool {
        if self.origin.as_ref() == Some(&url.origin()) {
            return true;
        }
        let host = url.host_str().unwrap_or("").to_lowercase();
        self.hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{h}")))
    }
}

/// Candidates and fetch trace for one state.
#[derive(Debug, Clone)]
pub struct StateListing {
    pub candidates: Vec<ProgramCandidate>,
    pub trace: FetchTrace,
}

/// Fetch and parse one state's directory page.
///
/// A failed fetch or an empty body yields no candidates; the reason only
/// shows up in the trace.
pub async fn enumerate_state<S: PageSource + ?Sized>(
    source: &S,
    scorer: &LinkScorer,
    state: &str,
) -> StateListing {
    let Some(url) = scorer.directory().page_url(state) else {
        tracing::warn!(state, "no directory page for state");
        return StateListing {
            candidates: Vec::new(),
            trace: FetchTrace {
                state: state.to_string(),
                url: String::new(),
                status: None,
                ok: false,
                error: Some("unknown state".into()),
                candidates: 0,
            },
        };
    };

    let outcome = source.fetch(&url).await;
    let candidates = match &outcome {
        FetchOutcome::Page(page) if page.has_body() => {
            parse_directory_page(&page.body, &page.final_url, state, scorer)
        }
        _ => Vec::new(),
    };

    tracing::info!(
        state,
        url = %url,
        status = ?outcome.status(),
        candidates = candidates.len(),
        "directory page enumerated"
    );

    let error = match &outcome {
        FetchOutcome::Failed(reason) => Some(reason.to_string()),
        FetchOutcome::Page(page) if !page.has_body() => Some("empty body".into()),
        FetchOutcome::Page(_) => None,
    };

    StateListing {
        trace: FetchTrace {
            state: state.to_string(),
            url: url.to_string(),
            status: outcome.status(),
            ok: error.is_none(),
            error,
            candidates: candidates.len(),
        },
        candidates,
    }
}

fn listing_table_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table.wikitable").expect("listing table selector is valid"))
}

fn row_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("tr").expect("row selector is valid"))
}

/// Parse a directory page into candidates, in row order.
pub fn parse_directory_page(
    html: &str,
    page_url: &Url,
    state: &str,
    scorer: &LinkScorer,
) -> Vec<ProgramCandidate> {
    let document = Html::parse_document(html);
    let mut out = Vec::new();

    for table in document.select(listing_table_selector()) {
        // First row is the header.
        for row in table.select(row_selector()).skip(1) {
            if let Some(candidate) = parse_row(row, page_url, state, scorer) {
                out.push(candidate);
            }
        }
    }

    out
}

fn parse_row(
    row: ElementRef<'_>,
    page_url: &Url,
    state: &str,
    scorer: &LinkScorer,
) -> Option<ProgramCandidate> {
    let cells: Vec<ElementRef<'_>> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect();
    let name_cell = *cells.first()?;

    let assoc_text = if cells.len() >= 3 {
        cells[1..3]
            .iter()
            .map(|c| element_text(*c))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        element_text(row)
    };
    let association = Association::detect(&assoc_text);
    let division = match association {
        Association::Ncaa => Division::detect(&assoc_text),
        _ => None,
    };

    let athletics = best_external_link(name_cell, page_url, scorer)
        .or_else(|| best_external_link(row, page_url, scorer));
    let reference = element_anchors(name_cell, page_url)
        .into_iter()
        .next()
        .map(|a| a.href);

    let candidate = ProgramCandidate::new(&element_text(name_cell), state, association).ok()?;
    Some(
        candidate
            .with_division(division)
            .with_athletics_url(athletics)
            .with_reference_url(reference),
    )
}

/// Best positively-scored outbound link under `element`.
fn best_external_link(element: ElementRef<'_>, base: &Url, scorer: &LinkScorer) -> Option<Url> {
    let anchors = element_anchors(element, base);
    scorer
        .best(anchors.iter().map(|a| &a.href), 1)
        .map(|(url, _)| url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::testing::StaticPages;

    const TEMPLATE: &str =
        "https://en.wikipedia.org/wiki/List_of_college_athletic_programs_in_{state}";

    fn scorer() -> LinkScorer {
        LinkScorer::new(DirectorySource::new(TEMPLATE, &["wikipedia.org".to_string()]))
    }

    const MAINE: &str = r#"
    <html><body>
    <table class="wikitable sortable">
      <tr><th>School</th><th>Association</th><th>Conference</th></tr>
      <tr>
        <td><a href="/wiki/Colby_College">Colby College</a></td>
        <td>NCAA Division III</td><td>NESCAC</td>
      </tr>
      <tr>
        <td><a href="/wiki/University_of_Maine">University of Maine</a></td>
        <td>NCAA</td><td>Division I America East</td>
        <td><a href="https://goblackbears.com/">Athletics</a></td>
      </tr>
      <tr>
        <td><a href="/wiki/Southern_Maine_Community_College">Southern Maine CC</a></td>
        <td>NJCAA</td><td>Region 21</td>
      </tr>
      <tr><td></td></tr>
      <tr><th colspan="3">Former members</th></tr>
    </table>
    <table class="navbox"><tr><th>x</th></tr><tr><td>Not a listing</td><td>NCAA</td><td>x</td></tr></table>
    </body></html>
    "#;

    #[test]
    fn test_page_url_uses_state_display_name() {
        let dir = DirectorySource::new(TEMPLATE, &[]);
        assert_eq!(
            dir.page_url("nh").unwrap().as_str(),
            "https://en.wikipedia.org/wiki/List_of_college_athletic_programs_in_New_Hampshire"
        );
        assert!(dir.page_url("ZZ").is_none());
    }

    #[test]
    fn test_directory_owns_origin_and_hosts() {
        let dir = DirectorySource::new("http://127.0.0.1:4000/dir/{state}", &["wikipedia.org".into()]);
        assert!(dir.owns(&Url::parse("http://127.0.0.1:4000/wiki/Colby").unwrap()));
        assert!(!dir.owns(&Url::parse("http://127.0.0.1:4001/athletics").unwrap()));
        assert!(dir.owns(&Url::parse("https://de.wikipedia.org/").unwrap()));
        assert!(!dir.owns(&Url::parse("https://notwikipedia.org/").unwrap()));
    }

    #[test]
    fn test_parse_directory_rows() {
        let page = Url::parse(&TEMPLATE.replace("{state}", "Maine")).unwrap();
        let candidates = parse_directory_page(MAINE, &page, "ME", &scorer());
        assert_eq!(candidates.len(), 3);

        let colby = &candidates[0];
        assert_eq!(colby.school, "Colby College");
        assert_eq!(colby.association, Association::Ncaa);
        assert_eq!(colby.division, Some(Division::III));
        assert_eq!(colby.athletics_url, None);
        assert_eq!(
            colby.reference_url.as_ref().map(Url::as_str),
            Some("https://en.wikipedia.org/wiki/Colby_College")
        );

        let umaine = &candidates[1];
        assert_eq!(umaine.division, Some(Division::I));
        assert_eq!(
            umaine.athletics_url.as_ref().map(Url::as_str),
            Some("https://goblackbears.com/")
        );

        let smcc = &candidates[2];
        assert_eq!(smcc.association, Association::Njcaa);
        assert_eq!(smcc.division, None);
    }

    #[test]
    fn test_short_rows_read_association_from_whole_row() {
        let html = r#"<table class="wikitable">
            <tr><th>School</th></tr>
            <tr><td>Husson University</td><td>NAIA (GNAC)</td></tr>
        </table>"#;
        let page = Url::parse("https://en.wikipedia.org/wiki/x").unwrap();
        let candidates = parse_directory_page(html, &page, "ME", &scorer());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].association, Association::Naia);
        assert_eq!(candidates[0].reference_url, None);
    }

    #[tokio::test]
    async fn test_failed_fetch_yields_no_candidates() {
        let pages = StaticPages::new();
        let listing = enumerate_state(&pages, &scorer(), "ME").await;
        assert!(listing.candidates.is_empty());
        assert!(!listing.trace.ok);
        assert_eq!(listing.trace.status, Some(404));
        assert_eq!(pages.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_body_yields_no_candidates() {
        let url = TEMPLATE.replace("{state}", "Maine");
        let pages = StaticPages::new().with(&url, "  ");
        let listing = enumerate_state(&pages, &scorer(), "ME").await;
        assert!(listing.candidates.is_empty());
        assert_eq!(listing.trace.error.as_deref(), Some("empty body"));
    }

    #[tokio::test]
    async fn test_enumerate_state() {
        let url = TEMPLATE.replace("{state}", "Maine");
        let pages = StaticPages::new().with(&url, MAINE);
        let listing = enumerate_state(&pages, &scorer(), "ME").await;
        assert_eq!(listing.candidates.len(), 3);
        assert!(listing.trace.ok);
        assert_eq!(listing.trace.candidates, 3);
        assert!(listing.candidates.iter().all(|c| c.state == "ME"));
    }
}
