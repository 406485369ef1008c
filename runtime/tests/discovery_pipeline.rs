//! End-to-end discovery against mock directory and athletics servers.
//!
//! Two servers keep the directory and the athletics sites on different
//! origins, the same way the real directory and school sites differ.

use roster_scout::discovery::{AssociationFilter, Association, Division};
use roster_scout::matching::{run_matches, MatchRequest};
use roster_scout::{Discoverer, DiscoveryRequest, RosterExtractor, ScoutConfig, ScoutError};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROSTER: &str = r#"<html><body>
<table class="sidearm-table">
  <tr><th>No.</th><th>Name</th><th>Pos.</th><th>Cl.</th></tr>
  <tr><td>4</td><td>Jane Doe</td><td>SS</td><td>Fr.</td></tr>
  <tr><td>11</td><td>Ana Ruiz</td><td>RHP</td><td>Jr.</td></tr>
  <tr><td>22</td><td>Kim Park</td><td>C</td><td>So.</td></tr>
</table>
</body></html>"#;

struct Sites {
    directory: MockServer,
    athletics: MockServer,
}

impl Sites {
    async fn start() -> Self {
        Self {
            directory: MockServer::start().await,
            athletics: MockServer::start().await,
        }
    }

    fn config(&self) -> ScoutConfig {
        ScoutConfig {
            app_version: "it".into(),
            directory_url_template: format!("{}/wiki/List_{{state}}", self.directory.uri()),
            directory_hosts: Vec::new(),
            max_retries: 0,
            discovery_timeout_secs: 5,
            roster_timeout_secs: 5,
            fan_out: 2,
            ..ScoutConfig::default()
        }
    }

    fn maine_directory(&self) -> String {
        let a = self.athletics.uri();
        format!(
            r#"<html><body>
            <table class="wikitable sortable">
              <tr><th>School</th><th>Association</th><th>Conference</th></tr>
              <tr><td><a href="/wiki/Colby_College">Colby College</a></td>
                  <td>NCAA Division III</td><td>NESCAC</td></tr>
              <tr><td><a href="{a}/athletics">University of Maine</a></td>
                  <td>NCAA Division I</td><td>America East</td></tr>
              <tr><td>Southern Maine Community College</td>
                  <td>NJCAA</td><td>Region 21</td></tr>
            </table>
            </body></html>"#
        )
    }

    /// Directory page, Colby's reference page, and two roster pages.
    async fn mount_maine(&self, directory_hits: u64) {
        self.mount_maine_delayed(directory_hits, Duration::ZERO).await;
    }

    async fn mount_maine_delayed(&self, directory_hits: u64, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/wiki/List_Maine"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(self.maine_directory())
                    .set_delay(delay),
            )
            .expect(directory_hits)
            .mount(&self.directory)
            .await;

        let reference = format!(
            r#"<table class="infobox"><tr><td>
                 <a href="/wiki/NESCAC">Conference</a>
                 <a href="{}/colby-athletics">Athletics website</a>
               </td></tr></table>"#,
            self.athletics.uri()
        );
        Mock::given(method("GET"))
            .and(path("/wiki/Colby_College"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reference))
            .mount(&self.directory)
            .await;

        for home in ["/athletics", "/colby-athletics"] {
            Mock::given(method("GET"))
                .and(path(format!("{home}/sports/baseball/roster")))
                .respond_with(ResponseTemplate::new(200).set_body_string(ROSTER))
                .mount(&self.athletics)
                .await;
        }
    }

    /// One Vermont program with its roster page.
    async fn mount_vermont(&self) {
        let directory = format!(
            r#"<table class="wikitable">
              <tr><th>School</th><th>Association</th><th>Conference</th></tr>
              <tr><td><a href="{}/uvm-athletics">University of Vermont</a></td>
                  <td>NCAA Division I</td><td>America East</td></tr>
            </table>"#,
            self.athletics.uri()
        );
        Mock::given(method("GET"))
            .and(path("/wiki/List_Vermont"))
            .respond_with(ResponseTemplate::new(200).set_body_string(directory))
            .mount(&self.directory)
            .await;
        Mock::given(method("GET"))
            .and(path("/uvm-athletics/sports/baseball/roster"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ROSTER))
            .mount(&self.athletics)
            .await;
    }
}

fn baseball_in_maine() -> DiscoveryRequest {
    DiscoveryRequest::new("baseball").states(&["ME"])
}

#[tokio::test]
async fn test_second_discovery_is_a_cache_hit() {
    let sites = Sites::start().await;
    sites.mount_maine(1).await;
    let discoverer = Discoverer::from_config(&sites.config());

    let first = discoverer.discover(&baseball_in_maine()).await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.count, 1);

    let program = &first.programs()[0];
    assert_eq!(program.school, "University of Maine");
    assert_eq!(program.association, Association::Ncaa);
    assert_eq!(program.division, Some(Division::I));
    assert_eq!(
        program.roster_url.as_str(),
        format!("{}/athletics/sports/baseball/roster", sites.athletics.uri())
    );

    let second = discoverer.discover(&baseball_in_maine()).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.payload, first.payload);
}

#[tokio::test]
async fn test_rebuild_refetches() {
    let sites = Sites::start().await;
    sites.mount_maine(2).await;
    let discoverer = Discoverer::from_config(&sites.config());

    discoverer.discover(&baseball_in_maine()).await.unwrap();
    let rebuilt = discoverer.rebuild(&baseball_in_maine()).await.unwrap();
    assert!(!rebuilt.from_cache);
    assert_eq!(rebuilt.count, 1);
    assert_eq!(discoverer.cache_stats().size, 1);
}

#[tokio::test]
async fn test_include_diii_resolves_through_reference_page() {
    let sites = Sites::start().await;
    sites.mount_maine(2).await;
    let discoverer = Discoverer::from_config(&sites.config());

    let narrow = discoverer.discover(&baseball_in_maine()).await.unwrap();
    let wide = discoverer
        .discover(&baseball_in_maine().filter(AssociationFilter::new(true, false)))
        .await
        .unwrap();

    assert_eq!(wide.count, 2);
    for p in narrow.programs() {
        assert!(wide.programs().contains(p));
    }

    // Directory row order is kept.
    let colby = &wide.programs()[0];
    assert_eq!(colby.school, "Colby College");
    assert_eq!(colby.division, Some(Division::III));
    assert_eq!(
        colby.athletics_url.as_str(),
        format!("{}/colby-athletics", sites.athletics.uri())
    );
}

#[tokio::test]
async fn test_programs_follow_state_order_when_first_state_is_slow() {
    let sites = Sites::start().await;
    sites.mount_maine_delayed(1, Duration::from_millis(300)).await;
    sites.mount_vermont().await;
    let discoverer = Discoverer::from_config(&sites.config());

    let req = DiscoveryRequest::new("baseball")
        .states(&["ME", "VT"])
        .filter(AssociationFilter::new(true, false));
    let found = discoverer.discover(&req).await.unwrap();

    let schools: Vec<&str> = found.programs().iter().map(|p| p.school.as_str()).collect();
    assert_eq!(
        schools,
        vec!["Colby College", "University of Maine", "University of Vermont"]
    );
    let states: Vec<&str> = found.programs().iter().map(|p| p.state.as_str()).collect();
    assert_eq!(states, vec!["ME", "ME", "VT"]);
    assert_eq!(found.payload.states, vec!["ME", "VT"]);
}

#[tokio::test]
async fn test_missing_region_is_invalid_input() {
    let sites = Sites::start().await;
    let discoverer = Discoverer::from_config(&sites.config());
    let err = discoverer
        .discover(&DiscoveryRequest::new("baseball"))
        .await
        .unwrap_err();
    assert!(matches!(err, ScoutError::InvalidInput(_)));
}

#[tokio::test]
async fn test_failed_directory_is_empty_and_uncached() {
    let sites = Sites::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/List_Vermont"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&sites.directory)
        .await;
    let discoverer = Discoverer::from_config(&sites.config());
    let req = DiscoveryRequest::new("baseball").states(&["VT"]).diagnostics(true);

    let first = discoverer.discover(&req).await.unwrap();
    assert_eq!(first.count, 0);
    let trace = first.payload.diag.as_ref().unwrap();
    assert_eq!(trace[0].status, Some(503));
    assert!(!trace[0].ok);
    assert!(discoverer.cache().is_empty());

    let second = discoverer.discover(&req).await.unwrap();
    assert!(!second.from_cache);
}

#[tokio::test]
async fn test_matches_end_to_end() {
    let sites = Sites::start().await;
    sites.mount_maine(1).await;
    let config = sites.config();
    let discoverer = Discoverer::from_config(&config);
    let extractor = RosterExtractor::from_config(&config);

    let req = MatchRequest {
        sport: "baseball".into(),
        position: "C".into(),
        class_level: "junior".into(),
        region: None,
        states: Some(vec!["ME".into()]),
        debug: false,
    };
    let report = run_matches(
        &discoverer,
        &extractor,
        &req,
        AssociationFilter::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.count, 1);
    assert_eq!(report.discovery.sport_slugs, vec!["baseball", "bsb"]);
    let m = &report.results[0];
    assert_eq!(m.school, "University of Maine");
    // "C" matches only the catcher.
    assert_eq!(m.players_considered, 1);
    assert_eq!(m.propensity, 0.909);
}
