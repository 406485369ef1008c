//! Recruit-to-program matching.
//!
//! A program's propensity falls as its roster at the recruit's position
//! fills up; the recruit's urgency rises with class level. The final score
//! blends the two.

use crate::acquisition::PageSource;
use crate::discovery::{Association, AssociationFilter, Discoverer, DiscoveryRequest, Division};
use crate::error::ScoutResult;
use crate::extraction::{PlayerRecord, RosterExtractor};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use url::Url;

/// Weight of propensity against urgency in [`final_match_score`].
pub const DEFAULT_ALPHA: f64 = 0.7;

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn years_remaining(class_level: &str) -> Option<i32> {
    match class_level.trim().to_lowercase().as_str() {
        "freshman" => Some(3),
        "sophomore" => Some(2),
        "junior" => Some(1),
        "senior" => Some(0),
        _ => None,
    }
}

/// How pressing a recruit's timeline is, from 0.2 (freshman) to 1.0 (senior).
pub fn graduation_urgency_weight(class_level: &str) -> f64 {
    match class_level.trim().to_lowercase().as_str() {
        "freshman" => 0.2,
        "sophomore" => 0.4,
        "junior" => 0.7,
        "senior" => 1.0,
        _ => 0.5,
    }
}

/// Spring graduation year for a class level as of `today`.
///
/// The academic year turns over in August: a senior in March graduates
/// this year, a senior in September graduates next year.
pub fn graduation_year(class_level: &str, today: NaiveDate) -> Option<i32> {
    let remaining = years_remaining(class_level)?;
    let spring = if today.month() >= 8 {
        today.year() + 1
    } else {
        today.year()
    };
    Some(spring + remaining)
}

/// 1.0 for an empty roster, shrinking as the roster grows.
pub fn recruiting_propensity(players: &[PlayerRecord]) -> f64 {
    if players.is_empty() {
        return 1.0;
    }
    round_to(1.0 / (1.0 + players.len() as f64 / 10.0), 3)
}

/// Blend of propensity and urgency on a 0-100 scale, one decimal.
pub fn final_match_score(propensity: f64, class_level: &str, alpha: f64) -> f64 {
    let urgency = graduation_urgency_weight(class_level);
    round_to((alpha * propensity + (1.0 - alpha) * urgency) * 100.0, 1)
}

/// Players whose position contains `position`, or the whole roster when
/// none do (or no position was given).
pub fn players_at_position<'a>(players: &'a [PlayerRecord], position: &str) -> Vec<&'a PlayerRecord> {
    let wanted = position.trim().to_lowercase();
    let filtered: Vec<&PlayerRecord> = if wanted.is_empty() {
        Vec::new()
    } else {
        players
            .iter()
            .filter(|p| p.position.to_lowercase().contains(&wanted))
            .collect()
    };
    if filtered.is_empty() {
        players.iter().collect()
    } else {
        filtered
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub sport: String,
    pub position: String,
    pub class_level: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub states: Option<Vec<String>>,
    /// Include the discovery fetch trace.
    #[serde(default)]
    pub debug: bool,
}

impl MatchRequest {
    fn discovery_request(&self, filter: AssociationFilter, cache_hours: Option<f64>) -> DiscoveryRequest {
        DiscoveryRequest {
            sport: Some(self.sport.clone()),
            region: self.region.clone(),
            states: self.states.clone(),
            sources: None,
            filter,
            cache_hours,
            diagnostics: self.debug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub school: String,
    pub state: String,
    pub association: Association,
    pub division: Option<Division>,
    pub source_url: Url,
    pub players_considered: usize,
    pub propensity: f64,
    pub final_score: f64,
}

/// Short summary of the discovery run behind a match report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySummary {
    pub count: usize,
    pub states: Vec<String>,
    pub sport_slugs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub count: usize,
    /// Sorted by `final_score`, highest first.
    pub results: Vec<MatchResult>,
    pub discovery: DiscoverySummary,
}

/// Discover programs, read each roster, and score every program that has
/// players.
pub async fn run_matches<S, T>(
    discoverer: &Discoverer<S>,
    extractor: &RosterExtractor<T>,
    req: &MatchRequest,
    filter: AssociationFilter,
    cache_hours: Option<f64>,
) -> ScoutResult<MatchReport>
where
    S: PageSource + ?Sized,
    T: PageSource + ?Sized,
{
    let discovery = discoverer
        .discover(&req.discovery_request(filter, cache_hours))
        .await?;

    let mut results = Vec::new();
    for program in discovery.programs() {
        let extraction = match extractor.extract_roster(program.roster_url.as_str()).await {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::warn!(school = %program.school, error = %e, "roster skipped");
                continue;
            }
        };
        if extraction.players.is_empty() {
            continue;
        }

        let considered = players_at_position(&extraction.players, &req.position);
        let considered: Vec<PlayerRecord> = considered.into_iter().cloned().collect();
        let propensity = recruiting_propensity(&considered);
        results.push(MatchResult {
            school: program.school.clone(),
            state: program.state.clone(),
            association: program.association,
            division: program.division,
            source_url: extraction.source_url,
            players_considered: considered.len(),
            propensity,
            final_score: final_match_score(propensity, &req.class_level, DEFAULT_ALPHA),
        });
    }

    results.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    tracing::info!(
        programs = discovery.count,
        matched = results.len(),
        "matches scored"
    );

    Ok(MatchReport {
        count: results.len(),
        results,
        discovery: DiscoverySummary {
            count: discovery.count,
            states: discovery.payload.states.clone(),
            sport_slugs: discovery.payload.sport_slugs.clone(),
        },
    })
}
