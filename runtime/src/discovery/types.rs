//! Record types flowing through the discovery pipeline.

use super::filter::AssociationFilter;
use crate::error::{ScoutError, ScoutResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// Governing body of an athletics program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Association {
    #[serde(rename = "NCAA")]
    Ncaa,
    #[serde(rename = "NAIA")]
    Naia,
    #[serde(rename = "NJCAA")]
    Njcaa,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Association {
    /// Detect the association mentioned in free text. NJCAA is checked
    /// before NCAA so junior colleges are not misread.
    pub fn detect(text: &str) -> Self {
        let upper = text.to_uppercase();
        if upper.contains("NJCAA") {
            Self::Njcaa
        } else if upper.contains("NAIA") {
            Self::Naia
        } else if upper.contains("NCAA") {
            Self::Ncaa
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ncaa => write!(f, "NCAA"),
            Self::Naia => write!(f, "NAIA"),
            Self::Njcaa => write!(f, "NJCAA"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// NCAA division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "Division I")]
    I,
    #[serde(rename = "Division II")]
    II,
    #[serde(rename = "Division III")]
    III,
}

impl Division {
    /// Parse the first `Division I|II|III` mention, case-insensitively.
    pub fn detect(text: &str) -> Option<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"(?i)\bdivision\s+(iii|ii|i)\b").expect("division regex is valid")
        });
        let caps = re.captures(text)?;
        match caps.get(1)?.as_str().to_uppercase().as_str() {
            "I" => Some(Self::I),
            "II" => Some(Self::II),
            "III" => Some(Self::III),
            _ => None,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I => write!(f, "Division I"),
            Self::II => write!(f, "Division II"),
            Self::III => write!(f, "Division III"),
        }
    }
}

/// A program as listed on a directory page, before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramCandidate {
    pub school: String,
    /// Two-letter state code.
    pub state: String,
    pub association: Association,
    /// Only ever set for NCAA programs.
    pub division: Option<Division>,
    /// Athletics link found directly on the directory row.
    pub athletics_url: Option<Url>,
    /// Institution reference page, used when no athletics link was found.
    pub reference_url: Option<Url>,
}

impl ProgramCandidate {
    pub fn new(school: &str, state: &str, association: Association) -> ScoutResult<Self> {
        let school = school.trim();
        if school.is_empty() {
            return Err(ScoutError::InvalidInput("program without a school name".into()));
        }
        let state = state.trim().to_uppercase();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ScoutError::InvalidInput(format!("bad state code: {state:?}")));
        }
        Ok(Self {
            school: school.to_string(),
            state,
            association,
            division: None,
            athletics_url: None,
            reference_url: None,
        })
    }

    /// Set the division. Ignored unless the association is NCAA.
    pub fn with_division(mut self, division: Option<Division>) -> Self {
        self.division = if self.association == Association::Ncaa {
            division
        } else {
            None
        };
        self
    }

    pub fn with_athletics_url(mut self, url: Option<Url>) -> Self {
        self.athletics_url = url;
        self
    }

    pub fn with_reference_url(mut self, url: Option<Url>) -> Self {
        self.reference_url = url;
        self
    }
}

/// A program with both its athletics homepage and its roster page.
///
/// Both URLs are required by construction: a candidate missing either never
/// becomes a `ResolvedProgram`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProgram {
    pub school: String,
    pub state: String,
    pub association: Association,
    pub division: Option<Division>,
    pub athletics_url: Url,
    pub roster_url: Url,
}

impl ResolvedProgram {
    pub fn new(candidate: ProgramCandidate, athletics_url: Url, roster_url: Url) -> Self {
        Self {
            school: candidate.school,
            state: candidate.state,
            association: candidate.association,
            division: candidate.division,
            athletics_url,
            roster_url,
        }
    }
}

/// Enumeration source categories a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Governing-body listings (seeded from the per-state directory).
    Governing,
    /// Third-party athletics site vendors, used during link resolution.
    Vendors,
    /// The per-state directory pages themselves.
    Wiki,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Governing, Source::Vendors, Source::Wiki];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Governing => "governing",
            Self::Vendors => "vendors",
            Self::Wiki => "wiki",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|src| src.as_str() == s)
    }

    /// Parse a comma-separated category list: lowercased, trimmed,
    /// de-duplicated, request order kept. Unknown names are skipped.
    pub fn parse_list(raw: &str) -> Vec<Source> {
        let mut out = Vec::new();
        for name in raw.split(',').map(|s| s.trim().to_lowercase()) {
            if name.is_empty() {
                continue;
            }
            match Self::parse(&name) {
                Some(src) if !out.contains(&src) => out.push(src),
                Some(_) => {}
                None => tracing::warn!("ignoring unknown discovery source {name:?}"),
            }
        }
        out
    }

    /// Whether directory enumeration runs for this source set.
    pub fn enumerates(sources: &[Source]) -> bool {
        sources
            .iter()
            .any(|s| matches!(s, Source::Governing | Source::Wiki))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default source list when the caller gives none.
pub const DEFAULT_SOURCES: &str = "governing,vendors,wiki";

/// Outcome of one per-state directory fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchTrace {
    pub state: String,
    pub url: String,
    pub status: Option<u16>,
    pub ok: bool,
    pub error: Option<String>,
    pub candidates: usize,
}

/// The full product of one discovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryPayload {
    pub programs: Vec<ResolvedProgram>,
    pub states: Vec<String>,
    pub sport_slugs: Vec<String>,
    pub sources_used: Vec<Source>,
    /// Per-state fetch trace, present only when diagnostics were requested.
    pub diag: Option<Vec<FetchTrace>>,
}

/// What `discover` hands back: the payload plus whether it came from cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    pub count: usize,
    pub from_cache: bool,
    #[serde(flatten)]
    pub payload: DiscoveryPayload,
}

impl Discovery {
    pub(crate) fn new(payload: DiscoveryPayload, from_cache: bool) -> Self {
        Self {
            count: payload.programs.len(),
            from_cache,
            payload,
        }
    }

    pub fn programs(&self) -> &[ResolvedProgram] {
        &self.payload.programs
    }
}

/// Parameters of a discovery call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryRequest {
    /// Free-text sport; `None` means men's basketball.
    pub sport: Option<String>,
    /// Free-text region, used when `states` is absent or blank.
    pub region: Option<String>,
    /// Explicit two-letter state codes.
    pub states: Option<Vec<String>>,
    /// Comma-separated source categories; `None` means all.
    pub sources: Option<String>,
    #[serde(flatten)]
    pub filter: AssociationFilter,
    /// TTL override in hours. Zero forces a rebuild.
    pub cache_hours: Option<f64>,
    /// Include the per-state fetch trace in the result.
    pub diagnostics: bool,
}

impl DiscoveryRequest {
    pub fn new(sport: &str) -> Self {
        Self {
            sport: Some(sport.to_string()),
            ..Default::default()
        }
    }

    pub fn region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub fn states<S: AsRef<str>>(mut self, states: &[S]) -> Self {
        self.states = Some(states.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    pub fn sources(mut self, sources: &str) -> Self {
        self.sources = Some(sources.to_string());
        self
    }

    pub fn filter(mut self, filter: AssociationFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn cache_hours(mut self, hours: f64) -> Self {
        self.cache_hours = Some(hours);
        self
    }

    pub fn diagnostics(mut self, on: bool) -> Self {
        self.diagnostics = on;
        self
    }

    /// Recognised source categories for this request.
    pub fn source_list(&self) -> Vec<Source> {
        Source::parse_list(self.sources.as_deref().unwrap_or(DEFAULT_SOURCES))
    }
}
