//! Athletics-link scoring.
//!
//! One ordered list of `(signal, weight)` rules decides how "athletics-like"
//! a URL is. The directory enumerator, the reference-page resolver and the
//! homepage scan all rank links through the same [`LinkScorer`].

use super::enumerate::DirectorySource;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Score given to links that belong to the directory source. Such links are
/// never selected.
pub const EXCLUDED: i32 = -999;

/// Host fragments of third-party athletics site vendors and their
/// conventional subdomains.
const VENDOR_HOST_HINTS: &[&str] = &[
    "sidearmsports.com",
    "prestosports.com",
    "wmt.digital",
    "neulion",
    "athleticsite",
    "athletics",
    "sports",
];

const ROSTER_PATH_HINTS: &[&str] = &["/sports/", "/roster"];

/// A property of a URL that makes it look like an athletics site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSignal {
    /// Host or path mentions "athletic(s)" or "sports".
    AthleticsKeyword,
    /// Host looks like a known vendor platform or a `go<mascot>.com` site.
    VendorHost,
    /// Path looks like a sport or roster section.
    RosterPath,
    /// Host sits under `.edu`.
    EduHost,
}

impl LinkSignal {
    fn matches(&self, host: &str, path: &str) -> bool {
        match self {
            Self::AthleticsKeyword => ["athletic", "sports"]
                .iter()
                .any(|k| host.contains(k) || path.contains(k)),
            Self::VendorHost => {
                VENDOR_HOST_HINTS.iter().any(|h| host.contains(h)) || go_mascot_host(host)
            }
            Self::RosterPath => ROSTER_PATH_HINTS.iter().any(|h| path.contains(h)),
            Self::EduHost => host.ends_with(".edu"),
        }
    }
}

fn go_mascot_host(host: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:www\.)?go[a-z0-9-]+\.(?:com|net|org)$").expect("vendor host regex is valid")
    })
    .is_match(host)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRule {
    pub signal: LinkSignal,
    pub weight: i32,
}

/// The standard rule set: keyword +5, vendor +4, roster path +3, edu +1.
pub const DEFAULT_RULES: [ScoringRule; 4] = [
    ScoringRule {
        signal: LinkSignal::AthleticsKeyword,
        weight: 5,
    },
    ScoringRule {
        signal: LinkSignal::VendorHost,
        weight: 4,
    },
    ScoringRule {
        signal: LinkSignal::RosterPath,
        weight: 3,
    },
    ScoringRule {
        signal: LinkSignal::EduHost,
        weight: 1,
    },
];

/// Ranks candidate links against a rule set, excluding the directory source.
#[derive(Debug, Clone)]
pub struct LinkScorer {
    rules: Vec<ScoringRule>,
    directory: DirectorySource,
}

impl LinkScorer {
    pub fn new(directory: DirectorySource) -> Self {
        Self::with_rules(directory, DEFAULT_RULES.to_vec())
    }

    pub fn with_rules(directory: DirectorySource, rules: Vec<ScoringRule>) -> Self {
        Self { rules, directory }
    }

    pub fn directory(&self) -> &DirectorySource {
        &self.directory
    }

    /// Whether `url` belongs to the directory source.
    pub fn is_excluded(&self, url: &Url) -> bool {
        self.directory.owns(url)
    }

    /// Sum of the weights of every matching rule, or [`EXCLUDED`].
    pub fn score(&self, url: &Url) -> i32 {
        if self.is_excluded(url) {
            return EXCLUDED;
        }
        let host = url.host_str().unwrap_or("").to_lowercase();
        let path = url.path().to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.signal.matches(&host, &path))
            .map(|r| r.weight)
            .sum()
    }

    /// The highest-scoring URL with a score of at least `min`.
    ///
    /// Ties keep the earliest URL, so the result depends only on the input
    /// order.
    pub fn best<'a>(
        &self,
        urls: impl IntoIterator<Item = &'a Url>,
        min: i32,
    ) -> Option<(&'a Url, i32)> {
        let mut best: Option<(&'a Url, i32)> = None;
        for url in urls {
            let score = self.score(url);
            if score < min {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((url, score));
            }
        }
        best
    }
}
