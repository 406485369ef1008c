//! Region and sport normalization.
//!
//! Free-text sport names map to an ordered list of URL slugs, free-text
//! region names (with synonyms) map to canonical state codes.

use crate::error::{ScoutError, ScoutResult};

/// Sport assumed when the caller supplies none.
pub const DEFAULT_SPORT: &str = "mens basketball";

const SPORT_SLUGS: &[(&str, &[&str])] = &[
    ("football", &["football", "fb"]),
    ("mens basketball", &["mens-basketball", "mbball", "mbb"]),
    ("womens basketball", &["womens-basketball", "wbball", "wbb"]),
    ("mens soccer", &["mens-soccer", "msoc"]),
    ("womens soccer", &["womens-soccer", "wsoc"]),
    ("baseball", &["baseball", "bsb"]),
    ("softball", &["softball", "sb"]),
    ("womens volleyball", &["womens-volleyball", "wvb", "volleyball"]),
];

const REGION_STATES: &[(&str, &[&str])] = &[
    (
        "west",
        &["AK", "AZ", "CA", "CO", "HI", "ID", "MT", "NV", "NM", "OR", "UT", "WA", "WY"],
    ),
    (
        "midwest",
        &["IL", "IN", "IA", "KS", "MI", "MN", "MO", "NE", "ND", "OH", "SD", "WI"],
    ),
    (
        "south",
        &[
            "AL", "AR", "DC", "DE", "FL", "GA", "KY", "LA", "MD", "MS", "NC", "OK", "SC", "TN",
            "TX", "VA", "WV",
        ],
    ),
    (
        "northeast",
        &["CT", "ME", "MA", "NH", "NJ", "NY", "PA", "RI", "VT"],
    ),
];

const REGION_SYNONYMS: &[(&str, &str)] = &[
    ("pnw", "west"),
    ("west coast", "west"),
    ("pacific northwest", "west"),
    ("southwest", "west"),
    ("southeast", "south"),
    ("mid-west", "midwest"),
    ("north east", "northeast"),
    ("north-east", "northeast"),
];

const STATE_NAMES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Ordered URL slugs for a sport.
///
/// Unknown sports become a single slug with whitespace runs replaced by
/// hyphens. A missing or blank sport falls back to [`DEFAULT_SPORT`].
pub fn sport_slugs(sport: Option<&str>) -> Vec<String> {
    let key = sport.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    let key = if key.is_empty() {
        DEFAULT_SPORT.to_string()
    } else {
        key
    };

    match SPORT_SLUGS.iter().find(|(name, _)| *name == key) {
        Some((_, slugs)) => slugs.iter().map(|s| s.to_string()).collect(),
        None => vec![key.split_whitespace().collect::<Vec<_>>().join("-")],
    }
}

/// Canonical region name, after synonym substitution. `None` when the
/// region is not one of the known regions.
pub fn normalize_region(region: &str) -> Option<&'static str> {
    let r = region.trim().to_lowercase();
    let r = REGION_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == r)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(r);
    REGION_STATES
        .iter()
        .find(|(name, _)| *name == r)
        .map(|(name, _)| *name)
}

/// State codes belonging to a canonical region.
pub fn region_states(region: &str) -> Option<&'static [&'static str]> {
    REGION_STATES
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, states)| *states)
}

/// Display name of a two-letter state code (`"NY"` → `"New York"`).
pub fn state_name(code: &str) -> Option<&'static str> {
    STATE_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Resolve the state list for a discovery call.
///
/// An explicit, non-blank state list wins over the region; codes are
/// upper-cased and must be known. Otherwise the region must normalize to a
/// known region.
pub fn resolve_states(region: Option<&str>, states: Option<&[String]>) -> ScoutResult<Vec<String>> {
    let explicit: Vec<String> = states
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if !explicit.is_empty() {
        if let Some(unknown) = explicit.iter().find(|s| state_name(s).is_none()) {
            return Err(ScoutError::InvalidInput(format!(
                "Unknown state code: {unknown}"
            )));
        }
        return Ok(explicit);
    }

    region
        .and_then(normalize_region)
        .and_then(region_states)
        .map(|codes| codes.iter().map(|s| s.to_string()).collect())
        .ok_or_else(|| ScoutError::InvalidInput("Provide a valid region or states list".into()))
}
