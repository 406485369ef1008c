//! Association inclusion policy.

use super::types::{Association, Division, ProgramCandidate};
use serde::{Deserialize, Serialize};

/// Which lower-tier programs survive enumeration. Both are off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationFilter {
    #[serde(default)]
    pub include_diii: bool,
    #[serde(default)]
    pub include_njcaa: bool,
}

impl AssociationFilter {
    pub fn new(include_diii: bool, include_njcaa: bool) -> Self {
        Self {
            include_diii,
            include_njcaa,
        }
    }

    /// Whether `candidate` passes. Only NCAA Division III and NJCAA
    /// programs can be dropped.
    pub fn admits(&self, candidate: &ProgramCandidate) -> bool {
        match (candidate.association, candidate.division) {
            (Association::Ncaa, Some(Division::III)) => self.include_diii,
            (Association::Njcaa, _) => self.include_njcaa,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(association: Association, division: Option<Division>) -> ProgramCandidate {
        ProgramCandidate::new("Test College", "NY", association)
            .unwrap()
            .with_division(division)
    }

    #[test]
    fn test_default_excludes_diii_and_njcaa() {
        let f = AssociationFilter::default();
        assert!(!f.admits(&candidate(Association::Ncaa, Some(Division::III))));
        assert!(!f.admits(&candidate(Association::Njcaa, None)));
        assert!(f.admits(&candidate(Association::Ncaa, Some(Division::I))));
        assert!(f.admits(&candidate(Association::Ncaa, Some(Division::II))));
        assert!(f.admits(&candidate(Association::Ncaa, None)));
        assert!(f.admits(&candidate(Association::Naia, None)));
        assert!(f.admits(&candidate(Association::Unknown, None)));
    }

    #[test]
    fn test_flags_only_weaken_filtering() {
        let all = [
            candidate(Association::Ncaa, Some(Division::I)),
            candidate(Association::Ncaa, Some(Division::III)),
            candidate(Association::Njcaa, None),
            candidate(Association::Naia, None),
            candidate(Association::Unknown, None),
        ];
        let count = |f: AssociationFilter| all.iter().filter(|c| f.admits(c)).count();

        let base = count(AssociationFilter::new(false, false));
        let diii = count(AssociationFilter::new(true, false));
        let njcaa = count(AssociationFilter::new(false, true));
        let both = count(AssociationFilter::new(true, true));

        assert_eq!(base, 3);
        assert_eq!(diii, 4);
        assert_eq!(njcaa, 4);
        assert_eq!(both, 5);
    }
}
