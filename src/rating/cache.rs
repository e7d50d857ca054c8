use std::collections::HashMap;

use log::debug;

use super::solver::calculate_team_performance_ratings;
use super::types::RatingSet;
use crate::config::EngineSettings;
use crate::domain::{Division, DivisionId, Match};
use crate::errors::Result;

/// Caller-owned rating sets indexed by division.
///
/// Entries are never refreshed implicitly: callers invalidate a division
/// whenever its match corpus changes.
pub struct RatingCache {
    ratings: HashMap<DivisionId, RatingSet>,
}

impl RatingCache {
    pub fn new() -> Self {
        Self {
            ratings: HashMap::new(),
        }
    }

    pub fn get(&self, division_id: DivisionId) -> Option<&RatingSet> {
        self.ratings.get(&division_id)
    }

    pub fn insert(&mut self, ratings: RatingSet) {
        self.ratings.insert(ratings.division_id, ratings);
    }

    /// Cached set for `division`, computing and storing it on first use.
    /// A failed computation leaves the cache unchanged.
    pub fn get_or_compute(
        &mut self,
        division: &Division,
        matches: &[Match],
        settings: &EngineSettings,
    ) -> Result<&RatingSet> {
        if !self.ratings.contains_key(&division.id) {
            let computed = calculate_team_performance_ratings(division, matches, settings)?;
            self.ratings.insert(division.id, computed);
        } else {
            debug!("Using cached ratings for division {}", division.id);
        }

        Ok(&self.ratings[&division.id])
    }

    pub fn invalidate(&mut self, division_id: DivisionId) -> Option<RatingSet> {
        self.ratings.remove(&division_id)
    }

    pub fn clear(&mut self) {
        self.ratings.clear();
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl Default for RatingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Round, Team};

    fn matches(red_score: i64) -> Vec<Match> {
        vec![
            Match::new(
                1,
                1,
                Round::Qualification,
                [Team::new(1, "1A"), Team::new(2, "2A")],
                [Team::new(3, "3A"), Team::new(4, "4A")],
            )
            .with_scores(red_score, 20),
        ]
    }

    #[test]
    fn test_get_or_compute_reuses_entry_until_invalidated() {
        let division = Division::new(1, "Math");
        let settings = EngineSettings::default();
        let mut cache = RatingCache::new();

        let first_opr = cache.get_or_compute(&division, &matches(40), &settings).unwrap().get(1).unwrap().opr;
        // A changed corpus is ignored while the entry is cached.
        let cached_opr = cache.get_or_compute(&division, &matches(80), &settings).unwrap().get(1).unwrap().opr;
        assert_eq!(first_opr, cached_opr);

        assert!(cache.invalidate(1).is_some());
        let fresh_opr = cache.get_or_compute(&division, &matches(80), &settings).unwrap().get(1).unwrap().opr;
        assert!(fresh_opr > first_opr);
    }

    #[test]
    fn test_failed_computation_is_not_cached() {
        let division = Division::new(1, "Math");
        let mut cache = RatingCache::new();

        assert!(cache.get_or_compute(&division, &[], &EngineSettings::default()).is_err());
        assert!(cache.is_empty());
    }
}
