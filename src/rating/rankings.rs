use std::cmp::Ordering;

use serde::Serialize;

use super::types::{RatingSet, TeamPerformanceRating};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RankingKey {
    Opr,
    Dpr,
    Ccwm,
}

impl RankingKey {
    pub fn as_str(&self) -> &str {
        match self {
            RankingKey::Opr => "opr",
            RankingKey::Dpr => "dpr",
            RankingKey::Ccwm => "ccwm",
        }
    }

    fn value(&self, rating: &TeamPerformanceRating) -> f64 {
        match self {
            RankingKey::Opr => rating.opr,
            RankingKey::Dpr => rating.dpr,
            RankingKey::Ccwm => rating.ccwm,
        }
    }

    // Lower DPR is better.
    fn ascending(&self) -> bool {
        matches!(self, RankingKey::Dpr)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedTeam {
    pub rank: usize,
    pub rating: TeamPerformanceRating,
}

/// Teams ordered best-first by `key`; equal values fall back to team number.
pub fn rank_by(ratings: &RatingSet, key: RankingKey) -> Vec<RankedTeam> {
    let mut sorted: Vec<&TeamPerformanceRating> = ratings.iter().collect();
    sorted.sort_by(|a, b| compare(a, b, key));

    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, rating)| RankedTeam {
            rank: idx + 1,
            rating: rating.clone(),
        })
        .collect()
}

fn compare(a: &TeamPerformanceRating, b: &TeamPerformanceRating, key: RankingKey) -> Ordering {
    let (va, vb) = (key.value(a), key.value(b));
    let by_value = if key.ascending() {
        va.total_cmp(&vb)
    } else {
        vb.total_cmp(&va)
    };

    by_value.then_with(|| a.team.number.cmp(&b.team.number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Team;

    fn sample() -> RatingSet {
        RatingSet::new(
            1,
            vec![
                TeamPerformanceRating::new(Team::new(1, "300C"), 20.0, 40.0, 2),
                TeamPerformanceRating::new(Team::new(2, "100A"), 30.0, -30.0, 2),
                TeamPerformanceRating::new(Team::new(3, "200B"), 10.0, 50.0, 2),
                TeamPerformanceRating::new(Team::new(4, "050Z"), 20.0, 40.0, 1),
            ],
        )
    }

    fn numbers(ranked: &[RankedTeam]) -> Vec<&str> {
        ranked.iter().map(|r| r.rating.team.number.as_str()).collect()
    }

    #[test]
    fn test_opr_descending_with_number_tiebreak() {
        let ranked = rank_by(&sample(), RankingKey::Opr);

        assert_eq!(numbers(&ranked), vec!["100A", "050Z", "300C", "200B"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[3].rank, 4);
    }

    #[test]
    fn test_dpr_ascending() {
        let ranked = rank_by(&sample(), RankingKey::Dpr);
        assert_eq!(ranked[0].rating.team.number, "100A");
        assert_eq!(ranked[3].rating.team.number, "200B");
    }

    #[test]
    fn test_ccwm_descending() {
        let ranked = rank_by(&sample(), RankingKey::Ccwm);
        assert_eq!(ranked[0].rating.team.number, "100A");
        assert_eq!(ranked[3].rating.team.number, "200B");
    }
}
