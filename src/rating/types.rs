use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{DivisionId, Team, TeamId};

pub type RatingValue = f64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPerformanceRating {
    pub team: Team,
    pub opr: RatingValue,
    pub dpr: RatingValue,
    pub ccwm: RatingValue,
    pub matches_played: usize,
}

impl TeamPerformanceRating {
    pub fn new(team: Team, opr: RatingValue, dpr: RatingValue, matches_played: usize) -> Self {
        Self {
            team,
            opr,
            dpr,
            ccwm: opr - dpr,
            matches_played,
        }
    }
}

/// Full rating set for one division, in incidence-matrix column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSet {
    pub division_id: DivisionId,
    ratings: Vec<TeamPerformanceRating>,
    #[serde(skip)]
    index: HashMap<TeamId, usize>,
}

impl RatingSet {
    pub fn new(division_id: DivisionId, ratings: Vec<TeamPerformanceRating>) -> Self {
        let index = ratings
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.team.id, idx))
            .collect();

        Self {
            division_id,
            ratings,
            index,
        }
    }

    pub fn get(&self, team_id: TeamId) -> Option<&TeamPerformanceRating> {
        self.index.get(&team_id).map(|&idx| &self.ratings[idx])
    }

    /// `(opr, dpr)` for a team; teams without a rating contribute nothing.
    pub fn contribution(&self, team: &Team) -> (RatingValue, RatingValue) {
        if team.is_none() {
            return (0.0, 0.0);
        }

        self.get(team.id)
            .map(|r| (r.opr, r.dpr))
            .unwrap_or((0.0, 0.0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamPerformanceRating> {
        self.ratings.iter()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn into_vec(self) -> Vec<TeamPerformanceRating> {
        self.ratings
    }
}
