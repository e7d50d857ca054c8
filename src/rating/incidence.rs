use std::collections::HashMap;

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::domain::{Alliance, Match, Round, Team, TeamId};
use crate::errors::{EngineError, Result};

const ALLIANCES: [Alliance; 2] = [Alliance::Red, Alliance::Blue];

/// Design matrix relating team presence to alliance scores.
///
/// Row `2k` is the red alliance of the k-th qualification match, row `2k + 1`
/// the blue alliance. Columns follow `teams`.
#[derive(Debug, Clone)]
pub struct IncidenceMatrix {
    pub matrix: DMatrix<f64>,
    pub alliance_scores: DVector<f64>,
    pub opponent_scores: DVector<f64>,
    pub teams: Vec<Team>,
    pub columns: HashMap<TeamId, usize>,
}

impl IncidenceMatrix {
    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn column_of(&self, team_id: TeamId) -> Option<usize> {
        self.columns.get(&team_id).copied()
    }

    /// Qualification matches each column appeared in
    pub fn appearances(&self) -> Vec<usize> {
        self.matrix
            .column_iter()
            .map(|col| col.iter().filter(|&&v| v > 0.0).count())
            .collect()
    }
}

/// Builds the design matrix from the scored qualification matches in `matches`.
pub fn build_incidence(matches: &[Match]) -> Result<IncidenceMatrix> {
    let qualifications: Vec<&Match> = matches
        .iter()
        .filter(|m| m.round == Round::Qualification && m.is_scored())
        .collect();

    if qualifications.is_empty() {
        return Err(EngineError::MissingData(
            "no scored qualification matches to rate".to_string(),
        ));
    }

    let (teams, columns) = extract_teams(&qualifications);
    if teams.is_empty() {
        return Err(EngineError::MissingData(
            "qualification matches list no teams".to_string(),
        ));
    }

    let n_rows = qualifications.len() * ALLIANCES.len();
    let mut matrix = DMatrix::<f64>::zeros(n_rows, teams.len());
    let mut alliance_scores = DVector::<f64>::zeros(n_rows);
    let mut opponent_scores = DVector::<f64>::zeros(n_rows);

    for (k, m) in qualifications.iter().enumerate() {
        for (offset, &alliance) in ALLIANCES.iter().enumerate() {
            let row = k * ALLIANCES.len() + offset;

            for team in m.alliance(alliance).iter().filter(|t| !t.is_none()) {
                // Assignment, not increment: a duplicated slot still marks once.
                matrix[(row, columns[&team.id])] = 1.0;
            }

            alliance_scores[row] = m.score(alliance) as f64;
            opponent_scores[row] = m.score(alliance.opponent()) as f64;
        }
    }

    debug!(
        "Built {}x{} incidence matrix from {} qualification matches",
        n_rows,
        teams.len(),
        qualifications.len()
    );

    Ok(IncidenceMatrix {
        matrix,
        alliance_scores,
        opponent_scores,
        teams,
        columns,
    })
}

/// Teams in first-seen order, with their column index
fn extract_teams(matches: &[&Match]) -> (Vec<Team>, HashMap<TeamId, usize>) {
    let mut teams = Vec::new();
    let mut columns = HashMap::new();

    for team in matches.iter().flat_map(|m| m.teams()) {
        if !columns.contains_key(&team.id) {
            columns.insert(team.id, teams.len());
            teams.push(team.clone());
        }
    }

    (teams, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: TeamId) -> Team {
        Team::new(id, format!("{}X", id))
    }

    fn qual(id: i64, red: [Team; 2], blue: [Team; 2], red_score: i64, blue_score: i64) -> Match {
        Match::new(id, 1, Round::Qualification, red, blue).with_scores(red_score, blue_score)
    }

    #[test]
    fn test_builds_two_rows_per_match() {
        let matches = vec![
            qual(1, [team(1), team(2)], [team(3), Team::NONE], 40, 20),
            qual(2, [team(3), team(1)], [team(2), Team::NONE], 50, 10),
        ];

        let incidence = build_incidence(&matches).unwrap();

        assert_eq!(incidence.matrix.shape(), (4, 3));
        assert_eq!(incidence.teams.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let expected = DMatrix::from_row_slice(4, 3, &[
            1.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
            1.0, 0.0, 1.0,
            0.0, 1.0, 0.0,
        ]);
        assert_eq!(incidence.matrix, expected);
        assert_eq!(incidence.alliance_scores.as_slice(), &[40.0, 20.0, 50.0, 10.0]);
        assert_eq!(incidence.opponent_scores.as_slice(), &[20.0, 40.0, 10.0, 50.0]);
        assert_eq!(incidence.appearances(), vec![2, 2, 2]);
    }

    #[test]
    fn test_skips_non_qualification_rounds() {
        let mut practice = qual(1, [team(7), team(8)], [team(9), Team::NONE], 10, 5);
        practice.round = Round::Practice;
        let mut final_match = qual(2, [team(1), team(7)], [team(2), team(9)], 60, 55);
        final_match.round = Round::Finals;

        let matches = vec![
            practice,
            qual(3, [team(1), team(2)], [team(3), team(4)], 30, 25),
            final_match,
        ];

        let incidence = build_incidence(&matches).unwrap();

        assert_eq!(incidence.rows(), 2);
        assert_eq!(incidence.teams.len(), 4);
        assert!(incidence.column_of(7).is_none());
    }

    #[test]
    fn test_skips_unscored_qualifications() {
        let matches = vec![
            qual(1, [team(1), team(2)], [team(3), team(4)], 30, 25),
            qual(2, [team(5), team(6)], [team(1), team(2)], 0, 0),
        ];

        let incidence = build_incidence(&matches).unwrap();

        assert_eq!(incidence.rows(), 2);
        assert!(incidence.column_of(5).is_none());
    }

    #[test]
    fn test_duplicate_slot_marks_once() {
        let matches = vec![qual(1, [team(1), team(1)], [team(2), team(3)], 20, 10)];

        let incidence = build_incidence(&matches).unwrap();

        assert_eq!(incidence.matrix[(0, 0)], 1.0);
        assert_eq!(incidence.matrix.row(0).sum(), 1.0);
    }

    #[test]
    fn test_empty_corpus_is_missing_data() {
        let mut practice = qual(1, [team(1), team(2)], [team(3), team(4)], 10, 5);
        practice.round = Round::Practice;

        let result = build_incidence(&[practice]);
        assert!(matches!(result, Err(EngineError::MissingData(_))));

        assert!(matches!(build_incidence(&[]), Err(EngineError::MissingData(_))));
    }
}
