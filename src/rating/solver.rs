use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use super::incidence::{IncidenceMatrix, build_incidence};
use super::types::{RatingSet, TeamPerformanceRating};
use crate::config::EngineSettings;
use crate::domain::{Division, Match};
use crate::errors::{EngineError, Result};

/// Computes OPR, DPR and CCWM for every team in a division.
///
/// Only matches belonging to `division` and played in the qualification
/// round take part. The full set is recomputed on every call.
pub fn calculate_team_performance_ratings(
    division: &Division,
    matches: &[Match],
    settings: &EngineSettings,
) -> Result<RatingSet> {
    let corpus: Vec<Match> = matches
        .iter()
        .filter(|m| m.division_id == division.id)
        .cloned()
        .collect();

    info!(
        "Calculating ratings for division {} ({}) from {} matches",
        division.id,
        division.name,
        corpus.len()
    );

    let incidence = build_incidence(&corpus).map_err(|e| match e {
        EngineError::MissingData(reason) => {
            EngineError::MissingData(format!("division {}: {}", division.id, reason))
        }
        other => other,
    })?;

    let ratings = solve(&incidence, settings)?;
    info!("Rated {} teams in division {}", ratings.len(), division.id);

    Ok(RatingSet::new(division.id, ratings))
}

/// Least-squares solve of `M · x = scores` through the pseudo-inverse of `M`.
pub fn solve(
    incidence: &IncidenceMatrix,
    settings: &EngineSettings,
) -> Result<Vec<TeamPerformanceRating>> {
    ensure_finite_input(incidence)?;

    let pinv = pseudo_inverse(&incidence.matrix, settings)?;
    let opr = pinv.clone() * &incidence.alliance_scores;
    let dpr = pinv * &incidence.opponent_scores;

    ensure_finite_output(&opr, "OPR")?;
    ensure_finite_output(&dpr, "DPR")?;

    Ok(build_team_ratings(incidence, &opr, &dpr))
}

fn pseudo_inverse(matrix: &DMatrix<f64>, settings: &EngineSettings) -> Result<DMatrix<f64>> {
    let svd = matrix
        .clone()
        .try_svd(true, true, f64::EPSILON, settings.svd_max_iterations)
        .ok_or_else(|| {
            EngineError::RatingComputationFailed("singular value decomposition did not converge".into())
        })?;

    let max_singular = svd.singular_values.iter().cloned().fold(0.0_f64, f64::max);
    let tolerance = settings.pinv_epsilon * max_singular;
    debug!(
        "SVD of {}x{} matrix: max singular value {:.4}, cutoff {:.3e}",
        matrix.nrows(),
        matrix.ncols(),
        max_singular,
        tolerance
    );

    svd.pseudo_inverse(tolerance)
        .map_err(|e| EngineError::RatingComputationFailed(e.to_string()))
}

fn ensure_finite_input(incidence: &IncidenceMatrix) -> Result<()> {
    let finite = incidence.matrix.iter().all(|v| v.is_finite())
        && incidence.alliance_scores.iter().all(|v| v.is_finite())
        && incidence.opponent_scores.iter().all(|v| v.is_finite());

    if finite {
        Ok(())
    } else {
        Err(EngineError::RatingComputationFailed(
            "incidence matrix or scores contain non-finite values".into(),
        ))
    }
}

fn ensure_finite_output(values: &DVector<f64>, label: &str) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(EngineError::RatingComputationFailed(format!(
            "{} solution contains non-finite values",
            label
        )))
    }
}

fn build_team_ratings(
    incidence: &IncidenceMatrix,
    opr: &DVector<f64>,
    dpr: &DVector<f64>,
) -> Vec<TeamPerformanceRating> {
    let appearances = incidence.appearances();

    incidence
        .teams
        .iter()
        .enumerate()
        .map(|(idx, team)| TeamPerformanceRating::new(team.clone(), opr[idx], dpr[idx], appearances[idx]))
        .collect()
}
