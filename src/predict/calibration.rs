use log::{info, warn};
use ndarray::{Array1, Array2};

use super::predictor::{PredictionOptions, predict_matches};
use super::progress::SweepProgress;
use super::validator::{ValidationReport, validate_predictions};
use crate::config::{EngineSettings, SweepSettings};
use crate::domain::{Division, Event, Match};
use crate::errors::{EngineError, Result};
use crate::rating::{RatingSet, calculate_team_performance_ratings};

/// Accuracy of every `(opr_weight, dpr_weight)` pair on the grid.
///
/// `accuracy[[i, j]]` holds the event-wide winner accuracy for
/// `opr_weight = weights[i]` and `dpr_weight = weights[j]`.
#[derive(Debug, Clone)]
pub struct WeightSweep {
    pub weights: Array1<f64>,
    pub accuracy: Array2<f64>,
}

impl WeightSweep {
    /// First maximum in row-major order: `(opr_weight, dpr_weight, accuracy)`
    pub fn best(&self) -> (f64, f64, f64) {
        let mut best = (0, 0, f64::NEG_INFINITY);

        for ((i, j), &accuracy) in self.accuracy.indexed_iter() {
            if accuracy > best.2 {
                best = (i, j, accuracy);
            }
        }

        (self.weights[best.0], self.weights[best.1], best.2)
    }
}

struct RatedDivision {
    division: Division,
    matches: Vec<Match>,
    ratings: RatingSet,
}

/// Grid search over prediction weights, holding the corpus fixed.
///
/// Ratings are computed once per division and reused for every pair.
pub fn sweep_weights(event: &Event, settings: &EngineSettings, sweep: &SweepSettings) -> Result<WeightSweep> {
    let rated = rate_divisions(event, settings);
    if rated.is_empty() {
        return Err(EngineError::MissingData(format!(
            "event {} has no division with rateable qualification matches",
            event.sku
        )));
    }

    let weights = grid(sweep.steps);
    let n = weights.len();
    let mut accuracy = Array2::<f64>::zeros((n, n));
    let mut progress = SweepProgress::new(n * n);

    info!("Sweeping {}x{} weight grid over {} divisions", n, n, rated.len());

    for (i, &opr_weight) in weights.iter().enumerate() {
        for (j, &dpr_weight) in weights.iter().enumerate() {
            let report = evaluate_pair(&rated, opr_weight, dpr_weight, settings)?;
            accuracy[[i, j]] = report.accuracy;
            progress.record(report.accuracy);
        }
    }

    Ok(WeightSweep { weights, accuracy })
}

fn grid(steps: usize) -> Array1<f64> {
    Array1::<f64>::linspace(0.0, 1.0, steps.max(2))
}

fn rate_divisions(event: &Event, settings: &EngineSettings) -> Vec<RatedDivision> {
    let mut rated = Vec::new();

    for division in &event.divisions {
        let matches = event.matches_for(division.id);
        match calculate_team_performance_ratings(division, &matches, settings) {
            Ok(ratings) => rated.push(RatedDivision {
                division: division.clone(),
                matches,
                ratings,
            }),
            Err(e) => warn!("Skipping division {} in sweep: {}", division.id, e),
        }
    }

    rated
}

fn evaluate_pair(
    rated: &[RatedDivision],
    opr_weight: f64,
    dpr_weight: f64,
    settings: &EngineSettings,
) -> Result<ValidationReport> {
    let options = PredictionOptions::backtest(opr_weight, dpr_weight);
    let mut aggregate = ValidationReport::default();

    for entry in rated {
        let predicted = predict_matches(&entry.division, Some(&entry.ratings), &entry.matches, &options, settings)?;
        aggregate.merge(&validate_predictions(&predicted));
    }

    Ok(aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Round, Team};

    fn event() -> Event {
        let team = |id: i64| Team::new(id, format!("{}T", id));
        Event {
            id: 1,
            sku: "RE-SWEEP".to_string(),
            name: "Sweep".to_string(),
            divisions: vec![Division::new(1, "Science")],
            matches: vec![
                Match::new(1, 1, Round::Qualification, [team(1), team(2)], [team(3), Team::NONE]).with_scores(40, 20),
                Match::new(2, 1, Round::Qualification, [team(3), team(1)], [team(2), Team::NONE]).with_scores(50, 10),
            ],
        }
    }

    #[test]
    fn test_grid_spans_unit_interval() {
        let weights = grid(11);

        assert_eq!(weights.len(), 11);
        assert_eq!(weights[0], 0.0);
        assert_eq!(weights[10], 1.0);
        assert_eq!(grid(0).len(), 2);
    }

    #[test]
    fn test_sweep_fills_grid() {
        let sweep = sweep_weights(&event(), &EngineSettings::default(), &SweepSettings { steps: 3 }).unwrap();

        assert_eq!(sweep.accuracy.dim(), (3, 3));
        // All-zero weights predict a tie everywhere.
        assert_eq!(sweep.accuracy[[0, 0]], 0.0);
        // OPR only picks both winners.
        assert_eq!(sweep.accuracy[[2, 0]], 100.0);
    }

    #[test]
    fn test_best_returns_first_maximum() {
        let sweep = WeightSweep {
            weights: Array1::from(vec![0.0, 0.5, 1.0]),
            accuracy: Array2::from_shape_vec((3, 3), vec![10.0, 20.0, 30.0, 60.0, 40.0, 60.0, 50.0, 50.0, 50.0])
                .unwrap(),
        };

        assert_eq!(sweep.best(), (0.5, 0.0, 60.0));
    }

    #[test]
    fn test_sweep_without_rateable_division_fails() {
        let mut event = event();
        event.matches.clear();

        let result = sweep_weights(&event, &EngineSettings::default(), &SweepSettings::default());
        assert!(matches!(result, Err(EngineError::MissingData(_))));
    }
}
