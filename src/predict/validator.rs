use log::warn;
use serde::Serialize;

use super::predictor::{PredictionOptions, predict_matches};
use crate::config::EngineSettings;
use crate::domain::{Division, Event, Match, Outcome};
use crate::rating::calculate_team_performance_ratings;

/// Winner-pick accuracy over a set of predicted matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
    pub predicted_ties: usize,
    pub actual_ties: usize,
}

impl ValidationReport {
    fn record(&mut self, predicted: Outcome, actual: Outcome) {
        self.total += 1;
        if predicted == actual {
            self.correct += 1;
        }
        if predicted == Outcome::Tie {
            self.predicted_ties += 1;
        }
        if actual == Outcome::Tie {
            self.actual_ties += 1;
        }
        self.refresh_accuracy();
    }

    pub fn merge(&mut self, other: &ValidationReport) {
        self.correct += other.correct;
        self.total += other.total;
        self.predicted_ties += other.predicted_ties;
        self.actual_ties += other.actual_ties;
        self.refresh_accuracy();
    }

    fn refresh_accuracy(&mut self) {
        self.accuracy = if self.total > 0 {
            100.0 * self.correct as f64 / self.total as f64
        } else {
            0.0
        };
    }
}

/// Compares predicted and actual winners for every predicted match with a
/// recorded outcome. A tie is its own outcome: tie against tie is correct,
/// a predicted tie against a decided match is not.
pub fn validate_predictions(matches: &[Match]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for m in matches.iter().filter(|m| m.predicted && m.is_scored()) {
        report.record(m.predicted_winner(), m.winner());
    }

    report
}

#[derive(Debug, Clone, Serialize)]
pub struct DivisionValidation {
    pub division: Division,
    pub report: ValidationReport,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventValidation {
    pub divisions: Vec<DivisionValidation>,
    pub skipped: Vec<Division>,
    pub aggregate: ValidationReport,
}

/// Back-tests every division of `event` on its played qualification matches.
///
/// A division whose ratings cannot be computed is skipped and listed in
/// `skipped`; the remaining divisions are still validated.
pub fn validate_event(event: &Event, settings: &EngineSettings, opr_weight: f64, dpr_weight: f64) -> EventValidation {
    let options = PredictionOptions::backtest(opr_weight, dpr_weight);
    let mut result = EventValidation::default();

    for division in &event.divisions {
        let matches = event.matches_for(division.id);
        let outcome = calculate_team_performance_ratings(division, &matches, settings)
            .and_then(|ratings| predict_matches(division, Some(&ratings), &matches, &options, settings));

        match outcome {
            Ok(predicted) => {
                let report = validate_predictions(&predicted);
                result.aggregate.merge(&report);
                result.divisions.push(DivisionValidation {
                    division: division.clone(),
                    report,
                });
            }
            Err(e) => {
                warn!("Skipping division {} ({}): {}", division.id, division.name, e);
                result.skipped.push(division.clone());
            }
        }
    }

    result
}
