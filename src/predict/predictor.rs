use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::config::EngineSettings;
use crate::domain::{Alliance, Division, Match, Round};
use crate::errors::{EngineError, Result};
use crate::rating::{RatingSet, calculate_team_performance_ratings};

#[derive(Debug, Clone)]
pub struct PredictionOptions {
    /// Only matches in these rounds are predicted; `None` means every round
    pub only_rounds: Option<HashSet<Round>>,
    /// Overwrite predictions for matches that already have an outcome (back-testing)
    pub predict_completed: bool,
    pub opr_weight: f64,
    pub dpr_weight: f64,
}

impl PredictionOptions {
    pub fn new() -> Self {
        Self {
            only_rounds: None,
            predict_completed: false,
            opr_weight: 0.5,
            dpr_weight: 0.5,
        }
    }

    /// Defaults taken from engine settings
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new().with_weights(settings.opr_weight, settings.dpr_weight)
    }

    /// Options for re-predicting played qualification matches
    pub fn backtest(opr_weight: f64, dpr_weight: f64) -> Self {
        Self::new()
            .with_weights(opr_weight, dpr_weight)
            .with_rounds([Round::Qualification])
            .with_completed(true)
    }

    pub fn with_weights(mut self, opr_weight: f64, dpr_weight: f64) -> Self {
        self.opr_weight = opr_weight;
        self.dpr_weight = dpr_weight;
        self
    }

    pub fn with_rounds(mut self, rounds: impl IntoIterator<Item = Round>) -> Self {
        self.only_rounds = Some(rounds.into_iter().collect());
        self
    }

    pub fn with_completed(mut self, predict_completed: bool) -> Self {
        self.predict_completed = predict_completed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_weight("opr_weight", self.opr_weight)?;
        check_weight("dpr_weight", self.dpr_weight)
    }

    fn includes(&self, round: Round) -> bool {
        self.only_rounds
            .as_ref()
            .is_none_or(|rounds| rounds.contains(&round))
    }
}

impl Default for PredictionOptions {
    fn default() -> Self {
        Self::new()
    }
}

fn check_weight(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidWeight { name, value })
    }
}

/// Forecast scores for the matches of `division`.
///
/// Returns an updated copy of `matches`; the input is never modified, so a
/// failure leaves the caller's corpus as it was. When `ratings` is absent,
/// empty or belongs to another division they are computed once from `matches`
/// and reused for every match.
pub fn predict_matches(
    division: &Division,
    ratings: Option<&RatingSet>,
    matches: &[Match],
    options: &PredictionOptions,
    settings: &EngineSettings,
) -> Result<Vec<Match>> {
    predict_matches_at(division, ratings, matches, options, settings, Utc::now())
}

pub fn predict_matches_at(
    division: &Division,
    ratings: Option<&RatingSet>,
    matches: &[Match],
    options: &PredictionOptions,
    settings: &EngineSettings,
    now: DateTime<Utc>,
) -> Result<Vec<Match>> {
    options.validate()?;

    let computed;
    let ratings = match ratings {
        Some(r) if !r.is_empty() && r.division_id == division.id => r,
        _ => {
            computed = calculate_team_performance_ratings(division, matches, settings)?;
            &computed
        }
    };

    let mut predicted = matches.to_vec();
    let mut count = 0;

    for m in predicted.iter_mut() {
        if m.division_id != division.id || !should_predict(m, options, settings, now) {
            continue;
        }

        apply_prediction(m, ratings, options);
        count += 1;
    }

    info!("Predicted {} matches in division {}", count, division.id);
    Ok(predicted)
}

fn should_predict(m: &Match, options: &PredictionOptions, settings: &EngineSettings, now: DateTime<Utc>) -> bool {
    if !options.predict_completed && m.completed_at(now, settings.completion_threshold) {
        return false;
    }

    options.includes(m.round)
}

fn apply_prediction(m: &mut Match, ratings: &RatingSet, options: &PredictionOptions) {
    m.predicted = true;
    m.predicted_red_score = predict_score(m, Alliance::Red, ratings, options);
    m.predicted_blue_score = predict_score(m, Alliance::Blue, ratings, options);

    debug!(
        "Match {} ({}): predicted {}-{}",
        m.id, m.name, m.predicted_red_score, m.predicted_blue_score
    );
}

/// `round(opr_weight * Σ OPR(own) + dpr_weight * Σ DPR(opponents))`
fn predict_score(m: &Match, alliance: Alliance, ratings: &RatingSet, options: &PredictionOptions) -> i64 {
    let offense: f64 = m
        .alliance(alliance)
        .iter()
        .map(|team| ratings.contribution(team).0)
        .sum();
    let defense: f64 = m
        .alliance(alliance.opponent())
        .iter()
        .map(|team| ratings.contribution(team).1)
        .sum();

    (options.opr_weight * offense + options.dpr_weight * defense).round() as i64
}
