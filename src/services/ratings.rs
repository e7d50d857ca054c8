use log::{info, warn};

use crate::config::EngineSettings;
use crate::domain::{Division, DivisionId, Event, Match};
use crate::errors::{EngineError, Result};
use crate::predict::{PredictionOptions, predict_matches};
use crate::rating::{RatingSet, calculate_team_performance_ratings};

pub struct DivisionRatings {
    pub division: Division,
    pub ratings: Result<RatingSet>,
}

/// Runs the synchronous engine on the blocking thread pool so async
/// callers never stall on a solve.
#[derive(Clone)]
pub struct RatingService {
    settings: EngineSettings,
}

impl RatingService {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub async fn compute(&self, division: Division, matches: Vec<Match>) -> Result<RatingSet> {
        let settings = self.settings.clone();

        tokio::task::spawn_blocking(move || calculate_team_performance_ratings(&division, &matches, &settings))
            .await
            .map_err(|e| EngineError::RatingComputationFailed(format!("rating task failed: {}", e)))?
    }

    pub async fn predict(
        &self,
        division: Division,
        ratings: Option<RatingSet>,
        matches: Vec<Match>,
        options: PredictionOptions,
    ) -> Result<Vec<Match>> {
        let settings = self.settings.clone();

        tokio::task::spawn_blocking(move || {
            predict_matches(&division, ratings.as_ref(), &matches, &options, &settings)
        })
        .await
        .map_err(|e| EngineError::RatingComputationFailed(format!("prediction task failed: {}", e)))?
    }

    /// Rates every division (or only `only`) concurrently, keeping event order.
    /// One division failing does not affect the others.
    pub async fn compute_event(&self, event: &Event, only: Option<DivisionId>) -> Vec<DivisionRatings> {
        let pending: Vec<_> = event
            .divisions
            .iter()
            .filter(|d| only.is_none_or(|id| d.id == id))
            .map(|division| {
                let service = self.clone();
                let matches = event.matches_for(division.id);
                let owned = division.clone();
                let task = tokio::spawn(async move { service.compute(owned, matches).await });
                (division.clone(), task)
            })
            .collect();

        let mut results = Vec::with_capacity(pending.len());
        for (division, task) in pending {
            let ratings = match task.await {
                Ok(result) => result,
                Err(e) => Err(EngineError::RatingComputationFailed(format!("rating task failed: {}", e))),
            };

            match &ratings {
                Ok(set) => info!("Division {}: rated {} teams", division.id, set.len()),
                Err(e) => warn!("Division {}: {}", division.id, e),
            }
            results.push(DivisionRatings { division, ratings });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Round, Team};

    fn event() -> Event {
        let team = |id: i64| Team::new(id, format!("{}T", id));
        Event {
            id: 1,
            sku: "RE-ASYNC".to_string(),
            name: "Async".to_string(),
            divisions: vec![Division::new(1, "Science"), Division::new(2, "Math")],
            matches: vec![
                Match::new(1, 1, Round::Qualification, [team(1), team(2)], [team(3), Team::NONE]).with_scores(40, 20),
                Match::new(2, 1, Round::Qualification, [team(3), team(1)], [team(2), Team::NONE]).with_scores(50, 10),
                Match::new(3, 1, Round::Qualification, [team(2), team(3)], [team(1), Team::NONE]),
            ],
        }
    }

    #[tokio::test]
    async fn test_compute_matches_synchronous_engine() {
        let event = event();
        let division = event.divisions[0].clone();
        let service = RatingService::new(EngineSettings::default());

        let async_ratings = service.compute(division.clone(), event.matches_for(1)).await.unwrap();
        let sync_ratings =
            calculate_team_performance_ratings(&division, &event.matches, &EngineSettings::default()).unwrap();

        assert_eq!(async_ratings, sync_ratings);
    }

    #[tokio::test]
    async fn test_compute_event_isolates_division_failures() {
        let service = RatingService::new(EngineSettings::default());
        let results = service.compute_event(&event(), None).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].division.id, 1);
        assert!(results[0].ratings.is_ok());
        assert!(matches!(results[1].ratings, Err(EngineError::MissingData(_))));

        let only_second = service.compute_event(&event(), Some(2)).await;
        assert_eq!(only_second.len(), 1);
    }

    #[tokio::test]
    async fn test_predict_off_thread() {
        let event = event();
        let service = RatingService::new(EngineSettings::default());

        let predicted = service
            .predict(event.divisions[0].clone(), None, event.matches.clone(), PredictionOptions::new())
            .await
            .unwrap();

        assert!(predicted[2].predicted);
        assert!(!predicted[0].predicted);
    }
}
