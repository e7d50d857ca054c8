use anyhow::{Context, Result};
use log::info;
use serde_json::Value;
use std::path::Path;

use crate::cache::Cache;
use crate::config::settings::AppConfig;
use crate::domain::{Division, DivisionId, Event, Match};
use crate::errors::{EngineError, with_parse_context};
use crate::predict::{self, EventValidation, PredictionOptions, WeightSweep};
use crate::rating::RatingCache;

pub struct ProcessingService {
    config: AppConfig,
    cache: Cache,
    ratings: RatingCache,
}

impl ProcessingService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let cache = Cache::new(&config.storage.cache_dir)?;
        Ok(Self {
            config,
            cache,
            ratings: RatingCache::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn load_event(&self, key: &str) -> Result<Event> {
        self.cache.load_event(key)
    }

    /// Store a raw competition-data payload under `key`.
    /// Cached ratings for the event's divisions are dropped.
    pub fn import(&mut self, key: &str, path: &Path) -> Result<Event> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raw: Value = with_parse_context(serde_json::from_str(&json), "event payload")?;

        self.cache.import_raw(key, &raw)?;
        let event = self.cache.load_event(key)?;

        for division in &event.divisions {
            self.ratings.invalidate(division.id);
        }

        info!(
            "Imported event {} ({} divisions, {} matches)",
            key,
            event.divisions.len(),
            event.matches.len()
        );
        Ok(event)
    }

    pub fn run_predictions(
        &mut self,
        key: &str,
        division_id: DivisionId,
        options: &PredictionOptions,
    ) -> Result<(Division, Vec<Match>)> {
        info!("=== Predicting matches for {} / division {} ===", key, division_id);

        let event = self.load_event(key)?;
        let division = find_division(&event, division_id)?;
        let matches = event.matches_for(division_id);

        let settings = &self.config.engine;
        let ratings = self.ratings.get_or_compute(&division, &matches, settings)?;
        let predicted = predict::predict_matches(&division, Some(ratings), &matches, options, settings)?;

        Ok((division, predicted))
    }

    pub fn run_validation(&self, key: &str, opr_weight: f64, dpr_weight: f64) -> Result<EventValidation> {
        info!("=== Validating predictions for {} ===", key);

        let event = self.load_event(key)?;
        let validation = predict::validate_event(&event, &self.config.engine, opr_weight, dpr_weight);

        info!(
            "  → {}/{} winners picked correctly across {} divisions",
            validation.aggregate.correct,
            validation.aggregate.total,
            validation.divisions.len()
        );
        Ok(validation)
    }

    pub fn run_sweep(&self, key: &str) -> Result<WeightSweep> {
        info!("=== Sweeping prediction weights for {} ===", key);

        let event = self.load_event(key)?;
        let sweep = predict::sweep_weights(&event, &self.config.engine, &self.config.sweep)?;

        let (opr_weight, dpr_weight, accuracy) = sweep.best();
        info!(
            "  → Best weights: opr {:.2}, dpr {:.2} ({:.1}%)",
            opr_weight, dpr_weight, accuracy
        );
        Ok(sweep)
    }
}

pub fn find_division(event: &Event, division_id: DivisionId) -> Result<Division, EngineError> {
    event.division(division_id).cloned().ok_or_else(|| {
        EngineError::MissingData(format!("event {} has no division {}", event.sku, division_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(name: &str) -> ProcessingService {
        let dir = std::env::temp_dir().join(format!("division_ratings_service_{}_{}", name, std::process::id()));
        let config = AppConfig::new().with_cache_dir(Some(dir.to_string_lossy().into_owned()));
        ProcessingService::new(config).unwrap()
    }

    fn write_payload(name: &str) -> std::path::PathBuf {
        let raw = json!({
            "id": 9,
            "sku": "RE-SVC",
            "name": "Service Test",
            "divisions": [{ "id": 1, "name": "Science" }],
            "matches": [
                { "id": 1, "division": { "id": 1 }, "round": 2, "alliances": [
                    { "color": "red", "score": 40, "teams": [{ "team": { "id": 1, "name": "1A" } }, { "team": { "id": 2, "name": "2A" } }] },
                    { "color": "blue", "score": 20, "teams": [{ "team": { "id": 3, "name": "3A" } }] }
                ]},
                { "id": 2, "division": { "id": 1 }, "round": 2, "alliances": [
                    { "color": "red", "score": 50, "teams": [{ "team": { "id": 3, "name": "3A" } }, { "team": { "id": 1, "name": "1A" } }] },
                    { "color": "blue", "score": 10, "teams": [{ "team": { "id": 2, "name": "2A" } }] }
                ]},
                { "id": 3, "division": { "id": 1 }, "round": 2, "alliances": [
                    { "color": "red", "score": 0, "teams": [{ "team": { "id": 2, "name": "2A" } }, { "team": { "id": 3, "name": "3A" } }] },
                    { "color": "blue", "score": 0, "teams": [{ "team": { "id": 1, "name": "1A" } }] }
                ]}
            ]
        });

        let path = std::env::temp_dir().join(format!("division_ratings_payload_{}_{}.json", name, std::process::id()));
        std::fs::write(&path, raw.to_string()).unwrap();
        path
    }

    #[test]
    fn test_import_then_predict() {
        let mut service = service("predict");
        let payload = write_payload("predict");

        let event = service.import("RE-SVC", &payload).unwrap();
        assert_eq!(event.matches.len(), 3);

        let options = PredictionOptions::new().with_weights(1.0, 0.0);
        let (division, predicted) = service.run_predictions("RE-SVC", 1, &options).unwrap();

        assert_eq!(division.name, "Science");
        assert!(predicted[2].predicted);
        assert_eq!(predicted[2].predicted_red_score, 30);
        assert_eq!(predicted[2].predicted_blue_score, 30);

        std::fs::remove_file(payload).unwrap();
        service.cache.clear().unwrap();
    }

    #[test]
    fn test_validation_and_unknown_division() {
        let mut service = service("validate");
        let payload = write_payload("validate");
        service.import("RE-SVC", &payload).unwrap();

        let validation = service.run_validation("RE-SVC", 1.0, 0.0).unwrap();
        assert_eq!(validation.aggregate.total, 2);
        assert_eq!(validation.aggregate.correct, 2);

        let missing = service.run_predictions("RE-SVC", 99, &PredictionOptions::new());
        assert!(missing.is_err());

        std::fs::remove_file(payload).unwrap();
        service.cache.clear().unwrap();
    }
}
