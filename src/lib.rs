pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod predict;
pub mod rating;
pub mod services;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::path::Path;

use crate::config::settings::AppConfig;
use crate::domain::{DivisionId, Round};
use crate::predict::PredictionOptions;
use crate::rating::{RankingKey, rank_by};
use crate::services::{ProcessingService, RatingService, report};

pub use crate::errors::EngineError;
pub use crate::predict::{predict_matches, validate_predictions};
pub use crate::rating::calculate_team_performance_ratings;

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn handle_import(config: AppConfig, key: &str, path: &Path) -> Result<()> {
    let mut service = ProcessingService::new(config)?;
    let event = service.import(key, path)?;
    println!(
        "Imported {} ({} divisions, {} matches)",
        event.name,
        event.divisions.len(),
        event.matches.len()
    );
    Ok(())
}

pub fn handle_ratings(config: AppConfig, key: &str, division: Option<DivisionId>, sort: RankingKey) -> Result<()> {
    let service = ProcessingService::new(config)?;
    let event = service.load_event(key)?;
    let rating_service = RatingService::new(service.config().engine.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    let results = runtime.block_on(rating_service.compute_event(&event, division));

    if results.is_empty() {
        anyhow::bail!("Event {} has no matching division", key);
    }

    for entry in results {
        match entry.ratings {
            Ok(ratings) => report::print_rankings(&entry.division, &rank_by(&ratings, sort), sort),
            Err(e) => report::print_unrated(&entry.division, &e.to_string()),
        }
    }
    Ok(())
}

pub struct PredictArgs {
    pub division: DivisionId,
    pub opr_weight: Option<f64>,
    pub dpr_weight: Option<f64>,
    pub completed: bool,
    pub rounds: Vec<Round>,
}

pub fn handle_predict(config: AppConfig, key: &str, args: PredictArgs) -> Result<()> {
    let mut service = ProcessingService::new(config)?;
    let engine = &service.config().engine;

    let mut options = PredictionOptions::from_settings(engine).with_completed(args.completed);
    options.opr_weight = args.opr_weight.unwrap_or(options.opr_weight);
    options.dpr_weight = args.dpr_weight.unwrap_or(options.dpr_weight);
    if !args.rounds.is_empty() {
        options = options.with_rounds(args.rounds);
    }

    let (division, predicted) = service.run_predictions(key, args.division, &options)?;
    report::print_predictions(&division, &predicted);
    Ok(())
}

pub fn handle_validate(config: AppConfig, key: &str, opr_weight: Option<f64>, dpr_weight: Option<f64>) -> Result<()> {
    let service = ProcessingService::new(config)?;
    let engine = &service.config().engine;
    let validation = service.run_validation(
        key,
        opr_weight.unwrap_or(engine.opr_weight),
        dpr_weight.unwrap_or(engine.dpr_weight),
    )?;

    report::print_validation(&validation);
    Ok(())
}

pub fn handle_sweep(mut config: AppConfig, key: &str, steps: Option<usize>) -> Result<()> {
    if let Some(steps) = steps {
        config.sweep.steps = steps;
    }

    let service = ProcessingService::new(config)?;
    let sweep = service.run_sweep(key)?;
    report::print_sweep(&sweep);
    Ok(())
}
