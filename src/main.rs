use anyhow::Result;

use division_ratings::cli::{Cli, Command};
use division_ratings::config::AppConfig;
use division_ratings::{
    PredictArgs, handle_import, handle_predict, handle_ratings, handle_sweep, handle_validate, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(cli)
}

fn execute_command(cli: Cli) -> Result<()> {
    let config = AppConfig::new().with_cache_dir(cli.cache_dir);

    match cli.command {
        Command::Import { key, path } => handle_import(config, &key, &path),
        Command::Ratings { key, division, sort } => handle_ratings(config, &key, division, sort),
        Command::Predict {
            key,
            division,
            opr_weight,
            dpr_weight,
            completed,
            rounds,
        } => handle_predict(
            config,
            &key,
            PredictArgs {
                division,
                opr_weight,
                dpr_weight,
                completed,
                rounds,
            },
        ),
        Command::Validate {
            key,
            opr_weight,
            dpr_weight,
        } => handle_validate(config, &key, opr_weight, dpr_weight),
        Command::Sweep { key, steps } => handle_sweep(config, &key, steps),
    }
}
