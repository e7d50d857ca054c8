use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::Round;
use crate::rating::RankingKey;

#[derive(Parser, Debug)]
#[command(author, version, about = "Division OPR/DPR ratings and match predictions")]
pub struct Cli {
    /// Directory holding the match corpus cache (defaults to $CACHE_DIR or ./cache)
    #[arg(long, global = true)]
    pub cache_dir: Option<String>,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Store a raw event payload (JSON file) in the corpus cache
    Import {
        /// Cache key, usually the event SKU
        key: String,
        /// Path to the JSON payload
        path: PathBuf,
    },
    /// Show OPR/DPR/CCWM rankings for each division
    Ratings {
        key: String,
        /// Only this division
        #[arg(short, long)]
        division: Option<i64>,
        /// Ranking column
        #[arg(short, long, value_enum, default_value_t = RankingKey::Opr)]
        sort: RankingKey,
    },
    /// Predict scores of a division's matches
    Predict {
        key: String,
        #[arg(short, long)]
        division: i64,
        #[arg(long)]
        opr_weight: Option<f64>,
        #[arg(long)]
        dpr_weight: Option<f64>,
        /// Also re-predict matches that already have a result
        #[arg(long)]
        completed: bool,
        /// Restrict to these rounds (repeatable), e.g. qualification, finals
        #[arg(long = "round")]
        rounds: Vec<Round>,
    },
    /// Back-test predictions against played qualification matches
    Validate {
        key: String,
        #[arg(long)]
        opr_weight: Option<f64>,
        #[arg(long)]
        dpr_weight: Option<f64>,
    },
    /// Grid-search prediction weights by back-test accuracy
    Sweep {
        key: String,
        /// Grid points per axis
        #[arg(long)]
        steps: Option<usize>,
    },
}
