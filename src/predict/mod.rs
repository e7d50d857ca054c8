pub mod calibration;
pub mod predictor;
mod progress;
pub mod validator;

pub use calibration::{WeightSweep, sweep_weights};
pub use predictor::{PredictionOptions, predict_matches, predict_matches_at};
pub use validator::{DivisionValidation, EventValidation, ValidationReport, validate_event, validate_predictions};
