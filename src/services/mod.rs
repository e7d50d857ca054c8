pub mod processing;
pub mod ratings;
pub mod report;

pub use processing::ProcessingService;
pub use ratings::{DivisionRatings, RatingService};
