pub mod cache;
pub mod incidence;
pub mod rankings;
pub mod solver;
pub mod types;

pub use cache::RatingCache;
pub use incidence::{IncidenceMatrix, build_incidence};
pub use rankings::{RankedTeam, RankingKey, rank_by};
pub use solver::calculate_team_performance_ratings;
pub use types::{RatingSet, TeamPerformanceRating};
