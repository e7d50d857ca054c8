pub mod models;
pub mod parsers;

pub use models::*;
pub use parsers::{parse_event, parse_match};
