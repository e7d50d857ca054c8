pub mod settings;

pub use settings::{AppConfig, EngineSettings, StorageSettings, SweepSettings};
