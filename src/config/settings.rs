use chrono::Duration;

const CACHE_DIR_ENV: &str = "CACHE_DIR";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub opr_weight: f64,
    pub dpr_weight: f64,
    /// How long after its start a match with no score is treated as played.
    pub completion_threshold: Duration,
    /// Singular values below `pinv_epsilon * max_singular_value` are treated as zero.
    pub pinv_epsilon: f64,
    pub svd_max_iterations: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            opr_weight: 0.5,
            dpr_weight: 0.5,
            completion_threshold: Duration::minutes(5),
            pinv_epsilon: 1e-9,
            svd_max_iterations: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub steps: usize,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self { steps: 11 } // 0.0, 0.1, ..., 1.0
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub cache_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            cache_dir: std::env::var(CACHE_DIR_ENV).unwrap_or_else(|_| "cache".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineSettings,
    pub sweep: SweepSettings,
    pub storage: StorageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            engine: EngineSettings::default(),
            sweep: SweepSettings::default(),
            storage: StorageSettings::default(),
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: Option<String>) -> Self {
        if let Some(dir) = cache_dir {
            self.storage.cache_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let settings = EngineSettings::default();

        assert_eq!(settings.opr_weight, 0.5);
        assert_eq!(settings.dpr_weight, 0.5);
        assert_eq!(settings.completion_threshold, Duration::minutes(5));
    }

    #[test]
    fn test_cache_dir_override() {
        let config = AppConfig::new().with_cache_dir(Some("/tmp/corpus".to_string()));
        assert_eq!(config.storage.cache_dir, "/tmp/corpus");

        let config = config.with_cache_dir(None);
        assert_eq!(config.storage.cache_dir, "/tmp/corpus");
    }
}
