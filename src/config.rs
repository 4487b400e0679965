use serde::Deserialize;

use crate::error::AppError;

pub const ID_VALUES_0: [&str; 3] = ["apples", "bananas", "cherries"];
pub const ID_VALUES_1: [&str; 3] = ["red", "green", "blue"];
pub const ID_VALUES_2: [&str; 3] = ["small", "medium", "large"];

pub const NUM_DISCRETE_FEATURES: usize = 50;
pub const NUM_CONTINUOUS_DERIVED_FEATURES: usize = 4;
pub const TOTAL_FEATURES: usize = NUM_DISCRETE_FEATURES + NUM_CONTINUOUS_DERIVED_FEATURES;

/// Standard deviation of the per-request coefficient noise.
pub const COEFFICIENT_STD_DEV: f64 = 0.5;

/// Triple and value used by the startup self-check.
pub const SELF_CHECK_IDS: [&str; 3] = ["apples", "red", "small"];
pub const SELF_CHECK_CONTINUOUS: f64 = 15.75;

/// Process settings, read from `PREDICT_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub self_check: bool,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let settings = ::config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("self_check", true)?
            .add_source(::config::Environment::with_prefix("PREDICT"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shape of the model: categorical domains, row width and noise level.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub domains: [Vec<String>; 3],
    pub discrete_features: usize,
    pub coefficient_std_dev: f64,
}

impl ModelConfig {
    pub fn reference() -> Self {
        let owned = |values: [&str; 3]| -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        };
        Self {
            domains: [owned(ID_VALUES_0), owned(ID_VALUES_1), owned(ID_VALUES_2)],
            discrete_features: NUM_DISCRETE_FEATURES,
            coefficient_std_dev: COEFFICIENT_STD_DEV,
        }
    }

    pub fn total_features(&self) -> usize {
        self.discrete_features + NUM_CONTINUOUS_DERIVED_FEATURES
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_model_shape() {
        let model = ModelConfig::reference();
        assert_eq!(model.total_features(), TOTAL_FEATURES);
        assert_eq!(model.total_features(), 54);
        assert!(model.domains.iter().all(|d| d.len() == 3));
        assert_eq!(model.domains[0][0], "apples");
    }

    #[test]
    fn test_bind_addr() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9000,
            self_check: false,
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }
}
