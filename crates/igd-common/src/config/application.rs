use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

const DEFAULT_CONFIG: &str = include_str!("default.toml");

const ENV_PREFIX: &str = "IGD__";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub training: TrainingConfig,
    pub store: StoreConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Loads the configuration from the embedded defaults, overridden by
    /// environment variables such as `IGD__TRAINING__LEARNING_RATE`.
    pub fn load() -> CommonResult<Self> {
        Self::extract(Self::figment())
    }

    /// The embedded defaults merged with the environment, for callers that
    /// layer further overrides before extraction.
    pub fn figment() -> Figment {
        Self::default_figment()
            .admerge(Env::prefixed(ENV_PREFIX).map(|p| p.as_str().replace("__", ".").into()))
    }

    /// Loads the embedded defaults only.
    pub fn defaults() -> CommonResult<Self> {
        Self::extract(Self::default_figment())
    }

    pub fn default_figment() -> Figment {
        Figment::from(Toml::string(DEFAULT_CONFIG))
    }

    pub fn extract(figment: Figment) -> CommonResult<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| CommonError::InvalidArgument(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CommonResult<()> {
        let training = &self.training;
        if !training.learning_rate.is_finite() || training.learning_rate <= 0.0 {
            return Err(CommonError::invalid(format!(
                "learning rate must be a positive number: {}",
                training.learning_rate
            )));
        }
        if matches!(training.strategy, StrategyKind::Reservoir) && training.reservoir_size == 0 {
            return Err(CommonError::invalid("reservoir size must be positive"));
        }
        if self.store.batch_size == 0 {
            return Err(CommonError::invalid("store batch size must be positive"));
        }
        if self.store.bias_column.is_empty() {
            return Err(CommonError::missing("store bias column"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub max_passes: usize,
    pub strategy: StrategyKind,
    pub reservoir_size: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    FullBatch,
    Reservoir,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub batch_size: usize,
    pub pass_mode: PassModeKind,
    pub bias_column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassModeKind {
    Aggregate,
    Cursor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub default_log_filter: String,
}

#[cfg(test)]
mod tests {
    use figment::providers::Serialized;

    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_default_config() {
        let config = AppConfig::defaults().unwrap();
        assert_eq!(config.training.learning_rate, 0.01);
        assert_eq!(config.training.max_passes, 1500);
        assert_eq!(config.training.strategy, StrategyKind::FullBatch);
        assert_eq!(config.training.reservoir_size, 100);
        assert_eq!(config.store.pass_mode, PassModeKind::Aggregate);
        assert_eq!(config.store.bias_column, "intercept");
        assert_eq!(config.telemetry.default_log_filter, "info");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_override_config() {
        let figment = AppConfig::default_figment()
            .merge(Serialized::default("training.strategy", "reservoir"))
            .merge(Serialized::default("training.max_passes", 650))
            .merge(Serialized::default("store.pass_mode", "cursor"));
        let config = AppConfig::extract(figment).unwrap();
        assert_eq!(config.training.strategy, StrategyKind::Reservoir);
        assert_eq!(config.training.max_passes, 650);
        assert_eq!(config.store.pass_mode, PassModeKind::Cursor);
    }

    #[test]
    fn test_env_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("IGD__TRAINING__LEARNING_RATE", 0.5);
            jail.set_env("IGD__TRAINING__STRATEGY", "reservoir");
            jail.set_env("IGD__STORE__PASS_MODE", "cursor");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.training.learning_rate, 0.5);
            assert_eq!(config.training.strategy, StrategyKind::Reservoir);
            assert_eq!(config.store.pass_mode, PassModeKind::Cursor);
            assert_eq!(config.training.max_passes, 1500);
            assert_eq!(config.store.bias_column, "intercept");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_env_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("IGD__TRAINING__LEARNING_RATE", -1.0);
            assert!(matches!(
                AppConfig::load(),
                Err(CommonError::InvalidArgument(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_config() {
        let figment =
            AppConfig::default_figment().merge(Serialized::default("training.learning_rate", 0.0));
        assert!(matches!(
            AppConfig::extract(figment),
            Err(CommonError::InvalidArgument(_))
        ));

        let figment = AppConfig::default_figment()
            .merge(Serialized::default("training.strategy", "reservoir"))
            .merge(Serialized::default("training.reservoir_size", 0));
        assert!(AppConfig::extract(figment).is_err());

        let figment =
            AppConfig::default_figment().merge(Serialized::default("training.strategy", "adam"));
        assert!(AppConfig::extract(figment).is_err());
    }
}
