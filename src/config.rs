use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlannerConfig {
    /// Shuffle seed for candidate pools, deterministic ordering when unset
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_scale")]
    pub default_scale: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            default_scale: default_scale(),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (WEEKMENU__PLANNER__SEED, etc.)
    /// 2. Config file specified by path, `CONFIG_PATH`, or config/default.toml
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("planner.default_scale", 1.0)?
            .set_default("observability.log_level", "info")?
            .set_default("observability.json", false)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // optional, ignored when missing
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("WEEKMENU")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let scale = self.planner.default_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(format!("Planner default_scale must be positive, got {scale}"));
        }
        if self.observability.log_level.trim().is_empty() {
            return Err("Observability log_level must not be empty".to_string());
        }
        Ok(())
    }
}
