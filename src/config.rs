use serde::Deserialize;
use std::{env, fs, path::Path, path::PathBuf};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::shipping::{default_options, ShippingOption};

pub const DEFAULT_CONFIG_PATH: &str = "fee_calc.toml";
pub const CONFIG_PATH_ENV: &str = "FEE_CALC_CONFIG";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub shipping_options: Vec<ShippingOption>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("fee_calc.db"),
            shipping_options: default_options(),
        }
    }
}

impl AppConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.shipping_options.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one shipping option is required".to_string(),
            ));
        }
        let manual = self
            .shipping_options
            .iter()
            .filter(|o| o.is_manual())
            .count();
        if manual > 1 {
            return Err(ConfigError::Invalid(format!(
                "at most one manual shipping option is allowed, found {manual}"
            )));
        }
        Ok(self)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_ref.display().to_string(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path_ref.display().to_string(),
        source,
    })?;
    config.validate()
}

/// Reads the config named by `FEE_CALC_CONFIG` (or `fee_calc.toml`). A missing
/// file means defaults; a broken one is logged and also falls back to defaults.
pub fn load_app_configuration() -> AppConfig {
    let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if !Path::new(&path).exists() {
        info!("No config file at {}, using defaults", path);
        return AppConfig::default();
    }

    match load_config(&path) {
        Ok(config) => {
            info!("Loaded configuration from {}", path);
            config
        }
        Err(e) => {
            warn!("{}; using defaults", e);
            AppConfig::default()
        }
    }
}
