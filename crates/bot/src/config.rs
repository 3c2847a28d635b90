//! Runtime configuration.
//!
//! Settings come from two places: a JSON file holding the buyer profile,
//! watched products, and proxies, and environment variables (optionally via
//! `.env`) controlling pool behavior:
//!
//! - `REDCART_CONFIG_PATH` - path to the JSON file (default `redcart.json`)
//! - `REDCART_WORKER_COUNT` - pool size (default 3, must be nonzero)
//! - `REDCART_LIVE` - `1` enables live checkout, anything else dry-runs
//! - `REDCART_TASK_TIMEOUT_SECS` - per-task deadline (default 90)

use std::env;
use std::path::Path;
use std::time::Duration;

use redcart_core::{Profile, Proxy, TargetProduct};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "redcart.json";
const DEFAULT_WORKER_COUNT: usize = 3;
const DEFAULT_TASK_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// On-disk shape of the JSON config file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    profile: Profile,
    products: Vec<TargetProduct>,
    #[serde(default)]
    proxies: Vec<Proxy>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub worker_count: usize,
    pub live: bool,
    pub task_timeout: Duration,
    pub profile: Profile,
    pub products: Vec<TargetProduct>,
    pub proxies: Vec<Proxy>,
}

impl BotConfig {
    /// Load configuration from the environment and the JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment variable fails to parse, the
    /// config file cannot be read or parsed, or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing .env is fine; environment variables may be set directly.
        dotenvy::dotenv().ok();

        let path = env::var("REDCART_CONFIG_PATH")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = load_config_file(Path::new(&path))?;

        let worker_count = parse_env("REDCART_WORKER_COUNT", DEFAULT_WORKER_COUNT)?;
        if worker_count == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "REDCART_WORKER_COUNT".to_string(),
                "must be nonzero".to_string(),
            ));
        }

        let live = env::var("REDCART_LIVE").is_ok_and(|value| value == "1");
        let timeout_secs = parse_env("REDCART_TASK_TIMEOUT_SECS", DEFAULT_TASK_TIMEOUT_SECS)?;

        let config = Self {
            worker_count,
            live,
            task_timeout: Duration::from_secs(timeout_secs),
            profile: file.profile,
            products: file.products,
            proxies: file.proxies,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.products.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one product must be configured".to_string(),
            ));
        }
        if self.task_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "task timeout must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}

fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}
