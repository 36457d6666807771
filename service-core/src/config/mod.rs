use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Process-level settings shared by every binary: listen port, log filter,
/// optional OTLP collector. Service-specific keys live in the service crate.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut loaded: Config = config.try_deserialize()?;
        if loaded
            .otlp_endpoint
            .as_deref()
            .is_some_and(|e| e.trim().is_empty())
        {
            loaded.otlp_endpoint = None;
        }
        Ok(loaded)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}
