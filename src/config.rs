use std::path::PathBuf;

use anyhow::Context;
use twelf::{Layer, config};

use crate::domain::models::MarkReadPolicy;

const ENV_PREFIX: &str = "CTS_";
const CONFIG_PATH_VAR: &str = "CTS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[config]
#[derive(Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub tracker_api_key: String,
    #[serde(default)]
    pub tracker_base_url: String,
    /// Numeric id the configured tracker is stored under in the track table
    #[serde(default = "default_tracker_id")]
    pub tracker_id: i32,
    #[serde(default = "default_db_connection_string")]
    pub db_connection_string: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub mark_read_policy: MarkReadPolicy,
}

fn default_tracker_id() -> i32 {
    1
}

fn default_db_connection_string() -> String {
    "sqlite://db.sqlite?mode=rwc".into()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".into()
}

impl Config {
    /// Optional YAML file first, then `CTS_*` environment variables on top.
    pub fn load() -> anyhow::Result<Self> {
        let mut layers = Vec::new();
        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config file");
            layers.push(Layer::Yaml(path));
        }
        layers.push(Layer::Env(Some(ENV_PREFIX.to_string())));

        Config::with_layers(&layers).with_context(|| "Failed to load configuration")
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tracker_api_key.is_empty() {
            return Err("CTS_TRACKER_API_KEY is missing".into());
        }
        if self.tracker_base_url.is_empty() {
            return Err("CTS_TRACKER_BASE_URL is missing".into());
        }
        Ok(())
    }
}
