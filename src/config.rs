use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::new();

const ENV_PREFIX: &str = "SPEAK_";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_tts_url")]
    pub tts_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_tmp_path")]
    pub tmp_path: PathBuf,
}

fn default_tts_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_tmp_path() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .context("Failed to parse SPEAK_* environment variables")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

pub fn init() -> Result<()> {
    if CONFIG.set(Config::from_vars(std::env::vars())?).is_err() {
        return Err(anyhow!("Failed to set CONFIG"));
    }

    Ok(())
}

pub fn get() -> &'static Config {
    CONFIG.get().expect("config::init must run before config::get")
}
