use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const URL_ENV: &str = "RECIPESHARE_SUPABASE_URL";
pub const ANON_KEY_ENV: &str = "RECIPESHARE_SUPABASE_ANON_KEY";

const REST_PATH: &str = "/rest/v1";

static CONFIG: OnceCell<ApiConfig> = OnceCell::new();

/// Where the hosted REST API lives and the public key it expects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    pub url: String,
    pub anon_key: String,
}

impl ApiConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self> {
        let url = url.into().trim_end_matches('/').to_string();
        let anon_key = anon_key.into();
        if url.is_empty() {
            return Err(Error::Config("api url is empty".to_string()));
        }
        if anon_key.is_empty() {
            return Err(Error::Config("anon key is empty".to_string()));
        }
        Ok(Self { url, anon_key })
    }

    /// Values baked in at build time; the browser has no environment to read.
    pub fn from_env() -> Result<Self> {
        let url = option_env!("RECIPESHARE_SUPABASE_URL")
            .ok_or_else(|| Error::Config(format!("{URL_ENV} was not set at build time")))?;
        let anon_key = option_env!("RECIPESHARE_SUPABASE_ANON_KEY")
            .ok_or_else(|| Error::Config(format!("{ANON_KEY_ENV} was not set at build time")))?;
        Self::new(url, anon_key)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: ApiConfig = serde_json::from_str(json)?;
        Self::new(raw.url, raw.anon_key)
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.url, REST_PATH, table)
    }
}

pub fn init_config(config: ApiConfig) {
    if CONFIG.get().is_some() {
        return;
    }
    if let Err(config) = CONFIG.set(config) {
        log::warn!("api config already initialized, ignoring {}", config.url);
    }
}

pub fn config() -> Result<&'static ApiConfig> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("api config is not initialized".to_string()))
}
