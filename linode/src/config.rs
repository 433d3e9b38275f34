//! Client configuration read from the environment

use url::Url;

use crate::api::DEFAULT_ENDPOINT;

pub const API_KEY_VAR: &str = "LINODE_API_KEY";
pub const API_URL_VAR: &str = "LINODE_API_URL";
pub const DEBUG_VAR: &str = "LINODE_DEBUG";
pub const INSECURE_VAR: &str = "LINODE_INSECURE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("LINODE_API_KEY is required")]
    MissingApiKey,

    #[error("LINODE_API_URL is not a valid URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("{var} must be a boolean, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub endpoint: Url,
    pub debug: bool,
    pub insecure: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"***")
            .field("endpoint", &self.endpoint.as_str())
            .field("debug", &self.debug)
            .field("insecure", &self.insecure)
            .finish()
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: api_key.into(),
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            debug: false,
            insecure: false,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let endpoint = std::env::var(API_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            api_key,
            endpoint: Url::parse(&endpoint)?,
            debug: flag(DEBUG_VAR)?,
            insecure: flag(INSECURE_VAR)?,
        })
    }
}

fn flag(var: &'static str) -> Result<bool, ConfigError> {
    let Ok(value) = std::env::var(var) else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(ConfigError::InvalidFlag { var, value }),
    }
}
