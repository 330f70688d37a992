//! Configuration management for the exporter.
//!
//! Loads credentials and endpoint hosts from environment variables, an optional
//! `.env` file and an optional `mexc.{toml,yaml,json}` config file.

use crate::exchange::{Credentials, ExchangeError};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Default host for the spot REST API.
pub const DEFAULT_SPOT_BASE_URL: &str = "https://api.mexc.co";
/// Default host for the futures (contract) REST API.
pub const DEFAULT_FUTURES_BASE_URL: &str = "https://contract.mexc.co";

/// Raw settings as read from the config sources.
///
/// Keys are flat: `MEXC_API_KEY` maps to `api_key`, `MEXC_FUTURES_API_SECRET`
/// to `futures_api_secret`, and so on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Settings {
    api_key: Option<String>,
    api_secret: Option<String>,
    futures_api_key: Option<String>,
    futures_api_secret: Option<String>,
    spot_base_url: Option<String>,
    futures_base_url: Option<String>,
}

/// Resolved configuration for one export run.
#[derive(Debug)]
pub struct Config {
    /// Spot credentials, if both key and secret were supplied
    pub spot: Option<Credentials>,
    /// Futures credentials, each half falling back to the spot value
    pub futures: Option<Credentials>,
    pub spot_base_url: String,
    pub futures_base_url: String,
}

impl Config {
    /// Load configuration from `.env`, an optional `mexc` config file and the
    /// process environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::build(None)
    }

    /// Load configuration from an explicit variable map instead of the process
    /// environment. The optional config file is still consulted.
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::build(Some(vars))
    }

    fn build(vars: Option<HashMap<String, String>>) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name("mexc").required(false))
            .add_source(config::Environment::with_prefix("MEXC").source(vars))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        let config = Self::resolve(settings);
        config.validate()?;
        Ok(config)
    }

    fn resolve(settings: Settings) -> Self {
        let api_key = non_empty(settings.api_key);
        let api_secret = non_empty(settings.api_secret);
        let futures_key = non_empty(settings.futures_api_key).or_else(|| api_key.clone());
        let futures_secret = non_empty(settings.futures_api_secret).or_else(|| api_secret.clone());

        Self {
            spot: pair(api_key, api_secret),
            futures: pair(futures_key, futures_secret),
            spot_base_url: non_empty(settings.spot_base_url)
                .unwrap_or_else(|| DEFAULT_SPOT_BASE_URL.to_string()),
            futures_base_url: non_empty(settings.futures_base_url)
                .unwrap_or_else(|| DEFAULT_FUTURES_BASE_URL.to_string()),
        }
    }

    /// Build a configuration with explicit credentials and default hosts.
    pub fn with_credentials(spot: Credentials, futures: Option<Credentials>) -> Self {
        Self {
            spot: Some(spot),
            futures,
            spot_base_url: DEFAULT_SPOT_BASE_URL.to_string(),
            futures_base_url: DEFAULT_FUTURES_BASE_URL.to_string(),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("spot_base_url", &self.spot_base_url),
            ("futures_base_url", &self.futures_base_url),
        ] {
            anyhow::ensure!(
                url.starts_with("http://") || url.starts_with("https://"),
                "{} must be an http(s) URL, got {}",
                name,
                url
            );
        }
        Ok(())
    }

    /// Spot credentials, or a configuration error naming the missing variables.
    pub fn spot_credentials(&self) -> Result<&Credentials, ExchangeError> {
        self.spot.as_ref().ok_or_else(|| {
            ExchangeError::Config("MEXC_API_KEY and MEXC_API_SECRET must be set".to_string())
        })
    }

    /// Futures credentials, or a configuration error naming the missing variables.
    pub fn futures_credentials(&self) -> Result<&Credentials, ExchangeError> {
        self.futures.as_ref().ok_or_else(|| {
            ExchangeError::Config(
                "MEXC_FUTURES_API_KEY / MEXC_FUTURES_API_SECRET (or MEXC_API_KEY / MEXC_API_SECRET) must be set"
                    .to_string(),
            )
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn pair(key: Option<String>, secret: Option<String>) -> Option<Credentials> {
    match (key, secret) {
        (Some(key), Some(secret)) => Some(Credentials::new(key, secret)),
        _ => None,
    }
}
