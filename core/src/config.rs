// storefront_client/src/config.rs
use crate::api::RetryConfig;
use crate::error::{StorefrontError, StorefrontResult};
use crate::feed::FeedConfig;
use crate::payment::GatewaySettings;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
  pub api_base_url: String,
  pub request_timeout: Duration,
  pub retry: RetryConfig,
  pub feed: FeedConfig,
  pub gateway: GatewaySettings,
  pub session_store_path: PathBuf,
}

impl StorefrontConfig {
  pub fn new(api_base_url: impl Into<String>) -> Self {
    Self {
      api_base_url: api_base_url.into(),
      request_timeout: Duration::from_millis(10_000),
      retry: RetryConfig::default(),
      feed: FeedConfig::default(),
      gateway: GatewaySettings::default(),
      session_store_path: PathBuf::from(".storefront/session.json"),
    }
  }

  /// Reads the environment, after loading a `.env` file if one is present.
  pub fn from_env() -> StorefrontResult<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StorefrontResult<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let number = |name: &str, default: u64| -> StorefrontResult<u64> {
      match get(name) {
        Some(raw) => parse(name, &raw),
        None => Ok(default),
      }
    };

    let api_base_url = get("API_BASE_URL")
      .ok_or_else(|| StorefrontError::Config("Missing environment variable 'API_BASE_URL'".to_string()))?;
    let mut config = Self::new(api_base_url);

    config.request_timeout = Duration::from_millis(number("REQUEST_TIMEOUT_MS", 10_000)?);
    config.retry = RetryConfig {
      max_attempts: u32::try_from(number("RETRY_MAX_ATTEMPTS", 3)?)
        .map_err(|e| StorefrontError::Config(format!("Invalid RETRY_MAX_ATTEMPTS: {}", e)))?,
      base_delay: Duration::from_millis(number("RETRY_BASE_DELAY_MS", 1000)?),
    };
    config.feed = FeedConfig {
      max_retries: u32::try_from(number("FEED_MAX_RETRIES", 5)?)
        .map_err(|e| StorefrontError::Config(format!("Invalid FEED_MAX_RETRIES: {}", e)))?,
      base_delay: Duration::from_millis(number("FEED_BASE_DELAY_MS", 1000)?),
    };
    if let Some(currency) = get("CURRENCY") {
      config.gateway.currency = currency;
    }
    if let Some(name) = get("MERCHANT_NAME") {
      config.gateway.merchant_name = name;
    }
    if let Some(color) = get("THEME_COLOR") {
      config.gateway.theme_color = color;
    }
    if let Some(path) = get("SESSION_STORE_PATH") {
      config.session_store_path = PathBuf::from(path);
    }

    tracing::info!(api_base_url = %config.api_base_url, "Storefront configuration loaded.");
    Ok(config)
  }
}

fn parse<T: FromStr>(name: &str, raw: &str) -> StorefrontResult<T>
where
  T::Err: std::fmt::Display,
{
  raw
    .parse::<T>()
    .map_err(|e| StorefrontError::Config(format!("Invalid {}: {}", name, e)))
}
