//! Configuration management for the alert bridge.
//!
//! Every value is resolved through a single key lookup so that the
//! environment and file-backed loaders parse identically. Missing
//! credentials are fatal at startup.

use crate::signing::{Credentials, SignatureScheme};
use crate::{Error, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub webhook: WebhookConfig,
}

/// Exchange connection settings.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Scheme and host of the futures API, without a trailing slash.
    pub base_url: String,
    /// Order-entry path appended to `base_url`.
    pub order_path: String,
    pub credentials: Credentials,
    /// Upper bound for a single order call, connect included.
    pub timeout: Duration,
    pub scheme: SignatureScheme,
}

impl ExchangeConfig {
    /// Default futures API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://fapi.bitunix.com";
    /// Default order-entry path.
    pub const DEFAULT_ORDER_PATH: &'static str = "/api/v1/futures/trade/place_order";
    /// Default per-call timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    /// Full URL of the order-entry endpoint.
    pub fn order_url(&self) -> String {
        format!("{}{}", self.base_url, self.order_path)
    }
}

/// Inbound webhook settings.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Shared secret every alert must carry in its `token` field.
    pub security_token: String,
    /// Number of recent alert ids remembered for duplicate suppression.
    pub dedup_capacity: usize,
}

impl WebhookConfig {
    pub const DEFAULT_DEDUP_CAPACITY: usize = 20;
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("security_token", &"[REDACTED]")
            .field("dedup_capacity", &self.dedup_capacity)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a file, with environment variables taking
    /// precedence. A missing file is not an error.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::default())
            .build()?;

        Self::from_lookup(|key| {
            settings
                .get_string(&key.to_lowercase())
                .or_else(|_| settings.get_string(key))
                .ok()
        })
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, "BITUNIX_API_KEY")?;
        let secret_key = required(&lookup, "BITUNIX_SECRET_KEY")?;
        let security_token = required(&lookup, "SECURITY_TOKEN")?;

        let base_url = parse_base_url(
            &lookup("BITUNIX_BASE_URL")
                .unwrap_or_else(|| ExchangeConfig::DEFAULT_BASE_URL.to_string()),
        )?;

        let order_path = lookup("BITUNIX_ORDER_PATH")
            .unwrap_or_else(|| ExchangeConfig::DEFAULT_ORDER_PATH.to_string());
        if !order_path.starts_with('/') {
            return Err(Error::config(format!(
                "BITUNIX_ORDER_PATH must start with '/', got {order_path}"
            )));
        }

        let timeout_ms: u64 = parse_or(&lookup, "BITUNIX_TIMEOUT_MS", ExchangeConfig::DEFAULT_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(Error::config("BITUNIX_TIMEOUT_MS must be greater than zero"));
        }

        let scheme: SignatureScheme =
            parse_or(&lookup, "BITUNIX_SIGNATURE_SCHEME", SignatureScheme::default())?;

        let dedup_capacity: usize = parse_or(
            &lookup,
            "ALERT_DEDUP_CAPACITY",
            WebhookConfig::DEFAULT_DEDUP_CAPACITY,
        )?;
        if dedup_capacity == 0 {
            return Err(Error::config("ALERT_DEDUP_CAPACITY must be greater than zero"));
        }

        Ok(Self {
            exchange: ExchangeConfig {
                base_url,
                order_path,
                credentials: Credentials::new(api_key, secret_key)?,
                timeout: Duration::from_millis(timeout_ms),
                scheme,
            },
            webhook: WebhookConfig {
                security_token,
                dedup_capacity,
            },
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(Error::config(format!("{key} environment variable not set"))),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("{key} has an invalid value: {raw}"))),
    }
}

fn parse_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::config(format!("BITUNIX_BASE_URL is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "BITUNIX_BASE_URL must use http or https, got {}",
            parsed.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
