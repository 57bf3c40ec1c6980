//! Application configuration loaded from environment variables.

use std::str::FromStr;

use domain::{DEFAULT_WRITE_ATTEMPTS, SubmitPolicy};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `pretty` or `json` (default: `pretty`)
/// - `DATABASE_URL` — PostgreSQL URL; unset keeps everything in memory
/// - `CART_WRITE_ATTEMPTS` — attempts per cart write on conflict (default: `5`)
/// - `SUBMIT_POLICY` — `retain` or `clear` the cart on submit (default: `retain`)
/// - `SEED_CATALOG` — register the demo items at startup (default: `true`)
///
/// Unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub cart_write_attempts: usize,
    pub submit_policy: SubmitPolicy,
    pub seed_catalog: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: parse_var(&lookup, "LOG_FORMAT").unwrap_or(defaults.log_format),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            cart_write_attempts: parse_var(&lookup, "CART_WRITE_ATTEMPTS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.cart_write_attempts),
            submit_policy: parse_var(&lookup, "SUBMIT_POLICY").unwrap_or(defaults.submit_policy),
            seed_catalog: lookup("SEED_CATALOG")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.seed_catalog),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            cart_write_attempts: DEFAULT_WRITE_ATTEMPTS,
            submit_policy: SubmitPolicy::RetainCart,
            seed_catalog: true,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
