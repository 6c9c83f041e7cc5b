//! Server configuration, read from the environment once at start-up.
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `127.0.0.1` |
//! | `PORT` | `8080` |
//! | `ALLOWED_ORIGINS` | `http://localhost:5176` (comma-separated) |
//! | `DATABASE_QUERY_TIMEOUT` | `30000` (milliseconds) |
//! | `LABEL_STRATEGY` | `exact` (`exact` or `fuzzy`) |
//! | `RATE_LIMIT_PER_MINUTE` | `100` |
//! | `ACCIDENTS_CSV` | unset (comma-separated CSV paths to preload) |
//!
//! Unparseable values are logged and replaced with the default.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;

use traffic_accidents_database::StoreConfig;
use traffic_accidents_source::labels::LabelStrategy;

/// Origin allowed when `ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5176";

/// Requests per client IP per minute when `RATE_LIMIT_PER_MINUTE` is unset.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(100) {
    Some(n) => n,
    None => panic!("rate limit must be non-zero"),
};

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
    /// Store timeouts.
    pub store: StoreConfig,
    /// How stored type and category strings become display labels.
    pub label_strategy: LabelStrategy,
    /// Requests allowed per client IP per minute.
    pub rate_limit_per_minute: NonZeroU32,
    /// CSV exports loaded into the store at start-up.
    pub accidents_csv: Vec<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            store: StoreConfig::default(),
            label_strategy: LabelStrategy::default(),
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            accidents_csv: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value
    /// of a variable if it is set.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|v| split_list(&v))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        let accidents_csv = var("ACCIDENTS_CSV")
            .map(|v| split_list(&v).into_iter().map(PathBuf::from).collect())
            .unwrap_or_default();

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: var("PORT")
                .and_then(|v| parse_var("PORT", &v))
                .unwrap_or(defaults.port),
            allowed_origins,
            store: StoreConfig::with_timeout_ms(
                var("DATABASE_QUERY_TIMEOUT").and_then(|v| parse_var("DATABASE_QUERY_TIMEOUT", &v)),
            ),
            label_strategy: var("LABEL_STRATEGY")
                .and_then(|v| parse_var("LABEL_STRATEGY", &v))
                .unwrap_or(defaults.label_strategy),
            rate_limit_per_minute: var("RATE_LIMIT_PER_MINUTE")
                .and_then(|v| parse_var("RATE_LIMIT_PER_MINUTE", &v))
                .unwrap_or(defaults.rate_limit_per_minute),
            accidents_csv,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        log::warn!("Ignoring invalid {key}={value:?}, using default");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.store.query_timeout, Duration::from_secs(30));
        assert_eq!(config.allowed_origins, [DEFAULT_ALLOWED_ORIGIN]);
        assert_eq!(config.label_strategy, LabelStrategy::Exact);
        assert_eq!(config.rate_limit_per_minute.get(), 100);
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "3000"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("DATABASE_QUERY_TIMEOUT", "1500"),
            ("LABEL_STRATEGY", "Fuzzy"),
            ("RATE_LIMIT_PER_MINUTE", "10"),
            ("ACCIDENTS_CSV", "data/2023.csv,data/2024.csv"),
        ]);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.allowed_origins,
            ["https://a.example", "https://b.example"]
        );
        assert_eq!(config.store.query_timeout, Duration::from_millis(1500));
        assert_eq!(config.label_strategy, LabelStrategy::Fuzzy);
        assert_eq!(config.rate_limit_per_minute.get(), 10);
        assert_eq!(
            config.accidents_csv,
            [PathBuf::from("data/2023.csv"), PathBuf::from("data/2024.csv")]
        );
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config(&[
            ("PORT", "eighty"),
            ("DATABASE_QUERY_TIMEOUT", "-5"),
            ("LABEL_STRATEGY", "approximate"),
            ("RATE_LIMIT_PER_MINUTE", "0"),
            ("ALLOWED_ORIGINS", " , "),
        ]);
        assert_eq!(config, ServerConfig::default());
    }
}
