//! Configuration module for the portfolio configuration backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the admin routes (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of the human-readable format
    pub log_json: bool,
    /// How long a published configuration may be served from memory
    pub cache_ttl: Duration,
    /// Upper bound on a single draft save or publish
    pub store_timeout: Duration,
    /// Problems found while reading the environment, logged once logging is up
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut warnings = Vec::new();

        let api_psk = env::var("PORTFOLIO_API_PSK")
            .ok()
            .filter(|psk| !psk.trim().is_empty());

        let db_path = env::var("PORTFOLIO_DB_PATH")
            .unwrap_or_else(|_| "./data/portfolio.sqlite".to_string())
            .into();

        let bind_addr = env::var("PORTFOLIO_BIND_ADDR")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    warnings.push(format!("Ignoring invalid PORTFOLIO_BIND_ADDR {:?}", raw));
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let log_level = env::var("PORTFOLIO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("PORTFOLIO_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let cache_ttl = Duration::from_secs(secs_from_env(
            "PORTFOLIO_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        ));

        let store_timeout = Duration::from_secs(secs_from_env(
            "PORTFOLIO_STORE_TIMEOUT_SECS",
            DEFAULT_STORE_TIMEOUT_SECS,
        ));

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            log_json,
            cache_ttl,
            store_timeout,
            warnings,
        }
    }
}

fn secs_from_env(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("PORTFOLIO_API_PSK");
        env::remove_var("PORTFOLIO_DB_PATH");
        env::remove_var("PORTFOLIO_BIND_ADDR");
        env::remove_var("PORTFOLIO_LOG_LEVEL");
        env::remove_var("PORTFOLIO_LOG_FORMAT");
        env::remove_var("PORTFOLIO_CACHE_TTL_SECS");
        env::remove_var("PORTFOLIO_STORE_TIMEOUT_SECS");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/portfolio.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert!(config.warnings.is_empty());

        env::set_var("PORTFOLIO_BIND_ADDR", "localhost:eighty");
        let config = Config::from_env();
        env::remove_var("PORTFOLIO_BIND_ADDR");

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(
            config.warnings,
            vec![r#"Ignoring invalid PORTFOLIO_BIND_ADDR "localhost:eighty""#]
        );
    }

    #[test]
    fn test_secs_from_env_falls_back_on_garbage() {
        env::set_var("PORTFOLIO_TEST_SECS", "not-a-number");
        assert_eq!(secs_from_env("PORTFOLIO_TEST_SECS", 5), 5);
        env::set_var("PORTFOLIO_TEST_SECS", " 90 ");
        assert_eq!(secs_from_env("PORTFOLIO_TEST_SECS", 5), 90);
        env::remove_var("PORTFOLIO_TEST_SECS");
    }
}
