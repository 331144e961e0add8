//! Configuration module for the Learnpath backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Gemini API key; generation endpoints answer 503 without it
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Upper bound for a single generation round-trip
    pub generation_timeout: Duration,
    /// Clerk Backend API secret key (profile lookups)
    pub clerk_secret_key: Option<String>,
    /// PEM-encoded public key used to verify Clerk session tokens
    pub clerk_jwt_key: Option<String>,
    pub clerk_api_url: String,
    /// Svix signing secret for the Clerk webhook (`whsec_...`)
    pub clerk_webhook_secret: Option<String>,
    /// Insert the starter catalog on boot when no public course exists
    pub seed_catalog: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("LEARNPATH_DB_PATH")
            .unwrap_or_else(|_| "./data/learnpath.sqlite".to_string())
            .into();

        let index_path = env::var("LEARNPATH_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let bind_addr = env::var("LEARNPATH_BIND_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let log_level = env::var("LEARNPATH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let generation_timeout = env::var("LEARNPATH_GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(120));

        let seed_catalog = env::var("LEARNPATH_SEED_CATALOG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            db_path,
            index_path,
            bind_addr,
            log_level,
            gemini_api_key: non_empty_var("LEARNPATH_GEMINI_API_KEY"),
            gemini_model: env::var("LEARNPATH_GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            gemini_base_url: env::var("LEARNPATH_GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            generation_timeout,
            clerk_secret_key: non_empty_var("LEARNPATH_CLERK_SECRET_KEY"),
            clerk_jwt_key: non_empty_var("LEARNPATH_CLERK_JWT_KEY"),
            clerk_api_url: env::var("LEARNPATH_CLERK_API_URL")
                .unwrap_or_else(|_| "https://api.clerk.com/v1".to_string()),
            clerk_webhook_secret: non_empty_var("LEARNPATH_CLERK_WEBHOOK_SECRET"),
            seed_catalog,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        for key in [
            "LEARNPATH_DB_PATH",
            "LEARNPATH_INDEX_PATH",
            "LEARNPATH_BIND_ADDR",
            "LEARNPATH_LOG_LEVEL",
            "LEARNPATH_GEMINI_API_KEY",
            "LEARNPATH_GENERATION_TIMEOUT_SECS",
            "LEARNPATH_CLERK_JWT_KEY",
            "LEARNPATH_SEED_CATALOG",
        ] {
            env::remove_var(key);
        }

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/learnpath.sqlite"));
        assert_eq!(config.index_path, PathBuf::from("./data/index"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.gemini_api_key.is_none());
        assert!(config.clerk_jwt_key.is_none());
        assert_eq!(config.generation_timeout, Duration::from_secs(120));
        assert!(!config.seed_catalog);
    }
}
