use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub db_host:              String,
    pub db_port:              u16,
    pub db_name:              String,
    pub db_user:              String,
    pub db_password:          String,

    // Backend
    pub backend_host:         String,
    pub backend_port:         u16,

    // Session
    #[allow(dead_code)]
    pub session_secret:       String,

    // Pricing
    pub base_hourly_rate:     f64,

    // Bootstrap admin definition, kept outside the relational store
    pub bootstrap_admin_path: String,

    // App
    pub app_env:              String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("Cannot access {0}")]
    Io(String, #[source] std::io::Error),
    #[error("Malformed bootstrap admin file {0}")]
    Malformed(String, #[source] serde_json::Error),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        fn require(key: &str) -> Result<String, ConfigError> {
            env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
        }

        fn parse_port(key: &str) -> Result<u16, ConfigError> {
            let raw = require(key)?;
            raw.parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw))
        }

        fn parse_rate(key: &str, default: f64) -> Result<f64, ConfigError> {
            match env::var(key) {
                Ok(raw) => raw
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw)),
                Err(_) => Ok(default),
            }
        }

        Ok(Self {
            db_host:      require("DB_HOST").unwrap_or_else(|_| "db".into()),
            db_port:      parse_port("DB_PORT").unwrap_or(3306),
            db_name:      require("DB_NAME")?,
            db_user:      require("DB_USER")?,
            db_password:  require("DB_PASSWORD")?,

            backend_host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            backend_port: parse_port("BACKEND_PORT").unwrap_or(8080),

            session_secret: require("SESSION_SECRET")?,

            base_hourly_rate: parse_rate("BASE_HOURLY_RATE", 15.0)?,

            bootstrap_admin_path: env::var("BOOTSTRAP_ADMIN_PATH")
                .unwrap_or_else(|_| "bootstrap_admin.json".into()),

            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
        })
    }

    #[allow(dead_code)]
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

// ── Bootstrap admin ───────────────────────────────────────────

/// Administrator account defined outside the relational store. Loaded once at
/// process start for seeding, reloaded and rewritten by the admin toggle
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email:    String,
    pub password: String,
    #[serde(default = "default_enabled")]
    pub enabled:  bool,
}

fn default_enabled() -> bool {
    true
}

impl BootstrapAdmin {
    /// Load the definition from `path`. A missing file means no bootstrap
    /// admin is configured, which is not an error.
    pub fn load(path: &str) -> Result<Option<Self>, ConfigError> {
        if !Path::new(path).exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_owned(), e))?;
        let admin =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Malformed(path.to_owned(), e))?;
        Ok(Some(admin))
    }

    /// Persist the definition back to `path`, pretty-printed so the file
    /// stays hand-editable.
    pub fn store(&self, path: &str) -> Result<(), ConfigError> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Malformed(path.to_owned(), e))?;
        fs::write(path, raw).map_err(|e| ConfigError::Io(path.to_owned(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_enabled_defaults_to_true() {
        let admin: BootstrapAdmin = serde_json::from_str(
            r#"{"username":"root","email":"root@example.com","password":"pw"}"#,
        )
        .unwrap();
        assert!(admin.enabled);
    }

    #[test]
    fn missing_file_means_no_bootstrap_admin() {
        let loaded = BootstrapAdmin::load("/nonexistent/bootstrap_admin.json").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootstrap_admin.json");
        let path = path.to_str().unwrap();

        let admin = BootstrapAdmin {
            username: "root".into(),
            email:    "root@example.com".into(),
            password: "pw".into(),
            enabled:  false,
        };
        admin.store(path).unwrap();

        let loaded = BootstrapAdmin::load(path).unwrap().unwrap();
        assert_eq!(loaded.username, "root");
        assert_eq!(loaded.email, "root@example.com");
        assert!(!loaded.enabled);
    }
}
