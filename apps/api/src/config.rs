// Application configuration
// Loaded from environment variables (optionally via a .env file)

use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Test,
    Production,
}

impl FromStr for AppEnv {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "test" => Ok(AppEnv::Test),
            "production" | "prod" => Ok(AppEnv::Production),
            _ => Err(()),
        }
    }
}

/// Runtime settings for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub app_env: AppEnv,
    pub log_level: Level,
    pub database_max_connections: u32,
}

impl AppConfig {
    /// Reads the configuration from the process environment
    ///
    /// # Variables
    /// * `DATABASE_URL` - required
    /// * `JWT_SECRET` - required
    /// * `PORT` - default 3000
    /// * `CORS_ORIGIN` - default `http://localhost:3001`
    /// * `APP_ENV` - default `development`
    /// * `LOG_LEVEL` - default `info`
    /// * `DATABASE_MAX_CONNECTIONS` - default 5
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            port: parse("PORT", or_default("PORT", "3000"))?,
            cors_origin: or_default("CORS_ORIGIN", "http://localhost:3001"),
            app_env: parse("APP_ENV", or_default("APP_ENV", "development"))?,
            log_level: parse("LOG_LEVEL", or_default("LOG_LEVEL", "info"))?,
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                or_default("DATABASE_MAX_CONNECTIONS", "5"),
            )?,
        })
    }

    /// Settings for tests and local runs without a database
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: String::new(),
            port: 0,
            cors_origin: "http://localhost:3001".to_string(),
            jwt_secret: jwt_secret.into(),
            app_env: AppEnv::Test,
            log_level: Level::WARN,
            database_max_connections: 1,
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
