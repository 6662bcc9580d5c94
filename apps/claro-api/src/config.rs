//! Application configuration loaded from environment variables.
//!
//! This module provides fail-fast configuration loading with validation.
//! Required variables must be present and valid, or the application will
//! exit with a clear error message. In particular the webhook signing
//! secret is required: without it the service refuses to start rather than
//! silently accepting unsigned provider events.

use std::env;
use thiserror::Error;

/// Application environment mode.
///
/// Controls security enforcement behavior:
/// - `Development`: insecure settings are allowed with WARN-level logging.
/// - `Production`: insecure settings cause the application to refuse startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Parse from the `APP_ENV` environment variable value.
    /// Defaults to `Development` if unset or unrecognized.
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => {
                tracing::warn!(
                    value = other,
                    "Unrecognized APP_ENV value, defaulting to Development"
                );
                Self::Development
            }
        }
    }

    /// Returns true if this is production mode.
    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Application environment (development or production).
    pub app_env: AppEnvironment,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Shared secret for verifying provider webhook signatures
    pub webhook_signing_secret: String,

    /// PEM-encoded RSA public key for verifying session JWTs
    pub session_jwt_public_key: String,

    /// Tracing filter directive (e.g., "info,claro=debug")
    pub rust_log: String,

    /// Allowed CORS origins (comma-separated URLs or "*" for development)
    pub cors_origins: Vec<String>,

    /// Server bind address
    pub host: String,

    /// Server listen port
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_env", &self.app_env)
            .field("database_url", &"[redacted]")
            .field("webhook_signing_secret", &"[redacted]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// are invalid (e.g., invalid port number).
    ///
    /// # Required Variables
    ///
    /// - `DATABASE_URL` - PostgreSQL connection string
    /// - `WEBHOOK_SIGNING_SECRET` - shared secret for webhook signatures
    /// - `SESSION_JWT_PUBLIC_KEY` - RSA public key (PEM format)
    ///
    /// # Optional Variables
    ///
    /// - `RUST_LOG` - Log level filter (default: "info")
    /// - `CORS_ORIGINS` - Comma-separated allowed origins (default: "*")
    /// - `HOST` - Bind address (default: "0.0.0.0")
    /// - `PORT` - Listen port (default: 8080)
    /// - `MAX_BODY_SIZE` - Request body limit in bytes (default: 1MB)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        let app_env = AppEnvironment::from_env_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        // Required variables
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let webhook_signing_secret = env::var("WEBHOOK_SIGNING_SECRET")
            .map_err(|_| ConfigError::MissingVar("WEBHOOK_SIGNING_SECRET".to_string()))?;
        if webhook_signing_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "WEBHOOK_SIGNING_SECRET".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        let session_jwt_public_key = env::var("SESSION_JWT_PUBLIC_KEY")
            .map_err(|_| ConfigError::MissingVar("SESSION_JWT_PUBLIC_KEY".to_string()))?;

        // Validate PEM format (basic check)
        if !session_jwt_public_key.contains("-----BEGIN") {
            return Err(ConfigError::InvalidValue {
                var: "SESSION_JWT_PUBLIC_KEY".to_string(),
                message: "Must be PEM format (should contain -----BEGIN)".to_string(),
            });
        }

        // Optional variables with defaults
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        let max_body_size = env::var("MAX_BODY_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1_048_576); // 1MB default

        Ok(Config {
            app_env,
            database_url,
            webhook_signing_secret,
            session_jwt_public_key,
            rust_log,
            cors_origins,
            host,
            port,
            max_body_size,
        })
    }

    /// Get the server bind address as a socket address string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate security configuration based on the application environment.
    ///
    /// In **production** mode: returns `Err(errors)` listing all insecure settings found.
    /// In **development** mode: returns `Ok(warnings)` listing all insecure settings found.
    ///
    /// This function checks:
    /// - `WEBHOOK_SIGNING_SECRET` has enough entropy to be a real secret
    /// - `CORS_ORIGINS` is not wildcard ("*") in production
    pub fn validate_security_config(&self) -> Result<Vec<String>, Vec<String>> {
        let mut issues = Vec::new();

        if self.webhook_signing_secret.len() < 16 {
            issues.push(
                "WEBHOOK_SIGNING_SECRET is shorter than 16 characters and is guessable"
                    .to_string(),
            );
        }

        if self.cors_origins.iter().any(|o| o == "*") {
            issues.push(
                "CORS_ORIGINS contains wildcard '*' which is not allowed in production".to_string(),
            );
        }

        if issues.is_empty() {
            return Ok(Vec::new());
        }

        if self.app_env.is_production() {
            Err(issues)
        } else {
            Ok(issues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PEM: &str = "-----BEGIN PUBLIC KEY-----\ntest\n-----END PUBLIC KEY-----";

    fn test_config() -> Config {
        Config {
            app_env: AppEnvironment::Production,
            database_url: "postgres://localhost/test".to_string(),
            webhook_signing_secret: "whsec_long_enough_secret_value".to_string(),
            session_jwt_public_key: TEST_PEM.to_string(),
            rust_log: "info".to_string(),
            cors_origins: vec!["https://app.example.com".to_string()],
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 1_048_576,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVar("WEBHOOK_SIGNING_SECRET".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: WEBHOOK_SIGNING_SECRET"
        );

        let err = ConfigError::InvalidValue {
            var: "PORT".to_string(),
            message: "Must be a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for PORT: Must be a number");
    }

    #[test]
    fn test_bind_addr() {
        let mut config = test_config();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_app_environment_parse() {
        assert_eq!(
            AppEnvironment::from_env_str("production"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("prod"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("dev"),
            AppEnvironment::Development
        );
        assert_eq!(
            AppEnvironment::from_env_str("staging"),
            AppEnvironment::Development
        );
        assert_eq!(AppEnvironment::from_env_str(""), AppEnvironment::Development);
    }

    #[test]
    fn test_app_environment_display() {
        assert_eq!(AppEnvironment::Development.to_string(), "development");
        assert_eq!(AppEnvironment::Production.to_string(), "production");
    }

    #[test]
    fn test_production_rejects_cors_wildcard() {
        let mut config = test_config();
        config.cors_origins = vec!["*".to_string()];

        let result = config.validate_security_config();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.contains("CORS_ORIGINS")));
    }

    #[test]
    fn test_production_rejects_short_webhook_secret() {
        let mut config = test_config();
        config.webhook_signing_secret = "short".to_string();

        let result = config.validate_security_config();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.contains("WEBHOOK_SIGNING_SECRET")));
    }

    #[test]
    fn test_development_allows_insecure_settings_with_warnings() {
        let mut config = test_config();
        config.app_env = AppEnvironment::Development;
        config.cors_origins = vec!["*".to_string()];
        config.webhook_signing_secret = "short".to_string();

        let result = config.validate_security_config();
        assert!(result.is_ok());
        let warnings = result.unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_production_passes_with_secure_config() {
        let config = test_config();
        let result = config.validate_security_config();
        assert!(result.is_ok());
        assert!(result.unwrap().is_empty());
    }
}
