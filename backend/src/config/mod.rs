//! Configuration management for the Fruit Pilot auth backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: FP__)
//!
//! The signing secret and the credential-store URL have no defaults. A
//! process without them fails in [`AppConfig::load`] and never starts serving.

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::ConfigBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::env;
use tracing::warn;

/// Longest accepted token lifetime (one year)
pub const MAX_EXPIRY_SECS: i64 = 365 * 24 * 60 * 60;

/// Shortest signing secret accepted in production, in bytes
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Credential store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub expiry_secs: i64,
}

/// Backend selected by the scheme of `database.url`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl DatabaseConfig {
    /// Resolve which credential store the URL points at
    pub fn store_kind(&self) -> Result<StoreKind> {
        let scheme = self
            .url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or_default();

        match scheme {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            _ => bail!(
                "Unsupported database URL scheme '{}'. Use postgres:// or memory://",
                scheme
            ),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with FP__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let builder = Self::defaults()?
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (FP__ prefix)
            // e.g., FP__JWT__SECRET sets jwt.secret
            .add_source(config::Environment::with_prefix("FP").separator("__"));

        Self::from_builder(builder, env == "production")
    }

    /// Builder pre-populated with every optional setting
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000_i64)?
            .set_default("database.max_connections", 10_i64)?
            .set_default("jwt.expiry_secs", 3600_i64)?)
    }

    /// Build, deserialize and validate a layered configuration
    ///
    /// `production` enables the stricter deployment checks of [`AppConfig::validate`].
    pub fn from_builder(builder: ConfigBuilder<DefaultState>, production: bool) -> Result<Self> {
        let config: AppConfig = builder
            .build()?
            .try_deserialize()
            .context("Missing or malformed configuration (jwt.secret and database.url are required)")?;

        config.validate(production)?;
        Ok(config)
    }

    /// Reject configurations the server must not start with
    pub fn validate(&self, production: bool) -> Result<()> {
        let secret = self.jwt.secret.expose_secret();
        if secret.trim().is_empty() {
            bail!("jwt.secret must not be empty");
        }
        if self.jwt.expiry_secs <= 0 {
            bail!("jwt.expiry_secs must be positive");
        }
        if self.jwt.expiry_secs > MAX_EXPIRY_SECS {
            bail!("jwt.expiry_secs must be at most {}", MAX_EXPIRY_SECS);
        }
        if self.database.url.trim().is_empty() {
            bail!("database.url must not be empty");
        }
        let store = self.database.store_kind()?;

        if production {
            if secret.len() < MIN_PRODUCTION_SECRET_LEN || secret.contains("development") {
                bail!(
                    "jwt.secret must be at least {} bytes and not contain 'development' in production",
                    MIN_PRODUCTION_SECRET_LEN
                );
            }
            if store == StoreKind::Memory {
                bail!("In-memory credential store is not allowed in production");
            }
            if self.database.url.contains("localhost") || self.database.url.contains("127.0.0.1") {
                warn!("Database URL contains localhost - ensure this is intentional for production");
            }
        }
        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn load_toml(toml: &str) -> Result<AppConfig> {
        load_toml_for(toml, false)
    }

    fn load_toml_for(toml: &str, production: bool) -> Result<AppConfig> {
        AppConfig::from_builder(
            AppConfig::defaults()?.add_source(File::from_str(toml, FileFormat::Toml)),
            production,
        )
    }

    const PRODUCTION_SECRET: &str = "k7Qp2vXr9LmT4wZs8NbY3cHd6FjG1aEu";

    #[test]
    fn test_defaults_fill_optional_settings() {
        let config = load_toml(
            r#"
            [database]
            url = "memory://"
            [jwt]
            secret = "test-secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.expiry_secs, 3600);
        assert_eq!(config.database.store_kind().unwrap(), StoreKind::Memory);
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let result = load_toml(
            r#"
            [database]
            url = "memory://"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_secret_is_fatal() {
        let result = load_toml(
            r#"
            [database]
            url = "memory://"
            [jwt]
            secret = "   "
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        let result = load_toml(
            r#"
            [jwt]
            secret = "test-secret"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_store_scheme_is_fatal() {
        let result = load_toml(
            r#"
            [database]
            url = "mongodb://localhost:27017/fruit"
            [jwt]
            secret = "test-secret"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_non_positive_expiry_is_fatal() {
        let result = load_toml(
            r#"
            [database]
            url = "memory://"
            [jwt]
            secret = "test-secret"
            expiry_secs = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_expiry_upper_bound() {
        let at_limit = load_toml(&format!(
            r#"
            [database]
            url = "memory://"
            [jwt]
            secret = "test-secret"
            expiry_secs = {}
            "#,
            MAX_EXPIRY_SECS
        ));
        assert!(at_limit.is_ok());

        let huge = load_toml(
            r#"
            [database]
            url = "memory://"
            [jwt]
            secret = "test-secret"
            expiry_secs = 9223372036854775807
            "#,
        );
        assert!(huge.is_err());
    }

    #[test]
    fn test_production_accepts_strong_secret_and_postgres() {
        let config = load_toml_for(
            &format!(
                r#"
                [database]
                url = "postgres://fruit:pw@db.internal/fruit"
                [jwt]
                secret = "{}"
                "#,
                PRODUCTION_SECRET
            ),
            true,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_production_rejects_short_secret() {
        let toml = r#"
            [database]
            url = "postgres://fruit:pw@db.internal/fruit"
            [jwt]
            secret = "short-secret"
            "#;
        assert!(load_toml_for(toml, false).is_ok());
        assert!(load_toml_for(toml, true).is_err());
    }

    #[test]
    fn test_production_rejects_development_secret() {
        let result = load_toml_for(
            r#"
            [database]
            url = "postgres://fruit:pw@db.internal/fruit"
            [jwt]
            secret = "development-secret-that-is-long-enough-to-pass"
            "#,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_production_rejects_memory_store() {
        let toml = format!(
            r#"
            [database]
            url = "memory://"
            [jwt]
            secret = "{}"
            "#,
            PRODUCTION_SECRET
        );
        assert!(load_toml_for(&toml, false).is_ok());
        assert!(load_toml_for(&toml, true).is_err());
    }

    #[test]
    fn test_postgres_scheme_variants() {
        for url in ["postgres://u:p@localhost/db", "postgresql://localhost/db"] {
            let db = DatabaseConfig {
                url: url.to_string(),
                max_connections: 1,
            };
            assert_eq!(db.store_kind().unwrap(), StoreKind::Postgres);
        }
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = load_toml(
            r#"
            [database]
            url = "memory://"
            [jwt]
            secret = "super-sensitive-value"
            "#,
        )
        .unwrap();
        assert!(!format!("{:?}", config).contains("super-sensitive-value"));
    }

    #[test]
    fn test_is_production() {
        // Default should be false (development)
        assert!(!AppConfig::is_production());
    }
}
