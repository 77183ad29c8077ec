//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Everything in here is built once at startup from an explicit
//! [`AppConfig`] and is read-only while requests are served.

use crate::auth::JwtService;
use crate::config::AppConfig;
use crate::repositories::UserRepository;
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Shared application state
///
/// All fields are reference counted, so cloning per request is O(1).
#[derive(Clone)]
pub struct AppState {
    /// Credential store
    pub users: Arc<dyn UserRepository>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
}

impl AppState {
    /// Create a new application state
    ///
    /// Derives the JWT keys from the configured secret. Call once at startup.
    pub fn new(users: Arc<dyn UserRepository>, config: AppConfig) -> Self {
        let jwt = JwtService::new(config.jwt.secret.expose_secret(), config.jwt.expiry_secs);

        Self {
            users,
            config: Arc::new(config),
            jwt,
        }
    }

    /// Get a reference to the credential store
    #[inline]
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, JwtConfig, ServerConfig};
    use crate::repositories::InMemoryUserRepository;
    use secrecy::SecretString;

    fn test_config(secret: &str) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: "memory://".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: SecretString::new(secret.to_string()),
                expiry_secs: 60,
            },
        }
    }

    #[test]
    fn test_jwt_service_uses_configured_secret() {
        let state = AppState::new(
            Arc::new(InMemoryUserRepository::new()),
            test_config("state-secret"),
        );

        let user_id = uuid::Uuid::new_v4();
        let token = state.jwt().issue(user_id, "alice").unwrap();

        let same_secret = JwtService::new("state-secret", 60);
        assert!(same_secret.verify(&token).is_ok());
        assert_eq!(state.jwt().expiry_secs(), 60);
    }

    #[test]
    fn test_state_clone_shares_resources() {
        let state = AppState::new(
            Arc::new(InMemoryUserRepository::new()),
            test_config("state-secret"),
        );
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.users, &cloned.users));
    }
}
