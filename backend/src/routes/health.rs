//! Probe endpoints for the process and its credential store

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Body shared by every probe
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_store: Option<StoreProbe>,
}

#[derive(Debug, Serialize)]
pub struct StoreProbe {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    fn bare(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            credential_store: None,
        }
    }
}

pub async fn health_check() -> Json<ProbeReport> {
    Json(ProbeReport::bare("healthy"))
}

pub async fn liveness_check() -> Json<ProbeReport> {
    Json(ProbeReport::bare("alive"))
}

/// 503 until the credential store answers
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ProbeReport>) {
    let store = match state.users().health_check().await {
        Ok(()) => StoreProbe {
            reachable: true,
            error: None,
        },
        Err(e) => StoreProbe {
            reachable: false,
            error: Some(e.to_string()),
        },
    };

    let (code, status) = if store.reachable {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    let report = ProbeReport {
        credential_store: Some(store),
        ..ProbeReport::bare(status)
    };
    (code, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, DatabaseConfig, JwtConfig, ServerConfig};
    use crate::repositories::{NewUser, StoreError, UserRecord, UserRepository};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Store whose every call fails
    struct DownStore;

    #[async_trait]
    impl UserRepository for DownStore {
        async fn create(&self, _: NewUser) -> Result<UserRecord, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
        async fn find_by_email(&self, _: &str) -> Result<Option<UserRecord>, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
        async fn find_by_id(&self, _: Uuid) -> Result<Option<UserRecord>, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
        async fn health_check(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
    }

    fn state_with(users: Arc<dyn UserRepository>) -> AppState {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: "memory://".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: SecretString::new("health-secret".to_string()),
                expiry_secs: 60,
            },
        };
        AppState::new(users, config)
    }

    #[tokio::test]
    async fn test_health_and_liveness() {
        assert_eq!(health_check().await.status, "healthy");
        assert_eq!(liveness_check().await.status, "alive");
        assert!(!health_check().await.version.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_not_ready() {
        let (code, Json(report)) = readiness_check(State(state_with(Arc::new(DownStore)))).await;

        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, "not_ready");
        let store = report.credential_store.unwrap();
        assert!(!store.reachable);
        assert!(store.error.is_some());
    }
}
