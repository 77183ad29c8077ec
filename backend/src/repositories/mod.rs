//! Credential store
//!
//! The store is an opaque collaborator behind [`UserRepository`]. Two
//! implementations ship with the backend:
//! - [`PgUserRepository`] for `postgres://` URLs
//! - [`InMemoryUserRepository`] for `memory://` URLs and tests

pub mod memory;
pub mod user;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryUserRepository;
pub use user::{PgUserRepository, UserRecord};

/// Store-level failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// Another record already owns this email
    #[error("Email already registered")]
    EmailTaken,

    /// Store unreachable or query failed
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Input for creating a user. `email` is expected in normalized form.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// User record persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; fails with [`StoreError::EmailTaken`] on a duplicate email
    async fn create(&self, new_user: NewUser) -> Result<UserRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// Cheap round trip used by the readiness probe
    async fn health_check(&self) -> Result<(), StoreError>;
}
