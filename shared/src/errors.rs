//! Error types for the Fruit Pilot authentication flow

use thiserror::Error;

/// Authentication error types
///
/// `MissingToken` means the caller never presented a credential and should
/// log in. `InvalidToken` and `TokenExpired` mean a credential was presented
/// but cannot be trusted, so the caller has to re-authenticate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing token")]
    MissingToken,
}

impl AuthError {
    /// True for the "presented but rejected" kinds.
    pub fn is_token_rejection(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
