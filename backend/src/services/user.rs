//! User service: the credential issuer
//!
//! Signup and login both end in a freshly issued token. Login never reveals
//! whether the email or the password was wrong.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{NewUser, UserRecord, UserRepository};
use fruit_pilot_shared::validation::{
    normalize_email, validate_email, validate_password, validate_username,
};
use fruit_pilot_shared::{AuthError, AuthResponse, UserProfile};
use tracing::{info, warn};
use uuid::Uuid;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and issue their first token
    pub async fn signup(
        repo: &dyn UserRepository,
        jwt_service: &JwtService,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        validate_username(username).map_err(|msg| ApiError::validation("username", msg))?;

        let email = normalize_email(email);
        validate_email(&email).map_err(|msg| ApiError::validation("email", msg))?;
        validate_password(password).map_err(|msg| ApiError::validation("password", msg))?;

        if repo.email_exists(&email).await? {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = PasswordService::hash_async(password.to_string()).await?;

        // The store's unique constraint still guards against a concurrent signup
        let user = repo
            .create(NewUser {
                username: username.to_string(),
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Self::issue(jwt_service, &user)
    }

    /// Login with email and password
    pub async fn login(
        repo: &dyn UserRepository,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let email = normalize_email(email);

        let Some(user) = repo.find_by_email(&email).await? else {
            PasswordService::verify_dummy_async(password.to_string()).await;
            warn!("Login failed");
            return Err(AuthError::InvalidCredentials.into());
        };

        // Verify password on blocking thread pool (CPU-intensive)
        let valid =
            PasswordService::verify_async(password.to_string(), user.password_hash.clone())
                .await?;

        if !valid {
            warn!(user_id = %user.id, "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "User logged in");
        Self::issue(jwt_service, &user)
    }

    /// Get the profile of an authenticated user
    pub async fn get_profile(
        repo: &dyn UserRepository,
        user_id: Uuid,
    ) -> Result<UserProfile, ApiError> {
        let user = repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        })
    }

    fn issue(jwt_service: &JwtService, user: &UserRecord) -> Result<AuthResponse, ApiError> {
        let token = jwt_service.issue(user.id, &user.username)?;
        Ok(AuthResponse {
            token,
            username: user.username.clone(),
        })
    }
}
