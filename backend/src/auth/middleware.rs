//! Authentication middleware
//!
//! Verifies the `Authorization: Bearer <token>` header and binds the
//! verified identity to the request as a typed [`AuthUser`].
//!
//! Two rejection kinds reach the client:
//! - no usable credential: `401 UNAUTHENTICATED`
//! - credential present but bad signature, malformed or expired: `403 INVALID_TOKEN`

use crate::auth::JwtService;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use fruit_pilot_shared::AuthError;
use tracing::{debug, warn};
use uuid::Uuid;

/// Authenticated user bound to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Extract the raw token from a `Bearer` authorization header
///
/// A missing header, a non-UTF-8 value, another scheme or an empty token
/// all count as no credential supplied.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

/// Run the full gatekeeper check against a set of request headers
pub fn authenticate(jwt: &JwtService, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
    let result = bearer_token(headers).and_then(|token| {
        let claims = jwt.verify(token)?;
        Ok(AuthUser {
            user_id: claims.user_id()?,
            username: claims.username,
        })
    });

    match &result {
        Ok(user) => debug!(user_id = %user.user_id, "Request authenticated"),
        Err(AuthError::MissingToken) => debug!("Request without bearer token"),
        Err(kind) => warn!(kind = ?kind, "Bearer token rejected"),
    }

    result
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already verified by `require_auth` on this route
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let app_state = AppState::from_ref(state);
        Ok(authenticate(app_state.jwt(), &parts.headers)?)
    }
}

/// Route layer that rejects unauthenticated requests before the handler runs
///
/// Apply with `axum::middleware::from_fn_with_state(state, require_auth)`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(state.jwt(), request.headers())?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
