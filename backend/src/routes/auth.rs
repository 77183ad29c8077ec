//! Authentication routes
//!
//! Signup and login issue tokens; `/me` sits behind the gatekeeper layer.
//!
//! - `POST /api/auth/signup` returns `201 { token, username }`
//! - `POST /api/auth/login` returns `200 { token, username }`
//! - `GET  /api/auth/me` returns the caller's profile

use crate::auth::{require_auth, AuthUser};
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use fruit_pilot_shared::types::{AuthResponse, LoginRequest, SignupRequest, UserProfile};

/// Create auth routes
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(get_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .merge(protected)
}

/// Register a new user
///
/// POST /api/auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = UserService::signup(
        state.users(),
        state.jwt(),
        &req.username,
        &req.email,
        &req.password,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
///
/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = UserService::login(state.users(), state.jwt(), &req.email, &req.password).await?;
    Ok(Json(response))
}

/// Get current user profile
///
/// GET /api/auth/me
async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::get_profile(state.users(), auth_user.user_id).await?;
    Ok(Json(profile))
}
