//! Common test utilities for integration tests
//!
//! `TestApp` runs the full router against an in-memory credential store.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fruit_pilot_backend::{
    config::{AppConfig, DatabaseConfig, JwtConfig, ServerConfig},
    repositories::InMemoryUserRepository,
    routes,
    state::AppState,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application with an empty in-memory store
    pub fn new() -> Self {
        let state = AppState::new(Arc::new(InMemoryUserRepository::new()), test_config());
        let app = routes::create_router(state.clone());

        Self { app, state }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a GET request with a bearer token
    pub async fn get_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Sign up a user and return the issued token
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> String {
        let body = json!({
            "username": username,
            "email": email,
            "password": password
        });
        let (status, response) = self.post("/api/auth/signup", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", response);

        let response: Value = serde_json::from_str(&response).unwrap();
        response["token"].as_str().unwrap().to_string()
    }
}

pub fn test_config() -> AppConfig {
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
            secret: SecretString::new(TEST_SECRET.to_string()),
            expiry_secs: 3600,
        },
    }
}
