//! Router fixtures over the in-memory stores.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use serde_json::Value;
use tower::ServiceExt;

use kripstanx_api::{AppState, build_router};
use kripstanx_auth::{PasswordHasher, provision_seed_users};
use kripstanx_core::config::{AppConfig, SeedUser, StoreProvider};
use kripstanx_database::{MemoryAuditEventRepository, MemoryUserRepository};

pub const SECRET: &str =
    "kripstanx-api-test-secret-kripstanx-api-test-secret-kripstanx-api-test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<MemoryUserRepository>,
    pub audit: Arc<MemoryAuditEventRepository>,
}

pub fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.provider = StoreProvider::Memory;
    config.auth.jwt_secret = SECRET.to_string();
    config
}

pub async fn app() -> TestApp {
    app_with(config()).await
}

pub async fn app_with(config: AppConfig) -> TestApp {
    let users = Arc::new(MemoryUserRepository::new());
    let audit = Arc::new(MemoryAuditEventRepository::new());

    let seeds = vec![
        seed("user", "user", &["ROLE_USER"]),
        seed("admin", "admin", &["ROLE_USER", "ROLE_ADMIN"]),
        seed("ops", "ops", &["ROLE_USER", "ROLE_TECHNICAL"]),
    ];
    provision_seed_users(users.as_ref(), &PasswordHasher::new(), &seeds)
        .await
        .unwrap();

    let state = AppState::new(config, users.clone(), audit.clone()).unwrap();
    TestApp {
        router: build_router(state.clone()),
        state,
        users,
        audit,
    }
}

fn seed(username: &str, password: &str, authorities: &[&str]) -> SeedUser {
    SeedUser {
        username: username.to_string(),
        password: password.to_string(),
        authorities: authorities.iter().map(|a| a.to_string()).collect(),
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.send(
            Request::post("/api/authenticate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Logs in and returns the issued token.
    pub async fn token(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status(), 200);
        json(response).await["id_token"].as_str().unwrap().to_string()
    }
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    with_token(Request::get(path), token)
}

pub fn post(path: &str, token: Option<&str>) -> Request<Body> {
    with_token(Request::post(path), token)
}

fn with_token(builder: axum::http::request::Builder, token: Option<&str>) -> Request<Body> {
    let builder = match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    };
    builder.body(Body::empty()).unwrap()
}

pub async fn json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
