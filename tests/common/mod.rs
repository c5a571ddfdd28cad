//! Shared test utilities for integration tests.
//!
//! This module provides a `TestClient` that drives the application router
//! against an in-memory database, simulating a browser session with a
//! cookie jar of exactly one session cookie. Methods are intentionally
//! broad to support various test scenarios across different test files.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::{middleware, Router};
use http_body_util::BodyExt;
use outlay::auth;
use outlay::config::Config;
use outlay::db::{create_in_memory_pool, migrations};
use outlay::handlers;
use outlay::state::AppState;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_cookies::CookieManagerLayer;

/// A test client holding the application state and the current session
/// cookie. Assign to `session` directly to switch between logged-in users.
pub struct TestClient {
    state: AppState,
    pub session: Option<String>,
}

impl TestClient {
    /// Create a new test client with a fresh in-memory database.
    pub fn new() -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }

        let config = Config {
            host: "127.0.0.1".into(),
            port: 5000,
            database_path: PathBuf::from(":memory:"),
            migrations_path: PathBuf::from("migrations"),
            static_path: PathBuf::from("static"),
        };

        Self {
            state: AppState::new(pool, config),
            session: None,
        }
    }

    /// The full router with auth middleware applied (mimics production).
    pub fn router(&self) -> Router {
        handlers::routes()
            .fallback(handlers::fallback)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::auth_middleware,
            ))
            .layer(CookieManagerLayer::new())
            .with_state(self.state.clone())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String, Option<String>) {
        let response = self.router().oneshot(request).await.unwrap();

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(';').next())
            .map(str::to_string);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string(), set_cookie)
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = &self.session {
            builder = builder.header(header::COOKIE, session.clone());
        }
        builder
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = self.builder("GET", uri).body(Body::empty()).unwrap();
        let (status, body, _) = self.send(request).await;
        (status, body)
    }

    /// Make a POST request with a JSON body and return status and body.
    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, String) {
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body, _) = self.send(request).await;
        (status, body)
    }

    /// Make a DELETE request and return status and body.
    pub async fn delete(&self, uri: &str) -> (StatusCode, String) {
        let request = self.builder("DELETE", uri).body(Body::empty()).unwrap();
        let (status, body, _) = self.send(request).await;
        (status, body)
    }

    /// Get JSON from an endpoint and parse it.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        let parsed = serde_json::from_str(&body).unwrap_or(Value::Null);
        (status, parsed)
    }

    // =========================================================================
    // Helper methods for driving the API
    // =========================================================================

    /// Register a user and return the response status.
    pub async fn register(&self, username: &str, password: &str) -> StatusCode {
        let (status, _) = self
            .post_json(
                "/api/register",
                &json!({"username": username, "password": password}),
            )
            .await;
        status
    }

    /// Log in and capture the session cookie for subsequent requests.
    pub async fn login(&mut self, username: &str, password: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": username, "password": password}).to_string(),
            ))
            .unwrap();
        let (status, _, set_cookie) = self.send(request).await;
        if status == StatusCode::OK {
            self.session = set_cookie;
        }
        status
    }

    /// Register a new user and log in as them.
    pub async fn signup(&mut self, username: &str, password: &str) {
        assert_eq!(self.register(username, password).await, StatusCode::CREATED);
        assert_eq!(self.login(username, password).await, StatusCode::OK);
    }

    /// Create an expense via POST and return success status.
    pub async fn create_expense(
        &self,
        date: &str,
        amount: f64,
        description: &str,
        category_id: i64,
    ) -> bool {
        let (status, _) = self
            .post_json(
                "/api/expenses",
                &json!({
                    "description": description,
                    "amount": amount,
                    "category_id": category_id,
                    "date": date,
                }),
            )
            .await;
        status == StatusCode::CREATED
    }

    /// Look up a seeded category id by name.
    pub async fn category_id(&self, name: &str) -> i64 {
        let (status, categories) = self.get_json("/api/categories").await;
        assert_eq!(status, StatusCode::OK);
        categories
            .as_array()
            .expect("categories array")
            .iter()
            .find(|c| c["name"] == name)
            .unwrap_or_else(|| panic!("category '{}' not seeded", name))["id"]
            .as_i64()
            .unwrap()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
