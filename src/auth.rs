//! Authentication middleware and handlers.
//!
//! Accounts are stored in the `users` table with Argon2id password hashes.
//! Session tokens are cryptographically random UUIDs, validated against a
//! server-side session store mapping token to user. Tokens are invalidated
//! on logout or server restart.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::db::queries::users;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Cookie name for the session token.
const SESSION_COOKIE: &str = "session";

/// The authenticated user for the current request, inserted into request
/// extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
    }
}

/// Request body for registration. Both fields are required; they are
/// optional here so the handler can reject missing fields with the API's
/// JSON error shape instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserInfo,
}

/// Authentication middleware guarding the JSON API.
///
/// Registration and login stay public, as do the health check and anything
/// outside `/api/` (the static frontend shell). Everything else requires a
/// valid session cookie; the matching user is attached to the request for
/// handlers to extract.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if !path.starts_with("/api/") || path == "/api/register" || path == "/api/login" {
        return next.run(request).await;
    }

    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        let user = state
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_cookie.value())
            .cloned();

        if let Some(user) = user {
            request.extensions_mut().insert(user);
            return next.run(request).await;
        }
    }

    AppError::Unauthorized("Authentication required".into()).into_response()
}

/// Handle user registration.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let (username, password) = credentials(body.username, body.password)?;

    let conn = state.db.get()?;

    if users::get_user_by_username(&conn, &username)?.is_some() {
        return Err(AppError::Validation("Username already exists".into()));
    }

    let password_hash = hash_password(&password)?;
    users::create_user(&conn, &username, &password_hash)?;

    tracing::info!(%username, "New user registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

/// Handle login and session creation.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (username, password) = credentials(body.username, body.password)?;

    let conn = state.db.get()?;
    let user = users::get_user_by_username(&conn, &username)?;

    let Some(user) = user.filter(|u| verify_password(&password, &u.password_hash)) else {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    // Generate a cryptographically random session token
    let session_token = Uuid::new_v4().to_string();
    state
        .sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(
            session_token.clone(),
            CurrentUser {
                id: user.id,
                username: user.username.clone(),
            },
        );

    let cookie = Cookie::build((SESSION_COOKIE, session_token))
        .path("/")
        .http_only(true)
        .same_site(tower_cookies::cookie::SameSite::Strict)
        .build();
    cookies.add(cookie);

    tracing::info!(username = %user.username, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        user: UserInfo {
            id: user.id,
            username: user.username,
        },
    }))
}

/// Handle logout: drop the server-side token and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
    cookies: Cookies,
) -> Json<MessageResponse> {
    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        state
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(session_cookie.value());
    }

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookies.remove(cookie);

    tracing::info!(username = %user.username, "User logged out");

    Json(MessageResponse {
        message: "Logged out successfully".into(),
    })
}

/// Validate and normalize a username/password pair from a request body.
/// Usernames are stored trimmed and lowercased.
fn credentials(
    username: Option<String>,
    password: Option<String>,
) -> AppResult<(String, String)> {
    let username = username
        .map(|u| u.trim().to_lowercase())
        .filter(|u| !u.is_empty());
    let password = password.filter(|p| !p.is_empty());

    match (username, password) {
        (Some(u), Some(p)) => Ok((u, p)),
        _ => Err(AppError::Validation(
            "Username and password required".into(),
        )),
    }
}

/// Hash a password with Argon2id and a fresh random salt.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against an Argon2 hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Invalid password hash in users table");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
