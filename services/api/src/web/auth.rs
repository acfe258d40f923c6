//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration, login, and logout,
//! plus the idempotent bootstrap of the seed admin accounts.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::password::{hash_password, verify_password};
use crate::web::state::AppState;
use inventory_core::domain::Role;
use inventory_core::ports::{PortError, PortResult, UserStore};

/// Lifetime of a login session.
const SESSION_TTL_DAYS: i64 = 30;

// Well-known seed credentials. Deployment is expected to rotate these on
// first boot; they are kept verbatim so a fresh install is reachable.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";
const SUPERADMIN_USERNAME: &str = "superadmin";
const SUPERADMIN_PASSWORD: &str = "superadmin";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub role: String,
}

//=========================================================================================
// Bootstrap
//=========================================================================================

/// Inserts the default admin account unless one already exists.
pub async fn ensure_admin_exists(users: &dyn UserStore) -> PortResult<()> {
    ensure_seed_user(users, Role::Admin, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

/// Inserts the default super_admin account unless one already exists.
pub async fn ensure_superadmin_exists(users: &dyn UserStore) -> PortResult<()> {
    ensure_seed_user(users, Role::SuperAdmin, SUPERADMIN_USERNAME, SUPERADMIN_PASSWORD).await
}

async fn ensure_seed_user(
    users: &dyn UserStore,
    role: Role,
    username: &str,
    password: &str,
) -> PortResult<()> {
    if users.count_role(role).await? > 0 {
        return Ok(());
    }
    let digest = hash_password(password)?;
    users.insert_user(username, &digest, role).await?;
    info!(role = role.as_str(), "seeded default account");
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /register - Create a new user account (always role `intern`).
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered"),
        (status = 400, description = "Missing username or password")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (username, password) = match (req.username.as_deref(), req.password.as_deref()) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(PortError::Validation(
                "Username and password are required".to_string(),
            )
            .into())
        }
    };

    // No uniqueness pre-check: duplicate usernames are accepted and
    // resolve to the oldest row at login.
    let digest = hash_password(password)?;
    let user_id = state
        .users
        .insert_user(username, &digest, Role::Intern)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user_id": user_id, "message": "User registered!" })),
    ))
}

/// POST /login - Verify credentials and establish a session cookie.
///
/// Unknown username and wrong password produce the identical generic
/// failure, so the endpoint cannot be used to enumerate accounts.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "Invalid credentials" })),
        )
            .into_response()
    };

    let (username, password) = match (req.username.as_deref(), req.password.as_deref()) {
        (Some(u), Some(p)) => (u, p),
        _ => return Ok(invalid()),
    };

    let creds = match state.users.find_by_username(username).await? {
        Some(creds) => creds,
        None => return Ok(invalid()),
    };
    if !verify_password(&creds.password_hash, password)? {
        return Ok(invalid());
    }

    let session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    state
        .users
        .create_auth_session(&session_id, creds.user_id, expires_at)
        .await?;

    let cookie = format!(
        "session={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        session_id,
        Duration::days(SESSION_TTL_DAYS).num_seconds()
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            role: creds.role.as_str().to_string(),
        }),
    )
        .into_response())
}

/// POST /logout - Invalidate the current session.
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_cookie_value)
        .ok_or(PortError::Unauthorized)?;

    state.users.delete_auth_session(session_id).await?;

    let cookie = "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0";
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(json!({ "message": "Logged out" })),
    ))
}

/// Pulls the session token out of a `Cookie` header value.
pub fn session_cookie_value(cookie_header: &str) -> Option<&str> {
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix("session=")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_extracted_among_others() {
        let header = "theme=dark; session=abc-123; lang=en";
        assert_eq!(session_cookie_value(header), Some("abc-123"));
    }

    #[test]
    fn missing_session_cookie_is_none() {
        assert_eq!(session_cookie_value("theme=dark"), None);
    }
}
