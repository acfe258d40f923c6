//! services/api/src/web/middleware.rs
//!
//! Authentication middleware and the role allow-list check consulted
//! before mutating operations.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::error::ApiError;
use crate::web::auth::session_cookie_value;
use crate::web::state::AppState;
use inventory_core::domain::Role;
use inventory_core::ports::PortError;

/// Roles allowed to read and perform non-destructive mutations.
pub const ANY_ROLE: &[Role] = &[Role::Intern, Role::Admin, Role::SuperAdmin];
/// Roles allowed to delete.
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

/// The authenticated caller, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Middleware that validates the auth session cookie and extracts the user id.
///
/// If valid, inserts an [`AuthUser`] into request extensions for handlers to use.
/// If invalid, missing, or expired, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let session_id = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_cookie_value)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .users
        .validate_auth_session(session_id)
        .await
        .map_err(|e| {
            error!("failed to validate auth session: {e}");
            StatusCode::UNAUTHORIZED
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(req).await)
}

/// Allow-list authorization: re-derives the caller's current role from
/// the store (never from the session) and checks membership. The stored
/// security level plays no part in this decision.
pub async fn authorize(
    state: &AppState,
    user_id: i64,
    allowed: &[Role],
) -> Result<(), ApiError> {
    let role = state
        .users
        .user_role(user_id)
        .await?
        .ok_or(PortError::Unauthorized)?;
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(PortError::Unauthorized.into())
    }
}
