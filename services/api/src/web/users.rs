//! services/api/src/web/users.rs
//!
//! User administration endpoints: listing accounts and removing them.

use axum::{
    extract::{Extension, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::middleware::{authorize, AuthUser, ADMIN_ROLES, ANY_ROLE};
use crate::web::state::AppState;
use inventory_core::ports::PortError;

/// GET /users - every account with its role and (unused) security level.
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let users = state.users.list_users().await?;
    Ok(Json(users))
}

/// DELETE /users/{id} - destructive, so admin or super_admin only.
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ADMIN_ROLES).await?;
    let affected = state.users.delete_user(id).await?;
    if affected == 0 {
        return Err(PortError::NotFound(format!("User {id}")).into());
    }
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
