//! services/api/src/web/assignments.rs
//!
//! Axum handlers for the inventory-assignment endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;
use crate::web::middleware::{authorize, AuthUser, ADMIN_ROLES, ANY_ROLE};
use crate::web::state::AppState;
use inventory_core::domain::{AssignmentFilter, CreateAssignment, UpdateAssignment};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_assignments_handler,
        get_assignment_handler,
        create_assignment_handler,
        update_assignment_handler,
        delete_assignment_handler,
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
    ),
    components(
        schemas(
            CreateAssignmentRequest,
            UpdateAssignmentRequest,
            crate::web::auth::RegisterRequest,
            crate::web::auth::LoginRequest,
            crate::web::auth::LoginResponse,
        )
    ),
    tags(
        (name = "Inventory API", description = "Device assignment tracking endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    pub device_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAssignmentRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Optional equality filters; an empty parameter counts as absent.
#[derive(Deserialize, Default)]
pub struct AssignmentSearchQuery {
    pub employee_name: Option<String>,
    pub department_name: Option<String>,
    pub device_type: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AssignmentSearchQuery {
    fn into_filter(self) -> AssignmentFilter {
        AssignmentFilter {
            employee_name: non_empty(self.employee_name),
            department_name: non_empty(self.department_name),
            device_type: non_empty(self.device_type),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List assignments, optionally filtered by exact employee name,
/// department name and device type (AND-combined).
#[utoipa::path(
    get,
    path = "/assignments",
    params(
        ("employee_name" = Option<String>, Query, description = "Exact employee full name"),
        ("department_name" = Option<String>, Query, description = "Exact department name"),
        ("device_type" = Option<String>, Query, description = "Exact device type")
    ),
    responses(
        (status = 200, description = "Assignments with joined display names"),
        (status = 403, description = "Unauthorized")
    )
)]
pub async fn list_assignments_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AssignmentSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let assignments = state.assignments.search(&query.into_filter()).await?;
    Ok(Json(json!({ "assignments": assignments })))
}

/// Fetch a single assignment by id.
#[utoipa::path(
    get,
    path = "/assignments/{id}",
    params(("id" = i64, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "The assignment"),
        (status = 404, description = "No such assignment")
    )
)]
pub async fn get_assignment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let assignment = state.assignments.get(id).await?;
    Ok(Json(json!({ "assignment": assignment })))
}

/// Assign a device to an employee.
#[utoipa::path(
    post,
    path = "/assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created"),
        (status = 400, description = "Missing required field or dangling reference")
    )
)]
pub async fn create_assignment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let id = state
        .assignments
        .create(CreateAssignment {
            device_id: req.device_id,
            employee_id: req.employee_id,
            status: req.status,
            notes: req.notes,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Inventory assignment created successfully" })),
    ))
}

/// Update an assignment's status and notes. Omitting `notes` resets it
/// to the empty string.
#[utoipa::path(
    put,
    path = "/assignments/{id}",
    request_body = UpdateAssignmentRequest,
    params(("id" = i64, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment updated"),
        (status = 400, description = "Missing status"),
        (status = 404, description = "No such assignment")
    )
)]
pub async fn update_assignment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAssignmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    state
        .assignments
        .update(
            id,
            UpdateAssignment {
                status: req.status,
                notes: req.notes,
            },
        )
        .await?;
    Ok(Json(json!({ "message": "Inventory assignment updated successfully" })))
}

/// Remove an assignment. Destructive, so admin or super_admin only.
#[utoipa::path(
    delete,
    path = "/assignments/{id}",
    params(("id" = i64, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment deleted"),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "No such assignment")
    )
)]
pub async fn delete_assignment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ADMIN_ROLES).await?;
    state.assignments.delete(id).await?;
    Ok(Json(json!({ "message": "Inventory assignment deleted successfully" })))
}
