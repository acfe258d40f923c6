//! services/api/src/web/directory.rs
//!
//! Pass-through CRUD endpoints for the directory entities assignments
//! reference: departments, employees and devices. No business logic
//! here beyond field mapping and the shared role checks.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::middleware::{authorize, AuthUser, ADMIN_ROLES, ANY_ROLE};
use crate::web::state::AppState;
use inventory_core::domain::{Device, DeviceType, Employee};
use inventory_core::ports::PortError;

#[derive(Deserialize)]
pub struct DepartmentPayload {
    pub name: String,
}

#[derive(Deserialize)]
pub struct EmployeePayload {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department_id: i64,
}

#[derive(Deserialize)]
pub struct DevicePayload {
    pub name: String,
    pub device_type: String,
    pub description: Option<String>,
}

impl EmployeePayload {
    fn into_domain(self) -> Employee {
        Employee {
            employee_id: 0,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            department_id: self.department_id,
        }
    }
}

impl DevicePayload {
    fn into_domain(self) -> Device {
        Device {
            device_id: 0,
            name: self.name,
            // Normalized through the closed device-type set.
            device_type: DeviceType::parse(&self.device_type).as_str().to_string(),
            description: self.description.unwrap_or_default(),
        }
    }
}

fn not_found(affected: u64, what: &str, id: i64) -> Result<(), ApiError> {
    if affected == 0 {
        Err(PortError::NotFound(format!("{what} {id}")).into())
    } else {
        Ok(())
    }
}

//=========================================================================================
// Departments
//=========================================================================================

pub async fn list_departments_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let departments = state.directory.list_departments().await?;
    Ok(Json(json!({ "departments": departments })))
}

pub async fn get_department_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let department = state.directory.get_department(id).await?;
    Ok(Json(json!({ "department": department })))
}

pub async fn create_department_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<DepartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let id = state.directory.insert_department(&req.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Department created successfully" })),
    ))
}

pub async fn update_department_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<DepartmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let affected = state.directory.update_department(id, &req.name).await?;
    not_found(affected, "Department", id)?;
    Ok(Json(json!({ "message": "Department updated successfully" })))
}

pub async fn delete_department_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ADMIN_ROLES).await?;
    let affected = state.directory.delete_department(id).await?;
    not_found(affected, "Department", id)?;
    Ok(Json(json!({ "message": "Department deleted successfully" })))
}

//=========================================================================================
// Employees
//=========================================================================================

pub async fn list_employees_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let employees = state.directory.list_employees().await?;
    Ok(Json(json!({ "employees": employees })))
}

pub async fn get_employee_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let employee = state.directory.get_employee(id).await?;
    Ok(Json(json!({ "employee": employee })))
}

pub async fn create_employee_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<EmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let id = state.directory.insert_employee(&req.into_domain()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Employee created successfully" })),
    ))
}

pub async fn update_employee_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<EmployeePayload>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let affected = state
        .directory
        .update_employee(id, &req.into_domain())
        .await?;
    not_found(affected, "Employee", id)?;
    Ok(Json(json!({ "message": "Employee updated successfully" })))
}

pub async fn delete_employee_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ADMIN_ROLES).await?;
    let affected = state.directory.delete_employee(id).await?;
    not_found(affected, "Employee", id)?;
    Ok(Json(json!({ "message": "Employee deleted successfully" })))
}

//=========================================================================================
// Devices
//=========================================================================================

pub async fn list_devices_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let devices = state.directory.list_devices().await?;
    Ok(Json(json!({ "devices": devices })))
}

pub async fn get_device_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let device = state.directory.get_device(id).await?;
    Ok(Json(json!({ "device": device })))
}

pub async fn create_device_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<DevicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let id = state.directory.insert_device(&req.into_domain()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Device created successfully" })),
    ))
}

pub async fn update_device_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<DevicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ANY_ROLE).await?;
    let affected = state.directory.update_device(id, &req.into_domain()).await?;
    not_found(affected, "Device", id)?;
    Ok(Json(json!({ "message": "Device updated successfully" })))
}

/// Deleting a device that an assignment still references fails with a
/// 400; the foreign key keeps assignment rows from being orphaned.
pub async fn delete_device_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, user.user_id, ADMIN_ROLES).await?;
    let affected = state.directory.delete_device(id).await?;
    not_found(affected, "Device", id)?;
    Ok(Json(json!({ "message": "Device deleted successfully" })))
}
