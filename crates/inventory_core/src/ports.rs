//! crates/inventory_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AssignmentFilter, AssignmentView, Department, Device, Employee, NewAssignment, Role,
    UserAccount, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database),
/// and carries enough shape for the HTTP layer to pick a status code.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A required input was absent or empty.
    #[error("{0}")]
    Validation(String),
    /// A referenced row (device/employee) does not exist.
    #[error("{0}")]
    MissingReference(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

/// Persistence operations for assignment rows and the joined read view.
///
/// Every method is a single short-lived statement against the store;
/// there is no multi-statement transaction spanning a call boundary.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn list(&self) -> PortResult<Vec<AssignmentView>>;

    /// Single-row lookup; `NotFound` when no row matches.
    async fn get(&self, inventory_id: i64) -> PortResult<AssignmentView>;

    /// Exact-equality filters, AND-combined; absent filters impose nothing.
    async fn search(&self, filter: &AssignmentFilter) -> PortResult<Vec<AssignmentView>>;

    /// Inserts a row and returns its new id. The store's foreign-key
    /// constraints enforce that device and employee exist; a violation
    /// surfaces as `MissingReference`.
    async fn insert(&self, new: &NewAssignment) -> PortResult<i64>;

    /// Updates status and notes, returning the number of rows affected.
    async fn update(&self, inventory_id: i64, status: &str, notes: &str) -> PortResult<u64>;

    /// Physical delete, returning the number of rows affected.
    async fn delete(&self, inventory_id: i64) -> PortResult<u64>;

    /// Display name of a device, for notification messages.
    async fn device_name(&self, device_id: i64) -> PortResult<String>;
}

/// Persistence operations for user accounts and auth sessions.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> PortResult<i64>;

    /// First row matching the username, if any. Usernames are not
    /// required to be unique; duplicates resolve to the oldest row.
    async fn find_by_username(&self, username: &str) -> PortResult<Option<UserCredentials>>;

    /// Re-derives the caller's current role from the store. `None` when
    /// the user row no longer exists.
    async fn user_role(&self, user_id: i64) -> PortResult<Option<Role>>;

    async fn list_users(&self) -> PortResult<Vec<UserAccount>>;

    async fn delete_user(&self, user_id: i64) -> PortResult<u64>;

    async fn count_role(&self, role: Role) -> PortResult<i64>;

    // --- Auth session methods ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a session token to its user id; `None` when the session
    /// is unknown or expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Option<i64>>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

/// Pass-through CRUD for the directory entities assignments reference.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn list_departments(&self) -> PortResult<Vec<Department>>;
    async fn get_department(&self, id: i64) -> PortResult<Department>;
    async fn insert_department(&self, name: &str) -> PortResult<i64>;
    async fn update_department(&self, id: i64, name: &str) -> PortResult<u64>;
    async fn delete_department(&self, id: i64) -> PortResult<u64>;

    async fn list_employees(&self) -> PortResult<Vec<Employee>>;
    async fn get_employee(&self, id: i64) -> PortResult<Employee>;
    async fn insert_employee(&self, employee: &Employee) -> PortResult<i64>;
    async fn update_employee(&self, id: i64, employee: &Employee) -> PortResult<u64>;
    async fn delete_employee(&self, id: i64) -> PortResult<u64>;

    async fn list_devices(&self) -> PortResult<Vec<Device>>;
    async fn get_device(&self, id: i64) -> PortResult<Device>;
    async fn insert_device(&self, device: &Device) -> PortResult<i64>;
    async fn update_device(&self, id: i64, device: &Device) -> PortResult<u64>;
    async fn delete_device(&self, id: i64) -> PortResult<u64>;
}

//=========================================================================================
// Notification Port
//=========================================================================================

/// Fire-and-forget fan-out of human-readable notifications.
///
/// `notify` must return without waiting for delivery; a slow or failing
/// observer never blocks or fails the operation that triggered it.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: String);
}
