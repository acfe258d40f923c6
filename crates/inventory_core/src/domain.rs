//! crates/inventory_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format
//! beyond the serde derives the HTTP layer needs.

use serde::Serialize;

/// The closed set of device categories the system tracks.
///
/// Devices are stored with a plain type string; anything outside the
/// known set parses to `Other` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Computer,
    Phone,
    Printer,
    Other,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Computer => "Computer",
            DeviceType::Phone => "Phone",
            DeviceType::Printer => "Printer",
            DeviceType::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Computer" => DeviceType::Computer,
            "Phone" => DeviceType::Phone,
            "Printer" => DeviceType::Printer,
            _ => DeviceType::Other,
        }
    }
}

/// A piece of tracked hardware.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    pub device_id: i64,
    pub name: String,
    pub device_type: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub department_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department_id: i64,
}

/// One device-to-employee assignment row as stored.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub inventory_id: i64,
    pub device_id: i64,
    pub employee_id: i64,
    pub assigned_date: String,
    pub status: String,
    pub notes: String,
}

/// The joined read shape returned by list/get/search: assignment columns
/// denormalized with device, employee and department names for display.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub inventory_id: i64,
    pub device_id: i64,
    pub employee_id: i64,
    pub device_name: String,
    pub device_type: String,
    pub description: String,
    pub employee_name: String,
    pub department_name: String,
    pub assigned_date: String,
    pub status: String,
    pub notes: String,
}

/// User roles, lowest to highest. Authorization is an allow-list check
/// over these variants; the stored security level is never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Intern,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Intern => "intern",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "intern" => Some(Role::Intern),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// The integer level persisted alongside the role.
    pub fn security_level(&self) -> i64 {
        match self {
            Role::Intern => 2,
            Role::Admin => 3,
            Role::SuperAdmin => 4,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Represents a user as exposed over the API - no credential material.
#[derive(Debug, Clone, Serialize)]
pub struct UserAccount {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub security_level: i64,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Input payload for creating an assignment. Required fields stay
/// optional here so presence validation happens in the service, where
/// the missing-field error message lives.
#[derive(Debug, Clone, Default)]
pub struct CreateAssignment {
    pub device_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Input payload for updating an assignment's status and notes.
#[derive(Debug, Clone, Default)]
pub struct UpdateAssignment {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// A validated assignment ready for insertion.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub device_id: i64,
    pub employee_id: i64,
    pub status: String,
    pub notes: String,
}

/// Optional equality filters for assignment search, AND-combined.
#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub employee_name: Option<String>,
    pub department_name: Option<String>,
    pub device_type: Option<String>,
}

impl AssignmentFilter {
    pub fn is_empty(&self) -> bool {
        self.employee_name.is_none()
            && self.department_name.is_none()
            && self.device_type.is_none()
    }
}
