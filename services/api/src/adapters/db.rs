//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the store ports from the `inventory_core` crate.
//! It handles all interactions with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use inventory_core::domain::{
    AssignmentFilter, AssignmentView, Department, Device, Employee, NewAssignment, Role,
    UserAccount, UserCredentials,
};
use inventory_core::ports::{
    AssignmentStore, DirectoryStore, PortError, PortResult, UserStore,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the store ports over SQLite.
///
/// Each method runs a single autocommit statement; there is no
/// multi-statement transaction spanning a call boundary.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new `SqliteStore`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Maps a write error, surfacing foreign-key violations as
/// `MissingReference` so the boundary can answer 400 instead of 500.
fn constraint_aware(e: sqlx::Error, what: &str) -> PortError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.kind() == sqlx::error::ErrorKind::ForeignKeyViolation {
            return PortError::MissingReference(format!(
                "{what} violates a foreign-key reference"
            ));
        }
    }
    unexpected(e)
}

fn parse_role(raw: &str) -> PortResult<Role> {
    Role::parse(raw)
        .ok_or_else(|| PortError::Unexpected(format!("unknown user role in store: {raw}")))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AssignmentViewRecord {
    inventory_id: i64,
    device_id: i64,
    employee_id: i64,
    device_name: String,
    device_type: String,
    description: String,
    employee_name: String,
    department_name: String,
    assigned_date: String,
    status: String,
    notes: String,
}
impl AssignmentViewRecord {
    fn to_domain(self) -> AssignmentView {
        AssignmentView {
            inventory_id: self.inventory_id,
            device_id: self.device_id,
            employee_id: self.employee_id,
            device_name: self.device_name,
            device_type: self.device_type,
            description: self.description,
            employee_name: self.employee_name,
            department_name: self.department_name,
            assigned_date: self.assigned_date,
            status: self.status,
            notes: self.notes,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    user_id: i64,
    username: String,
    user_role: String,
    security_level: i64,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<UserAccount> {
        Ok(UserAccount {
            user_id: self.user_id,
            username: self.username,
            role: parse_role(&self.user_role)?,
            security_level: self.security_level,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: i64,
    username: String,
    password: String,
    user_role: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            user_id: self.user_id,
            username: self.username,
            password_hash: self.password,
            role: parse_role(&self.user_role)?,
        })
    }
}

#[derive(FromRow)]
struct DepartmentRecord {
    department_id: i64,
    name: String,
}

#[derive(FromRow)]
struct EmployeeRecord {
    employee_id: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    department_id: i64,
}
impl EmployeeRecord {
    fn to_domain(self) -> Employee {
        Employee {
            employee_id: self.employee_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            department_id: self.department_id,
        }
    }
}

#[derive(FromRow)]
struct DeviceRecord {
    device_id: i64,
    device_name: String,
    device_type: String,
    description: String,
}
impl DeviceRecord {
    fn to_domain(self) -> Device {
        Device {
            device_id: self.device_id,
            name: self.device_name,
            device_type: self.device_type,
            description: self.description,
        }
    }
}

/// Shared SELECT for the denormalized assignment view.
const ASSIGNMENT_VIEW_SQL: &str = "\
    SELECT
        ia.inventory_id,
        ia.device_id,
        ia.employee_id,
        d.device_name,
        d.device_type,
        d.description,
        e.first_name || ' ' || e.last_name AS employee_name,
        dep.name AS department_name,
        ia.assigned_date,
        ia.status,
        ia.notes
    FROM inventory_assignments ia
    JOIN devices d ON ia.device_id = d.device_id
    JOIN employees e ON ia.employee_id = e.employee_id
    JOIN departments dep ON e.department_id = dep.department_id";

//=========================================================================================
// `AssignmentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AssignmentStore for SqliteStore {
    async fn list(&self) -> PortResult<Vec<AssignmentView>> {
        let records = sqlx::query_as::<_, AssignmentViewRecord>(ASSIGNMENT_VIEW_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get(&self, inventory_id: i64) -> PortResult<AssignmentView> {
        let sql = format!("{ASSIGNMENT_VIEW_SQL} WHERE ia.inventory_id = ?");
        let record = sqlx::query_as::<_, AssignmentViewRecord>(&sql)
            .bind(inventory_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Inventory assignment {inventory_id}"))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn search(&self, filter: &AssignmentFilter) -> PortResult<Vec<AssignmentView>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ASSIGNMENT_VIEW_SQL);
        builder.push(" WHERE 1=1");
        if let Some(name) = &filter.employee_name {
            builder.push(" AND e.first_name || ' ' || e.last_name = ");
            builder.push_bind(name);
        }
        if let Some(name) = &filter.department_name {
            builder.push(" AND dep.name = ");
            builder.push_bind(name);
        }
        if let Some(device_type) = &filter.device_type {
            builder.push(" AND d.device_type = ");
            builder.push_bind(device_type);
        }

        let records = builder
            .build_query_as::<AssignmentViewRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert(&self, new: &NewAssignment) -> PortResult<i64> {
        let result = sqlx::query(
            "INSERT INTO inventory_assignments (device_id, employee_id, status, notes) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(new.device_id)
        .bind(new.employee_id)
        .bind(&new.status)
        .bind(&new.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_aware(e, "Assignment"))?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, inventory_id: i64, status: &str, notes: &str) -> PortResult<u64> {
        let result = sqlx::query(
            "UPDATE inventory_assignments SET status = ?, notes = ? WHERE inventory_id = ?",
        )
        .bind(status)
        .bind(notes)
        .bind(inventory_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, inventory_id: i64) -> PortResult<u64> {
        let result =
            sqlx::query("DELETE FROM inventory_assignments WHERE inventory_id = ?")
                .bind(inventory_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn device_name(&self, device_id: i64) -> PortResult<String> {
        let name: Option<(String,)> =
            sqlx::query_as("SELECT device_name FROM devices WHERE device_id = ?")
                .bind(device_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        name.map(|(n,)| n)
            .ok_or_else(|| PortError::NotFound(format!("Device {device_id}")))
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for SqliteStore {
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> PortResult<i64> {
        let result = sqlx::query(
            "INSERT INTO users (username, password, user_role, security_level) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(role.security_level())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.last_insert_rowid())
    }

    async fn find_by_username(&self, username: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, username, password, user_role FROM users \
             WHERE username = ? ORDER BY user_id LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn user_role(&self, user_id: i64) -> PortResult<Option<Role>> {
        let raw: Option<(String,)> =
            sqlx::query_as("SELECT user_role FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        raw.map(|(r,)| parse_role(&r)).transpose()
    }

    async fn list_users(&self) -> PortResult<Vec<UserAccount>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, username, user_role, security_level FROM users",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn delete_user(&self, user_id: i64) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn count_role(&self, role: Role) -> PortResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE user_role = ?")
                .bind(role.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(count)
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO auth_sessions (session_id, user_id, expires_at) VALUES (?, ?, ?)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_aware(e, "Session"))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Option<i64>> {
        let row: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT user_id, expires_at FROM auth_sessions WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match row {
            Some((user_id, expires_at)) if expires_at > Utc::now() => Ok(Some(user_id)),
            Some(_) => {
                // Expired: clean up lazily.
                self.delete_auth_session(session_id).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `DirectoryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DirectoryStore for SqliteStore {
    async fn list_departments(&self) -> PortResult<Vec<Department>> {
        let records = sqlx::query_as::<_, DepartmentRecord>(
            "SELECT department_id, name FROM departments",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records
            .into_iter()
            .map(|r| Department {
                department_id: r.department_id,
                name: r.name,
            })
            .collect())
    }

    async fn get_department(&self, id: i64) -> PortResult<Department> {
        let record = sqlx::query_as::<_, DepartmentRecord>(
            "SELECT department_id, name FROM departments WHERE department_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Department {id}")))?;
        Ok(Department {
            department_id: record.department_id,
            name: record.name,
        })
    }

    async fn insert_department(&self, name: &str) -> PortResult<i64> {
        let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.last_insert_rowid())
    }

    async fn update_department(&self, id: i64, name: &str) -> PortResult<u64> {
        let result =
            sqlx::query("UPDATE departments SET name = ? WHERE department_id = ?")
                .bind(name)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn delete_department(&self, id: i64) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM departments WHERE department_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_aware(e, "Department"))?;
        Ok(result.rows_affected())
    }

    async fn list_employees(&self) -> PortResult<Vec<Employee>> {
        let records = sqlx::query_as::<_, EmployeeRecord>(
            "SELECT employee_id, first_name, last_name, email, phone, department_id \
             FROM employees",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_employee(&self, id: i64) -> PortResult<Employee> {
        let record = sqlx::query_as::<_, EmployeeRecord>(
            "SELECT employee_id, first_name, last_name, email, phone, department_id \
             FROM employees WHERE employee_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Employee {id}")))?;
        Ok(record.to_domain())
    }

    async fn insert_employee(&self, employee: &Employee) -> PortResult<i64> {
        let result = sqlx::query(
            "INSERT INTO employees (first_name, last_name, email, phone, department_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(employee.department_id)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_aware(e, "Employee"))?;
        Ok(result.last_insert_rowid())
    }

    async fn update_employee(&self, id: i64, employee: &Employee) -> PortResult<u64> {
        let result = sqlx::query(
            "UPDATE employees SET first_name = ?, last_name = ?, email = ?, phone = ?, \
             department_id = ? WHERE employee_id = ?",
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(employee.department_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_aware(e, "Employee"))?;
        Ok(result.rows_affected())
    }

    async fn delete_employee(&self, id: i64) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM employees WHERE employee_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_aware(e, "Employee"))?;
        Ok(result.rows_affected())
    }

    async fn list_devices(&self) -> PortResult<Vec<Device>> {
        let records = sqlx::query_as::<_, DeviceRecord>(
            "SELECT device_id, device_name, device_type, description FROM devices",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_device(&self, id: i64) -> PortResult<Device> {
        let record = sqlx::query_as::<_, DeviceRecord>(
            "SELECT device_id, device_name, device_type, description FROM devices \
             WHERE device_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Device {id}")))?;
        Ok(record.to_domain())
    }

    async fn insert_device(&self, device: &Device) -> PortResult<i64> {
        let result = sqlx::query(
            "INSERT INTO devices (device_name, device_type, description) VALUES (?, ?, ?)",
        )
        .bind(&device.name)
        .bind(&device.device_type)
        .bind(&device.description)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.last_insert_rowid())
    }

    async fn update_device(&self, id: i64, device: &Device) -> PortResult<u64> {
        let result = sqlx::query(
            "UPDATE devices SET device_name = ?, device_type = ?, description = ? \
             WHERE device_id = ?",
        )
        .bind(&device.name)
        .bind(&device.device_type)
        .bind(&device.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    /// A device still referenced by an assignment cannot be removed;
    /// the foreign key turns that attempt into `MissingReference` and
    /// the row survives.
    async fn delete_device(&self, id: i64) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM devices WHERE device_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_aware(e, "Device"))?;
        Ok(result.rows_affected())
    }
}
