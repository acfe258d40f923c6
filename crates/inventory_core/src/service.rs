//! crates/inventory_core/src/service.rs
//!
//! The assignment service: validation, mutation orchestration and the
//! commit-then-notify contract. All persistence goes through the
//! `AssignmentStore` port so the service can be exercised against an
//! in-memory store in tests.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{
    AssignmentFilter, AssignmentView, CreateAssignment, NewAssignment, UpdateAssignment,
};
use crate::ports::{AssignmentStore, NotificationSink, PortError, PortResult};

/// Coordinates assignment mutations against the store and fans out a
/// notification after each durable change. Each store call commits on
/// its own, so observers never hear about a change that was not
/// persisted; the inverse is not guaranteed and notifications are
/// treated as best-effort telemetry.
pub struct AssignmentService {
    store: Arc<dyn AssignmentStore>,
    sink: Arc<dyn NotificationSink>,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn AssignmentStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// Every assignment joined with device, employee and department
    /// names. An empty inventory is an empty vec, not an error.
    pub async fn list(&self) -> PortResult<Vec<AssignmentView>> {
        self.store.list().await
    }

    pub async fn get(&self, inventory_id: i64) -> PortResult<AssignmentView> {
        self.store.get(inventory_id).await
    }

    /// Equality match only; a fully-empty filter returns the same set
    /// as `list`.
    pub async fn search(&self, filter: &AssignmentFilter) -> PortResult<Vec<AssignmentView>> {
        if filter.is_empty() {
            return self.store.list().await;
        }
        self.store.search(filter).await
    }

    /// Validates presence of the required fields, inserts the row, then
    /// notifies. Referential integrity is the store's job: a dangling
    /// device or employee id comes back as `MissingReference`.
    pub async fn create(&self, input: CreateAssignment) -> PortResult<i64> {
        let (device_id, employee_id, status) = match (
            input.device_id,
            input.employee_id,
            input.status.as_deref(),
        ) {
            (Some(d), Some(e), Some(s)) if d > 0 && e > 0 && !s.is_empty() => {
                (d, e, s.to_string())
            }
            _ => {
                return Err(PortError::Validation(
                    "Device ID, Employee ID, and Status are required".to_string(),
                ))
            }
        };

        let new = NewAssignment {
            device_id,
            employee_id,
            status,
            notes: input.notes.unwrap_or_default(),
        };
        let inventory_id = self.store.insert(&new).await?;

        let device_name = self
            .store
            .device_name(device_id)
            .await
            .unwrap_or_else(|_| device_id.to_string());
        self.sink.notify(format!(
            "Inventory Update: Assigned {device_name} to Employee {employee_id}"
        ));
        Ok(inventory_id)
    }

    /// Updates status and notes only; device/employee references are
    /// never repointed. An omitted notes field resets notes to the
    /// empty string - a deliberate contract, not an accident.
    pub async fn update(&self, inventory_id: i64, input: UpdateAssignment) -> PortResult<()> {
        let status = match input.status.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return Err(PortError::Validation("Status is required".to_string())),
        };
        let notes = input.notes.unwrap_or_default();

        let affected = self.store.update(inventory_id, &status, &notes).await?;
        if affected == 0 {
            warn!(inventory_id, "Inventory ID not found");
            return Err(PortError::NotFound(format!("Inventory ID {inventory_id}")));
        }
        self.sink.notify(format!(
            "Inventory Update: Status updated for Inventory ID {inventory_id}"
        ));
        Ok(())
    }

    /// Physical delete. A missing row is NotFound semantics, not a hard
    /// failure: it logs a warning and no notification fires.
    pub async fn delete(&self, inventory_id: i64) -> PortResult<()> {
        let affected = self.store.delete(inventory_id).await?;
        if affected == 0 {
            warn!(inventory_id, "Assignment not found for Inventory ID");
            return Err(PortError::NotFound(format!("Inventory ID {inventory_id}")));
        }
        self.sink.notify(format!(
            "Inventory Update: Removed assignment for Inventory ID {inventory_id}"
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    #[derive(Clone)]
    struct Row {
        view: AssignmentView,
    }

    /// In-memory stand-in for the SQL store, with a fixed directory of
    /// two devices and two employees.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<i64, Row>>,
        next_id: Mutex<i64>,
    }

    impl MemoryStore {
        fn device(device_id: i64) -> Option<(&'static str, &'static str)> {
            match device_id {
                1 => Some(("ThinkPad X1", "Computer")),
                2 => Some(("LaserJet 4100", "Printer")),
                _ => None,
            }
        }

        fn employee(employee_id: i64) -> Option<(&'static str, &'static str)> {
            match employee_id {
                1 => Some(("Alice Smith", "Engineering")),
                2 => Some(("Bob Jones", "Facilities")),
                _ => None,
            }
        }
    }

    #[async_trait]
    impl AssignmentStore for MemoryStore {
        async fn list(&self) -> PortResult<Vec<AssignmentView>> {
            let rows = self.rows.lock().unwrap();
            let mut views: Vec<_> = rows.values().map(|r| r.view.clone()).collect();
            views.sort_by_key(|v| v.inventory_id);
            Ok(views)
        }

        async fn get(&self, inventory_id: i64) -> PortResult<AssignmentView> {
            self.rows
                .lock()
                .unwrap()
                .get(&inventory_id)
                .map(|r| r.view.clone())
                .ok_or_else(|| PortError::NotFound(format!("Inventory ID {inventory_id}")))
        }

        async fn search(&self, filter: &AssignmentFilter) -> PortResult<Vec<AssignmentView>> {
            let views = self.list().await?;
            Ok(views
                .into_iter()
                .filter(|v| {
                    filter
                        .employee_name
                        .as_ref()
                        .map_or(true, |n| &v.employee_name == n)
                        && filter
                            .department_name
                            .as_ref()
                            .map_or(true, |n| &v.department_name == n)
                        && filter
                            .device_type
                            .as_ref()
                            .map_or(true, |t| &v.device_type == t)
                })
                .collect())
        }

        async fn insert(&self, new: &NewAssignment) -> PortResult<i64> {
            let (device_name, device_type) = Self::device(new.device_id).ok_or_else(|| {
                PortError::MissingReference(format!("no device with id {}", new.device_id))
            })?;
            let (employee_name, department_name) =
                Self::employee(new.employee_id).ok_or_else(|| {
                    PortError::MissingReference(format!(
                        "no employee with id {}",
                        new.employee_id
                    ))
                })?;

            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let id = *next;
            self.rows.lock().unwrap().insert(
                id,
                Row {
                    view: AssignmentView {
                        inventory_id: id,
                        device_id: new.device_id,
                        employee_id: new.employee_id,
                        device_name: device_name.to_string(),
                        device_type: device_type.to_string(),
                        description: String::new(),
                        employee_name: employee_name.to_string(),
                        department_name: department_name.to_string(),
                        assigned_date: "2024-01-01 00:00:00".to_string(),
                        status: new.status.clone(),
                        notes: new.notes.clone(),
                    },
                },
            );
            Ok(id)
        }

        async fn update(&self, inventory_id: i64, status: &str, notes: &str) -> PortResult<u64> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&inventory_id) {
                Some(row) => {
                    row.view.status = status.to_string();
                    row.view.notes = notes.to_string();
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete(&self, inventory_id: i64) -> PortResult<u64> {
            Ok(self.rows.lock().unwrap().remove(&inventory_id).map_or(0, |_| 1))
        }

        async fn device_name(&self, device_id: i64) -> PortResult<String> {
            Self::device(device_id)
                .map(|(name, _)| name.to_string())
                .ok_or_else(|| PortError::NotFound(format!("device {device_id}")))
        }
    }

    /// Records every notification synchronously.
    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, message: String) {
            self.messages.lock().unwrap().push(message);
        }
    }

    fn service() -> (AssignmentService, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let svc = AssignmentService::new(Arc::new(MemoryStore::default()), sink.clone());
        (svc, sink)
    }

    fn valid_input() -> CreateAssignment {
        CreateAssignment {
            device_id: Some(1),
            employee_id: Some(2),
            status: Some("active".to_string()),
            notes: Some("new hire laptop".to_string()),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (svc, _) = service();
        let id = svc.create(valid_input()).await.unwrap();
        let view = svc.get(id).await.unwrap();
        assert_eq!(view.device_id, 1);
        assert_eq!(view.employee_id, 2);
        assert_eq!(view.status, "active");
        assert_eq!(view.notes, "new hire laptop");
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let (svc, sink) = service();
        for input in [
            CreateAssignment::default(),
            CreateAssignment {
                device_id: None,
                ..valid_input()
            },
            CreateAssignment {
                employee_id: None,
                ..valid_input()
            },
            CreateAssignment {
                status: Some(String::new()),
                ..valid_input()
            },
            CreateAssignment {
                device_id: Some(0),
                ..valid_input()
            },
        ] {
            let err = svc.create(input).await.unwrap_err();
            assert!(
                matches!(err, PortError::Validation(_)),
                "expected validation error, got {err:?}"
            );
        }
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn create_with_dangling_reference_fails_without_notification() {
        let (svc, sink) = service();
        let err = svc
            .create(CreateAssignment {
                device_id: Some(99),
                ..valid_input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::MissingReference(_)));
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn create_notifies_with_device_name_and_employee_id() {
        let (svc, sink) = service();
        svc.create(valid_input()).await.unwrap();
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            "Inventory Update: Assigned ThinkPad X1 to Employee 2"
        );
    }

    #[tokio::test]
    async fn update_resets_notes_when_omitted() {
        let (svc, _) = service();
        let id = svc.create(valid_input()).await.unwrap();
        svc.update(
            id,
            UpdateAssignment {
                status: Some("returned".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();

        let view = svc.get(id).await.unwrap();
        assert_eq!(view.status, "returned");
        assert_eq!(view.notes, "");
    }

    #[tokio::test]
    async fn update_requires_status() {
        let (svc, _) = service();
        let id = svc.create(valid_input()).await.unwrap();
        let err = svc
            .update(
                id,
                UpdateAssignment {
                    status: None,
                    notes: Some("still here".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found_and_silent() {
        let (svc, sink) = service();
        let err = svc
            .update(
                42,
                UpdateAssignment {
                    status: Some("lost".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_row_is_not_found_and_leaves_rows_alone() {
        let (svc, sink) = service();
        let id = svc.create(valid_input()).await.unwrap();

        let err = svc.delete(id + 100).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        assert_eq!(svc.list().await.unwrap().len(), 1);
        // Only the create notification fired.
        assert_eq!(sink.messages().len(), 1);
    }

    #[tokio::test]
    async fn empty_search_equals_list() {
        let (svc, _) = service();
        svc.create(valid_input()).await.unwrap();
        svc.create(CreateAssignment {
            device_id: Some(2),
            employee_id: Some(1),
            status: Some("active".to_string()),
            notes: None,
        })
        .await
        .unwrap();

        let listed = svc.list().await.unwrap();
        let searched = svc.search(&AssignmentFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(
            listed.iter().map(|v| v.inventory_id).collect::<Vec<_>>(),
            searched.iter().map(|v| v.inventory_id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn search_matches_exact_names_only() {
        let (svc, _) = service();
        svc.create(valid_input()).await.unwrap(); // Bob Jones
        svc.create(CreateAssignment {
            device_id: Some(2),
            employee_id: Some(1),
            status: Some("active".to_string()),
            notes: None,
        })
        .await
        .unwrap(); // Alice Smith

        let hits = svc
            .search(&AssignmentFilter {
                employee_name: Some("Alice Smith".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].employee_name, "Alice Smith");

        // Case and partial matches do not count.
        let miss = svc
            .search(&AssignmentFilter {
                employee_name: Some("alice smith".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(miss.is_empty());
        let partial = svc
            .search(&AssignmentFilter {
                employee_name: Some("Alice".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(partial.is_empty());
    }

    #[tokio::test]
    async fn combined_filters_are_anded() {
        let (svc, _) = service();
        svc.create(valid_input()).await.unwrap(); // Bob / Computer
        svc.create(CreateAssignment {
            device_id: Some(2),
            employee_id: Some(2),
            status: Some("active".to_string()),
            notes: None,
        })
        .await
        .unwrap(); // Bob / Printer

        let hits = svc
            .search(&AssignmentFilter {
                employee_name: Some("Bob Jones".to_string()),
                device_type: Some("Printer".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].device_type, "Printer");
    }
}
