//! Integration tests for the SQLite store and the assignment service,
//! using an in-memory database.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::mpsc;

use api_lib::adapters::db::SqliteStore;
use api_lib::notify::{AssignmentObserver, Notifier};
use inventory_core::domain::{
    AssignmentFilter, CreateAssignment, Device, Employee, UpdateAssignment,
};
use inventory_core::ports::{
    AssignmentStore, DirectoryStore, NotificationSink, PortError,
};
use inventory_core::service::AssignmentService;

/// Helper: spin up an in-memory SQLite store with foreign keys on and
/// the schema applied. A single connection keeps the in-memory database
/// alive and shared.
async fn setup() -> Arc<SqliteStore> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    let store = SqliteStore::new(pool);
    store.run_migrations().await.unwrap();
    Arc::new(store)
}

/// Seeds a department, two employees and two devices; returns
/// (employee ids, device ids).
async fn seed_directory(store: &SqliteStore) -> (Vec<i64>, Vec<i64>) {
    let eng = store.insert_department("Engineering").await.unwrap();
    let fac = store.insert_department("Facilities").await.unwrap();

    let alice = store
        .insert_employee(&Employee {
            employee_id: 0,
            first_name: "Alice".into(),
            last_name: "Smith".into(),
            email: Some("alice@example.com".into()),
            phone: None,
            department_id: eng,
        })
        .await
        .unwrap();
    let bob = store
        .insert_employee(&Employee {
            employee_id: 0,
            first_name: "Bob".into(),
            last_name: "Jones".into(),
            email: None,
            phone: Some("555-0100".into()),
            department_id: fac,
        })
        .await
        .unwrap();

    let laptop = store
        .insert_device(&Device {
            device_id: 0,
            name: "ThinkPad X1".into(),
            device_type: "Computer".into(),
            description: "14-inch laptop".into(),
        })
        .await
        .unwrap();
    let printer = store
        .insert_device(&Device {
            device_id: 0,
            name: "LaserJet 4100".into(),
            device_type: "Printer".into(),
            description: String::new(),
        })
        .await
        .unwrap();

    (vec![alice, bob], vec![laptop, printer])
}

struct ChannelObserver {
    tx: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl AssignmentObserver for ChannelObserver {
    async fn receive(&self, message: String) {
        let _ = self.tx.send(message);
    }
}

fn service_with_observer(
    store: Arc<SqliteStore>,
) -> (AssignmentService, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let notifier = Notifier::new();
    notifier.register(Arc::new(ChannelObserver { tx }));
    let sink: Arc<dyn NotificationSink> = Arc::new(notifier);
    (AssignmentService::new(store, sink), rx)
}

#[tokio::test]
async fn insert_with_dangling_reference_is_a_foreign_key_error() {
    let store = setup().await;
    seed_directory(&store).await;

    let err = store
        .insert(&inventory_core::domain::NewAssignment {
            device_id: 999,
            employee_id: 1,
            status: "active".into(),
            notes: String::new(),
        })
        .await
        .unwrap_err();
    assert!(
        matches!(err, PortError::MissingReference(_)),
        "expected MissingReference, got {err:?}"
    );
}

#[tokio::test]
async fn joined_view_carries_display_names() {
    let store = setup().await;
    let (employees, devices) = seed_directory(&store).await;

    let id = store
        .insert(&inventory_core::domain::NewAssignment {
            device_id: devices[0],
            employee_id: employees[0],
            status: "active".into(),
            notes: "desk 12".into(),
        })
        .await
        .unwrap();

    let view = store.get(id).await.unwrap();
    assert_eq!(view.device_name, "ThinkPad X1");
    assert_eq!(view.device_type, "Computer");
    assert_eq!(view.employee_name, "Alice Smith");
    assert_eq!(view.department_name, "Engineering");
    assert_eq!(view.status, "active");
    assert_eq!(view.notes, "desk 12");
    assert!(!view.assigned_date.is_empty());
}

#[tokio::test]
async fn search_filters_are_exact_and_anded() {
    let store = setup().await;
    let (employees, devices) = seed_directory(&store).await;
    for (d, e) in [(devices[0], employees[0]), (devices[1], employees[1])] {
        store
            .insert(&inventory_core::domain::NewAssignment {
                device_id: d,
                employee_id: e,
                status: "active".into(),
                notes: String::new(),
            })
            .await
            .unwrap();
    }

    let all = store.search(&AssignmentFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let alice_only = store
        .search(&AssignmentFilter {
            employee_name: Some("Alice Smith".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(alice_only.len(), 1);
    assert_eq!(alice_only[0].employee_name, "Alice Smith");

    // Partial and case-differing names do not match.
    for miss in ["Alice", "alice smith"] {
        let hits = store
            .search(&AssignmentFilter {
                employee_name: Some(miss.into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(hits.is_empty(), "'{miss}' should not match");
    }

    let anded = store
        .search(&AssignmentFilter {
            department_name: Some("Facilities".into()),
            device_type: Some("Printer".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(anded.len(), 1);
    assert_eq!(anded[0].device_name, "LaserJet 4100");

    let conflicting = store
        .search(&AssignmentFilter {
            department_name: Some("Facilities".into()),
            device_type: Some("Computer".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(conflicting.is_empty());
}

#[tokio::test]
async fn device_referenced_by_assignment_cannot_be_deleted() {
    let store = setup().await;
    let (employees, devices) = seed_directory(&store).await;
    store
        .insert(&inventory_core::domain::NewAssignment {
            device_id: devices[0],
            employee_id: employees[0],
            status: "active".into(),
            notes: String::new(),
        })
        .await
        .unwrap();

    let err = store.delete_device(devices[0]).await.unwrap_err();
    assert!(matches!(err, PortError::MissingReference(_)));
    // The device row survives.
    assert!(store.get_device(devices[0]).await.is_ok());
}

#[tokio::test]
async fn assignment_lifecycle_end_to_end() {
    let store = setup().await;
    let (employees, devices) = seed_directory(&store).await;
    let (service, mut rx) = service_with_observer(store);

    // Create: exactly one notification naming the device and employee.
    let id = service
        .create(CreateAssignment {
            device_id: Some(devices[0]),
            employee_id: Some(employees[1]),
            status: Some("active".into()),
            notes: None,
        })
        .await
        .unwrap();
    let message = rx.recv().await.unwrap();
    assert_eq!(
        message,
        format!("Inventory Update: Assigned ThinkPad X1 to Employee {}", employees[1])
    );

    // Update: status changes, omitted notes reset to empty.
    service
        .update(
            id,
            UpdateAssignment {
                status: Some("returned".into()),
                notes: None,
            },
        )
        .await
        .unwrap();
    let view = service.get(id).await.unwrap();
    assert_eq!(view.status, "returned");
    assert_eq!(view.notes, "");
    let message = rx.recv().await.unwrap();
    assert!(message.contains(&format!("Inventory ID {id}")));

    // Delete, then the row is gone.
    service.delete(id).await.unwrap();
    let message = rx.recv().await.unwrap();
    assert!(message.contains("Removed assignment"));
    let err = service.get(id).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}

#[tokio::test]
async fn update_preserves_explicit_notes() {
    let store = setup().await;
    let (employees, devices) = seed_directory(&store).await;
    let (service, _rx) = service_with_observer(store);

    let id = service
        .create(CreateAssignment {
            device_id: Some(devices[1]),
            employee_id: Some(employees[0]),
            status: Some("active".into()),
            notes: Some("tray 2 jams".into()),
        })
        .await
        .unwrap();

    service
        .update(
            id,
            UpdateAssignment {
                status: Some("lost".into()),
                notes: Some("last seen in room 4".into()),
            },
        )
        .await
        .unwrap();

    let view = service.get(id).await.unwrap();
    assert_eq!(view.status, "lost");
    assert_eq!(view.notes, "last seen in room 4");
}

#[tokio::test]
async fn delete_missing_assignment_leaves_count_unchanged() {
    let store = setup().await;
    let (employees, devices) = seed_directory(&store).await;
    let (service, _rx) = service_with_observer(store.clone());

    service
        .create(CreateAssignment {
            device_id: Some(devices[0]),
            employee_id: Some(employees[0]),
            status: Some("active".into()),
            notes: None,
        })
        .await
        .unwrap();

    let err = service.delete(9999).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
    assert_eq!(store.list().await.unwrap().len(), 1);
}
