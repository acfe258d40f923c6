//! services/api/src/notify.rs
//!
//! Fire-and-forget notification fan-out. Observers are registered once at
//! startup; every assignment mutation dispatches its message to all of
//! them concurrently on detached tokio tasks. Delivery failures are
//! logged and swallowed - the triggering operation never waits on them.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{info, warn};

use inventory_core::ports::NotificationSink;

/// A registered recipient of assignment notifications.
#[async_trait]
pub trait AssignmentObserver: Send + Sync {
    async fn receive(&self, message: String);
}

/// The process-wide observer registry. Registration is append-only and
/// expected to happen during startup, before requests flow.
#[derive(Default)]
pub struct Notifier {
    observers: RwLock<Vec<Arc<dyn AssignmentObserver>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn AssignmentObserver>) {
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    /// Delivers to every observer concurrently and waits for all of
    /// them. Used by the detached dispatch task and directly by tests
    /// that need deterministic completion.
    pub async fn deliver_all(observers: Vec<Arc<dyn AssignmentObserver>>, message: String) {
        let mut tasks = JoinSet::new();
        for observer in observers {
            let message = message.clone();
            tasks.spawn(async move { observer.receive(message).await });
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                warn!("observer delivery failed: {e}");
            }
        }
    }
}

impl NotificationSink for Notifier {
    fn notify(&self, message: String) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if observers.is_empty() {
            return;
        }
        // Detach: the caller has already committed and must not block on
        // (or fail because of) observer delivery.
        tokio::spawn(Self::deliver_all(observers, message));
    }
}

/// Default observer: writes every notification to the log.
pub struct TracingObserver;

#[async_trait]
impl AssignmentObserver for TracingObserver {
    async fn receive(&self, message: String) {
        info!("Notification: {message}");
    }
}
