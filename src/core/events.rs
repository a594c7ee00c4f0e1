//! Sync event bus
//!
//! Collections publish what happened to them on an `EventBus` built on
//! `tokio::sync::broadcast`. The presentation layer subscribes and decides
//! how to surface each event (toasts, logs), which keeps notification calls
//! out of the data layer.
//!
//! # Architecture
//!
//! ```text
//! clients  ──┐
//! projects ──┼──▶ EventBus::publish() ──▶ broadcast channel ──▶ toast renderer
//! invoices ──┘                                               ──▶ activity log
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(256);
//! let mut rx = bus.subscribe();
//!
//! let projects = EntitySync::<Project>::new(store, auth).with_events(bus.clone());
//! projects.add(draft).await?;
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{}", Notice::from_event(&envelope.event));
//! }
//! ```

use crate::core::error::Operation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// What happened to a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncAction {
    /// The collection was replaced by a fresh read
    Fetched { count: usize },
    /// A row was inserted and prepended
    Created { entity_id: Uuid },
    /// A row was updated and merged locally
    Updated { entity_id: Uuid },
    /// A row was deleted and dropped locally
    Deleted { entity_id: Uuid },
    /// A remote call failed; local state was left as it was
    Failed { operation: String, message: String },
}

impl SyncAction {
    /// Operation that produced a successful outcome
    ///
    /// Failures carry their operation as text and yield `None`.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            SyncAction::Fetched { .. } => Some(Operation::Fetch),
            SyncAction::Created { .. } => Some(Operation::Add),
            SyncAction::Updated { .. } => Some(Operation::Update),
            SyncAction::Deleted { .. } => Some(Operation::Delete),
            SyncAction::Failed { .. } => None,
        }
    }
}

/// A collection event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Remote table (e.g., "projects")
    pub table: String,

    /// Singular record name (e.g., "project")
    pub entity_type: String,

    #[serde(flatten)]
    pub action: SyncAction,
}

impl SyncEvent {
    pub fn new(table: &str, entity_type: &str, action: SyncAction) -> Self {
        Self {
            table: table.to_string(),
            entity_type: entity_type.to_string(),
            action,
        }
    }

    /// Build the failure event for an operation
    pub fn failed(table: &str, entity_type: &str, operation: Operation, message: String) -> Self {
        Self::new(
            table,
            entity_type,
            SyncAction::Failed {
                operation: operation.verb().to_string(),
                message,
            },
        )
    }

    /// Get the action name (fetched, created, updated, deleted, failed)
    pub fn action_name(&self) -> &str {
        match self.action {
            SyncAction::Fetched { .. } => "fetched",
            SyncAction::Created { .. } => "created",
            SyncAction::Updated { .. } => "updated",
            SyncAction::Deleted { .. } => "deleted",
            SyncAction::Failed { .. } => "failed",
        }
    }

    /// Get the record id this event relates to (if applicable)
    pub fn entity_id(&self) -> Option<Uuid> {
        match &self.action {
            SyncAction::Created { entity_id }
            | SyncAction::Updated { entity_id }
            | SyncAction::Deleted { entity_id } => Some(*entity_id),
            SyncAction::Fetched { .. } | SyncAction::Failed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.action, SyncAction::Failed { .. })
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: SyncEvent,
}

impl EventEnvelope {
    pub fn new(event: SyncEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; all clones feed the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// Receivers that fall more than `capacity` events behind get a `Lagged`
    /// error on their next `recv()`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. Returns the number of receivers that will see the event.
    pub fn publish(&self, event: SyncEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() only errs when there are no receivers
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
