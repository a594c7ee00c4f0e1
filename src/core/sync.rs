//! Entity sync collections
//!
//! An [`EntitySync`] keeps an ordered in-memory copy of one remote table for
//! the signed-in identity. Reads replace the whole copy; writes go to the
//! store first and patch the copy only once the store accepted them.
//!
//! # Ordering
//!
//! Fetches and mutations on one collection are serialised through an async
//! gate, so a local patch is always applied to the current collection rather
//! than a snapshot taken before an overlapping call. Separate collections are
//! not coordinated with each other.
//!
//! # Identity
//!
//! The collection remembers which identity it was loaded for. Fetch, add and
//! [`EntitySync::resync`] all discard everything before touching the store
//! when that identity no longer matches the auth context, so rows of a
//! previous identity never survive a failed call. Results of a fetch that
//! raced an identity change are dropped.

use crate::core::auth::AuthContext;
use crate::core::entity::Entity;
use crate::core::error::{Operation, SyncError};
use crate::core::events::{EventBus, SyncAction, SyncEvent};
use crate::core::query::{OWNER_COLUMN, Row, SelectQuery};
use crate::core::store::TableStore;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug)]
struct SyncState<E> {
    items: Vec<E>,
    loading: bool,
    owner: Option<Uuid>,
}

/// In-memory mirror of one remote table, scoped to the signed-in identity
pub struct EntitySync<E: Entity> {
    store: Arc<dyn TableStore>,
    auth: AuthContext,
    events: Option<EventBus>,
    state: Arc<RwLock<SyncState<E>>>,
    gate: Arc<Mutex<()>>,
}

impl<E: Entity> Clone for EntitySync<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            auth: self.auth.clone(),
            events: self.events.clone(),
            state: self.state.clone(),
            gate: self.gate.clone(),
        }
    }
}

impl<E: Entity> EntitySync<E> {
    /// Create an empty collection in the loading state
    pub fn new(store: Arc<dyn TableStore>, auth: AuthContext) -> Self {
        Self {
            store,
            auth,
            events: None,
            state: Arc::new(RwLock::new(SyncState {
                items: Vec::new(),
                loading: true,
                owner: None,
            })),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Publish every outcome on an event bus
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    // === Accessors ===

    /// Snapshot of the collection, newest first
    pub fn items(&self) -> Vec<E> {
        self.read().items.clone()
    }

    /// Find a record by id
    pub fn get(&self, id: &Uuid) -> Option<E> {
        self.read().items.iter().find(|e| &e.id() == id).cloned()
    }

    /// True until the first fetch for the current identity settles
    pub fn loading(&self) -> bool {
        self.read().loading
    }

    /// Identity the collection was loaded for
    pub fn owner(&self) -> Option<Uuid> {
        self.read().owner
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    // === Operations ===

    /// Replace the collection with every row the current identity owns
    ///
    /// Without an identity nothing happens. On failure the previous
    /// collection is kept and only the loading flag clears.
    pub async fn fetch(&self) -> Result<(), SyncError> {
        let _gate = self.gate.lock().await;
        self.fetch_locked().await
    }

    /// Bring the collection in line with the auth context
    ///
    /// When the identity differs from the one the collection was loaded for,
    /// the collection is emptied before anything else happens; it is then
    /// fetched for the new identity, or left empty when nobody is signed in.
    /// With an unchanged identity this is a plain re-fetch.
    pub async fn resync(&self) -> Result<(), SyncError> {
        let _gate = self.gate.lock().await;
        let current = self.auth.user_id();

        if self.claim(current) {
            self.write().loading = current.is_some();
        }

        if current.is_none() {
            return Ok(());
        }
        self.fetch_locked().await
    }

    /// Insert a record for the current identity and prepend it
    pub async fn add(&self, draft: E::Draft) -> Result<E, SyncError> {
        let Some(owner) = self.auth.user_id() else {
            return Err(self.unauthenticated(Operation::Add));
        };
        draft.validate().map_err(|errors| SyncError::Invalid {
            entity: E::resource_name_singular(),
            errors,
        })?;

        let mut row = to_row::<E, _>(&draft)?;
        row.insert(OWNER_COLUMN.to_string(), json!(owner));

        let _gate = self.gate.lock().await;
        self.claim(Some(owner));
        let result = match self.store.insert(E::resource_name(), row, E::embeds()).await {
            Ok(row) => decode::<E>(Value::Object(row)),
            Err(e) => Err(remote::<E>(Operation::Add, e)),
        };

        match result {
            Ok(entity) => {
                // Skipped only when the identity moved on mid-insert.
                if self.auth.user_id() == Some(owner) {
                    self.write().items.insert(0, entity.clone());
                }
                tracing::debug!(table = E::resource_name(), id = %entity.id(), "record added");
                self.publish(SyncAction::Created {
                    entity_id: entity.id(),
                });
                Ok(entity)
            }
            Err(e) => Err(self.failed(Operation::Add, e)),
        }
    }

    /// Update a record remotely, then merge the patch into the local copy
    ///
    /// Returns the merged local record, or `None` when it is not in the
    /// collection. Embedded related names are not refreshed.
    pub async fn update(&self, id: Uuid, patch: E::Patch) -> Result<Option<E>, SyncError> {
        let mut fields = to_row::<E, _>(&patch)?;
        let now = Utc::now();
        fields.insert("updated_at".to_string(), json!(now));

        let _gate = self.gate.lock().await;
        if let Err(e) = self.store.update(E::resource_name(), &id, fields).await {
            return Err(self.failed(Operation::Update, remote::<E>(Operation::Update, e)));
        }

        let merged = {
            let mut state = self.write();
            state.items.iter_mut().find(|e| e.id() == id).map(|entity| {
                entity.apply_patch(&patch);
                entity.touch(now);
                entity.clone()
            })
        };
        tracing::debug!(table = E::resource_name(), %id, "record updated");
        self.publish(SyncAction::Updated { entity_id: id });
        Ok(merged)
    }

    /// Delete a record remotely, then drop it from the collection
    ///
    /// Returns whether a local record was dropped.
    pub async fn remove(&self, id: Uuid) -> Result<bool, SyncError> {
        let _gate = self.gate.lock().await;
        if let Err(e) = self.store.delete(E::resource_name(), &id).await {
            return Err(self.failed(Operation::Delete, remote::<E>(Operation::Delete, e)));
        }

        let removed = {
            let mut state = self.write();
            let before = state.items.len();
            state.items.retain(|e| e.id() != id);
            state.items.len() != before
        };
        tracing::debug!(table = E::resource_name(), %id, removed, "record deleted");
        self.publish(SyncAction::Deleted { entity_id: id });
        Ok(removed)
    }

    /// Re-synchronise on every auth transition until the task is aborted
    ///
    /// Runs one `resync` immediately (the initial load) and one per change
    /// observed on the auth context afterwards.
    pub fn watch_identity(&self) -> JoinHandle<()> {
        let this = self.clone();
        let mut rx = self.auth.subscribe();
        tokio::spawn(async move {
            rx.borrow_and_update();
            let _ = this.resync().await;
            while rx.changed().await.is_ok() {
                rx.borrow_and_update();
                let _ = this.resync().await;
            }
        })
    }

    // === Internals ===

    async fn fetch_locked(&self) -> Result<(), SyncError> {
        let Some(owner) = self.auth.user_id() else {
            return Err(self.unauthenticated(Operation::Fetch));
        };
        self.claim(Some(owner));

        let query = SelectQuery::owned(E::resource_name(), owner).with_embeds(E::embeds());
        let result = match self.store.select(&query).await {
            Ok(rows) => rows
                .into_iter()
                .map(|row| decode::<E>(Value::Object(row)))
                .collect::<Result<Vec<E>, _>>(),
            Err(e) => Err(remote::<E>(Operation::Fetch, e)),
        };

        if self.auth.user_id() != Some(owner) {
            tracing::debug!(
                table = E::resource_name(),
                "identity changed during fetch, dropping result"
            );
            return Ok(());
        }

        match result {
            Ok(items) => {
                let count = items.len();
                {
                    let mut state = self.write();
                    state.items = items;
                    state.owner = Some(owner);
                    state.loading = false;
                }
                tracing::debug!(table = E::resource_name(), count, "collection fetched");
                self.publish(SyncAction::Fetched { count });
                Ok(())
            }
            Err(e) => {
                self.write().loading = false;
                Err(self.failed(Operation::Fetch, e))
            }
        }
    }

    /// Hand the collection to `owner`, discarding rows loaded for anyone else
    ///
    /// Returns whether the previous contents were discarded.
    fn claim(&self, owner: Option<Uuid>) -> bool {
        let mut state = self.write();
        if state.owner == owner {
            return false;
        }
        tracing::info!(
            table = E::resource_name(),
            previous = ?state.owner,
            current = ?owner,
            "identity changed, discarding collection"
        );
        state.items.clear();
        state.owner = owner;
        true
    }

    fn unauthenticated(&self, operation: Operation) -> SyncError {
        tracing::debug!(
            table = E::resource_name(),
            %operation,
            "skipped: no authenticated identity"
        );
        SyncError::Unauthenticated {
            table: E::resource_name(),
            operation,
        }
    }

    fn failed(&self, operation: Operation, error: SyncError) -> SyncError {
        tracing::error!(table = E::resource_name(), %operation, error = %error, "sync operation failed");
        if let Some(events) = &self.events {
            events.publish(SyncEvent::failed(
                E::resource_name(),
                E::resource_name_singular(),
                operation,
                error.to_string(),
            ));
        }
        error
    }

    fn publish(&self, action: SyncAction) {
        if let Some(events) = &self.events {
            events.publish(SyncEvent::new(
                E::resource_name(),
                E::resource_name_singular(),
                action,
            ));
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SyncState<E>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SyncState<E>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn remote<E: Entity>(operation: Operation, error: anyhow::Error) -> SyncError {
    SyncError::Remote {
        table: E::resource_name(),
        operation,
        message: format!("{:#}", error),
    }
}

fn decode<E: Entity>(value: Value) -> Result<E, SyncError> {
    serde_json::from_value(value).map_err(|e| SyncError::Decode {
        table: E::resource_name(),
        message: e.to_string(),
    })
}

fn to_row<E: Entity, T: Serialize>(payload: &T) -> Result<Row, SyncError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(SyncError::Decode {
            table: E::resource_name(),
            message: format!("payload is not an object: {}", other),
        }),
        Err(e) => Err(SyncError::Decode {
            table: E::resource_name(),
            message: e.to_string(),
        }),
    }
}
