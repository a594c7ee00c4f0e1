//! Entity traits defining the record contract shared by every synced table

use crate::core::field::FieldValue;
use crate::core::query::Embed;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

/// Base trait for all records mirrored from the remote store.
///
/// Every record has:
/// - id: opaque unique identifier assigned by the store
/// - owner: the identity whose row-level scope the record lives in
/// - created_at: creation timestamp, the collection ordering key
/// - updated_at: last modification timestamp
///
/// The associated `Draft` is what a caller supplies to create a record and
/// `Patch` is a partial update where unset fields are left untouched.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Insert payload, validated before it reaches the store
    type Draft: Serialize + Validate + Send + Sync;

    /// Partial update; only set fields serialise
    type Patch: Serialize + Send + Sync;

    /// The remote table name (e.g., "projects")
    fn resource_name() -> &'static str;

    /// The singular name used in messages (e.g., "project")
    fn resource_name_singular() -> &'static str;

    /// Related tables whose display columns are embedded on read
    fn embeds() -> &'static [Embed] {
        &[]
    }

    // === Core Entity Fields ===

    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;

    /// Get the owner identity
    fn owner_id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Set the last update timestamp
    fn touch(&mut self, at: DateTime<Utc>);

    /// Merge the set fields of a patch into this record
    ///
    /// Embedded related names are not refreshed.
    fn apply_patch(&mut self, patch: &Self::Patch);
}

/// Trait for records that the screens search and filter.
pub trait Data: Entity {
    /// Get the display name of this record
    fn name(&self) -> &str;

    /// Fields matched by free-text search
    fn indexed_fields() -> &'static [&'static str];

    /// Get the value of a specific field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Case-insensitive substring match over `indexed_fields`
    fn matches_search(&self, term: &str) -> bool {
        Self::indexed_fields().iter().any(|field| {
            self.field_value(field)
                .is_some_and(|value| value.contains_ci(term))
        })
    }
}
