//! Table store trait: the boundary to the hosted backend

use crate::core::query::{Embed, Row, SelectQuery};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Per-table row storage with owner filtering, ordering and embedded joins
///
/// Rows travel as JSON objects so the store stays agnostic to the record
/// types layered on top of it. Row visibility beyond the owner filter is the
/// backend's business (row-level policies), not this trait's.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Read every row owned by `query.owner`, embeds attached, in `query.order`
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>>;

    /// Insert one row and return it as stored, embeds attached
    ///
    /// The store fills `id`, `created_at` and `updated_at` when absent.
    async fn insert(&self, table: &str, row: Row, embeds: &[Embed]) -> Result<Row>;

    /// Overwrite the given columns of the row with this id
    ///
    /// Updating an id that does not exist succeeds and changes nothing.
    async fn update(&self, table: &str, id: &Uuid, fields: Row) -> Result<()>;

    /// Delete the row with this id
    ///
    /// Deleting an id that does not exist succeeds and changes nothing.
    async fn delete(&self, table: &str, id: &Uuid) -> Result<()>;
}
