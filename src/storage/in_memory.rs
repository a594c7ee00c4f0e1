//! In-memory implementation of TableStore for testing and development

use crate::core::query::{Embed, OWNER_COLUMN, Order, Row, SelectQuery};
use crate::core::store::TableStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type Table = IndexMap<Uuid, Row>;

/// In-memory table store
///
/// Behaves like the hosted store as far as the sync layer can tell: fills
/// `id` and timestamps on insert, filters reads by owner, orders by
/// `created_at` and resolves embeds from the related table. Uses RwLock for
/// thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryTableStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryTableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row of a table regardless of owner, in insertion order
    pub fn rows(&self, table: &str) -> Result<Vec<Row>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Number of rows in a table regardless of owner
    pub fn count(&self, table: &str) -> Result<usize> {
        Ok(self.rows(table)?.len())
    }
}

fn row_id(row: &Row) -> Option<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn created_at(row: &Row) -> Option<DateTime<Utc>> {
    row.get("created_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn owned_by(row: &Row, owner: &Uuid) -> bool {
    row.get(OWNER_COLUMN)
        .and_then(Value::as_str)
        .is_some_and(|s| Uuid::parse_str(s).ok().as_ref() == Some(owner))
}

fn attach_embeds(tables: &HashMap<String, Table>, row: &mut Row, embeds: &[Embed]) {
    for embed in embeds {
        let related = row
            .get(embed.foreign_key)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .and_then(|id| tables.get(embed.relation).and_then(|t| t.get(&id)));

        let value = match related {
            Some(related) => {
                let columns: Row = embed
                    .columns
                    .iter()
                    .map(|column| {
                        let value = related.get(*column).cloned().unwrap_or(Value::Null);
                        (column.to_string(), value)
                    })
                    .collect();
                Value::Object(columns)
            }
            None => Value::Null,
        };
        row.insert(embed.relation.to_string(), value);
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut rows: Vec<Row> = tables
            .get(query.table)
            .map(|rows| {
                rows.values()
                    .filter(|row| owned_by(row, &query.owner))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Stable sort keeps insertion order between equal timestamps; the
        // reversal for descending order therefore puts later inserts first.
        rows.sort_by_key(created_at);
        if query.order == Order::CreatedDesc {
            rows.reverse();
        }

        for row in rows.iter_mut() {
            attach_embeds(&tables, row, query.embeds);
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Row, embeds: &[Embed]) -> Result<Row> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = match row_id(&row) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                row.insert("id".to_string(), json!(id));
                id
            }
        };
        let now = json!(Utc::now());
        row.entry("created_at").or_insert_with(|| now.clone());
        row.entry("updated_at").or_insert(now);

        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(&id) {
            return Err(anyhow!(
                "duplicate key value violates unique constraint \"{}_pkey\"",
                table
            ));
        }
        rows.insert(id, row.clone());

        attach_embeds(&tables, &mut row, embeds);
        Ok(row)
    }

    async fn update(&self, table: &str, id: &Uuid, fields: Row) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if let Some(row) = tables.get_mut(table).and_then(|rows| rows.get_mut(id)) {
            for (column, value) in fields {
                if column != "id" {
                    row.insert(column, value);
                }
            }
        }

        Ok(())
    }

    async fn delete(&self, table: &str, id: &Uuid) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if let Some(rows) = tables.get_mut(table) {
            rows.shift_remove(id);
        }

        Ok(())
    }
}
