//! Shared test harness for table store and sync testing
//!
//! Provides row builders, a `FlakyStore` wrapper whose reads and writes can be
//! made to fail or pause on demand, a mock PostgREST backend served by axum,
//! and the `table_store_tests!` contract suite.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod table_store_tests;
pub mod mock_backend;

use agency_sync::core::auth::{AuthContext, Identity};
use agency_sync::core::query::{Embed, Row, SelectQuery};
use agency_sync::core::store::TableStore;
use agency_sync::storage::InMemoryTableStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Rows and dates
// ---------------------------------------------------------------------------

/// Unwrap a `json!` object literal into a row
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub fn row_id(row: &Row) -> Uuid {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("row has an id")
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

/// Fixed "today" used by the date-sensitive tests
pub fn today() -> NaiveDate {
    day("2024-06-10")
}

pub fn signed_in(user_id: Uuid) -> AuthContext {
    let auth = AuthContext::new();
    auth.sign_in(Identity::new(user_id));
    auth
}

/// Poll `condition` until it holds, panicking after two seconds
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

// ---------------------------------------------------------------------------
// FlakyStore — an in-memory store with failure and pause switches
// ---------------------------------------------------------------------------

/// Wraps `InMemoryTableStore`; reads and writes can be made to fail, and
/// reads can be held until released.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryTableStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    pause_reads: Arc<AtomicBool>,
    read_entered: Arc<Notify>,
    read_release: Arc<Notify>,
    selects: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Hold subsequent reads until `release_read` is called
    pub fn pause_reads(&self, pause: bool) {
        self.pause_reads.store(pause, Ordering::SeqCst);
    }

    /// Wait until a paused read has started
    pub async fn read_started(&self) {
        self.read_entered.notified().await;
    }

    pub fn release_read(&self) {
        self.read_release.notify_one();
    }

    /// Number of select calls that reached the store
    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset by peer"));
        }
        Ok(())
    }
}

#[async_trait]
impl TableStore for FlakyStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if self.pause_reads.load(Ordering::SeqCst) {
            self.read_entered.notify_one();
            self.read_release.notified().await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset by peer"));
        }
        self.inner.select(query).await
    }

    async fn insert(&self, table: &str, row: Row, embeds: &[Embed]) -> Result<Row> {
        self.check_writes()?;
        self.inner.insert(table, row, embeds).await
    }

    async fn update(&self, table: &str, id: &Uuid, fields: Row) -> Result<()> {
        self.check_writes()?;
        self.inner.update(table, id, fields).await
    }

    async fn delete(&self, table: &str, id: &Uuid) -> Result<()> {
        self.check_writes()?;
        self.inner.delete(table, id).await
    }
}
