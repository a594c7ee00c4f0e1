//! # agency-sync
//!
//! Typed client-side sync layer for an agency operations dashboard. Clients,
//! projects and invoices live in a hosted table store; this crate keeps an
//! in-memory copy of each table for the signed-in identity and derives the
//! dashboard from those copies.
//!
//! ## Features
//!
//! - **Write-through collections**: `EntitySync` mutates the store first and
//!   patches its local copy only once the store accepted the change
//! - **Identity scoping**: every read is filtered by owner; switching identity
//!   discards the collection instead of merging
//! - **Explicit auth context**: a cloneable `AuthContext` handle over a watch
//!   channel replaces ambient session lookups
//! - **Tagged results**: operations return `Result<_, SyncError>`; notices are
//!   derived from events on an `EventBus`
//! - **Pluggable backends**: `InMemoryTableStore` for tests and demos,
//!   `RestTableStore` for a PostgREST-style endpoint
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agency_sync::prelude::*;
//!
//! let store = Arc::new(InMemoryTableStore::new());
//! let auth = AuthContext::new();
//! let workspace = Workspace::new(store, auth.clone());
//!
//! auth.sign_in(Identity::new(Uuid::new_v4()));
//! workspace.resync_all().await?;
//!
//! workspace.projects().add(NewProject::new("Website relaunch")).await?;
//! let dashboard = workspace.dashboard(Utc::now().date_naive());
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod storage;
pub mod views;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthProvider, AuthState, Identity, Session},
        entity::{Data, Entity},
        error::{Operation, SyncError},
        events::{EventBus, EventEnvelope, SyncAction, SyncEvent},
        field::FieldValue,
        store::TableStore,
        sync::EntitySync,
    };

    // === Entities ===
    pub use crate::entities::{
        Client, ClientPatch, ClientStatus, Invoice, InvoiceNumber, InvoicePatch, InvoiceStatus,
        NewClient, NewInvoice, NewProject, Project, ProjectPatch, ProjectStatus,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryTableStore;
    #[cfg(feature = "rest")]
    pub use crate::storage::{RestAuthProvider, RestTableStore};

    // === Config ===
    pub use crate::config::{AppConfig, BackendConfig};

    // === Views ===
    pub use crate::views::{
        ClientFilter, Dashboard, DashboardStats, InvoiceFilter, Notice, ProjectFilter,
        RecordFilter, Workspace,
    };

    // === External dependencies ===
    pub use chrono::{NaiveDate, Utc};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
