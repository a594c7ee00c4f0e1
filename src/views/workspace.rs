//! The three collections behind the dashboard, wired to one store

use crate::core::auth::AuthContext;
use crate::core::error::SyncError;
use crate::core::events::{EventBus, EventEnvelope};
use crate::core::store::TableStore;
use crate::core::sync::EntitySync;
use crate::entities::{Client, Invoice, Project};
use crate::views::dashboard::{
    ClientStats, Dashboard, DashboardStats, InvoiceStats, PendingInvoice, ProjectStats,
    RecentProject,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const DEFAULT_RECENT_LIMIT: usize = 3;

/// Clients, projects and invoices for the signed-in identity
///
/// The collections share the store, the auth context and an event bus but
/// are otherwise independent: no operation on one refreshes another.
#[derive(Clone)]
pub struct Workspace {
    auth: AuthContext,
    events: EventBus,
    clients: EntitySync<Client>,
    projects: EntitySync<Project>,
    invoices: EntitySync<Invoice>,
    recent_limit: usize,
}

impl Workspace {
    pub fn new(store: Arc<dyn TableStore>, auth: AuthContext) -> Self {
        let events = EventBus::default();
        Self {
            clients: EntitySync::new(store.clone(), auth.clone()).with_events(events.clone()),
            projects: EntitySync::new(store.clone(), auth.clone()).with_events(events.clone()),
            invoices: EntitySync::new(store, auth.clone()).with_events(events.clone()),
            auth,
            events,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Number of entries in the dashboard's recent lists
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    pub fn clients(&self) -> &EntitySync<Client> {
        &self.clients
    }

    pub fn projects(&self) -> &EntitySync<Project> {
        &self.projects
    }

    pub fn invoices(&self) -> &EntitySync<Invoice> {
        &self.invoices
    }

    /// True while any collection is loading
    pub fn loading(&self) -> bool {
        self.clients.loading() || self.projects.loading() || self.invoices.loading()
    }

    /// Resync all three collections concurrently
    ///
    /// Each collection settles on its own; the first error, in client,
    /// project, invoice order, is returned.
    pub async fn resync_all(&self) -> Result<(), SyncError> {
        let (clients, projects, invoices) = futures::join!(
            self.clients.resync(),
            self.projects.resync(),
            self.invoices.resync(),
        );
        clients?;
        projects?;
        invoices?;
        Ok(())
    }

    /// Spawn one identity watcher per collection
    pub fn watch_identity(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.clients.watch_identity(),
            self.projects.watch_identity(),
            self.invoices.watch_identity(),
        ]
    }

    /// Derive the dashboard from the current collections
    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        let clients = self.clients.items();
        let projects = self.projects.items();
        let invoices = self.invoices.items();

        Dashboard {
            loading: self.loading(),
            stats: DashboardStats::compute(&clients, &projects, &invoices),
            recent_projects: RecentProject::latest(&projects, self.recent_limit),
            pending_invoices: PendingInvoice::latest(&invoices, self.recent_limit, today),
        }
    }

    pub fn client_stats(&self) -> ClientStats {
        ClientStats::compute(&self.clients.items())
    }

    pub fn project_stats(&self, today: NaiveDate) -> ProjectStats {
        ProjectStats::compute(&self.projects.items(), today)
    }

    pub fn invoice_stats(&self) -> InvoiceStats {
        InvoiceStats::compute(&self.invoices.items())
    }
}
