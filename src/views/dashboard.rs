//! Aggregates shown on the dashboard and the list screens' stat cards
//!
//! Everything here is a pure function of the collections passed in; nothing
//! is cached. Collections are expected newest first, which is how
//! `EntitySync` keeps them.

use crate::entities::{Client, Invoice, InvoiceStatus, Project, ProjectStatus};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Shown for a recent project without a client
pub const NO_CLIENT_ASSIGNED: &str = "No client assigned";
/// Shown for a pending invoice without a client
pub const NO_CLIENT: &str = "No client";

/// Headline numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_clients: usize,
    /// Projects labelled In Progress
    pub active_projects: usize,
    /// Invoices labelled Pending
    pub pending_invoices: usize,
    /// Sum of Paid invoice amounts
    pub total_revenue: f64,
}

impl DashboardStats {
    pub fn compute(clients: &[Client], projects: &[Project], invoices: &[Invoice]) -> Self {
        Self {
            total_clients: clients.len(),
            active_projects: projects
                .iter()
                .filter(|p| p.status == Some(ProjectStatus::InProgress))
                .count(),
            pending_invoices: invoices
                .iter()
                .filter(|i| i.has_status(&InvoiceStatus::Pending))
                .count(),
            total_revenue: invoices
                .iter()
                .filter(|i| i.has_status(&InvoiceStatus::Paid))
                .map(|i| i.amount)
                .sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentProject {
    pub id: Uuid,
    pub name: String,
    pub client: String,
    pub status: ProjectStatus,
    pub progress: i32,
}

impl RecentProject {
    /// The first `limit` projects of the collection
    pub fn latest(projects: &[Project], limit: usize) -> Vec<Self> {
        projects
            .iter()
            .take(limit)
            .map(|p| Self {
                id: p.id,
                name: p.name.clone(),
                client: p.client_name().unwrap_or(NO_CLIENT_ASSIGNED).to_string(),
                status: p.effective_status(),
                progress: p.progress.unwrap_or(0),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingInvoice {
    pub id: Uuid,
    pub client: String,
    pub amount: f64,
    pub due_date: Option<NaiveDate>,
    pub overdue: bool,
}

impl PendingInvoice {
    /// The first `limit` invoices not labelled Paid
    pub fn latest(invoices: &[Invoice], limit: usize, today: NaiveDate) -> Vec<Self> {
        invoices
            .iter()
            .filter(|i| !i.has_status(&InvoiceStatus::Paid))
            .take(limit)
            .map(|i| Self {
                id: i.id,
                client: i.client_name().unwrap_or(NO_CLIENT).to_string(),
                amount: i.amount,
                due_date: i.due_date,
                overdue: i.is_overdue(today),
            })
            .collect()
    }
}

/// Everything the dashboard screen renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// True while any of the three collections is still loading
    pub loading: bool,
    pub stats: DashboardStats,
    pub recent_projects: Vec<RecentProject>,
    pub pending_invoices: Vec<PendingInvoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientStats {
    pub total: usize,
    pub active: usize,
}

impl ClientStats {
    /// Only clients explicitly labelled Active count as active
    pub fn compute(clients: &[Client]) -> Self {
        Self {
            total: clients.len(),
            active: clients.iter().filter(|c| c.is_active()).count(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl ProjectStats {
    pub fn compute(projects: &[Project], today: NaiveDate) -> Self {
        let labelled = |status: ProjectStatus| {
            projects
                .iter()
                .filter(|p| p.status.as_ref() == Some(&status))
                .count()
        };

        Self {
            total: projects.len(),
            in_progress: labelled(ProjectStatus::InProgress),
            completed: labelled(ProjectStatus::Completed),
            overdue: projects.iter().filter(|p| p.is_overdue(today)).count(),
        }
    }
}

/// Amount sums per invoice label
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceStats {
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
    /// Sum of invoices labelled Overdue, regardless of due date
    pub overdue: f64,
}

impl InvoiceStats {
    pub fn compute(invoices: &[Invoice]) -> Self {
        let labelled = |status: InvoiceStatus| -> f64 {
            invoices
                .iter()
                .filter(|i| i.has_status(&status))
                .map(|i| i.amount)
                .sum()
        };

        Self {
            total: invoices.iter().map(|i| i.amount).sum(),
            paid: labelled(InvoiceStatus::Paid),
            pending: labelled(InvoiceStatus::Pending),
            overdue: labelled(InvoiceStatus::Overdue),
        }
    }
}
