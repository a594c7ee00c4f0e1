//! Concrete records: clients, projects and invoices

#[macro_use]
pub mod macros;
pub mod client;
pub mod invoice;
pub mod project;

pub use client::{Client, ClientPatch, ClientStatus, NewClient};
pub use invoice::{Invoice, InvoiceNumber, InvoicePatch, InvoiceStatus, NewInvoice};
pub use project::{NewProject, Project, ProjectPatch, ProjectStatus};

use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Display columns of a related row embedded on read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedName {
    pub name: String,
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
