//! Search and status filters behind the list screens

use crate::core::entity::Data;
use crate::entities::{Client, Invoice, Project};

/// Status slug that matches every record
pub const ALL_STATUSES: &str = "all";

/// A predicate over one kind of record
pub trait RecordFilter<T> {
    fn matches(&self, record: &T) -> bool;

    /// Records passing the filter, in collection order
    fn apply<'a>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

fn status_matches(filter: &str, slug: Option<String>) -> bool {
    filter == ALL_STATUSES || slug.is_some_and(|slug| slug == filter)
}

/// Free-text search over client name and contact name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub search: String,
}

impl ClientFilter {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
        }
    }
}

impl RecordFilter<Client> for ClientFilter {
    fn matches(&self, client: &Client) -> bool {
        client.matches_search(&self.search)
    }
}

/// Search over project and client names plus a status slug
///
/// A project without a status only passes the `all` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFilter {
    pub search: String,
    pub status: String,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: ALL_STATUSES.to_string(),
        }
    }
}

impl ProjectFilter {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Default::default()
        }
    }

    /// Restrict to a status slug such as `in-progress`
    pub fn status(mut self, slug: impl Into<String>) -> Self {
        self.status = slug.into();
        self
    }
}

impl RecordFilter<Project> for ProjectFilter {
    fn matches(&self, project: &Project) -> bool {
        project.matches_search(&self.search)
            && status_matches(&self.status, project.status.as_ref().map(|s| s.slug()))
    }
}

/// Search over client name, invoice number and project name plus a status slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub search: String,
    pub status: String,
}

impl Default for InvoiceFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: ALL_STATUSES.to_string(),
        }
    }
}

impl InvoiceFilter {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Default::default()
        }
    }

    /// Restrict to a status slug such as `paid`
    pub fn status(mut self, slug: impl Into<String>) -> Self {
        self.status = slug.into();
        self
    }
}

impl RecordFilter<Invoice> for InvoiceFilter {
    fn matches(&self, invoice: &Invoice) -> bool {
        invoice.matches_search(&self.search)
            && status_matches(&self.status, invoice.status.as_ref().map(|s| s.slug()))
    }
}
