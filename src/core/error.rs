//! Typed errors surfaced by the sync layer and its backends
//!
//! # Error Categories
//!
//! - [`SyncError`]: outcome of a collection operation. Remote failures of any
//!   cause (network, permission, constraint) collapse into one variant.
//! - [`StoreError`]: what an HTTP backend reports before it is collapsed.
//! - [`ConfigError`]: configuration loading failures.
//!
//! # Example
//!
//! ```rust,ignore
//! match projects.add(draft).await {
//!     Ok(project) => println!("created {}", project.id),
//!     Err(SyncError::Invalid { .. }) => println!("fix the form"),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use thiserror::Error;
use validator::ValidationErrors;

/// Operation a collection attempted against the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Add,
    Update,
    Delete,
}

impl Operation {
    /// Verb used in user-facing messages ("Failed to add project")
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Add => "add",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Past participle used in success messages ("Project added successfully")
    pub fn past_participle(&self) -> &'static str {
        match self {
            Operation::Fetch => "fetched",
            Operation::Add => "added",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// Result of a sync collection operation
#[derive(Debug, Error)]
pub enum SyncError {
    /// No identity is signed in; the operation was skipped
    #[error("Cannot {operation} {table}: no authenticated identity")]
    Unauthenticated {
        table: &'static str,
        operation: Operation,
    },

    /// Required fields are missing or malformed; nothing was sent
    #[error("Invalid {entity}: {errors}")]
    Invalid {
        entity: &'static str,
        errors: ValidationErrors,
    },

    /// The remote store rejected or failed the call
    #[error("Failed to {operation} {table}: {message}")]
    Remote {
        table: &'static str,
        operation: Operation,
        message: String,
    },

    /// A row came back in a shape the record type cannot read
    #[error("Malformed {table} row: {message}")]
    Decode {
        table: &'static str,
        message: String,
    },
}

impl SyncError {
    /// The operation that produced this error, when one was attempted
    pub fn operation(&self) -> Option<Operation> {
        match self {
            SyncError::Unauthenticated { operation, .. } | SyncError::Remote { operation, .. } => {
                Some(*operation)
            }
            SyncError::Invalid { .. } => Some(Operation::Add),
            SyncError::Decode { .. } => None,
        }
    }

    /// True when local state may now disagree with the store until the next fetch
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Remote { .. } | SyncError::Decode { .. })
    }
}

/// Errors reported by an HTTP table store or auth provider
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the expected JSON shape
    #[error("unexpected response body: {0}")]
    Body(String),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}
