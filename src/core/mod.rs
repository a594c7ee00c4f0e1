//! Core module containing the record contract, the table store boundary and
//! the sync engine built on them

pub mod auth;
pub mod entity;
pub mod error;
pub mod events;
pub mod field;
pub mod query;
pub mod store;
pub mod sync;

pub use auth::{AuthContext, AuthProvider, AuthState, Identity, Session};
pub use entity::{Data, Entity};
pub use error::{ConfigError, Operation, StoreError, SyncError};
pub use events::{EventBus, EventEnvelope, SyncAction, SyncEvent};
pub use field::FieldValue;
pub use query::{Embed, OWNER_COLUMN, Order, Row, SelectQuery};
pub use store::TableStore;
pub use sync::EntitySync;
