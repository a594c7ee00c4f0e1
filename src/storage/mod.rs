//! Table store backends

#[cfg(feature = "in-memory")]
pub mod in_memory;
#[cfg(feature = "rest")]
pub mod rest;

#[cfg(feature = "in-memory")]
pub use in_memory::InMemoryTableStore;
#[cfg(feature = "rest")]
pub use rest::{RestAuthProvider, RestTableStore};
