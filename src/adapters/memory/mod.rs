//! In-memory adapters.
//!
//! - `InMemoryStore` - Implements every storage port; used by tests and dry runs

mod store;

pub use store::InMemoryStore;
