//! Storage backends for pedgraph
//!
//! The core talks to the persistent graph only through the `GraphStore`
//! trait. The shipped implementation is `SqliteStore`.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{GraphStore, IndexStatus, Mutation, OpenStore, PersonRow, StorageError, StorageResult};
