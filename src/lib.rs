//! Pedgraph: a graph database for pedigree analysis
//!
//! Loads tabular pedigrees (`ind, father, mother, sex`) into a typed graph,
//! labels founders and leaves, and reconstructs the genealogy of any set of
//! probands by following parent links back to the founders.
//!
//! # Core Concepts
//!
//! - **Persons**: one node per individual, keyed by a unique identifier
//! - **Relations**: `is_child` (child to parent) and `is_father`,
//!   `is_mother`, `is_parent` (parent to child)
//! - **Genealogy**: a set of records closed under "parent of"
//!
//! # Example
//!
//! ```
//! use pedgraph::{PedGraph, PedigreeConfig, PersonId, RawRow};
//!
//! let graph = PedGraph::open_in_memory(PedigreeConfig::default()).unwrap();
//! let rows = vec![
//!     RawRow::new(2, vec!["1".into(), "0".into(), "0".into(), "F".into()]),
//!     RawRow::new(3, vec!["2".into(), "0".into(), "1".into(), "M".into()]),
//! ];
//! graph.ingest_rows(rows).unwrap();
//! let result = graph.reconstruct(&[PersonId::from("2")]).unwrap();
//! assert_eq!(result.genealogy.len(), 2);
//! ```

mod graph;
pub mod classify;
pub mod config;
pub mod ingest;
pub mod pedfile;
pub mod query;
pub mod reconstruct;
pub mod stats;
pub mod storage;

pub use classify::ClassificationReport;
pub use config::{ConfigError, PedigreeConfig};
pub use graph::{
    duplicate_count, AddOutcome, BuildReport, Genealogy, Label, ParentRole, PedGraph,
    PedigreeError, PedigreeResult, Person, PersonId, RawRow, Record, Relation, RelationKind,
    Warning, RECORD_COLUMNS,
};
pub use ingest::IngestionReport;
pub use pedfile::{CsvFormat, PedigreeReader, PedigreeWriter};
pub use query::{ClosureResult, Direction};
pub use reconstruct::{Reconstruction, ReconstructionReport};
pub use stats::PedigreeStats;
pub use storage::{GraphStore, IndexStatus, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
