//! Core pedigree data structures

mod edge;
mod engine;
mod genealogy;
mod node;
mod record;
mod warning;

pub use edge::{ParentRole, Relation, RelationKind};
pub use engine::{BuildReport, PedGraph, PedigreeError, PedigreeResult};
pub use genealogy::{AddOutcome, Genealogy};
pub use node::{Label, Person, PersonId};
pub use record::{RawRow, Record, RECORD_COLUMNS};
pub use warning::{duplicate_count, Warning};
