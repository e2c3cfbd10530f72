//! Storage trait definitions

use crate::graph::{Label, Person, PersonId, Record, Relation, RelationKind};
use crate::query::{self, Direction};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Any of these means the store could not be reached or could not answer;
/// callers propagate them rather than retrying or swallowing.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection lock poisoned")]
    LockPoisoned,

    #[error("Unsupported unique index on (:{label} {{{property}}})")]
    UnsupportedIndex { label: Label, property: String },

    #[error("Unknown label in store: {0}")]
    UnknownLabel(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of `ensure_unique_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Created,
    AlreadyExists,
}

/// A single graph mutation
///
/// Every variant is idempotent: applying it a second time leaves the graph
/// as the first application did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create the person if missing. `Some(sex)` overwrites the stored sex;
    /// `None` leaves an existing sex untouched.
    UpsertPerson { id: PersonId, sex: Option<String> },
    /// Create the relation if missing. Both endpoints must already exist.
    UpsertRelation(Relation),
    /// Remove the relation if present.
    RemoveRelation(Relation),
    AddLabel { id: PersonId, label: Label },
    RemoveLabel { id: PersonId, label: Label },
    /// Remove every relation touching the person, then the person.
    DetachDelete(PersonId),
}

/// A person as seen through its parent relations
///
/// `father` and `mother` come from at most one inbound `is_father` and one
/// inbound `is_mother` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub id: PersonId,
    pub father: Option<PersonId>,
    pub mother: Option<PersonId>,
    pub sex: Option<String>,
}

impl PersonRow {
    /// Convert to a tabular record, writing absent values as `sentinel`
    pub fn into_record(self, sentinel: &str) -> Record {
        let absent = || PersonId::from_string(sentinel);
        Record {
            ind: self.id,
            father: self.father.unwrap_or_else(absent),
            mother: self.mother.unwrap_or_else(absent),
            sex: self.sex.unwrap_or_else(|| sentinel.to_string()),
        }
    }
}

/// Trait for graph storage backends
///
/// Implementations must be thread-safe (Send + Sync) so read-only queries
/// can be shared between workers. Writes are expected from a single
/// ingestion at a time.
pub trait GraphStore: Send + Sync {
    // === Constraints ===

    /// Guarantee that `property` is unique among nodes labelled `label`.
    /// Calling it again is a no-op reported as `AlreadyExists`.
    fn ensure_unique_index(&self, label: Label, property: &str) -> StorageResult<IndexStatus>;

    // === Mutations ===

    /// Apply mutations in order as one unit: either all of them are
    /// visible afterwards or none are.
    fn apply(&self, batch: &[Mutation]) -> StorageResult<()>;

    fn upsert_person(&self, id: &PersonId, sex: Option<&str>) -> StorageResult<()> {
        self.apply(&[Mutation::UpsertPerson {
            id: id.clone(),
            sex: sex.map(str::to_string),
        }])
    }

    fn upsert_relation(&self, from: &PersonId, kind: RelationKind, to: &PersonId) -> StorageResult<()> {
        self.apply(&[Mutation::UpsertRelation(Relation::new(from.clone(), kind, to.clone()))])
    }

    fn add_label(&self, id: &PersonId, label: Label) -> StorageResult<()> {
        self.apply(&[Mutation::AddLabel { id: id.clone(), label }])
    }

    fn detach_delete(&self, id: &PersonId) -> StorageResult<()> {
        self.apply(&[Mutation::DetachDelete(id.clone())])
    }

    // === Node queries ===

    fn contains_person(&self, id: &PersonId) -> StorageResult<bool>;

    /// Load a person with its sex and labels
    fn load_person(&self, id: &PersonId) -> StorageResult<Option<Person>>;

    /// Identifiers of every node carrying `label`, in order
    fn person_ids(&self, label: Label) -> StorageResult<Vec<PersonId>>;

    /// Nodes carrying `label` with no outgoing relation of `kind`
    fn nodes_without_outgoing(&self, kind: RelationKind, label: Label) -> StorageResult<Vec<PersonId>>;

    /// Nodes carrying `label` with no incoming relation of `kind`
    fn nodes_without_incoming(&self, kind: RelationKind, label: Label) -> StorageResult<Vec<PersonId>>;

    // === Relation queries ===

    /// Distinct one-hop neighbours of any of `ids` along `kind`
    fn neighbors(
        &self,
        ids: &[PersonId],
        kind: RelationKind,
        direction: Direction,
    ) -> StorageResult<BTreeSet<PersonId>>;

    /// Every node reachable from `starts` by one or more hops along `kind`
    fn traverse_variable_length(
        &self,
        starts: &[PersonId],
        kind: RelationKind,
        direction: Direction,
    ) -> StorageResult<BTreeSet<PersonId>> {
        query::closure(self, starts, kind, direction)
    }

    /// The person with its recorded parents, or `None` if not in the graph
    fn get_record(&self, id: &PersonId) -> StorageResult<Option<PersonRow>>;

    // === Counts ===

    fn count_persons(&self, label: Label) -> StorageResult<usize>;

    fn count_persons_with_sex(&self, sex: &str) -> StorageResult<usize>;

    fn count_relations(&self, kind: RelationKind) -> StorageResult<usize>;

    /// Release the underlying connection
    fn close(self) -> StorageResult<()>
    where
        Self: Sized;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
