//! Genealogy: an in-memory set of records keyed by individual

use super::engine::{PedigreeError, PedigreeResult};
use super::node::PersonId;
use super::record::Record;
use super::warning::Warning;
use std::collections::btree_map::{self, BTreeMap};
use tracing::warn;

/// What happened when a record was added to a genealogy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// First record for this identifier
    Inserted,
    /// Identical record already present
    Unchanged,
    /// A different record was replaced
    Overwritten { previous: Record },
}

impl AddOutcome {
    /// The duplicate-identifier warning for an overwrite, if this was one
    pub fn warning(&self, current: &Record) -> Option<Warning> {
        match self {
            AddOutcome::Overwritten { previous } => Some(Warning::DuplicateIdentifier {
                id: current.ind.clone(),
                previous: previous.clone(),
                current: current.clone(),
            }),
            _ => None,
        }
    }
}

/// A set of individuals keyed by identifier
///
/// Adding a record for an identifier that is already present replaces it
/// and leaves the size unchanged. Iteration is in identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genealogy {
    records: BTreeMap<PersonId, Record>,
}

impl Genealogy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a genealogy, collecting a warning for every overwrite
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> (Self, Vec<Warning>) {
        let mut gen = Self::new();
        let mut warnings = Vec::new();
        for record in records {
            let outcome = gen.add(record.clone());
            warnings.extend(outcome.warning(&record));
        }
        (gen, warnings)
    }

    /// Add a record, replacing any existing record with the same identifier
    pub fn add(&mut self, record: Record) -> AddOutcome {
        match self.records.entry(record.ind.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                AddOutcome::Inserted
            }
            btree_map::Entry::Occupied(mut slot) => {
                if slot.get() == &record {
                    return AddOutcome::Unchanged;
                }
                warn!(
                    ind = %record.ind,
                    "record with ind={} already exists, will be over-written",
                    record.ind
                );
                let previous = slot.insert(record);
                AddOutcome::Overwritten { previous }
            }
        }
    }

    /// Add a record, refusing to replace a conflicting one
    ///
    /// The genealogy is left untouched when this returns an error.
    pub fn add_strict(&mut self, record: Record) -> PedigreeResult<AddOutcome> {
        if let Some(previous) = self.records.get(&record.ind) {
            if previous != &record {
                return Err(PedigreeError::ConflictingDuplicate {
                    id: record.ind.clone(),
                    previous: Box::new(previous.clone()),
                    current: Box::new(record),
                });
            }
        }
        Ok(self.add(record))
    }

    pub fn get(&self, id: &PersonId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.records.contains_key(id)
    }

    /// Number of distinct individuals
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Identifiers in order
    pub fn ids(&self) -> impl Iterator<Item = &PersonId> {
        self.records.keys()
    }
}

impl IntoIterator for Genealogy {
    type Item = Record;
    type IntoIter = btree_map::IntoValues<PersonId, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_values()
    }
}

impl<'a> IntoIterator for &'a Genealogy {
    type Item = &'a Record;
    type IntoIter = btree_map::Values<'a, PersonId, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
