//! Individual pedigree records

use super::edge::ParentRole;
use super::engine::{PedigreeError, PedigreeResult};
use super::node::PersonId;
use serde::{Deserialize, Serialize};

/// Column names of a pedigree record, in canonical order
pub const RECORD_COLUMNS: [&str; 4] = ["ind", "father", "mother", "sex"];

/// One raw input row: its 1-based source line and its fields in canonical
/// column order. Fields are not yet trimmed or validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }
}

/// Everything the pedigree knows about one individual
///
/// Unknown parents are held as the sentinel identifier, exactly as they
/// appear in the tabular form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub ind: PersonId,
    pub father: PersonId,
    pub mother: PersonId,
    pub sex: String,
}

impl Record {
    pub fn new(
        ind: impl Into<PersonId>,
        father: impl Into<PersonId>,
        mother: impl Into<PersonId>,
        sex: impl Into<String>,
    ) -> Self {
        Self {
            ind: ind.into(),
            father: father.into(),
            mother: mother.into(),
            sex: sex.into(),
        }
    }

    /// Decode a raw row into a record
    ///
    /// Fields are trimmed; anything after the fourth is ignored. Fewer than
    /// four fields, an empty field, or an identifier equal to the sentinel
    /// is a `MalformedRecord` naming the row's line.
    pub fn from_row(row: &RawRow, sentinel: &str) -> PedigreeResult<Self> {
        if row.fields.len() < RECORD_COLUMNS.len() {
            return Err(PedigreeError::MalformedRecord {
                line: row.line,
                reason: format!(
                    "expected {} fields, found {}",
                    RECORD_COLUMNS.len(),
                    row.fields.len()
                ),
            });
        }

        let mut values = [""; 4];
        for (i, column) in RECORD_COLUMNS.iter().enumerate() {
            let value = row.fields[i].trim();
            if value.is_empty() {
                return Err(PedigreeError::MalformedRecord {
                    line: row.line,
                    reason: format!("empty \"{}\" field", column),
                });
            }
            values[i] = value;
        }

        let [ind, father, mother, sex] = values;
        if ind == sentinel {
            return Err(PedigreeError::MalformedRecord {
                line: row.line,
                reason: format!("individual id equals the missing-parent value \"{}\"", sentinel),
            });
        }

        Ok(Self::new(ind, father, mother, sex))
    }

    /// The father, unless recorded as absent
    pub fn father_id(&self, sentinel: &str) -> Option<&PersonId> {
        (!self.father.is_sentinel(sentinel)).then_some(&self.father)
    }

    /// The mother, unless recorded as absent
    pub fn mother_id(&self, sentinel: &str) -> Option<&PersonId> {
        (!self.mother.is_sentinel(sentinel)).then_some(&self.mother)
    }

    /// Recorded parents with the slot each one fills
    pub fn parents(&self, sentinel: &str) -> Vec<(ParentRole, &PersonId)> {
        let mut parents = Vec::with_capacity(2);
        if let Some(father) = self.father_id(sentinel) {
            parents.push((ParentRole::Father, father));
        }
        if let Some(mother) = self.mother_id(sentinel) {
            parents.push((ParentRole::Mother, mother));
        }
        parents
    }

    /// Both parents absent
    pub fn is_founder(&self, sentinel: &str) -> bool {
        self.father_id(sentinel).is_none() && self.mother_id(sentinel).is_none()
    }

    /// The record as its four output fields
    pub fn fields(&self) -> [&str; 4] {
        [self.ind.as_str(), self.father.as_str(), self.mother.as_str(), &self.sex]
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.ind, self.father, self.mother, self.sex)
    }
}
