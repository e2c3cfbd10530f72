//! Recoverable conditions surfaced alongside a successful operation

use super::node::{Label, PersonId};
use super::record::Record;
use serde::Serialize;

/// A recoverable condition
///
/// Operations log these with `tracing::warn!` when they occur and also
/// return them in their report so callers can count them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The same identifier was given twice with different attributes; the
    /// later record replaced the earlier one.
    DuplicateIdentifier {
        id: PersonId,
        previous: Record,
        current: Record,
    },
    /// Requested probands that are not in the graph.
    ProbandNotFound { missing: usize, ids: Vec<PersonId> },
    /// The requested uniqueness constraint was already in place.
    ConstraintAlreadyExists { label: Label, property: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::DuplicateIdentifier { id, previous, current } => write!(
                f,
                "record with ind={} already exists and will be overwritten: {} -> {}",
                id, previous, current
            ),
            Warning::ProbandNotFound { missing, .. } => write!(
                f,
                "not all input probands found in database, {} missing",
                missing
            ),
            Warning::ConstraintAlreadyExists { label, property } => write!(
                f,
                "an index on (:{} {{{}}}) already exists, will not create",
                label, property
            ),
        }
    }
}

/// Count the duplicate-identifier warnings in a list
pub fn duplicate_count(warnings: &[Warning]) -> usize {
    warnings
        .iter()
        .filter(|w| matches!(w, Warning::DuplicateIdentifier { .. }))
        .count()
}
