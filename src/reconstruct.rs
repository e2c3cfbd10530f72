//! Genealogy reconstruction
//!
//! The genealogy of a set of probands is the probands plus every node
//! reachable from them along `is_child`, each written back as a tabular
//! record. Parents outside that set cannot exist: any parent of a member is
//! itself an ancestor of a proband.

use crate::config::PedigreeConfig;
use crate::graph::{
    AddOutcome, Genealogy, Label, PedigreeError, PedigreeResult, PersonId, Record, RelationKind,
    Warning,
};
use crate::query::{self, Direction};
use crate::storage::{GraphStore, StorageResult};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Summary of one reconstruction
#[derive(Debug, Clone, Serialize)]
pub struct ReconstructionReport {
    /// Distinct probands asked for
    pub probands_requested: usize,
    /// Of those, the ones present in the graph
    pub probands_found: usize,
    /// Ancestors reached, probands excluded unless one descends from another
    pub ancestors: usize,
    /// Individuals in the resulting genealogy
    pub individuals: usize,
    pub warnings: Vec<Warning>,
}

/// A reconstructed genealogy and how it was obtained
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub genealogy: Genealogy,
    pub report: ReconstructionReport,
}

/// Reads genealogies back out of a graph
pub struct Reconstructor<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    config: &'a PedigreeConfig,
}

impl<'a, S: GraphStore + ?Sized> Reconstructor<'a, S> {
    pub fn new(store: &'a S, config: &'a PedigreeConfig) -> Self {
        Self { store, config }
    }

    /// Genealogy of `probands` and all their ancestors
    ///
    /// Probands missing from the graph are skipped and reported in a single
    /// warning. An empty proband list is an error.
    pub fn reconstruct(&self, probands: &[PersonId]) -> PedigreeResult<Reconstruction> {
        let requested: BTreeSet<PersonId> = probands.iter().cloned().collect();
        if requested.is_empty() {
            return Err(PedigreeError::EmptyProbandSet);
        }

        let mut warnings = Vec::new();
        let mut found = Vec::with_capacity(requested.len());
        let mut missing = Vec::new();
        for id in &requested {
            if self.store.contains_person(id)? {
                found.push(id.clone());
            } else {
                missing.push(id.clone());
            }
        }

        if !missing.is_empty() {
            let warning = Warning::ProbandNotFound {
                missing: missing.len(),
                ids: missing,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        info!("Reconstructing genealogy of {} probands.", found.len());
        let ancestors = self
            .store
            .traverse_variable_length(&found, RelationKind::IsChild, Direction::Outgoing)?;
        info!("Found {} ancestors.", ancestors.len());

        let mut universe = ancestors.clone();
        universe.extend(found.iter().cloned());

        info!("Building a genealogy with {} individuals.", universe.len());
        let (genealogy, duplicates) = self.assemble(&universe)?;
        warnings.extend(duplicates);
        info!("Number of individuals in reconstructed genealogy: {}", genealogy.len());

        let report = ReconstructionReport {
            probands_requested: requested.len(),
            probands_found: found.len(),
            ancestors: ancestors.len(),
            individuals: genealogy.len(),
            warnings,
        };
        Ok(Reconstruction { genealogy, report })
    }

    /// Every individual in the graph as a genealogy
    pub fn export_all(&self) -> PedigreeResult<Genealogy> {
        let ids: BTreeSet<PersonId> = self
            .store
            .person_ids(Label::Person)?
            .into_iter()
            .collect();
        let (genealogy, _) = self.assemble(&ids)?;
        info!("Exported {} individuals", genealogy.len());
        Ok(genealogy)
    }

    /// Every descendant of `ids`, following `is_parent`
    pub fn descendants(&self, ids: &[PersonId], max_generations: Option<usize>) -> StorageResult<BTreeSet<PersonId>> {
        let result = query::closure_with_depth(
            self.store,
            ids,
            RelationKind::IsParent,
            Direction::Outgoing,
            max_generations,
        )?;
        debug!(
            "Found {} descendants over {} generations",
            result.reached.len(),
            result.depth()
        );
        Ok(result.reached)
    }

    /// Fetch and collect records for `ids`
    ///
    /// A duplicate identifier among fetched rows means the store is
    /// inconsistent; it is reported, and the later row wins.
    fn assemble(&self, ids: &BTreeSet<PersonId>) -> StorageResult<(Genealogy, Vec<Warning>)> {
        let records = self.fetch(ids)?;

        let mut genealogy = Genealogy::new();
        let mut warnings = Vec::new();
        for record in records {
            match genealogy.add(record.clone()) {
                AddOutcome::Inserted => {}
                AddOutcome::Unchanged => {
                    warn!(ind = %record.ind, "record for ind={} fetched twice", record.ind);
                    warnings.push(Warning::DuplicateIdentifier {
                        id: record.ind.clone(),
                        previous: record.clone(),
                        current: record,
                    });
                }
                outcome @ AddOutcome::Overwritten { .. } => warnings.extend(outcome.warning(&record)),
            }
        }
        Ok((genealogy, warnings))
    }

    /// Records for `ids`, fetched by `config.workers` threads over
    /// contiguous slices of the identifiers
    fn fetch(&self, ids: &BTreeSet<PersonId>) -> StorageResult<Vec<Record>> {
        let ids: Vec<&PersonId> = ids.iter().collect();
        let workers = self.config.workers.max(1);
        if workers == 1 || ids.len() < 2 * workers {
            return self.fetch_slice(&ids);
        }

        let chunk = ids.len().div_ceil(workers);
        std::thread::scope(|scope| -> StorageResult<Vec<Record>> {
            let handles: Vec<_> = ids
                .chunks(chunk)
                .map(|slice| scope.spawn(move || self.fetch_slice(slice)))
                .collect();

            let mut records = Vec::with_capacity(ids.len());
            for handle in handles {
                match handle.join() {
                    Ok(part) => records.extend(part?),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            Ok(records)
        })
    }

    fn fetch_slice(&self, ids: &[&PersonId]) -> StorageResult<Vec<Record>> {
        let sentinel = self.config.sentinel.as_str();
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(row) = self.store.get_record(id)? {
                records.push(row.into_record(sentinel));
            }
        }
        Ok(records)
    }
}
