//! Ingestion: pedigree rows to idempotent graph mutations
//!
//! Each record `(ind, father, mother, sex)` becomes:
//! 1. an upsert of `ind` with its sex
//! 2. for each recorded parent, a bare upsert of the parent followed by
//!    `ind -is_child-> parent`, `parent -is_father|is_mother-> ind` and
//!    `parent -is_parent-> ind`
//!
//! Rows are all decoded before anything is written, so a malformed row
//! aborts the call with the graph untouched. Mutations are applied in
//! batches of `batch_size` records, one transaction per batch; re-running
//! the same input converges to the same graph.

use crate::config::PedigreeConfig;
use crate::graph::{
    Genealogy, Label, PedigreeResult, PersonId, RawRow, Record, Relation, RelationKind, Warning,
};
use crate::pedfile::PedigreeReader;
use crate::storage::{GraphStore, IndexStatus, Mutation, StorageResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Summary of one ingestion call
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    /// Rows decoded from the input
    pub rows: usize,
    /// Distinct individuals among those rows
    pub individuals: usize,
    pub persons_before: usize,
    pub persons_after: usize,
    pub relations_before: usize,
    pub relations_after: usize,
    /// Storage transactions used
    pub batches: usize,
    /// Whether a node with the missing-parent identifier had to be removed
    pub sentinel_removed: bool,
    pub index: IndexStatus,
    pub warnings: Vec<Warning>,
    pub completed_at: DateTime<Utc>,
}

impl IngestionReport {
    /// Number of duplicate-identifier warnings
    pub fn duplicates(&self) -> usize {
        crate::graph::duplicate_count(&self.warnings)
    }
}

/// Turns pedigree records into graph mutations against a store
pub struct Ingestor<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    config: &'a PedigreeConfig,
}

impl<'a, S: GraphStore + ?Sized> Ingestor<'a, S> {
    pub fn new(store: &'a S, config: &'a PedigreeConfig) -> Self {
        Self { store, config }
    }

    /// Read a pedigree file with the configured format and ingest it
    pub fn ingest_file(&self, path: impl AsRef<Path>) -> PedigreeResult<IngestionReport> {
        let rows = PedigreeReader::new(self.config.format.clone()).read_path(path)?;
        self.ingest(rows)
    }

    /// Ingest raw rows
    pub fn ingest(&self, source: impl IntoIterator<Item = RawRow>) -> PedigreeResult<IngestionReport> {
        let sentinel = self.config.sentinel.as_str();

        let records = source
            .into_iter()
            .map(|row| Record::from_row(&row, sentinel))
            .collect::<PedigreeResult<Vec<_>>>()?;

        let mut warnings = Vec::new();

        let index = self.store.ensure_unique_index(Label::Person, "ind")?;
        if index == IndexStatus::AlreadyExists {
            let warning = Warning::ConstraintAlreadyExists {
                label: Label::Person,
                property: "ind".to_string(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        let persons_before = self.store.count_persons(Label::Person)?;
        let relations_before = self.relation_count()?;

        // Plan every record before writing so strict mode can refuse the
        // whole call.
        let mut seen = Genealogy::new();
        let mut plans = Vec::with_capacity(records.len());
        for record in &records {
            // A stored record competes with the first row for its individual.
            if !seen.contains(&record.ind) {
                if let Some(stored) = self.stored_record(&record.ind)? {
                    seen.add(stored);
                }
            }
            let previous = seen.get(&record.ind).cloned();

            let outcome = if self.config.strict {
                seen.add_strict(record.clone())?
            } else {
                seen.add(record.clone())
            };
            warnings.extend(outcome.warning(record));
            plans.push(self.plan(record, previous.as_ref()));
        }

        let mut batches = 0;
        for chunk in plans.chunks(self.config.batch_size) {
            let batch: Vec<Mutation> = chunk.concat();
            self.store.apply(&batch)?;
            batches += 1;
            debug!("Committed batch {} ({} records, {} mutations)", batches, chunk.len(), batch.len());
        }

        let sentinel_removed = self.remove_sentinel()?;

        let report = IngestionReport {
            rows: records.len(),
            individuals: seen.len(),
            persons_before,
            persons_after: self.store.count_persons(Label::Person)?,
            relations_before,
            relations_after: self.relation_count()?,
            batches,
            sentinel_removed,
            index,
            warnings,
            completed_at: Utc::now(),
        };

        info!(
            "Ingested {} rows ({} individuals): persons {} -> {}, relations {} -> {}",
            report.rows,
            report.individuals,
            report.persons_before,
            report.persons_after,
            report.relations_before,
            report.relations_after
        );
        if report.duplicates() > 0 {
            warn!("{} duplicate identifiers were over-written", report.duplicates());
        }

        Ok(report)
    }

    /// Mutations for one record, nodes first
    ///
    /// When `previous` is a different record for the same individual, the
    /// parent relations it created and the new record no longer names are
    /// removed, so the later record fully replaces the earlier one.
    fn plan(&self, record: &Record, previous: Option<&Record>) -> Vec<Mutation> {
        let sentinel = self.config.sentinel.as_str();
        let parents = record.parents(sentinel);

        let mut mutations = vec![Mutation::UpsertPerson {
            id: record.ind.clone(),
            sex: Some(record.sex.clone()),
        }];

        if let Some(previous) = previous.filter(|p| *p != record) {
            for (role, old) in previous.parents(sentinel) {
                if parents.iter().any(|(r, p)| *r == role && *p == old) {
                    continue;
                }
                mutations.push(Mutation::RemoveRelation(Relation::new(
                    old.clone(),
                    role.relation(),
                    record.ind.clone(),
                )));
                if !parents.iter().any(|(_, p)| *p == old) {
                    mutations.push(Mutation::RemoveRelation(Relation::new(
                        record.ind.clone(),
                        RelationKind::IsChild,
                        old.clone(),
                    )));
                    mutations.push(Mutation::RemoveRelation(Relation::new(
                        old.clone(),
                        RelationKind::IsParent,
                        record.ind.clone(),
                    )));
                }
            }
        }

        for (_, parent) in &parents {
            mutations.push(Mutation::UpsertPerson {
                id: (*parent).clone(),
                sex: None,
            });
        }
        for (role, parent) in parents {
            mutations.extend(
                Relation::parent_links(&record.ind, parent, role)
                    .into_iter()
                    .map(Mutation::UpsertRelation),
            );
        }

        mutations
    }

    /// The complete record stored for `id`
    ///
    /// A node that so far only exists as someone's parent has no sex and
    /// counts as no record at all.
    fn stored_record(&self, id: &PersonId) -> StorageResult<Option<Record>> {
        let row = self.store.get_record(id)?;
        Ok(row
            .filter(|r| r.sex.is_some())
            .map(|r| r.into_record(&self.config.sentinel)))
    }

    /// Detach and delete the missing-parent node if one exists
    fn remove_sentinel(&self) -> StorageResult<bool> {
        let sentinel = PersonId::from_string(self.config.sentinel.as_str());
        if !self.store.contains_person(&sentinel)? {
            return Ok(false);
        }
        info!("Detaching and deleting \"null\" node ind={}", sentinel);
        self.store.detach_delete(&sentinel)?;
        Ok(true)
    }

    fn relation_count(&self) -> StorageResult<usize> {
        RelationKind::ALL
            .into_iter()
            .map(|kind| self.store.count_relations(kind))
            .sum()
    }
}
