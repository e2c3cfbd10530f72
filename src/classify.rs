//! Founder and leaf classification
//!
//! A founder has no recorded parent: no outgoing `is_child` relation. A
//! leaf has no recorded child: no incoming `is_child` relation. Labels are
//! recomputed from the relations on every run, so a node that gained a
//! parent or child since the last run loses its stale label.

use crate::graph::{Label, PersonId, RelationKind};
use crate::storage::{GraphStore, Mutation, StorageResult};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// Outcome of one classification run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationReport {
    /// Nodes labelled `Founder` afterwards
    pub founders: usize,
    /// Nodes labelled `Leaf` afterwards
    pub leaves: usize,
    pub labels_added: usize,
    pub labels_removed: usize,
}

pub struct Classifier<'a, S: GraphStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: GraphStore + ?Sized> Classifier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn classify(&self) -> StorageResult<ClassificationReport> {
        let mut report = ClassificationReport::default();

        info!("Labelling founder nodes.");
        let founders = self
            .store
            .nodes_without_outgoing(RelationKind::IsChild, Label::Person)?;
        report.founders = founders.len();
        self.sync(Label::Founder, founders, &mut report)?;

        info!("Labelling leaf nodes.");
        let leaves = self
            .store
            .nodes_without_incoming(RelationKind::IsChild, Label::Person)?;
        report.leaves = leaves.len();
        self.sync(Label::Leaf, leaves, &mut report)?;

        info!(
            "Labelled {} founders and {} leaves ({} labels added, {} removed)",
            report.founders, report.leaves, report.labels_added, report.labels_removed
        );
        Ok(report)
    }

    /// Make `label` be carried by exactly `wanted`
    fn sync(&self, label: Label, wanted: Vec<PersonId>, report: &mut ClassificationReport) -> StorageResult<()> {
        let wanted: BTreeSet<PersonId> = wanted.into_iter().collect();
        let current: BTreeSet<PersonId> = self.store.person_ids(label)?.into_iter().collect();

        let mut batch = Vec::new();
        for id in wanted.difference(&current) {
            batch.push(Mutation::AddLabel {
                id: id.clone(),
                label,
            });
            report.labels_added += 1;
        }
        for id in current.difference(&wanted) {
            batch.push(Mutation::RemoveLabel {
                id: id.clone(),
                label,
            });
            report.labels_removed += 1;
        }

        if !batch.is_empty() {
            self.store.apply(&batch)?;
        }
        Ok(())
    }
}
