//! PedGraph: the main entry point for a pedigree graph

use super::genealogy::Genealogy;
use super::node::PersonId;
use super::record::{RawRow, Record};
use crate::classify::{ClassificationReport, Classifier};
use crate::config::{ConfigError, PedigreeConfig};
use crate::ingest::{IngestionReport, Ingestor};
use crate::pedfile::PedigreeWriter;
use crate::reconstruct::{Reconstruction, Reconstructor};
use crate::stats::PedigreeStats;
use crate::storage::{GraphStore, OpenStore, SqliteStore, StorageError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur in pedigree operations
#[derive(Debug, Error)]
pub enum PedigreeError {
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("input is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("no probands given")]
    EmptyProbandSet,

    #[error("conflicting records for ind={id}: {previous} then {current}")]
    ConflictingDuplicate {
        id: PersonId,
        previous: Box<Record>,
        current: Box<Record>,
    },

    #[error("output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PedigreeError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PedigreeError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type for pedigree operations
pub type PedigreeResult<T> = Result<T, PedigreeError>;

/// Everything `build` did
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub ingestion: IngestionReport,
    pub classification: ClassificationReport,
    pub stats: PedigreeStats,
}

/// A pedigree graph over some storage backend
///
/// Owns the store and the configuration every operation reads its
/// sentinel, strictness and file format from.
pub struct PedGraph<S: GraphStore> {
    store: S,
    config: PedigreeConfig,
}

impl PedGraph<SqliteStore> {
    /// Open (or create) a SQLite-backed graph at `path`
    pub fn open(path: impl AsRef<Path>, config: PedigreeConfig) -> PedigreeResult<Self> {
        Self::with_store(SqliteStore::open(path)?, config)
    }

    /// An in-memory SQLite-backed graph
    pub fn open_in_memory(config: PedigreeConfig) -> PedigreeResult<Self> {
        Self::with_store(SqliteStore::open_in_memory()?, config)
    }
}

impl<S: GraphStore> PedGraph<S> {
    /// Wrap an existing store; the configuration is validated first
    pub fn with_store(store: S, config: PedigreeConfig) -> PedigreeResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PedigreeConfig {
        &self.config
    }

    /// Ingest a pedigree file, classify founders and leaves, and log the
    /// resulting graph statistics
    pub fn build(&self, path: impl AsRef<Path>) -> PedigreeResult<BuildReport> {
        let ingestion = self.ingest_file(path)?;
        let classification = self.classify()?;
        let stats = self.stats()?;
        stats.log();
        Ok(BuildReport {
            ingestion,
            classification,
            stats,
        })
    }

    pub fn ingest_file(&self, path: impl AsRef<Path>) -> PedigreeResult<IngestionReport> {
        Ingestor::new(&self.store, &self.config).ingest_file(path)
    }

    pub fn ingest_rows(&self, rows: impl IntoIterator<Item = RawRow>) -> PedigreeResult<IngestionReport> {
        Ingestor::new(&self.store, &self.config).ingest(rows)
    }

    /// Recompute `Founder` and `Leaf` labels from the current relations
    pub fn classify(&self) -> PedigreeResult<ClassificationReport> {
        Ok(Classifier::new(&self.store).classify()?)
    }

    /// Genealogy of `probands` and all their ancestors
    pub fn reconstruct(&self, probands: &[PersonId]) -> PedigreeResult<Reconstruction> {
        self.reconstructor().reconstruct(probands)
    }

    /// Every descendant of `ids`, optionally limited to `max_generations`
    pub fn descendants(
        &self,
        ids: &[PersonId],
        max_generations: Option<usize>,
    ) -> PedigreeResult<BTreeSet<PersonId>> {
        Ok(self.reconstructor().descendants(ids, max_generations)?)
    }

    /// The whole graph as a genealogy
    pub fn export_all(&self) -> PedigreeResult<Genealogy> {
        self.reconstructor().export_all()
    }

    /// Write a genealogy with the configured format to a new file
    pub fn write_csv(&self, genealogy: &Genealogy, path: impl AsRef<Path>) -> PedigreeResult<()> {
        PedigreeWriter::new(self.config.format.clone()).write_path(genealogy, path)
    }

    pub fn stats(&self) -> PedigreeResult<PedigreeStats> {
        Ok(PedigreeStats::collect(&self.store)?)
    }

    /// Release the store
    pub fn close(self) -> PedigreeResult<()> {
        self.store.close()?;
        info!("Closed pedigree graph");
        Ok(())
    }

    fn reconstructor(&self) -> Reconstructor<'_, S> {
        Reconstructor::new(&self.store, &self.config)
    }
}
