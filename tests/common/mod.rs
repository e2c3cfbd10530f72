//! Common test utilities for pedgraph integration tests
//!
//! Fixed fixtures for the small worked pedigrees plus a seeded generator
//! for larger random ones.

#![allow(dead_code)]

pub mod pedigree;

pub use pedigree::{ancestors_in, random_pedigree, PedigreeShape};

use pedgraph::{PedGraph, PedigreeConfig, RawRow, Record, SqliteStore};

/// Three generations: 1 and 2 are the parents of 3 and 4, who are the
/// parents of 5.
pub const SCENARIO_CSV: &str = "ind,father,mother,sex\n\
1,0,0,F\n\
2,0,0,M\n\
3,1,2,F\n\
4,1,2,M\n\
5,3,4,F\n";

pub fn scenario_records() -> Vec<Record> {
    vec![
        Record::new("1", "0", "0", "F"),
        Record::new("2", "0", "0", "M"),
        Record::new("3", "1", "2", "F"),
        Record::new("4", "1", "2", "M"),
        Record::new("5", "3", "4", "F"),
    ]
}

/// Rows as a reader would produce them, starting after a header line
pub fn to_rows(records: &[Record]) -> Vec<RawRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| RawRow::new(i + 2, r.fields().iter().map(|f| f.to_string()).collect()))
        .collect()
}

pub fn memory_graph() -> PedGraph<SqliteStore> {
    PedGraph::open_in_memory(PedigreeConfig::default()).unwrap()
}

/// An in-memory graph holding `records`, classified
pub fn graph_with(records: &[Record]) -> PedGraph<SqliteStore> {
    let graph = memory_graph();
    graph.ingest_rows(to_rows(records)).unwrap();
    graph.classify().unwrap();
    graph
}
