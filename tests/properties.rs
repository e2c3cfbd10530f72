//! Graph invariants checked over seeded random pedigrees

mod common;

use common::{ancestors_in, graph_with, memory_graph, random_pedigree, to_rows, PedigreeShape};
use pedgraph::{
    Genealogy, GraphStore, Label, PedGraph, PedigreeConfig, PedigreeReader, PersonId, Record,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

const SEEDS: [u64; 4] = [7, 42, 1234, 99_991];

fn as_genealogy(records: &[Record]) -> Genealogy {
    Genealogy::from_records(records.iter().cloned()).0
}

#[test]
fn test_export_round_trips_input() {
    for seed in SEEDS {
        let records = random_pedigree(seed, PedigreeShape::default());
        let graph = graph_with(&records);
        assert_eq!(graph.export_all().unwrap(), as_genealogy(&records), "seed {seed}");
    }
}

#[test]
fn test_reingestion_changes_nothing() {
    for seed in SEEDS {
        let records = random_pedigree(seed, PedigreeShape::default());
        let graph = graph_with(&records);
        let before = graph.stats().unwrap();

        let report = graph.ingest_rows(to_rows(&records)).unwrap();
        graph.classify().unwrap();

        assert_eq!(report.duplicates(), 0, "seed {seed}");
        assert_eq!(graph.stats().unwrap(), before, "seed {seed}");
    }
}

#[test]
fn test_input_order_does_not_matter() {
    for seed in SEEDS {
        let records = random_pedigree(seed, PedigreeShape::default());
        let mut shuffled = records.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed + 1));

        let a = graph_with(&records);
        let b = graph_with(&shuffled);
        assert_eq!(a.export_all().unwrap(), b.export_all().unwrap(), "seed {seed}");
        assert_eq!(a.stats().unwrap(), b.stats().unwrap(), "seed {seed}");
    }
}

#[test]
fn test_batch_size_does_not_matter() {
    let records = random_pedigree(3, PedigreeShape::default());
    let reference = graph_with(&records).export_all().unwrap();

    for batch_size in [1, 7, 64] {
        let config = PedigreeConfig::default().with_batch_size(batch_size);
        let graph = PedGraph::open_in_memory(config).unwrap();
        let report = graph.ingest_rows(to_rows(&records)).unwrap();
        assert_eq!(report.batches, records.len().div_ceil(batch_size));
        assert_eq!(graph.export_all().unwrap(), reference);
    }
}

#[test]
fn test_founders_and_leaves_match_records() {
    for seed in SEEDS {
        let records = random_pedigree(seed, PedigreeShape::default());
        let graph = graph_with(&records);
        let store = graph.store();

        let named_parents: BTreeSet<&PersonId> = records
            .iter()
            .flat_map(|r| [r.father_id("0"), r.mother_id("0")])
            .flatten()
            .collect();

        for record in &records {
            let person = store.load_person(&record.ind).unwrap().unwrap();
            assert_eq!(person.is_founder(), record.is_founder("0"), "{}", record);
            assert_eq!(person.is_leaf(), !named_parents.contains(&record.ind), "{}", record);
        }
    }
}

#[test]
fn test_reconstruction_is_closed_and_minimal() {
    for seed in SEEDS {
        let records = random_pedigree(seed, PedigreeShape::default());
        let graph = graph_with(&records);

        let mut rng = StdRng::seed_from_u64(seed);
        let probands: Vec<PersonId> = records
            .choose_multiple(&mut rng, 4)
            .map(|r| r.ind.clone())
            .collect();

        let result = graph.reconstruct(&probands).unwrap();
        let genealogy = &result.genealogy;

        for record in genealogy {
            for parent in [record.father_id("0"), record.mother_id("0")].into_iter().flatten() {
                assert!(genealogy.contains(parent), "seed {seed}: parent {parent} missing");
            }
        }

        let mut expected = ancestors_in(&records, &probands);
        assert_eq!(result.report.ancestors, expected.len(), "seed {seed}");
        expected.extend(probands.iter().cloned());
        let members: BTreeSet<PersonId> = genealogy.ids().cloned().collect();
        assert_eq!(members, expected, "seed {seed}");
    }
}

#[test]
fn test_sentinel_is_never_stored() {
    for seed in SEEDS {
        let records = random_pedigree(seed, PedigreeShape::default());
        let graph = graph_with(&records);
        assert!(!graph.store().contains_person(&PersonId::from("0")).unwrap());
        assert!(!graph
            .store()
            .person_ids(Label::Person)
            .unwrap()
            .iter()
            .any(|id| id.as_str() == "0"));
    }
}

#[test]
fn test_empty_input() {
    let graph = memory_graph();
    let report = graph.ingest_rows(Vec::new()).unwrap();
    assert_eq!(report.rows, 0);
    assert_eq!(report.persons_after, 0);
    assert!(graph.export_all().unwrap().is_empty());
}

#[test]
fn test_leaf_reconstruction_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    for seed in SEEDS {
        let records = random_pedigree(seed, PedigreeShape::default());
        let graph = graph_with(&records);

        let leaves = graph.store().person_ids(Label::Leaf).unwrap();
        let result = graph.reconstruct(&leaves).unwrap();

        let out = dir.path().join(format!("leaves_{seed}.csv"));
        graph.write_csv(&result.genealogy, &out).unwrap();

        let reread: Vec<Record> = PedigreeReader::default()
            .read_path(&out)
            .unwrap()
            .iter()
            .map(|row| Record::from_row(row, "0").unwrap())
            .collect();
        assert_eq!(as_genealogy(&reread), as_genealogy(&records), "seed {seed}");
    }
}
