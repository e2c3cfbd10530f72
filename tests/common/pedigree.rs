//! Seeded random pedigrees

use pedgraph::{PersonId, Record};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};

/// Size and sparsity of a generated pedigree
#[derive(Debug, Clone, Copy)]
pub struct PedigreeShape {
    pub generations: usize,
    pub founders: usize,
    pub per_generation: usize,
    /// Chance that a known parent is recorded as unknown instead
    pub unknown_parent: f64,
}

impl Default for PedigreeShape {
    fn default() -> Self {
        Self {
            generations: 5,
            founders: 12,
            per_generation: 20,
            unknown_parent: 0.15,
        }
    }
}

/// A pedigree in which every named parent is itself a record with a
/// matching sex. Identifiers are `g<generation>_<n>`; `0` means unknown.
pub fn random_pedigree(seed: u64, shape: PedigreeShape) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::new();
    let mut previous: Vec<Record> = Vec::new();

    for n in 0..shape.founders {
        let sex = if n % 2 == 0 { "F" } else { "M" };
        previous.push(Record::new(format!("g0_{n}"), "0", "0", sex));
    }
    records.extend(previous.iter().cloned());

    for generation in 1..shape.generations {
        let fathers: Vec<&Record> = previous.iter().filter(|r| r.sex == "M").collect();
        let mothers: Vec<&Record> = previous.iter().filter(|r| r.sex == "F").collect();

        let mut current = Vec::with_capacity(shape.per_generation);
        for n in 0..shape.per_generation {
            let mut pick = |pool: &[&Record]| -> String {
                match pool.choose(&mut rng) {
                    Some(parent) if !rng.gen_bool(shape.unknown_parent) => parent.ind.to_string(),
                    _ => "0".to_string(),
                }
            };
            let father = pick(&fathers[..]);
            let mother = pick(&mothers[..]);
            let sex = if rng.gen_bool(0.5) { "F" } else { "M" };
            current.push(Record::new(format!("g{generation}_{n}"), father, mother, sex));
        }

        records.extend(current.iter().cloned());
        previous = current;
    }

    records
}

/// Every ancestor of `probands` according to `records`, probands excluded
pub fn ancestors_in(records: &[Record], probands: &[PersonId]) -> BTreeSet<PersonId> {
    let by_id: BTreeMap<&PersonId, &Record> = records.iter().map(|r| (&r.ind, r)).collect();

    let mut seen = BTreeSet::new();
    let mut stack: Vec<&PersonId> = probands.iter().collect();
    while let Some(id) = stack.pop() {
        let Some(record) = by_id.get(id) else { continue };
        for parent in [record.father_id("0"), record.mother_id("0")].into_iter().flatten() {
            if seen.insert(parent.clone()) {
                stack.push(parent);
            }
        }
    }
    seen
}
