//! Graph statistics

use crate::graph::{Label, RelationKind};
use crate::storage::{GraphStore, StorageResult};
use serde::Serialize;
use tracing::info;

/// Node and relation counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PedigreeStats {
    pub persons: usize,
    pub females: usize,
    pub males: usize,
    pub founders: usize,
    pub leaves: usize,
    pub is_child: usize,
    pub is_father: usize,
    pub is_mother: usize,
    pub is_parent: usize,
}

impl PedigreeStats {
    pub fn collect<S: GraphStore + ?Sized>(store: &S) -> StorageResult<Self> {
        Ok(Self {
            persons: store.count_persons(Label::Person)?,
            females: store.count_persons_with_sex("F")?,
            males: store.count_persons_with_sex("M")?,
            founders: store.count_persons(Label::Founder)?,
            leaves: store.count_persons(Label::Leaf)?,
            is_child: store.count_relations(RelationKind::IsChild)?,
            is_father: store.count_relations(RelationKind::IsFather)?,
            is_mother: store.count_relations(RelationKind::IsMother)?,
            is_parent: store.count_relations(RelationKind::IsParent)?,
        })
    }

    /// Total relations of every kind
    pub fn relations(&self) -> usize {
        self.is_child + self.is_father + self.is_mother + self.is_parent
    }

    pub fn log(&self) {
        info!("NODE STATS");
        info!("Person:  {}", self.persons);
        info!("Female:  {}", self.females);
        info!("Male:    {}", self.males);
        info!("Founder: {}", self.founders);
        info!("Leaf:    {}", self.leaves);
        info!("RELATIONSHIP STATS");
        info!("is_child:  {}", self.is_child);
        info!("is_father: {}", self.is_father);
        info!("is_mother: {}", self.is_mother);
        info!("is_parent: {}", self.is_parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PersonId;
    use crate::storage::{OpenStore, SqliteStore};

    #[test]
    fn test_counts() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_unique_index(Label::Person, "ind").unwrap();
        let (mother, child) = (PersonId::from("1"), PersonId::from("2"));
        store.upsert_person(&mother, Some("F")).unwrap();
        store.upsert_person(&child, Some("M")).unwrap();
        store.upsert_relation(&child, RelationKind::IsChild, &mother).unwrap();
        store.upsert_relation(&mother, RelationKind::IsMother, &child).unwrap();
        store.upsert_relation(&mother, RelationKind::IsParent, &child).unwrap();
        store.add_label(&mother, Label::Founder).unwrap();

        let stats = PedigreeStats::collect(&store).unwrap();
        assert_eq!(stats.persons, 2);
        assert_eq!((stats.females, stats.males), (1, 1));
        assert_eq!(stats.founders, 1);
        assert_eq!(stats.leaves, 0);
        assert_eq!(stats.is_father, 0);
        assert_eq!(stats.relations(), 3);
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(PedigreeStats::collect(&store).unwrap(), PedigreeStats::default());
    }
}
