//! SQLite storage backend for pedgraph

use super::traits::{
    GraphStore, IndexStatus, Mutation, OpenStore, PersonRow, StorageError, StorageResult,
};
use crate::graph::{Label, Person, PersonId, RelationKind};
use crate::query::Direction;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Name of the uniqueness constraint on person identifiers
const PERSON_IND_INDEX: &str = "idx_persons_ind_unique";

/// SQLite-backed graph store
///
/// Persons, their labels, and typed relations live in three tables.
/// Relations are keyed by `(source, kind, target)`, so writing the same
/// relation twice leaves a single row. Thread-safe via internal mutex on
/// the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    ///
    /// The unique index on `persons(ind)` is created by
    /// `ensure_unique_index`, not here. Person upserts fail until it exists.
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS persons (
                ind TEXT NOT NULL,
                sex TEXT
            );

            CREATE TABLE IF NOT EXISTS person_labels (
                ind TEXT NOT NULL,
                label TEXT NOT NULL,
                PRIMARY KEY (ind, label)
            );

            CREATE INDEX IF NOT EXISTS idx_person_labels_label
                ON person_labels(label, ind);

            CREATE TABLE IF NOT EXISTS relations (
                source TEXT NOT NULL,
                kind TEXT NOT NULL,
                target TEXT NOT NULL,
                PRIMARY KEY (source, kind, target)
            );

            CREATE INDEX IF NOT EXISTS idx_relations_target
                ON relations(target, kind);
            CREATE INDEX IF NOT EXISTS idx_relations_kind
                ON relations(kind);

            PRAGMA journal_mode = WAL;
            "#,
        )?;

        Ok(())
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn apply_one(tx: &Transaction<'_>, mutation: &Mutation) -> StorageResult<()> {
        match mutation {
            Mutation::UpsertPerson { id, sex: Some(sex) } => {
                tx.execute(
                    r#"
                    INSERT INTO persons (ind, sex) VALUES (?1, ?2)
                    ON CONFLICT(ind) DO UPDATE SET sex = excluded.sex
                    "#,
                    params![id.as_str(), sex],
                )?;
                Self::tag(tx, id, Label::Person)?;
            }
            Mutation::UpsertPerson { id, sex: None } => {
                tx.execute(
                    "INSERT INTO persons (ind, sex) VALUES (?1, NULL) ON CONFLICT(ind) DO NOTHING",
                    params![id.as_str()],
                )?;
                Self::tag(tx, id, Label::Person)?;
            }
            Mutation::UpsertRelation(rel) => {
                tx.execute(
                    "INSERT OR IGNORE INTO relations (source, kind, target) VALUES (?1, ?2, ?3)",
                    params![rel.source.as_str(), rel.kind.as_str(), rel.target.as_str()],
                )?;
            }
            Mutation::RemoveRelation(rel) => {
                tx.execute(
                    "DELETE FROM relations WHERE source = ?1 AND kind = ?2 AND target = ?3",
                    params![rel.source.as_str(), rel.kind.as_str(), rel.target.as_str()],
                )?;
            }
            Mutation::AddLabel { id, label } => {
                Self::tag(tx, id, *label)?;
            }
            Mutation::RemoveLabel { id, label } => {
                tx.execute(
                    "DELETE FROM person_labels WHERE ind = ?1 AND label = ?2",
                    params![id.as_str(), label.as_str()],
                )?;
            }
            Mutation::DetachDelete(id) => {
                tx.execute(
                    "DELETE FROM relations WHERE source = ?1 OR target = ?1",
                    params![id.as_str()],
                )?;
                tx.execute("DELETE FROM person_labels WHERE ind = ?1", params![id.as_str()])?;
                tx.execute("DELETE FROM persons WHERE ind = ?1", params![id.as_str()])?;
            }
        }
        Ok(())
    }

    /// Add a label to an existing person; missing persons are left alone
    fn tag(tx: &Transaction<'_>, id: &PersonId, label: Label) -> StorageResult<()> {
        tx.execute(
            r#"
            INSERT OR IGNORE INTO person_labels (ind, label)
            SELECT ind, ?2 FROM persons WHERE ind = ?1
            "#,
            params![id.as_str(), label.as_str()],
        )?;
        Ok(())
    }

    fn collect_ids(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<PersonId>> {
        let mut stmt = conn.prepare(sql)?;
        let ids = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .map(|r| r.map(PersonId::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn first_parent(conn: &Connection, child: &PersonId, kind: RelationKind) -> StorageResult<Option<PersonId>> {
        let parent = conn
            .query_row(
                "SELECT source FROM relations WHERE target = ?1 AND kind = ?2 ORDER BY source LIMIT 1",
                params![child.as_str(), kind.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(parent.map(PersonId::from))
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl GraphStore for SqliteStore {
    // === Constraints ===

    fn ensure_unique_index(&self, label: Label, property: &str) -> StorageResult<IndexStatus> {
        // Every node is a Person and `ind` is the only key column.
        if label != Label::Person || property != "ind" {
            return Err(StorageError::UnsupportedIndex {
                label,
                property: property.to_string(),
            });
        }

        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'index' AND name = ?1",
            params![PERSON_IND_INDEX],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(IndexStatus::AlreadyExists);
        }

        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_persons_ind_unique ON persons(ind)",
            [],
        )?;
        Ok(IndexStatus::Created)
    }

    // === Mutations ===

    fn apply(&self, batch: &[Mutation]) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for mutation in batch {
            Self::apply_one(&tx, mutation)?;
        }
        tx.commit()?;

        Ok(())
    }

    // === Node queries ===

    fn contains_person(&self, id: &PersonId) -> StorageResult<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM persons WHERE ind = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn load_person(&self, id: &PersonId) -> StorageResult<Option<Person>> {
        let conn = self.conn()?;

        let sex: Option<Option<String>> = conn
            .query_row(
                "SELECT sex FROM persons WHERE ind = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(sex) = sex else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT label FROM person_labels WHERE ind = ?1")?;
        let names = stmt
            .query_map(params![id.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut labels = BTreeSet::new();
        for name in names {
            let label = Label::parse(&name).ok_or(StorageError::UnknownLabel(name))?;
            labels.insert(label);
        }

        Ok(Some(Person {
            id: id.clone(),
            sex,
            labels,
        }))
    }

    fn person_ids(&self, label: Label) -> StorageResult<Vec<PersonId>> {
        let conn = self.conn()?;
        Self::collect_ids(
            &conn,
            "SELECT ind FROM person_labels WHERE label = ?1 ORDER BY ind",
            params![label.as_str()],
        )
    }

    fn nodes_without_outgoing(&self, kind: RelationKind, label: Label) -> StorageResult<Vec<PersonId>> {
        let conn = self.conn()?;
        Self::collect_ids(
            &conn,
            r#"
            SELECT l.ind FROM person_labels l
            WHERE l.label = ?1
              AND NOT EXISTS (SELECT 1 FROM relations r WHERE r.source = l.ind AND r.kind = ?2)
            ORDER BY l.ind
            "#,
            params![label.as_str(), kind.as_str()],
        )
    }

    fn nodes_without_incoming(&self, kind: RelationKind, label: Label) -> StorageResult<Vec<PersonId>> {
        let conn = self.conn()?;
        Self::collect_ids(
            &conn,
            r#"
            SELECT l.ind FROM person_labels l
            WHERE l.label = ?1
              AND NOT EXISTS (SELECT 1 FROM relations r WHERE r.target = l.ind AND r.kind = ?2)
            ORDER BY l.ind
            "#,
            params![label.as_str(), kind.as_str()],
        )
    }

    // === Relation queries ===

    fn neighbors(
        &self,
        ids: &[PersonId],
        kind: RelationKind,
        direction: Direction,
    ) -> StorageResult<BTreeSet<PersonId>> {
        let conn = self.conn()?;
        let sql = match direction {
            Direction::Outgoing => "SELECT target FROM relations WHERE source = ?1 AND kind = ?2",
            Direction::Incoming => "SELECT source FROM relations WHERE target = ?1 AND kind = ?2",
        };
        let mut stmt = conn.prepare_cached(sql)?;

        let mut found = BTreeSet::new();
        for id in ids {
            let rows = stmt.query_map(params![id.as_str(), kind.as_str()], |row| {
                row.get::<_, String>(0)
            })?;
            for row in rows {
                found.insert(PersonId::from(row?));
            }
        }
        Ok(found)
    }

    fn get_record(&self, id: &PersonId) -> StorageResult<Option<PersonRow>> {
        let conn = self.conn()?;

        let sex: Option<Option<String>> = conn
            .query_row(
                "SELECT sex FROM persons WHERE ind = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(sex) = sex else {
            return Ok(None);
        };

        Ok(Some(PersonRow {
            id: id.clone(),
            father: Self::first_parent(&conn, id, RelationKind::IsFather)?,
            mother: Self::first_parent(&conn, id, RelationKind::IsMother)?,
            sex,
        }))
    }

    // === Counts ===

    fn count_persons(&self, label: Label) -> StorageResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM person_labels WHERE label = ?1",
            params![label.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn count_persons_with_sex(&self, sex: &str) -> StorageResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM persons WHERE sex = ?1",
            params![sex],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn count_relations(&self, kind: RelationKind) -> StorageResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM relations WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn close(self) -> StorageResult<()> {
        let conn = self.conn.into_inner().map_err(|_| StorageError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| StorageError::Database(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Relation;

    fn create_test_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_unique_index(Label::Person, "ind").unwrap();
        store
    }

    fn id(s: &str) -> PersonId {
        PersonId::from(s)
    }

    fn link(store: &SqliteStore, child: &str, parent: &str, kind: RelationKind) {
        store.upsert_relation(&id(child), RelationKind::IsChild, &id(parent)).unwrap();
        store.upsert_relation(&id(parent), kind, &id(child)).unwrap();
        store.upsert_relation(&id(parent), RelationKind::IsParent, &id(child)).unwrap();
    }

    #[test]
    fn test_unique_index_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.ensure_unique_index(Label::Person, "ind").unwrap(), IndexStatus::Created);
        assert_eq!(
            store.ensure_unique_index(Label::Person, "ind").unwrap(),
            IndexStatus::AlreadyExists
        );
    }

    #[test]
    fn test_unsupported_index_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.ensure_unique_index(Label::Founder, "sex").unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedIndex { .. }));
    }

    #[test]
    fn test_upsert_requires_unique_index() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.upsert_person(&id("1"), Some("F")).is_err());
    }

    #[test]
    fn test_upsert_person_merges() {
        let store = create_test_store();
        store.upsert_person(&id("1"), Some("F")).unwrap();
        store.upsert_person(&id("1"), Some("M")).unwrap();
        store.upsert_person(&id("1"), None).unwrap();

        assert_eq!(store.count_persons(Label::Person).unwrap(), 1);
        let person = store.load_person(&id("1")).unwrap().unwrap();
        assert_eq!(person.sex.as_deref(), Some("M"));
        assert!(person.has_label(Label::Person));
    }

    #[test]
    fn test_bare_person_has_no_sex() {
        let store = create_test_store();
        store.upsert_person(&id("9"), None).unwrap();
        let person = store.load_person(&id("9")).unwrap().unwrap();
        assert_eq!(person.sex, None);
    }

    #[test]
    fn test_relations_are_not_duplicated() {
        let store = create_test_store();
        store.upsert_person(&id("1"), Some("F")).unwrap();
        store.upsert_person(&id("3"), Some("F")).unwrap();
        link(&store, "3", "1", RelationKind::IsMother);
        link(&store, "3", "1", RelationKind::IsMother);

        for kind in [RelationKind::IsChild, RelationKind::IsMother, RelationKind::IsParent] {
            assert_eq!(store.count_relations(kind).unwrap(), 1, "{kind}");
        }
        assert_eq!(store.count_relations(RelationKind::IsFather).unwrap(), 0);
    }

    #[test]
    fn test_labels_are_additive_and_idempotent() {
        let store = create_test_store();
        store.upsert_person(&id("1"), Some("F")).unwrap();
        store.add_label(&id("1"), Label::Founder).unwrap();
        store.add_label(&id("1"), Label::Founder).unwrap();
        store.add_label(&id("1"), Label::Leaf).unwrap();

        let person = store.load_person(&id("1")).unwrap().unwrap();
        assert_eq!(person.labels.len(), 3);
        assert_eq!(store.count_persons(Label::Founder).unwrap(), 1);
    }

    #[test]
    fn test_add_label_ignores_missing_person() {
        let store = create_test_store();
        store.add_label(&id("ghost"), Label::Leaf).unwrap();
        assert_eq!(store.count_persons(Label::Leaf).unwrap(), 0);
    }

    #[test]
    fn test_detach_delete_removes_edges() {
        let store = create_test_store();
        store.upsert_person(&id("1"), Some("F")).unwrap();
        store.upsert_person(&id("3"), Some("F")).unwrap();
        link(&store, "3", "1", RelationKind::IsMother);

        store.detach_delete(&id("1")).unwrap();

        assert!(!store.contains_person(&id("1")).unwrap());
        assert!(store.contains_person(&id("3")).unwrap());
        for kind in RelationKind::ALL {
            assert_eq!(store.count_relations(kind).unwrap(), 0);
        }
    }

    #[test]
    fn test_without_outgoing_and_incoming() {
        let store = create_test_store();
        for (p, s) in [("1", "F"), ("2", "M"), ("3", "F")] {
            store.upsert_person(&id(p), Some(s)).unwrap();
        }
        link(&store, "3", "1", RelationKind::IsMother);
        link(&store, "3", "2", RelationKind::IsFather);

        let no_parents = store.nodes_without_outgoing(RelationKind::IsChild, Label::Person).unwrap();
        assert_eq!(no_parents, vec![id("1"), id("2")]);

        let no_children = store.nodes_without_incoming(RelationKind::IsChild, Label::Person).unwrap();
        assert_eq!(no_children, vec![id("3")]);
    }

    #[test]
    fn test_get_record_reads_parent_edges() {
        let store = create_test_store();
        for (p, s) in [("1", "F"), ("2", "M"), ("3", "F")] {
            store.upsert_person(&id(p), Some(s)).unwrap();
        }
        link(&store, "3", "1", RelationKind::IsMother);
        link(&store, "3", "2", RelationKind::IsFather);

        let row = store.get_record(&id("3")).unwrap().unwrap();
        assert_eq!(row.father, Some(id("2")));
        assert_eq!(row.mother, Some(id("1")));
        assert_eq!(row.sex.as_deref(), Some("F"));

        let founder = store.get_record(&id("1")).unwrap().unwrap();
        assert_eq!(founder.into_record("0").father, id("0"));

        assert!(store.get_record(&id("42")).unwrap().is_none());
    }

    #[test]
    fn test_apply_batch_is_atomic() {
        let store = create_test_store();
        // Without the index the person upsert fails after the relation write.
        store.conn().unwrap().execute("DROP INDEX idx_persons_ind_unique", []).unwrap();

        let batch = vec![
            Mutation::UpsertRelation(Relation::new(id("3"), RelationKind::IsChild, id("1"))),
            Mutation::UpsertPerson { id: id("3"), sex: Some("F".into()) },
        ];
        assert!(store.apply(&batch).is_err());
        assert_eq!(store.count_relations(RelationKind::IsChild).unwrap(), 0);
    }

    #[test]
    fn test_neighbors_follow_direction() {
        let store = create_test_store();
        for (p, s) in [("1", "F"), ("2", "M"), ("3", "F"), ("4", "M")] {
            store.upsert_person(&id(p), Some(s)).unwrap();
        }
        link(&store, "3", "1", RelationKind::IsMother);
        link(&store, "3", "2", RelationKind::IsFather);
        link(&store, "4", "1", RelationKind::IsMother);

        let parents = store
            .neighbors(&[id("3"), id("4")], RelationKind::IsChild, Direction::Outgoing)
            .unwrap();
        assert_eq!(parents, BTreeSet::from([id("1"), id("2")]));

        let children = store
            .neighbors(&[id("1")], RelationKind::IsChild, Direction::Incoming)
            .unwrap();
        assert_eq!(children, BTreeSet::from([id("3"), id("4")]));
    }

    #[test]
    fn test_file_store_persists_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("ped.db");

        let store = SqliteStore::open(&db_path).unwrap();
        store.ensure_unique_index(Label::Person, "ind").unwrap();
        store.upsert_person(&id("1"), Some("F")).unwrap();
        store.close().unwrap();

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            reopened.ensure_unique_index(Label::Person, "ind").unwrap(),
            IndexStatus::AlreadyExists
        );
        assert!(reopened.contains_person(&id("1")).unwrap());
    }
}
