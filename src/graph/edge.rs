//! Typed pedigree relations

use super::node::PersonId;
use serde::{Deserialize, Serialize};

/// The closed set of relation types stored in the graph
///
/// Directions:
/// - `IsChild`: child -> parent, one per recorded parent
/// - `IsFather` / `IsMother`: parent -> child
/// - `IsParent`: parent -> child, the union of the two above
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    IsChild,
    IsFather,
    IsMother,
    IsParent,
}

impl RelationKind {
    pub const ALL: [RelationKind; 4] = [
        RelationKind::IsChild,
        RelationKind::IsFather,
        RelationKind::IsMother,
        RelationKind::IsParent,
    ];

    /// Name used in the persisted form
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::IsChild => "is_child",
            RelationKind::IsFather => "is_father",
            RelationKind::IsMother => "is_mother",
            RelationKind::IsParent => "is_parent",
        }
    }

    /// Parse a persisted relation name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which parent slot of a record a relation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentRole {
    Father,
    Mother,
}

impl ParentRole {
    /// The parent -> child relation specific to this role
    pub fn relation(&self) -> RelationKind {
        match self {
            ParentRole::Father => RelationKind::IsFather,
            ParentRole::Mother => RelationKind::IsMother,
        }
    }
}

/// A directed, typed relation between two persons
///
/// Identity is `(source, kind, target)`: a relation either exists once or
/// not at all.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub source: PersonId,
    pub kind: RelationKind,
    pub target: PersonId,
}

impl Relation {
    pub fn new(source: PersonId, kind: RelationKind, target: PersonId) -> Self {
        Self { source, kind, target }
    }

    /// The three relations that link a child to one recorded parent:
    /// `child -is_child-> parent`, `parent -is_father|is_mother-> child`
    /// and `parent -is_parent-> child`.
    pub fn parent_links(child: &PersonId, parent: &PersonId, role: ParentRole) -> [Relation; 3] {
        [
            Relation::new(child.clone(), RelationKind::IsChild, parent.clone()),
            Relation::new(parent.clone(), role.relation(), child.clone()),
            Relation::new(parent.clone(), RelationKind::IsParent, child.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_names_round_trip() {
        for kind in RelationKind::ALL {
            assert_eq!(RelationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RelationKind::parse("is_child; DROP TABLE persons"), None);
    }

    #[test]
    fn parent_links_point_the_right_way() {
        let child = PersonId::from("3");
        let mother = PersonId::from("1");
        let [up, role, generic] = Relation::parent_links(&child, &mother, ParentRole::Mother);

        assert_eq!((up.source.as_str(), up.target.as_str()), ("3", "1"));
        assert_eq!(up.kind, RelationKind::IsChild);
        assert_eq!((role.source.as_str(), role.target.as_str()), ("1", "3"));
        assert_eq!(role.kind, RelationKind::IsMother);
        assert_eq!(generic.kind, RelationKind::IsParent);
        assert_eq!(generic.source, mother);
    }
}
