//! Person nodes and their labels

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of an individual in the pedigree
///
/// Serializes as a plain string. Ordering is lexical, which is what keeps
/// exports and reconstructed genealogies deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// Create a PersonId from any string-like value
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this identifier is the reserved "absent parent" value
    pub fn is_sentinel(&self, sentinel: &str) -> bool {
        self.0 == sentinel
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PersonId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Node labels
///
/// `Person` is the base identity label carried by every node. `Founder` and
/// `Leaf` are structural roles layered on top by the classifier; a node may
/// carry neither, one, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Person,
    Founder,
    Leaf,
}

impl Label {
    /// Name used in the persisted form
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Person => "Person",
            Label::Founder => "Founder",
            Label::Leaf => "Leaf",
        }
    }

    /// Parse a persisted label name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Person" => Some(Label::Person),
            "Founder" => Some(Label::Founder),
            "Leaf" => Some(Label::Leaf),
            _ => None,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person node as persisted in the graph
///
/// `sex` is `None` for a node that so far only exists because some other
/// record named it as a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub sex: Option<String>,
    pub labels: BTreeSet<Label>,
}

impl Person {
    /// Create a bare person carrying only the base label
    pub fn new(id: impl Into<PersonId>) -> Self {
        Self {
            id: id.into(),
            sex: None,
            labels: BTreeSet::from([Label::Person]),
        }
    }

    /// Set the sex property
    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }

    pub fn has_label(&self, label: Label) -> bool {
        self.labels.contains(&label)
    }

    pub fn is_founder(&self) -> bool {
        self.has_label(Label::Founder)
    }

    pub fn is_leaf(&self) -> bool {
        self.has_label(Label::Leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_id_serializes_as_string() {
        let id = PersonId::from_string("ind:42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ind:42\"");
    }

    #[test]
    fn sentinel_check_is_exact() {
        assert!(PersonId::from("0").is_sentinel("0"));
        assert!(!PersonId::from("00").is_sentinel("0"));
    }

    #[test]
    fn label_round_trips_through_name() {
        for label in [Label::Person, Label::Founder, Label::Leaf] {
            assert_eq!(Label::parse(label.as_str()), Some(label));
        }
        assert_eq!(Label::parse("Ghost"), None);
    }

    #[test]
    fn new_person_has_only_base_label() {
        let p = Person::new("7").with_sex("F");
        assert!(p.has_label(Label::Person));
        assert!(!p.is_founder());
        assert!(!p.is_leaf());
        assert_eq!(p.sex.as_deref(), Some("F"));
    }
}
