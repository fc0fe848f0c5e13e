//! Graph records: one node plus its outgoing typed edges.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Attribute map of a record, in source field order.
pub type Attributes = Map<String, Value>;

/// Kind of graph node a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Document,
    Component,
    Vulnerability,
    Reference,
    License,
}

impl NodeKind {
    /// Label used for the node and as the identity prefix.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Component => "Component",
            Self::Vulnerability => "Vulnerability",
            Self::Reference => "Reference",
            Self::License => "License",
        }
    }

    /// Build an identity for this kind from one or more key parts.
    ///
    /// `NodeKind::Component.identity(&["library", "foo"])` yields
    /// `Component_library_foo`.
    #[must_use]
    pub fn identity(&self, parts: &[&str]) -> String {
        let mut id = String::from(self.label());
        for part in parts {
            id.push('_');
            id.push_str(part);
        }
        id
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Edge relation vocabulary shared by all writers.
///
/// The serialized name is the key under which a record carries the edge list;
/// [`Relation::edge_label`] is the relationship type to use in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "describes")]
    Describes,
    /// CycloneDX dependency graph entry
    #[serde(rename = "dependsOn")]
    DependsOn,
    #[serde(rename = "affects")]
    Affects,
    #[serde(rename = "licensed_by")]
    LicensedBy,
    #[serde(rename = "references")]
    References,
    #[serde(rename = "contains")]
    Contains,
    /// SPDX `DEPENDS_ON` relationship
    #[serde(rename = "depends_on")]
    RelationshipDependsOn,
    #[serde(rename = "dependency_of")]
    DependencyOf,
    #[serde(rename = "described_by")]
    DescribedBy,
}

impl Relation {
    /// Key under which the edge list is serialized.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Describes => "describes",
            Self::DependsOn => "dependsOn",
            Self::Affects => "affects",
            Self::LicensedBy => "licensed_by",
            Self::References => "references",
            Self::Contains => "contains",
            Self::RelationshipDependsOn => "depends_on",
            Self::DependencyOf => "dependency_of",
            Self::DescribedBy => "described_by",
        }
    }

    /// Relationship type for the edge in a property graph.
    #[must_use]
    pub const fn edge_label(&self) -> &'static str {
        match self {
            Self::Describes => "DESCRIBES",
            Self::DependsOn | Self::RelationshipDependsOn => "DEPENDS_ON",
            Self::Affects => "AFFECTS",
            Self::LicensedBy => "LICENSED_BY",
            Self::References => "REFERS_TO",
            Self::Contains => "CONTAINS",
            Self::DependencyOf => "DEPENDENCY_OF",
            Self::DescribedBy => "DESCRIBED_BY",
        }
    }

    /// Map an SPDX `relationshipType` onto the relation it is recorded under.
    #[must_use]
    pub fn from_spdx_relationship(relationship_type: &str) -> Option<Self> {
        match relationship_type {
            "DESCRIBES" => Some(Self::Describes),
            "DEPENDS_ON" => Some(Self::RelationshipDependsOn),
            "DEPENDENCY_OF" => Some(Self::DependencyOf),
            "DESCRIBED_BY" => Some(Self::DescribedBy),
            "CONTAINS" => Some(Self::Contains),
            _ => None,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outgoing edges of a record, grouped by relation.
///
/// A target of `None` is a reference that did not resolve to any record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Edges(IndexMap<Relation, Vec<Option<String>>>);

impl Edges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a (possibly empty) list exists for `relation`.
    pub fn declare(&mut self, relation: Relation) {
        self.0.entry(relation).or_default();
    }

    /// Append one target to the list for `relation`.
    pub fn push(&mut self, relation: Relation, target: Option<String>) {
        self.0.entry(relation).or_default().push(target);
    }

    /// Append a resolved target.
    pub fn link(&mut self, relation: Relation, target: impl Into<String>) {
        self.push(relation, Some(target.into()));
    }

    /// Targets recorded for `relation`, if the relation is present.
    #[must_use]
    pub fn get(&self, relation: Relation) -> Option<&[Option<String>]> {
        self.0.get(&relation).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, relation: Relation) -> bool {
        self.0.contains_key(&relation)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Relation, &Vec<Option<String>>)> {
        self.0.iter()
    }

    /// Number of relations present (including empty ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of edge targets across all relations.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Append every list of `other` onto this one, preserving order.
    pub fn merge(&mut self, other: Self) {
        for (relation, targets) in other.0 {
            self.0.entry(relation).or_default().extend(targets);
        }
    }
}

/// One graph node plus its outgoing typed edges.
///
/// Serializes to a single flat object:
/// `{"kind": .., "identity": .., "attributes": {..}, "<relation>": [..]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: NodeKind,
    /// `None` when the record annotates an element whose reference could not
    /// be resolved. Such records are never yielded by the extractor.
    pub identity: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(flatten)]
    pub edges: Edges,
}

impl Record {
    /// Create a record with a resolved identity.
    pub fn new(kind: NodeKind, identity: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            kind,
            identity: Some(identity.into()),
            attributes,
            edges: Edges::new(),
        }
    }

    /// Create a record whose identity may be unresolved.
    #[must_use]
    pub fn with_optional_identity(
        kind: NodeKind,
        identity: Option<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            kind,
            identity,
            attributes,
            edges: Edges::new(),
        }
    }

    /// Attach an edge set.
    #[must_use]
    pub fn with_edges(mut self, edges: Edges) -> Self {
        self.edges = edges;
        self
    }

    /// Identity as a string slice, if resolved.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Targets for one relation.
    #[must_use]
    pub fn targets(&self, relation: Relation) -> Option<&[Option<String>]> {
        self.edges.get(relation)
    }

    /// Fold another record with the same identity into this one.
    ///
    /// Edges are appended per relation; attributes only fill keys that are
    /// not present yet.
    pub fn absorb(&mut self, other: Self) {
        for (key, value) in other.attributes {
            self.attributes.entry(key).or_insert(value);
        }
        self.edges.merge(other.edges);
    }
}
