//! Concept graph model.
//!
//! The graph is a fixed three-tier hierarchy (one root, secondaries, tertiaries) described by an
//! ordered list of concepts and their directed `connections`. The model is immutable once built;
//! a new graph means a full regeneration.

use crate::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque concept identifier, stable across renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(String);

impl ConceptId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ConceptId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConceptId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConceptId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptType {
    Main,
    Secondary,
    Tertiary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: ConceptId,
    pub label: String,
    #[serde(rename = "type")]
    pub ty: ConceptType,
    #[serde(default)]
    pub connections: Vec<ConceptId>,
}

impl Concept {
    pub fn new(id: impl Into<ConceptId>, label: impl Into<String>, ty: ConceptType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ty,
            connections: Vec::new(),
        }
    }

    pub fn with_connections<I, S>(mut self, connections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ConceptId>,
    {
        self.connections = connections.into_iter().map(Into::into).collect();
        self
    }

    pub fn connects_to(&self, id: &str) -> bool {
        self.connections.iter().any(|c| c.as_str() == id)
    }
}

/// Accepts either a bare array of concepts or `{ "concepts": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum GraphRepr {
    List(Vec<Concept>),
    Wrapped { concepts: Vec<Concept> },
}

/// An ordered, immutable collection of concepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GraphRepr", into = "Vec<Concept>")]
pub struct ConceptGraph {
    concepts: Vec<Concept>,
    index: FxHashMap<ConceptId, usize>,
}

impl From<GraphRepr> for ConceptGraph {
    fn from(value: GraphRepr) -> Self {
        match value {
            GraphRepr::List(concepts) | GraphRepr::Wrapped { concepts } => Self::new(concepts),
        }
    }
}

impl From<ConceptGraph> for Vec<Concept> {
    fn from(value: ConceptGraph) -> Self {
        value.concepts
    }
}

impl FromIterator<Concept> for ConceptGraph {
    fn from_iter<T: IntoIterator<Item = Concept>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ConceptGraph {
    pub fn new(concepts: Vec<Concept>) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(concepts.len());
        for (i, c) in concepts.iter().enumerate() {
            // Duplicate ids: the first occurrence owns the id.
            index.entry(c.id.clone()).or_insert(i);
        }
        Self { concepts, index }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let graph: Self = serde_json::from_str(text)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let graph: Self = serde_json::from_reader(reader)?;
        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> Result<()> {
        if let Some(c) = self.concepts.iter().find(|c| c.id.as_str().is_empty()) {
            return Err(Error::InvalidGraph {
                message: format!("concept with label {:?} has an empty id", c.label),
            });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Concept> {
        self.concepts.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Concept> {
        self.index.get(id).map(|&i| &self.concepts[i])
    }

    /// The `main` concept, or the first concept when no `main` exists.
    pub fn root(&self) -> Option<&Concept> {
        self.concepts
            .iter()
            .find(|c| c.ty == ConceptType::Main)
            .or_else(|| self.concepts.first())
    }

    /// Secondaries listed in the root's `connections`, in graph order.
    pub fn eligible_secondaries(&self) -> Vec<&Concept> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        self.concepts
            .iter()
            .enumerate()
            .filter(|(i, c)| self.index.get(&c.id) == Some(i))
            .map(|(_, c)| c)
            .filter(|c| c.ty == ConceptType::Secondary && c.id != root.id)
            .filter(|c| root.connects_to(c.id.as_str()))
            .collect()
    }

    /// Tertiaries referenced by `secondary`, in its `connections` order.
    ///
    /// Dangling ids and repeated entries are skipped.
    pub fn children_of<'a>(&'a self, secondary: &Concept) -> Vec<&'a Concept> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        secondary
            .connections
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.get(id.as_str()))
            .filter(|c| c.ty == ConceptType::Tertiary)
            .collect()
    }
}
