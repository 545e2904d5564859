//! Label matching strategies, tried in order until one returns a concept.

use super::text::normalize;
use conceptmap_core::{Concept, ConceptGraph};
use rustc_hash::FxHashSet;

/// Normalized concept labels, computed once per reconciliation.
#[derive(Debug, Clone)]
pub struct LabelIndex<'g> {
    entries: Vec<(&'g Concept, String)>,
    root: Option<(&'g Concept, String)>,
}

impl<'g> LabelIndex<'g> {
    pub fn new(graph: &'g ConceptGraph) -> Self {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let entries = graph
            .iter()
            .filter(|c| seen.insert(c.id.as_str()))
            .map(|c| (c, normalize(&c.label)))
            .collect();
        let root = graph.root().map(|c| (c, normalize(&c.label)));
        Self { entries, root }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'g Concept, &str)> + '_ {
        self.entries.iter().map(|(c, l)| (*c, l.as_str()))
    }

    pub fn root(&self) -> Option<(&'g Concept, &str)> {
        self.root.as_ref().map(|(c, l)| (*c, l.as_str()))
    }
}

pub type MatchFn = for<'g> fn(&str, &LabelIndex<'g>) -> Option<&'g Concept>;

#[derive(Clone, Copy)]
pub struct MatchStrategy {
    pub name: &'static str,
    pub find: MatchFn,
}

impl std::fmt::Debug for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MatchStrategy").field(&self.name).finish()
    }
}

pub fn exact<'g>(candidate: &str, index: &LabelIndex<'g>) -> Option<&'g Concept> {
    index
        .entries()
        .find(|(_, label)| *label == candidate)
        .map(|(c, _)| c)
}

/// Matches a truncated label against the full one.
pub fn prefix<'g>(candidate: &str, index: &LabelIndex<'g>) -> Option<&'g Concept> {
    index
        .entries()
        .find(|(_, label)| label.starts_with(candidate))
        .map(|(c, _)| c)
}

pub fn root_fallback<'g>(candidate: &str, index: &LabelIndex<'g>) -> Option<&'g Concept> {
    let (root, label) = index.root()?;
    label.starts_with(candidate).then_some(root)
}

pub fn default_strategies() -> Vec<MatchStrategy> {
    vec![
        MatchStrategy {
            name: "exact",
            find: exact,
        },
        MatchStrategy {
            name: "prefix",
            find: prefix,
        },
        MatchStrategy {
            name: "root",
            find: root_fallback,
        },
    ]
}
