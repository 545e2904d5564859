//! Mapping rendered node groups back to concepts.
//!
//! The renderer reports nothing about which concept produced which group, so the association is
//! recovered from the displayed text alone. Groups that look like diagram nodes are visited
//! first; any other text-bearing group is tried afterwards. A group is visited at most once and
//! groups whose text matches nothing are left unmapped.

pub mod matchers;
pub mod text;


use crate::tree::{GroupId, NodeGroup, VisualTree};
use conceptmap_core::{ConceptGraph, ConceptId};
use matchers::{LabelIndex, MatchStrategy, default_strategies};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedGroup {
    pub group: GroupId,
    pub concept: ConceptId,
    /// Text as displayed by the renderer.
    pub text: String,
    pub strategy: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedGroup {
    pub group: GroupId,
    pub text: String,
    /// Normalized form that was looked up.
    pub candidate: String,
}

/// Group → concept association for one rendered tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<MappedGroup>,
    by_group: FxHashMap<GroupId, usize>,
}

impl Mapping {
    fn insert(&mut self, entry: MappedGroup) {
        self.by_group.insert(entry.group, self.entries.len());
        self.entries.push(entry);
    }

    pub fn get(&self, group: GroupId) -> Option<&ConceptId> {
        self.by_group.get(&group).map(|&i| &self.entries[i].concept)
    }

    /// Groups mapped to `concept`, in visiting order.
    pub fn groups_for(&self, concept: &str) -> Vec<GroupId> {
        self.entries
            .iter()
            .filter(|e| e.concept.as_str() == concept)
            .map(|e| e.group)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappedGroup> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    #[serde(rename = "matched", serialize_with = "serialize_mapping")]
    pub mapping: Mapping,
    pub unmatched: Vec<UnmatchedGroup>,
}

fn serialize_mapping<S: serde::Serializer>(m: &Mapping, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(m.iter())
}

/// Classes that mark a group as a diagram node.
pub fn is_node_group(group: &NodeGroup) -> bool {
    group
        .classes
        .iter()
        .any(|c| c == "node" || c == "mindmap-node" || c.starts_with("section-"))
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    strategies: Vec<MatchStrategy>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }
}

impl Reconciler {
    pub fn new(strategies: Vec<MatchStrategy>) -> Self {
        Self { strategies }
    }

    /// Appends a strategy after the existing ones.
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies(&self) -> &[MatchStrategy] {
        &self.strategies
    }

    pub fn reconcile(&self, graph: &ConceptGraph, tree: &VisualTree) -> ReconcileReport {
        let index = LabelIndex::new(graph);
        let mut report = ReconcileReport::default();
        let mut visited: FxHashSet<GroupId> = FxHashSet::default();

        let node_groups = tree.groups().iter().filter(|g| is_node_group(g));
        let other_groups = tree
            .groups()
            .iter()
            .filter(|g| !is_node_group(g) && g.has_text());

        for group in node_groups.chain(other_groups) {
            if !visited.insert(group.id()) {
                continue;
            }
            let shown = tree.text_of(group.id());
            if shown.is_empty() {
                continue;
            }
            let candidate = text::candidate(&shown);
            let hit = if candidate.is_empty() {
                None
            } else {
                self.strategies
                    .iter()
                    .find_map(|s| (s.find)(&candidate, &index).map(|c| (s.name, c)))
            };
            match hit {
                Some((strategy, concept)) => {
                    tracing::trace!(group = group.id().index(), concept = %concept.id, strategy, "matched rendered label");
                    report.mapping.insert(MappedGroup {
                        group: group.id(),
                        concept: concept.id.clone(),
                        text: shown,
                        strategy,
                    })
                }
                None => {
                    tracing::debug!(group = group.id().index(), text = %shown, "no concept matched rendered label");
                    report.unmatched.push(UnmatchedGroup {
                        group: group.id(),
                        text: shown,
                        candidate,
                    });
                }
            }
        }

        tracing::debug!(
            matched = report.mapping.len(),
            unmatched = report.unmatched.len(),
            "reconciled rendered labels"
        );
        report
    }
}

/// Reconciles with the default strategies.
pub fn reconcile(graph: &ConceptGraph, tree: &VisualTree) -> ReconcileReport {
    Reconciler::default().reconcile(graph, tree)
}
