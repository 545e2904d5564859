//! Concept graph → mindmap diagram text.
//!
//! Output shape:
//!
//! ```text
//! mindmap
//!   root((Root label))
//!     Secondary
//!       Tertiary
//! ```
//!
//! Blank lines are significant only to the renderer's auto-layout (they are skipped by the
//! mindmap grammar), so they are used to loosen crowded branches.


use crate::model::{Concept, ConceptGraph, ConceptType};
use crate::sanitize::{sanitize_label, tier_label, truncate_label};
use crate::{Result, SiteConfig};
use rustc_hash::FxHashSet;
use std::fmt::Write as _;

pub const MINDMAP_HEADER: &str = "mindmap";
const INDENT: &str = "  ";
const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub root_limit: usize,
    pub secondary_limit: usize,
    pub tertiary_limit: usize,
    /// Leaf text used when the graph has no concepts.
    pub placeholder: String,
    /// A secondary with more than this many children gets a spacer after its middle child.
    pub dense_branch_threshold: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            root_limit: 25,
            secondary_limit: 22,
            tertiary_limit: 20,
            placeholder: "No concepts yet".to_string(),
            dense_branch_threshold: 3,
        }
    }
}

impl GeneratorOptions {
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            root_limit: config.read_usize("generator.rootLimit", d.root_limit)?,
            secondary_limit: config.read_usize("generator.secondaryLimit", d.secondary_limit)?,
            tertiary_limit: config.read_usize("generator.tertiaryLimit", d.tertiary_limit)?,
            placeholder: config.read_string("generator.placeholder", &d.placeholder)?,
            dense_branch_threshold: config
                .read_usize("generator.denseBranchThreshold", d.dense_branch_threshold)?,
        })
    }

    pub fn limit_for(&self, tier: ConceptType) -> usize {
        match tier {
            ConceptType::Main => self.root_limit,
            ConceptType::Secondary => self.secondary_limit,
            ConceptType::Tertiary => self.tertiary_limit,
        }
    }
}

/// Generates mindmap text with the default options.
pub fn generate(graph: &ConceptGraph, title: &str) -> String {
    generate_with_options(graph, title, &GeneratorOptions::default())
}

pub fn generate_with_options(
    graph: &ConceptGraph,
    title: &str,
    options: &GeneratorOptions,
) -> String {
    let mut out = String::new();
    out.push_str(MINDMAP_HEADER);
    out.push('\n');

    let Some(root) = graph.root() else {
        let title = non_empty(truncate_label(&sanitize_label(title), options.root_limit));
        push_root(&mut out, &title);
        push_node(&mut out, 2, &non_empty(sanitize_label(&options.placeholder)));
        return out;
    };

    push_root(&mut out, &node_text(root, options.limit_for(ConceptType::Main)));

    let secondaries = graph.eligible_secondaries();
    let mut emitted_tertiaries: FxHashSet<&str> = FxHashSet::default();
    for (si, secondary) in secondaries.iter().enumerate() {
        if si > 0 {
            out.push('\n');
        }
        let label = node_text(secondary, options.limit_for(ConceptType::Secondary));
        push_node(&mut out, 2, &label);

        let children = graph.children_of(secondary);
        let dense = children.len() > options.dense_branch_threshold;
        for (ci, child) in children.iter().enumerate() {
            emitted_tertiaries.insert(child.id.as_str());
            let label = node_text(child, options.limit_for(ConceptType::Tertiary));
            push_node(&mut out, 3, &label);
            if dense && ci == children.len() / 2 {
                out.push('\n');
            }
        }
        if !children.is_empty() && si + 1 < secondaries.len() {
            out.push('\n');
        }
    }

    tracing::debug!(
        concepts = graph.len(),
        secondaries = secondaries.len(),
        tertiaries = emitted_tertiaries.len(),
        "generated mindmap text"
    );
    out
}

fn node_text(concept: &Concept, limit: usize) -> String {
    non_empty(tier_label(&concept.label, limit))
}

fn non_empty(label: String) -> String {
    if label.is_empty() {
        UNTITLED.to_string()
    } else {
        label
    }
}

fn push_root(out: &mut String, label: &str) {
    let _ = writeln!(out, "{INDENT}root(({label}))");
}

fn push_node(out: &mut String, level: usize, label: &str) {
    let _ = writeln!(out, "{}{label}", INDENT.repeat(level));
}
