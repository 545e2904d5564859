//! Hover and click wiring for mapped node groups.
//!
//! Every listener added for a render generation is recorded in an [`AttachBatch`]; detaching the
//! batch removes exactly those listeners and restores the shape styles it changed. Attaching the
//! same generation twice is a no-op.

use crate::reconcile::Mapping;
use crate::tree::{GroupId, ListenerAction, ListenerId, PointerEvent, Style, VisualTree};

#[derive(Debug, Clone, PartialEq)]
struct BatchEntry {
    group: GroupId,
    listeners: Vec<ListenerId>,
    /// Shape style before it was marked as a hit target.
    shape_style: Option<Style>,
}

/// Listeners attached for one render generation.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "dropping a batch without detaching leaves its listeners on the tree"]
pub struct AttachBatch {
    generation: u64,
    entries: Vec<BatchEntry>,
}

impl AttachBatch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of groups wired by this batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.entries.iter().map(|e| e.listeners.len()).sum()
    }

    /// Removes the batch's listeners and restores touched styles. Returns the number of
    /// listeners removed.
    pub fn detach(self, tree: &mut VisualTree) -> usize {
        let mut removed = 0;
        for entry in self.entries {
            for id in entry.listeners {
                if tree.remove_listener(entry.group, id) {
                    removed += 1;
                }
            }
            if let Some(group) = tree.group_mut(entry.group) {
                group.unhighlight();
                if let (Some(shape), Some(style)) = (group.shape.as_mut(), entry.shape_style) {
                    shape.style = style;
                    shape.hit_target = false;
                }
            }
        }
        removed
    }
}

/// Wires every mapped group that does not already carry listeners.
pub fn attach(tree: &mut VisualTree, mapping: &Mapping, generation: u64) -> AttachBatch {
    let mut entries = Vec::new();
    for mapped in mapping.iter() {
        let Some(group) = tree.group_mut(mapped.group) else {
            continue;
        };
        if !group.listeners().is_empty() {
            continue;
        }
        let shape_style = group.shape.as_mut().map(|shape| {
            let before = shape.style.clone();
            shape.style.set("cursor", "pointer");
            shape.style.set("pointer-events", "all");
            shape.hit_target = true;
            before
        });

        let listeners = [
            (PointerEvent::Enter, ListenerAction::Highlight),
            (PointerEvent::Leave, ListenerAction::Unhighlight),
            (
                PointerEvent::Click,
                ListenerAction::Select(mapped.concept.clone()),
            ),
        ]
        .into_iter()
        .filter_map(|(event, action)| tree.add_listener(mapped.group, event, action, generation))
        .collect();

        entries.push(BatchEntry {
            group: mapped.group,
            listeners,
            shape_style,
        });
    }
    tracing::debug!(generation, groups = entries.len(), "attached node interactions");
    AttachBatch {
        generation,
        entries,
    }
}

/// Owns the current batch so attach/detach stay paired across render generations.
#[derive(Debug, Default)]
pub struct InteractionManager {
    batch: Option<AttachBatch>,
}

impl InteractionManager {
    pub fn generation(&self) -> Option<u64> {
        self.batch.as_ref().map(AttachBatch::generation)
    }

    pub fn is_attached(&self) -> bool {
        self.batch.is_some()
    }

    /// Attaches `generation`, replacing any older batch. Returns `false` when that generation is
    /// already attached.
    pub fn attach(&mut self, tree: &mut VisualTree, mapping: &Mapping, generation: u64) -> bool {
        if self.generation() == Some(generation) {
            return false;
        }
        self.detach(tree);
        self.batch = Some(attach(tree, mapping, generation));
        true
    }

    pub fn detach(&mut self, tree: &mut VisualTree) -> usize {
        self.batch.take().map_or(0, |b| b.detach(tree))
    }

    /// Drops the batch when its tree is already gone.
    pub fn forget(&mut self) {
        self.batch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile;
    use crate::tree::{Shape, ShapeKind};
    use conceptmap_core::{Concept, ConceptGraph, ConceptId, ConceptType};

    fn fixture() -> (VisualTree, Mapping) {
        let graph = ConceptGraph::new(vec![
            Concept::new("r", "Root", ConceptType::Main).with_connections(["s"]),
            Concept::new("s", "Branch", ConceptType::Secondary),
        ]);
        let mut tree = VisualTree::new("<svg/>");
        let outer = tree.add_group(None, ["mindmap-nodes"]);
        for label in ["Root", "Branch", "Unknown"] {
            let g = tree.add_group(Some(outer), ["mindmap-node"]);
            let group = tree.group_mut(g).unwrap();
            group.text_runs = vec![label.to_string()];
            group.shape = Some(Shape::new(ShapeKind::Rect));
        }
        let mapping = reconcile(&graph, &tree).mapping;
        (tree, mapping)
    }

    #[test]
    fn attach_wires_mapped_groups_only() {
        let (mut tree, mapping) = fixture();
        let batch = attach(&mut tree, &mapping, 1);
        assert_eq!(batch.len(), 2);
        assert_eq!(tree.listener_count(), 6);
        let unknown = tree.group(GroupId::from_index(3)).unwrap();
        assert!(unknown.listeners().is_empty());
        let root = tree.group(GroupId::from_index(1)).unwrap();
        let shape = root.shape.as_ref().unwrap();
        assert!(shape.hit_target);
        assert_eq!(shape.style.get("cursor"), Some("pointer"));
        assert_eq!(batch.detach(&mut tree), 6);
    }

    #[test]
    fn detach_restores_tree_to_pre_attach_state() {
        let (mut tree, mapping) = fixture();
        let before: Vec<_> = tree.groups().to_vec();
        let batch = attach(&mut tree, &mapping, 1);
        tree.dispatch(GroupId::from_index(2), PointerEvent::Enter);
        assert!(tree.group(GroupId::from_index(2)).unwrap().is_highlighted());

        batch.detach(&mut tree);
        assert_eq!(tree.listener_count(), 0);
        assert_eq!(tree.groups(), before.as_slice());
    }

    #[test]
    fn hover_and_click_behaviour() {
        let (mut tree, mapping) = fixture();
        let _batch = attach(&mut tree, &mapping, 1);
        let branch = GroupId::from_index(2);

        tree.dispatch(branch, PointerEvent::Enter);
        assert_eq!(
            tree.group(branch).unwrap().label_style.get("font-weight"),
            Some("bold")
        );
        tree.dispatch(branch, PointerEvent::Leave);
        assert_eq!(
            tree.group(branch).unwrap().label_style.get("font-weight"),
            None
        );

        let r = tree.dispatch(branch, PointerEvent::Click);
        assert_eq!(r.selected, Some(ConceptId::from("s")));
        assert!(r.propagation_stopped);
    }

    #[test]
    fn manager_ignores_duplicate_generation() {
        let (mut tree, mapping) = fixture();
        let mut manager = InteractionManager::default();
        assert!(manager.attach(&mut tree, &mapping, 7));
        assert!(!manager.attach(&mut tree, &mapping, 7));
        assert_eq!(tree.listener_count(), 6);

        assert!(manager.attach(&mut tree, &mapping, 8));
        assert_eq!(tree.listener_count(), 6);
        assert!(tree.groups().iter().flat_map(|g| g.listeners()).all(|l| l.generation == 8));

        assert_eq!(manager.detach(&mut tree), 6);
        assert_eq!(tree.listener_count(), 0);
        assert!(!manager.is_attached());
    }

    #[test]
    fn already_wired_groups_are_not_wired_twice() {
        let (mut tree, mapping) = fixture();
        let first = attach(&mut tree, &mapping, 1);
        let second = attach(&mut tree, &mapping, 2);
        assert!(second.is_empty());
        assert_eq!(tree.listener_count(), 6);
        second.detach(&mut tree);
        first.detach(&mut tree);
        assert_eq!(tree.listener_count(), 0);
    }
}
