//! Rendered visual tree.
//!
//! Renderer output as the rest of the pipeline sees it: an ordered list of node groups (a
//! parent-linked tree in document order), each with zero or more text runs, an optional primary
//! shape, and simple presentation styles. Event behaviour is attached as listener records that
//! [`VisualTree::dispatch`] interprets, so a whole render generation can be detached by id.
//!
//! The native markup the renderer produced is stored verbatim for export and is never rewritten
//! by style mutations.

use conceptmap_core::ConceptId;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupId(usize);

impl GroupId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Ordered CSS-like property map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style(IndexMap<String, String>);

impl Style {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    /// Sets or removes `key` depending on `value`.
    pub fn restore(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(v) => self.set(key, v),
            None => {
                self.remove(key);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    RoundedRect,
    Circle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub style: Style,
    /// Set while the shape is the group's interactive hit area.
    pub hit_target: bool,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            style: Style::default(),
            hit_target: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEvent {
    Enter,
    Leave,
    Click,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerAction {
    /// Bold the label and brighten the shape.
    Highlight,
    /// Undo [`ListenerAction::Highlight`].
    Unhighlight,
    /// Stop propagation and report the concept as selected.
    Select(ConceptId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub id: ListenerId,
    pub event: PointerEvent,
    pub action: ListenerAction,
    pub generation: u64,
}

pub const HOVER_FONT_WEIGHT: &str = "bold";
pub const HOVER_FILTER: &str = "brightness(1.15)";

#[derive(Debug, Clone, PartialEq, Eq)]
struct HighlightBackup {
    font_weight: Option<String>,
    filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeGroup {
    id: GroupId,
    parent: Option<GroupId>,
    pub dom_id: Option<String>,
    pub classes: Vec<String>,
    pub text_runs: Vec<String>,
    pub shape: Option<Shape>,
    /// Style applied to the group's text runs.
    pub label_style: Style,
    listeners: Vec<Listener>,
    highlight: Option<HighlightBackup>,
}

impl NodeGroup {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn has_text(&self) -> bool {
        self.text_runs.iter().any(|t| !t.trim().is_empty())
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight.is_some()
    }

    fn highlight(&mut self) {
        if self.highlight.is_some() {
            return;
        }
        let backup = HighlightBackup {
            font_weight: self.label_style.get("font-weight").map(str::to_string),
            filter: self
                .shape
                .as_ref()
                .and_then(|s| s.style.get("filter"))
                .map(str::to_string),
        };
        self.label_style.set("font-weight", HOVER_FONT_WEIGHT);
        if let Some(shape) = self.shape.as_mut() {
            shape.style.set("filter", HOVER_FILTER);
        }
        self.highlight = Some(backup);
    }

    pub(crate) fn unhighlight(&mut self) {
        let Some(backup) = self.highlight.take() else {
            return;
        };
        self.label_style.restore("font-weight", backup.font_weight);
        if let Some(shape) = self.shape.as_mut() {
            shape.style.restore("filter", backup.filter);
        }
    }
}

/// Outcome of [`VisualTree::dispatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Number of listeners that ran.
    pub handled: usize,
    pub propagation_stopped: bool,
    pub selected: Option<ConceptId>,
}

#[derive(Debug, Clone, Default)]
pub struct VisualTree {
    groups: Vec<NodeGroup>,
    markup: String,
    next_listener: u64,
}

impl VisualTree {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            groups: Vec::new(),
            markup: markup.into(),
            next_listener: 0,
        }
    }

    /// Appends a group in document order.
    pub fn add_group<I, S>(&mut self, parent: Option<GroupId>, classes: I) -> GroupId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = GroupId(self.groups.len());
        let parent = parent.filter(|p| p.0 < self.groups.len());
        self.groups.push(NodeGroup {
            id,
            parent,
            dom_id: None,
            classes: classes.into_iter().map(Into::into).collect(),
            text_runs: Vec::new(),
            shape: None,
            label_style: Style::default(),
            listeners: Vec::new(),
            highlight: None,
        });
        id
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.markup = markup.into();
    }

    pub fn groups(&self) -> &[NodeGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, id: GroupId) -> Option<&NodeGroup> {
        self.groups.get(id.0)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut NodeGroup> {
        self.groups.get_mut(id.0)
    }

    /// All text runs of the group in document order, joined with single spaces.
    pub fn text_of(&self, id: GroupId) -> String {
        self.group(id)
            .map(|g| {
                g.text_runs
                    .iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    pub fn listener_count(&self) -> usize {
        self.groups.iter().map(|g| g.listeners.len()).sum()
    }

    pub fn add_listener(
        &mut self,
        group: GroupId,
        event: PointerEvent,
        action: ListenerAction,
        generation: u64,
    ) -> Option<ListenerId> {
        let id = ListenerId(self.next_listener);
        let g = self.groups.get_mut(group.0)?;
        g.listeners.push(Listener {
            id,
            event,
            action,
            generation,
        });
        self.next_listener += 1;
        Some(id)
    }

    pub fn remove_listener(&mut self, group: GroupId, id: ListenerId) -> bool {
        let Some(g) = self.groups.get_mut(group.0) else {
            return false;
        };
        let before = g.listeners.len();
        g.listeners.retain(|l| l.id != id);
        g.listeners.len() != before
    }

    /// Delivers `event` to `target`, then bubbles it through the ancestors until a listener
    /// stops propagation.
    pub fn dispatch(&mut self, target: GroupId, event: PointerEvent) -> DispatchResult {
        let mut result = DispatchResult::default();
        let mut cursor = self.group(target).map(|g| g.id);
        while let Some(id) = cursor {
            let g = &mut self.groups[id.0];
            let actions: Vec<ListenerAction> = g
                .listeners
                .iter()
                .filter(|l| l.event == event)
                .map(|l| l.action.clone())
                .collect();
            for action in actions {
                result.handled += 1;
                match action {
                    ListenerAction::Highlight => g.highlight(),
                    ListenerAction::Unhighlight => g.unhighlight(),
                    ListenerAction::Select(concept) => {
                        result.selected = Some(concept);
                        result.propagation_stopped = true;
                    }
                }
            }
            if result.propagation_stopped {
                break;
            }
            cursor = g.parent;
        }
        result
    }
}
