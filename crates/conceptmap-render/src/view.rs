//! Zoom/pan state for the rendered map, and SVG export.

use crate::tree::VisualTree;
use serde::Serialize;

pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 2.5;
pub const INITIAL_ZOOM: f64 = 0.3;
pub const RESET_ZOOM: f64 = 1.0;
pub const ZOOM_STEP: f64 = 0.1;
pub const WHEEL_ZOOM_STEP: f64 = 0.05;

pub const SVG_MIME_TYPE: &str = "image/svg+xml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        alt: false,
        shift: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    /// Ctrl, Meta or Alt. Shift is ignored because `+` needs it on most layouts.
    pub fn has_command(&self) -> bool {
        self.ctrl || self.meta || self.alt
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start: (f64, f64),
    origin: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewControls {
    zoom: f64,
    pan: (f64, f64),
    drag: Option<Drag>,
}

impl Default for ViewControls {
    fn default() -> Self {
        Self {
            zoom: INITIAL_ZOOM,
            pan: (0.0, 0.0),
            drag: None,
        }
    }
}

fn clamp_zoom(z: f64) -> f64 {
    let z = if z.is_finite() { z } else { RESET_ZOOM };
    (z.clamp(MIN_ZOOM, MAX_ZOOM) * 100.0).round() / 100.0
}

impl ViewControls {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> (f64, f64) {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom = clamp_zoom(zoom);
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    /// Zoom back to 100% and recentre.
    pub fn reset(&mut self) {
        self.zoom = RESET_ZOOM;
        self.pan = (0.0, 0.0);
        self.drag = None;
    }

    /// Wheel zoom, active only with Ctrl or Meta held. `delta_y < 0` zooms in. Returns whether the
    /// event was consumed.
    pub fn on_wheel(&mut self, delta_y: f64, modifiers: Modifiers) -> bool {
        if !(modifiers.ctrl || modifiers.meta) || delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let step = if delta_y < 0.0 {
            WHEEL_ZOOM_STEP
        } else {
            -WHEEL_ZOOM_STEP
        };
        self.set_zoom(self.zoom + step);
        true
    }

    /// `+`/`=` zoom in, `-` zooms out, `0`/`r` reset. Ignored while a command modifier is held.
    pub fn on_key(&mut self, key: char, modifiers: Modifiers) -> bool {
        if modifiers.has_command() {
            return false;
        }
        match key {
            '+' | '=' => {
                self.zoom_in();
            }
            '-' => {
                self.zoom_out();
            }
            '0' | 'r' | 'R' => self.reset(),
            _ => return false,
        }
        true
    }

    /// Starts a pan drag unless a node already consumed the pointer-down.
    pub fn begin_drag(&mut self, x: f64, y: f64, consumed_by_node: bool) -> bool {
        if consumed_by_node {
            return false;
        }
        self.drag = Some(Drag {
            start: (x, y),
            origin: self.pan,
        });
        true
    }

    pub fn drag_to(&mut self, x: f64, y: f64) {
        if let Some(d) = self.drag {
            self.pan = (d.origin.0 + x - d.start.0, d.origin.1 + y - d.start.1);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Transform for the diagram's root group.
    pub fn transform(&self) -> String {
        format!(
            "translate({}, {}) scale({})",
            crate::headless::svg::fmt(self.pan.0),
            crate::headless::svg::fmt(self.pan.1),
            crate::headless::svg::fmt(self.zoom)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// File-name stem for a title: lowercase ASCII alphanumerics joined by single hyphens.
pub fn file_stem(title: &str) -> String {
    let mut out = String::new();
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let stem = out.trim_end_matches('-');
    if stem.is_empty() {
        "concept-map".to_string()
    } else {
        stem.to_string()
    }
}

/// Serializes the rendered markup byte-for-byte. `None` when nothing has been rendered.
pub fn export_svg(tree: Option<&VisualTree>, title: &str) -> Option<ExportArtifact> {
    let tree = tree?;
    Some(ExportArtifact {
        file_name: format!("{}.svg", file_stem(title)),
        mime_type: SVG_MIME_TYPE,
        bytes: tree.markup().as_bytes().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zoomed_out_and_clamps() {
        let mut v = ViewControls::default();
        assert_eq!(v.zoom(), 0.3);
        assert_eq!(v.zoom_out(), 0.3);
        for _ in 0..40 {
            v.zoom_in();
        }
        assert_eq!(v.zoom(), 2.5);
    }

    #[test]
    fn steps_are_rounded_to_hundredths() {
        let mut v = ViewControls::default();
        assert_eq!(v.zoom_in(), 0.4);
        assert_eq!(v.zoom_in(), 0.5);
        assert_eq!(v.zoom_out(), 0.4);
        v.set_zoom(1.0);
        assert!(v.on_wheel(-3.0, Modifiers::ctrl()));
        assert_eq!(v.zoom(), 1.05);
        assert!(v.on_wheel(3.0, Modifiers::meta()));
        assert_eq!(v.zoom(), 1.0);
    }

    #[test]
    fn wheel_without_modifier_is_ignored() {
        let mut v = ViewControls::default();
        assert!(!v.on_wheel(-3.0, Modifiers::NONE));
        assert_eq!(v.zoom(), 0.3);
    }

    #[test]
    fn keyboard_shortcuts() {
        let mut v = ViewControls::default();
        assert!(v.on_key('+', Modifiers::NONE));
        assert!(v.on_key('=', Modifiers { shift: true, ..Modifiers::NONE }));
        assert_eq!(v.zoom(), 0.5);
        assert!(!v.on_key('-', Modifiers::ctrl()));
        assert_eq!(v.zoom(), 0.5);
        assert!(v.on_key('0', Modifiers::NONE));
        assert_eq!(v.zoom(), 1.0);
        assert!(!v.on_key('x', Modifiers::NONE));
    }

    #[test]
    fn drag_pans_relative_to_start() {
        let mut v = ViewControls::default();
        assert!(!v.begin_drag(0.0, 0.0, true));
        assert!(v.begin_drag(10.0, 10.0, false));
        v.drag_to(25.0, 5.0);
        assert_eq!(v.pan(), (15.0, -5.0));
        v.end_drag();
        v.drag_to(100.0, 100.0);
        assert_eq!(v.pan(), (15.0, -5.0));
        assert_eq!(v.transform(), "translate(15, -5) scale(0.3)");
        v.reset();
        assert_eq!(v.transform(), "translate(0, 0) scale(1)");
    }

    #[test]
    fn export_uses_title_slug_and_exact_bytes() {
        let tree = VisualTree::new("<svg>é</svg>");
        let a = export_svg(Some(&tree), "AI Overview: 2024!").unwrap();
        assert_eq!(a.file_name, "ai-overview-2024.svg");
        assert_eq!(a.mime_type, "image/svg+xml");
        assert_eq!(a.bytes, "<svg>é</svg>".as_bytes());
        assert!(export_svg(None, "x").is_none());
        assert_eq!(file_stem("\u{1F680}"), "concept-map");

        let meta = serde_json::to_value(&a).unwrap();
        assert_eq!(meta["file_name"], "ai-overview-2024.svg");
        assert!(meta.get("bytes").is_none());
    }
}
