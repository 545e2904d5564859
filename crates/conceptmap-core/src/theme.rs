//! Renderer presentation parameters.
//!
//! Resolved once from [`SiteConfig`] at startup and shared read-only (usually behind an `Arc`)
//! by the renderer and the render coordinator. Nothing here is derived from the concept graph.

use crate::{ConceptType, Result, SiteConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPalette {
    pub fill: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    /// Labels wider than this (in px) wrap onto additional lines.
    pub max_node_width: f64,
    pub padding: f64,
    /// Horizontal gap between the columns of adjacent tree levels.
    pub level_gap: f64,
    /// Vertical gap between sibling nodes.
    pub sibling_gap: f64,
    pub root: TierPalette,
    pub secondary: TierPalette,
    pub tertiary: TierPalette,
}

impl Default for Theme {
    fn default() -> Self {
        // The built-in site config only holds well-typed values.
        Self::from_config(&SiteConfig::default()).unwrap_or_else(|_| Self::fallback())
    }
}

impl Theme {
    fn fallback() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            max_node_width: 200.0,
            padding: 10.0,
            level_gap: 80.0,
            sibling_gap: 24.0,
            root: TierPalette {
                fill: "#1f1fb4".to_string(),
                text: "#ffffff".to_string(),
            },
            secondary: TierPalette {
                fill: "#ffff78".to_string(),
                text: "black".to_string(),
            },
            tertiary: TierPalette {
                fill: "#ccff86".to_string(),
                text: "black".to_string(),
            },
        }
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let fb = Self::fallback();
        let palette = |tier: &str, fb: &TierPalette| -> Result<TierPalette> {
            Ok(TierPalette {
                fill: config.read_string(&format!("themeVariables.{tier}.fill"), &fb.fill)?,
                text: config.read_string(&format!("themeVariables.{tier}.text"), &fb.text)?,
            })
        };
        Ok(Self {
            font_family: config.read_string("fontFamily", &fb.font_family)?,
            font_size: config.read_f64("fontSize", fb.font_size)?.max(1.0),
            max_node_width: config
                .read_f64("mindmap.maxNodeWidth", fb.max_node_width)?
                .max(1.0),
            padding: config.read_f64("mindmap.padding", fb.padding)?.max(0.0),
            level_gap: config.read_f64("mindmap.levelGap", fb.level_gap)?.max(0.0),
            sibling_gap: config
                .read_f64("mindmap.siblingGap", fb.sibling_gap)?
                .max(0.0),
            root: palette("root", &fb.root)?,
            secondary: palette("secondary", &fb.secondary)?,
            tertiary: palette("tertiary", &fb.tertiary)?,
        })
    }

    pub fn palette(&self, tier: ConceptType) -> &TierPalette {
        match tier {
            ConceptType::Main => &self.root,
            ConceptType::Secondary => &self.secondary,
            ConceptType::Tertiary => &self.tertiary,
        }
    }
}
