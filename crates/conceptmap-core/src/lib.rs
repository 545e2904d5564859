#![forbid(unsafe_code)]

//! Concept graph model + mindmap diagram code generator (headless).
//!
//! Design goals:
//! - deterministic, byte-stable diagram text for the same graph and title
//! - never fail on user content: sanitization instead of rejection
//! - no I/O and no async; rendering lives in `conceptmap-render`

pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod sanitize;
pub mod theme;

pub use config::SiteConfig;
pub use error::{Error, Result};
pub use generate::{GeneratorOptions, generate, generate_with_options};
pub use model::{Concept, ConceptGraph, ConceptId, ConceptType};
pub use theme::{Theme, TierPalette};
