//! Culling configuration.
//!
//! Conflicting interactive tools and third-party extensions are injected
//! here as data rather than baked into the engine: hosts differ in which
//! tool is unsafe to re-tag under, and the identifiers are versioned host
//! internals that do not belong in library code.

use std::time::Duration;

use serde::Deserialize;

use crate::document::{Document, ExtensionId, ToolId};

/// Default name of the marker tag.
pub const DEFAULT_MARKER_TAG: &str = "Hide Back Faces";

/// Default debounce delay for edit-context resets, in milliseconds.
pub const DEFAULT_RESET_DELAY_MS: u64 = 100;

/// An interactive tool during which live re-tagging must be suppressed.
///
/// When `requires_extension` is set, the conflict only applies while that
/// extension is loaded (some tools are only unsafe in combination with a
/// specific extension).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolConflict {
    pub tool: ToolId,
    #[serde(default)]
    pub requires_extension: Option<ExtensionId>,
}

/// Settings for one culling session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CullingSettings {
    /// Name of the reserved marker tag.
    #[serde(default = "default_marker_tag")]
    pub marker_tag: String,
    /// Debounce delay for edit-context resets, in milliseconds.
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u64,
    /// Tools (optionally gated on an extension) that suppress updates.
    #[serde(default, rename = "tool_conflict")]
    pub tool_conflicts: Vec<ToolConflict>,
}

fn default_marker_tag() -> String {
    DEFAULT_MARKER_TAG.to_string()
}

fn default_reset_delay_ms() -> u64 {
    DEFAULT_RESET_DELAY_MS
}

impl Default for CullingSettings {
    fn default() -> Self {
        Self {
            marker_tag: default_marker_tag(),
            reset_delay_ms: default_reset_delay_ms(),
            tool_conflicts: Vec::new(),
        }
    }
}

impl CullingSettings {
    /// Loads settings from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// The debounce delay as a [`Duration`].
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    /// Returns `true` if the document's current interactive state conflicts
    /// with live re-tagging.
    pub fn conflicts_with(&self, doc: &Document) -> bool {
        let Some(active) = doc.active_tool() else {
            return false;
        };
        self.tool_conflicts.iter().any(|conflict| {
            conflict.tool == active
                && conflict
                    .requires_extension
                    .as_ref()
                    .is_none_or(|ext| doc.extension_loaded(ext))
        })
    }
}
