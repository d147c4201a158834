//! Nicht-besitzende Viewport-Referenz.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Schlüssel `(renderingEngineId, viewportId)` auf einen Viewport.
///
/// Niemals ein Live-Handle: Die Referenz wird erst am Verwendungsort über die
/// [`ViewportRegistry`](crate::render::ViewportRegistry) aufgelöst. Ein
/// inzwischen entsorgter Viewport ist dort ein normaler Lookup-Miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewportRef {
    /// ID der RenderingEngine, die den Viewport besitzt
    pub rendering_engine_id: String,
    /// ID des Viewports innerhalb der Engine
    pub viewport_id: String,
}

impl ViewportRef {
    /// Erstellt eine neue Referenz.
    pub fn new(rendering_engine_id: impl Into<String>, viewport_id: impl Into<String>) -> Self {
        Self {
            rendering_engine_id: rendering_engine_id.into(),
            viewport_id: viewport_id.into(),
        }
    }

    /// Referenz auf einen anderen Viewport derselben Engine.
    pub fn sibling(&self, viewport_id: impl Into<String>) -> Self {
        Self::new(self.rendering_engine_id.clone(), viewport_id)
    }
}

impl fmt::Display for ViewportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.rendering_engine_id, self.viewport_id)
    }
}
