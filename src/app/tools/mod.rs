//! Trait-basiertes Tool-System für Zeiger-Werkzeuge.
//!
//! Jedes Tool implementiert den [`Tool`]-Trait und wird bei der
//! [`ToolRegistry`] unter seinem Namen angemeldet. Tools sind zustandslos:
//! Alles, was sie brauchen, kommt über [`ToolContext`] bzw. [`RenderContext`]
//! herein, Viewports werden nur über `ViewportRef`-Schlüssel angesprochen.

/// Kamera-Werkzeuge: Pan, Zoom, VolumeRotate.
mod camera_tools;
/// Crosshairs mit Referenzlinien über alle Viewports der Gruppe.
pub mod crosshairs;
/// Labelmap-Pinsel.
mod brush;
/// Ebenen-Sprung per Klick in ein MIP-Viewport.
mod mip_jump;
/// Overlay-Liste der Segmentierungen.
mod segmentation_display;
/// Bildwechsel per Mausrad.
mod stack_scroll;
/// Fensterbreite/-zentrum per Drag.
mod window_level;

pub use brush::BrushTool;
pub use camera_tools::{PanTool, VolumeRotateMouseWheelTool, ZoomTool};
pub use crosshairs::CrosshairsTool;
pub use mip_jump::MipJumpToClickTool;
pub use segmentation_display::SegmentationDisplayTool;
pub use stack_scroll::StackScrollMouseWheelTool;
pub use window_level::WindowLevelTool;

use super::reference_lines::ReferenceLine;
use super::segmentation::SegmentationState;
use super::tool_groups::{ToolMode, ToolOptions};
use crate::core::{Binding, InputEvent, ViewportRef};
use crate::error::{CoordinationError, Result};
use crate::render::{ViewportRegistry, VolumeStore};
use crate::shared::CoordinationOptions;
use glam::Vec3;
use indexmap::IndexMap;

// ── Typen ────────────────────────────────────────────────────────

/// Rückgabe von `on_input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    /// Event war für dieses Tool bedeutungslos
    Ignored,
    /// Tool hat reagiert (Mutationen lösen eigene Events aus)
    Handled,
}

/// Overlay-Geometrie, die ein Tool für einen Viewport zeichnen möchte.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Schnittlinie der Ebene eines anderen Viewports mit dem gezeichneten
    ReferenceLine(ReferenceLine),
    /// Crosshair-Zentrum (Schnittpunkt aller Ebenen)
    CrosshairCenter { position: Vec3 },
    /// Sichtbares Segmentierungs-Overlay
    Segmentation {
        segmentation_id: String,
        labels: Vec<u32>,
        active: bool,
    },
}

/// Alles, was ein Tool während eines Event-Turns anfassen darf.
pub struct ToolContext<'a> {
    pub tool_group_id: &'a str,
    /// Viewport, auf dem das Event entstand
    pub viewport: &'a ViewportRef,
    /// Alle Viewports der Gruppe (Registrierungsreihenfolge)
    pub group_viewports: &'a [ViewportRef],
    pub options: &'a ToolOptions,
    pub settings: &'a CoordinationOptions,
    pub viewports: &'a mut ViewportRegistry,
    pub volumes: &'a mut dyn VolumeStore,
    pub segmentation: &'a SegmentationState,
}

/// Lesender Kontext für `render`.
pub struct RenderContext<'a> {
    pub tool_group_id: &'a str,
    /// Viewport, für den gezeichnet wird
    pub viewport: &'a ViewportRef,
    pub group_viewports: &'a [ViewportRef],
    pub options: &'a ToolOptions,
    pub mode: ToolMode,
    pub settings: &'a CoordinationOptions,
    pub viewports: &'a ViewportRegistry,
    pub segmentation: &'a SegmentationState,
}

// ── Tool-Trait ───────────────────────────────────────────────────

/// Geschlossene Fähigkeits-Schnittstelle eines Tools.
pub trait Tool {
    /// Registrierungsname (z.B. `"WindowLevel"`)
    fn name(&self) -> &'static str;

    /// Bindings, wenn `set_tool_active` keine angibt und keine gespeichert sind.
    fn default_bindings(&self) -> Vec<Binding> {
        Vec::new()
    }

    /// Manipulation im Modus `Active` (nur bei passendem Binding).
    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction>;

    /// Hover/Selektion im Modus `Passive`. `true` = Viewport neu zeichnen.
    fn on_hover(&self, _ctx: &mut ToolContext<'_>, _event: &InputEvent) -> Result<bool> {
        Ok(false)
    }

    /// Overlays in den Modi `Enabled`, `Passive` und `Active`.
    fn render(&self, _ctx: &RenderContext<'_>) -> Result<Vec<Annotation>> {
        Ok(Vec::new())
    }
}

// ── ToolRegistry ─────────────────────────────────────────────────

/// Typisierte Registry aller Tool-Verhalten, nach Name.
pub struct ToolRegistry {
    tools: IndexMap<&'static str, Box<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_default_tools()
    }
}

impl ToolRegistry {
    /// Leere Registry.
    pub fn empty() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Registry mit allen mitgelieferten Tools.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::empty();
        let defaults: Vec<Box<dyn Tool>> = vec![
            Box::new(WindowLevelTool),
            Box::new(PanTool),
            Box::new(ZoomTool),
            Box::new(StackScrollMouseWheelTool),
            Box::new(VolumeRotateMouseWheelTool),
            Box::new(MipJumpToClickTool),
            Box::new(CrosshairsTool),
            Box::new(BrushTool),
            Box::new(SegmentationDisplayTool),
        ];
        for tool in defaults {
            registry.tools.insert(tool.name(), tool);
        }
        registry
    }

    /// Meldet ein Tool an. Doppelte Namen sind ein Konfigurationsfehler.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name();
        if self.tools.contains_key(name) {
            return Err(CoordinationError::DuplicateToolRegistration {
                tool: name.to_string(),
            });
        }
        log::info!("Tool '{}' registriert", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Wie [`ToolRegistry::get`], aber unbekannte Namen → `ToolNotFound`.
    pub fn require(&self, name: &str) -> Result<&dyn Tool> {
        self.get(name).ok_or_else(|| CoordinationError::ToolNotFound {
            tool: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Namen aller Tools in Registrierungsreihenfolge.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }
}
