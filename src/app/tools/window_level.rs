use super::{Tool, ToolAction, ToolContext};
use crate::core::{Binding, InputButton, InputEvent, InputEventKind};
use crate::error::Result;

/// Fensterbreite (horizontal) und Fensterzentrum (vertikal) per Drag.
pub struct WindowLevelTool;

impl WindowLevelTool {
    pub const NAME: &'static str = "WindowLevel";
}

impl Tool for WindowLevelTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn default_bindings(&self) -> Vec<Binding> {
        vec![Binding::new(InputButton::Primary)]
    }

    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction> {
        if event.kind != InputEventKind::PointerDrag || event.delta == glam::Vec2::ZERO {
            return Ok(ToolAction::Ignored);
        }
        let sensitivity = ctx
            .options
            .f32("sensitivity")
            .unwrap_or(ctx.settings.window_level_sensitivity);

        let viewport = ctx.viewports.resolve_mut(ctx.viewport)?;
        let mut properties = viewport.properties();
        let current = properties.voi_range.unwrap_or_default();
        properties.voi_range = Some(current.adjusted(
            event.delta.x * sensitivity,
            event.delta.y * sensitivity,
        ));
        viewport.set_properties(properties);
        Ok(ToolAction::Handled)
    }
}
