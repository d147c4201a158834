use super::{Tool, ToolAction, ToolContext};
use crate::core::{Binding, InputButton, InputEvent, InputEventKind};
use crate::error::Result;
use crate::render::ViewportKind;

/// Mausrad blättert durch den Stack bzw. verschiebt die Schicht eines Volume-Viewports.
pub struct StackScrollMouseWheelTool;

impl StackScrollMouseWheelTool {
    pub const NAME: &'static str = "StackScrollMouseWheel";
}

impl Tool for StackScrollMouseWheelTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn default_bindings(&self) -> Vec<Binding> {
        vec![Binding::new(InputButton::Wheel)]
    }

    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction> {
        if event.kind != InputEventKind::Wheel {
            return Ok(ToolAction::Ignored);
        }
        let steps = event.delta.y.round() as i32 * ctx.settings.stack_scroll_step;
        if steps == 0 {
            return Ok(ToolAction::Ignored);
        }

        let viewport = ctx.viewports.resolve_mut(ctx.viewport)?;
        match viewport.kind() {
            ViewportKind::Stack => {
                let count = viewport.image_count();
                let Some(current) = viewport.image_index() else {
                    return Ok(ToolAction::Ignored);
                };
                let last = count.saturating_sub(1) as i64;
                let target = (current as i64 + i64::from(steps)).clamp(0, last) as usize;
                if target == current || !viewport.set_image_index(target) {
                    return Ok(ToolAction::Ignored);
                }
            }
            ViewportKind::Orthographic | ViewportKind::Volume3D => {
                let spacing = ctx.options.f32("slice_spacing").unwrap_or(1.0);
                let mut camera = viewport.camera();
                camera.translate(camera.view_plane_normal * (steps as f32 * spacing));
                viewport.set_camera(camera);
            }
        }
        Ok(ToolAction::Handled)
    }
}
