use super::{Tool, ToolAction, ToolContext};
use crate::core::{Binding, InputButton, InputEvent, InputEventKind};
use crate::error::Result;

/// Klick in ein MIP-Viewport setzt die Ebenen der Ziel-Viewports auf den Punkt.
///
/// Option `target_viewport_ids`: Viewport-IDs derselben Engine.
pub struct MipJumpToClickTool;

impl MipJumpToClickTool {
    pub const NAME: &'static str = "MIPJumpToClick";
}

impl Tool for MipJumpToClickTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn default_bindings(&self) -> Vec<Binding> {
        vec![Binding::new(InputButton::Primary)]
    }

    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction> {
        if event.kind != InputEventKind::PointerDown {
            return Ok(ToolAction::Ignored);
        }
        let Some(world) = event.world_position else {
            return Ok(ToolAction::Ignored);
        };
        let targets = ctx.options.string_list("target_viewport_ids").unwrap_or_default();
        if targets.is_empty() {
            log::debug!("MIPJumpToClick ohne Ziel-Viewports in '{}'", ctx.tool_group_id);
            return Ok(ToolAction::Ignored);
        }

        for target_id in targets {
            let target = ctx.viewport.sibling(target_id);
            match ctx.viewports.resolve_mut(&target) {
                Ok(viewport) => {
                    let mut camera = viewport.camera();
                    camera.move_plane_through(world);
                    viewport.set_camera(camera);
                }
                Err(e) => log::warn!("MIPJumpToClick: {}", e),
            }
        }
        Ok(ToolAction::Handled)
    }
}
