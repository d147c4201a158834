use super::{Annotation, RenderContext, Tool, ToolAction, ToolContext};
use crate::core::InputEvent;
use crate::error::Result;

/// Listet die sichtbaren Segmentierungs-Overlays eines Viewports.
///
/// Reagiert auf keine Eingaben; wird üblicherweise nur `Enabled` geschaltet.
pub struct SegmentationDisplayTool;

impl SegmentationDisplayTool {
    pub const NAME: &'static str = "SegmentationDisplay";
}

impl Tool for SegmentationDisplayTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_input(&self, _ctx: &mut ToolContext<'_>, _event: &InputEvent) -> Result<ToolAction> {
        Ok(ToolAction::Ignored)
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<Annotation>> {
        let viewport = ctx.viewports.resolve(ctx.viewport)?;
        let active = ctx.segmentation.active_segmentation_id(ctx.tool_group_id);

        Ok(ctx
            .segmentation
            .representations_for_tool_group(ctx.tool_group_id)
            .filter(|rep| rep.visible)
            .filter_map(|rep| {
                viewport
                    .segmentation_overlays()
                    .iter()
                    .find(|overlay| overlay.segmentation_id == rep.segmentation_id)
            })
            .map(|overlay| Annotation::Segmentation {
                segmentation_id: overlay.segmentation_id.clone(),
                labels: overlay.labels.clone(),
                active: active == Some(overlay.segmentation_id.as_str()),
            })
            .collect())
    }
}
