use super::{Tool, ToolAction, ToolContext};
use crate::core::{
    Binding, InputButton, InputEvent, InputEventKind, ViewportEvent, ViewportEventDetail,
};
use crate::error::{CoordinationError, Result};
use crate::shared::options::BRUSH_SEGMENT_INDEX;

/// Malt Kugeln in die Labelmap der aktiven Segmentierung der Gruppe.
///
/// Optionen: `radius` (Voxel), `segment_index`, `erase` (malt 0).
pub struct BrushTool;

impl BrushTool {
    pub const NAME: &'static str = "Brush";
}

impl Tool for BrushTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn default_bindings(&self) -> Vec<Binding> {
        vec![Binding::new(InputButton::Primary)]
    }

    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction> {
        if !matches!(
            event.kind,
            InputEventKind::PointerDown | InputEventKind::PointerDrag
        ) {
            return Ok(ToolAction::Ignored);
        }
        let Some(center) = event.world_position else {
            return Ok(ToolAction::Ignored);
        };
        let Some(record) = ctx.segmentation.active_segmentation(ctx.tool_group_id) else {
            log::debug!(
                "Brush: ToolGroup '{}' hat keine aktive Segmentierung",
                ctx.tool_group_id
            );
            return Ok(ToolAction::Ignored);
        };

        let Some(scene_id) = ctx
            .viewports
            .resolve(ctx.viewport)?
            .scene_id()
            .map(str::to_string)
        else {
            return Err(CoordinationError::UnsupportedOperation {
                operation: "Brush".to_string(),
                viewport: ctx.viewport.clone(),
                reason: "Viewport gehört zu keiner Scene (Stack)".to_string(),
            });
        };

        let radius_voxels = ctx
            .options
            .f32("radius")
            .unwrap_or(ctx.settings.brush_radius_voxels);
        let value = if ctx.options.bool("erase").unwrap_or(false) {
            0.0
        } else {
            ctx.options.u32("segment_index").unwrap_or(BRUSH_SEGMENT_INDEX) as f32
        };

        let labelmap = ctx.volumes.volume_mut(&record.volume_id).ok_or_else(|| {
            CoordinationError::VolumeNotFound {
                volume_id: record.volume_id.clone(),
            }
        })?;
        let radius = radius_voxels * labelmap.spacing.min_element();
        let changed = labelmap.paint_sphere(center, radius, value);
        if changed == 0 {
            return Ok(ToolAction::Ignored);
        }

        log::debug!(
            "Brush: {} Voxel in '{}' gesetzt",
            changed,
            record.segmentation_id
        );
        ctx.viewports.emit(ViewportEvent::new(
            ctx.viewport.clone(),
            Some(scene_id),
            ViewportEventDetail::LabelmapUpdated {
                segmentation_id: Some(record.segmentation_id.clone()),
            },
        ));
        Ok(ToolAction::Handled)
    }
}
