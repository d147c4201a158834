//! Labelmap-Segmentierungen: Registrierung, Repräsentationen je ToolGroup, Dispatch.

mod dispatcher;
mod state;

pub use dispatcher::{on_labelmap_updated, LabelmapUpdate};
pub use state::{
    LabelmapData, RepresentationConfig, RepresentationInput, SegmentationInput,
    SegmentationRecord, SegmentationRepresentation, SegmentationState,
};

use super::context::CoordinationContext;
use crate::core::ViewportRef;
use crate::error::{CoordinationError, Result};
use std::collections::HashSet;

/// Registriert Segmentierungen. Alle Einträge werden vorab geprüft,
/// bei einem Fehler bleibt der Zustand unverändert.
pub fn add_segmentations(ctx: &mut CoordinationContext, inputs: &[SegmentationInput]) -> Result<()> {
    let mut seen = HashSet::new();
    for input in inputs {
        let id = &input.segmentation_id;
        if ctx.segmentation.segmentation(id).is_some() || !seen.insert(id.as_str()) {
            return Err(CoordinationError::DuplicateSegmentation {
                segmentation_id: id.clone(),
            });
        }
        let volume_id = &input.representation.data.volume_id;
        if ctx.volumes.volume(volume_id).is_none() {
            return Err(CoordinationError::MissingBackingVolume {
                segmentation_id: id.clone(),
                volume_id: volume_id.clone(),
            });
        }
    }

    for input in inputs {
        ctx.segmentation.insert_segmentation(SegmentationRecord {
            segmentation_id: input.segmentation_id.clone(),
            volume_id: input.representation.data.volume_id.clone(),
            representation_type: input.representation.representation_type,
        })?;
        log::info!(
            "Segmentierung '{}' registriert (Volume '{}')",
            input.segmentation_id,
            input.representation.data.volume_id
        );
    }
    Ok(())
}

/// Legt Repräsentationen für eine ToolGroup an und rendert deren Viewports.
///
/// Gibt die UIDs der neuen Repräsentationen zurück.
pub fn add_segmentation_representations(
    ctx: &mut CoordinationContext,
    tool_group_id: &str,
    inputs: &[RepresentationInput],
) -> Result<Vec<String>> {
    ctx.tool_groups.require(tool_group_id)?;
    let mut seen = HashSet::new();
    for input in inputs {
        ctx.segmentation.require_segmentation(&input.segmentation_id)?;
        let duplicate = ctx
            .segmentation
            .representation(tool_group_id, &input.segmentation_id)
            .is_some();
        if duplicate || !seen.insert(input.segmentation_id.as_str()) {
            return Err(CoordinationError::DuplicateRepresentation {
                tool_group_id: tool_group_id.to_string(),
                segmentation_id: input.segmentation_id.clone(),
            });
        }
    }

    let mut uids = Vec::with_capacity(inputs.len());
    for input in inputs {
        let rep = ctx.segmentation.insert_representation(tool_group_id, input)?;
        log::info!(
            "Repräsentation '{}' für Segmentierung '{}' in ToolGroup '{}'",
            rep.uid,
            rep.segmentation_id,
            tool_group_id
        );
        uids.push(rep.uid.clone());
    }

    refresh(ctx, tool_group_id)?;
    Ok(uids)
}

/// Entfernt eine Segmentierung samt Repräsentationen und Overlays.
pub fn remove_segmentation(
    ctx: &mut CoordinationContext,
    segmentation_id: &str,
) -> Result<SegmentationRecord> {
    let (record, removed) = ctx.segmentation.remove_segmentation(segmentation_id)?;
    let groups: Vec<String> = removed.into_iter().map(|rep| rep.tool_group_id).collect();
    dispatcher::clear_overlays(&ctx.tool_groups, &mut ctx.viewports, &groups, segmentation_id);
    log::info!("Segmentierung '{}' entfernt", segmentation_id);
    Ok(record)
}

/// Entfernt alle Repräsentationen einer Gruppe; die Segmentierungen bleiben registriert.
pub fn remove_representations_for_tool_group(
    ctx: &mut CoordinationContext,
    tool_group_id: &str,
) -> Vec<SegmentationRepresentation> {
    let removed = ctx
        .segmentation
        .remove_representations_for_tool_group(tool_group_id);
    let groups = [tool_group_id.to_string()];
    for rep in &removed {
        dispatcher::clear_overlays(
            &ctx.tool_groups,
            &mut ctx.viewports,
            &groups,
            &rep.segmentation_id,
        );
    }
    removed
}

/// Setzt die aktive Segmentierung (Ziel des Pinsels) einer Gruppe.
pub fn set_active_segmentation(
    ctx: &mut CoordinationContext,
    tool_group_id: &str,
    segmentation_id: &str,
) -> Result<()> {
    ctx.tool_groups.require(tool_group_id)?;
    ctx.segmentation.set_active(tool_group_id, segmentation_id)?;
    log::debug!(
        "ToolGroup '{}': aktive Segmentierung '{}'",
        tool_group_id,
        segmentation_id
    );
    Ok(())
}

pub fn active_segmentation<'a>(
    ctx: &'a CoordinationContext,
    tool_group_id: &str,
) -> Option<&'a SegmentationRecord> {
    ctx.segmentation.active_segmentation(tool_group_id)
}

/// Blendet eine Repräsentation ein oder aus und rendert die Gruppe bei Änderung.
pub fn set_representation_visibility(
    ctx: &mut CoordinationContext,
    tool_group_id: &str,
    segmentation_id: &str,
    visible: bool,
) -> Result<Vec<ViewportRef>> {
    ctx.tool_groups.require(tool_group_id)?;
    let changed = ctx
        .segmentation
        .set_visibility(tool_group_id, segmentation_id, visible)?;
    if !changed {
        return Ok(Vec::new());
    }
    refresh(ctx, tool_group_id)
}

fn refresh(ctx: &mut CoordinationContext, tool_group_id: &str) -> Result<Vec<ViewportRef>> {
    dispatcher::refresh_tool_group(
        &ctx.tool_groups,
        &ctx.segmentation,
        &mut ctx.viewports,
        ctx.volumes.as_ref(),
        tool_group_id,
    )
}
