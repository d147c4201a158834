//! Reaktion auf Labelmap-Änderungen: Overlay neu berechnen, genau die betroffenen Viewports rendern.

use super::state::{SegmentationRecord, SegmentationState};
use crate::app::tool_groups::ToolGroupManager;
use crate::app::turn_log::TurnReport;
use crate::core::{ViewportEvent, ViewportEventDetail, ViewportRef};
use crate::error::{CoordinationError, Result};
use crate::render::{SegmentationOverlay, ViewportKind, ViewportRegistry, VolumeStore};
use std::collections::HashMap;

/// Auslöser einer Labelmap-Aktualisierung.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelmapUpdate {
    pub viewport_id: String,
    /// Scene des auslösenden Viewports; Stack-Viewports haben keine
    pub scene_id: Option<String>,
    pub rendering_engine_id: String,
    /// `None` = alle sichtbaren Segmentierungen betroffen
    pub segmentation_id: Option<String>,
}

impl LabelmapUpdate {
    pub fn new(viewport: &ViewportRef, scene_id: Option<&str>) -> Self {
        Self {
            viewport_id: viewport.viewport_id.clone(),
            scene_id: scene_id.map(str::to_string),
            rendering_engine_id: viewport.rendering_engine_id.clone(),
            segmentation_id: None,
        }
    }

    pub fn for_segmentation(mut self, segmentation_id: impl Into<String>) -> Self {
        self.segmentation_id = Some(segmentation_id.into());
        self
    }

    pub fn viewport(&self) -> ViewportRef {
        ViewportRef::new(&self.rendering_engine_id, &self.viewport_id)
    }
}

impl From<&ViewportEvent> for LabelmapUpdate {
    fn from(event: &ViewportEvent) -> Self {
        let segmentation_id = match &event.detail {
            ViewportEventDetail::LabelmapUpdated { segmentation_id } => segmentation_id.clone(),
            _ => None,
        };
        Self {
            viewport_id: event.viewport.viewport_id.clone(),
            scene_id: event.scene_id.clone(),
            rendering_engine_id: event.viewport.rendering_engine_id.clone(),
            segmentation_id,
        }
    }
}

/// Berechnet das Overlay einer Segmentierung aus deren Labelmap-Volume.
pub(super) fn compute_overlay(
    record: &SegmentationRecord,
    volumes: &dyn VolumeStore,
) -> Result<SegmentationOverlay> {
    let volume =
        volumes
            .volume(&record.volume_id)
            .ok_or_else(|| CoordinationError::VolumeNotFound {
                volume_id: record.volume_id.clone(),
            })?;
    Ok(SegmentationOverlay {
        segmentation_id: record.segmentation_id.clone(),
        volume_id: record.volume_id.clone(),
        representation_type: record.representation_type,
        labels: volume.distinct_labels(),
        data_version: volume.version,
    })
}

/// Verarbeitet ein Labelmap-Update und gibt die gerenderten Viewports zurück.
///
/// Ohne Scene (Stack-Viewport) ist die Operation nicht definiert und schlägt
/// sofort mit `UnsupportedOperation` fehl.
pub fn on_labelmap_updated(
    tool_groups: &ToolGroupManager,
    state: &SegmentationState,
    viewports: &mut ViewportRegistry,
    volumes: &dyn VolumeStore,
    update: &LabelmapUpdate,
    report: &mut TurnReport,
) -> Result<Vec<ViewportRef>> {
    let Some(scene_id) = update.scene_id.as_deref() else {
        return Err(CoordinationError::UnsupportedOperation {
            operation: "Labelmap-Update".to_string(),
            viewport: update.viewport(),
            reason: "Viewport gehört zu keiner Scene (Stack)".to_string(),
        });
    };

    let scene_viewports = viewports.viewports_in_scene(&update.rendering_engine_id, scene_id);
    let mut affected: Vec<ViewportRef> = Vec::new();
    // Ein Overlay pro Segmentierung und Update; `None` = Volume fehlt
    let mut overlays: HashMap<&str, Option<SegmentationOverlay>> = HashMap::new();

    for viewport in &scene_viewports {
        let groups = tool_groups.tool_groups_for_viewport(viewport);
        let mut touched = false;
        for group in groups {
            let representations = state
                .representations_for_tool_group(group.id())
                .filter(|rep| rep.visible)
                .filter(|rep| {
                    update
                        .segmentation_id
                        .as_deref()
                        .is_none_or(|id| id == rep.segmentation_id)
                });
            for rep in representations {
                let overlay = match overlays.get(rep.segmentation_id.as_str()) {
                    Some(cached) => cached.clone(),
                    None => {
                        let computed = match state.segmentation(&rep.segmentation_id) {
                            Some(record) => match compute_overlay(record, volumes) {
                                Ok(overlay) => Some(overlay),
                                Err(err) if err.is_lookup_miss() => {
                                    report.record_lookup_miss("Segmentierungs-Dispatcher", err);
                                    None
                                }
                                Err(err) => return Err(err),
                            },
                            None => None,
                        };
                        overlays.insert(rep.segmentation_id.as_str(), computed.clone());
                        computed
                    }
                };
                let Some(overlay) = overlay else {
                    continue;
                };
                match viewports.resolve_mut(viewport) {
                    Ok(target) => {
                        target.set_segmentation_overlay(overlay);
                        touched = true;
                    }
                    Err(err) => report.record_lookup_miss("Segmentierungs-Dispatcher", err),
                }
            }
        }
        if touched && !affected.contains(viewport) {
            affected.push(viewport.clone());
        }
    }

    log::debug!(
        "Labelmap-Update in Scene '{}' ({}): {} von {} Viewports betroffen",
        scene_id,
        update.rendering_engine_id,
        affected.len(),
        scene_viewports.len()
    );

    viewports.render_viewports(&affected);
    for viewport in &affected {
        if !report.overlays_updated.contains(viewport) {
            report.overlays_updated.push(viewport.clone());
        }
        if !report.rendered.contains(viewport) {
            report.rendered.push(viewport.clone());
        }
    }
    Ok(affected)
}

/// Gleicht die Overlays aller Volume-Viewports einer Gruppe mit deren
/// Repräsentationen ab und rendert sie.
pub(super) fn refresh_tool_group(
    tool_groups: &ToolGroupManager,
    state: &SegmentationState,
    viewports: &mut ViewportRegistry,
    volumes: &dyn VolumeStore,
    tool_group_id: &str,
) -> Result<Vec<ViewportRef>> {
    let group = tool_groups.require(tool_group_id)?;
    let visible: Vec<SegmentationOverlay> = state
        .representations_for_tool_group(tool_group_id)
        .filter(|rep| rep.visible)
        .filter_map(|rep| state.segmentation(&rep.segmentation_id))
        .filter_map(|record| match compute_overlay(record, volumes) {
            Ok(overlay) => Some(overlay),
            Err(err) => {
                log::warn!("Overlay für '{}' nicht berechenbar: {}", record.segmentation_id, err);
                None
            }
        })
        .collect();

    let mut refreshed = Vec::new();
    for viewport_ref in group.viewports() {
        let viewport = match viewports.resolve_mut(&viewport_ref) {
            Ok(viewport) => viewport,
            Err(err) => {
                log::warn!("ToolGroup '{}': {}", tool_group_id, err);
                continue;
            }
        };
        if viewport.kind() == ViewportKind::Stack {
            continue;
        }
        let stale: Vec<String> = viewport
            .segmentation_overlays()
            .iter()
            .filter(|existing| {
                !visible
                    .iter()
                    .any(|o| o.segmentation_id == existing.segmentation_id)
            })
            .map(|existing| existing.segmentation_id.clone())
            .collect();
        for segmentation_id in &stale {
            viewport.remove_segmentation_overlay(segmentation_id);
        }
        for overlay in &visible {
            viewport.set_segmentation_overlay(overlay.clone());
        }
        refreshed.push(viewport_ref);
    }

    viewports.render_viewports(&refreshed);
    Ok(refreshed)
}

/// Entfernt die Overlays einer Segmentierung aus allen Viewports der Gruppen.
pub(super) fn clear_overlays(
    tool_groups: &ToolGroupManager,
    viewports: &mut ViewportRegistry,
    tool_group_ids: &[String],
    segmentation_id: &str,
) -> Vec<ViewportRef> {
    let mut cleared = Vec::new();
    for tool_group_id in tool_group_ids {
        let Some(group) = tool_groups.get_tool_group(tool_group_id) else {
            continue;
        };
        for viewport_ref in group.viewports() {
            let Ok(viewport) = viewports.resolve_mut(&viewport_ref) else {
                continue;
            };
            let present = viewport
                .segmentation_overlays()
                .iter()
                .any(|o| o.segmentation_id == segmentation_id);
            if present {
                viewport.remove_segmentation_overlay(segmentation_id);
                if !cleared.contains(&viewport_ref) {
                    cleared.push(viewport_ref);
                }
            }
        }
    }
    viewports.render_viewports(&cleared);
    cleared
}
