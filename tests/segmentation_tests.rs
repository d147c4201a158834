mod common;

use common::{context, headless, headless_mut, volumes, vp, CT_VOLUME_ID, LABELMAP_VOLUME_ID};
use glam::Vec3;
use std::cell::Cell;
use std::rc::Rc;
use viewport_coordination::app::segmentation::{
    self, LabelmapUpdate, RepresentationInput, SegmentationInput,
};
use viewport_coordination::app::tools::BrushTool;
use viewport_coordination::core::{DerivedVolumeSpec, Volume, VolumeSpec};
use viewport_coordination::{
    ActivationOptions, CoordinationContext, CoordinationController, CoordinationError,
    ErrorCategory, InputButton, InputEvent, MemoryVolumeStore, ToolOptions, VolumeStore,
};

const SEG: &str = "seg1";

/// CT-Gruppe mit Axial und Sagittal (Coronal liegt in derselben Scene, aber in keiner Gruppe).
fn ct_context() -> CoordinationContext {
    let mut ctx = context();
    let group = ctx
        .tool_groups
        .create_tool_group("ct")
        .expect("ToolGroup sollte angelegt werden");
    group.add_viewport(vp("CT_AXIAL"));
    group.add_viewport(vp("CT_SAGITTAL"));
    segmentation::add_segmentations(&mut ctx, &[SegmentationInput::labelmap(SEG, LABELMAP_VOLUME_ID)])
        .expect("Segmentierung sollte registriert werden");
    ctx
}

fn overlay_ids(ctx: &CoordinationContext, id: &str) -> Vec<String> {
    ctx.viewports
        .resolve(&vp(id))
        .expect("Viewport fehlt")
        .segmentation_overlays()
        .iter()
        .map(|o| o.segmentation_id.clone())
        .collect()
}

#[test]
fn test_duplicate_and_unbacked_segmentations_are_rejected_atomically() {
    let mut ctx = ct_context();

    let err = segmentation::add_segmentations(
        &mut ctx,
        &[SegmentationInput::labelmap(SEG, LABELMAP_VOLUME_ID)],
    )
    .expect_err("doppelte Segmentierung muss fehlschlagen");
    assert!(matches!(err, CoordinationError::DuplicateSegmentation { .. }));

    let err = segmentation::add_segmentations(
        &mut ctx,
        &[
            SegmentationInput::labelmap("seg2", LABELMAP_VOLUME_ID),
            SegmentationInput::labelmap("seg3", "missingVolume"),
        ],
    )
    .expect_err("fehlendes Volume muss fehlschlagen");
    assert!(matches!(err, CoordinationError::MissingBackingVolume { .. }));
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(ctx.segmentation.segmentation("seg2").is_none());
}

#[test]
fn test_representation_errors_and_first_representation_becomes_active() {
    let mut ctx = ct_context();
    ctx.volumes
        .create_and_cache_derived_volume(
            CT_VOLUME_ID,
            DerivedVolumeSpec {
                volume_id: "seg2Labelmap".into(),
            },
        )
        .expect("zweite Labelmap");
    segmentation::add_segmentations(&mut ctx, &[SegmentationInput::labelmap("seg2", "seg2Labelmap")])
        .expect("seg2 registrieren");

    assert!(matches!(
        segmentation::add_segmentation_representations(
            &mut ctx,
            "unknown",
            &[RepresentationInput::labelmap(SEG)]
        ),
        Err(CoordinationError::UnknownToolGroup { .. })
    ));
    assert!(matches!(
        segmentation::add_segmentation_representations(
            &mut ctx,
            "ct",
            &[RepresentationInput::labelmap("nope")]
        ),
        Err(CoordinationError::UnknownSegmentation { .. })
    ));

    let uids = segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG), RepresentationInput::labelmap("seg2")],
    )
    .expect("Repräsentationen sollten angelegt werden");
    assert_eq!(uids.len(), 2);
    assert_eq!(
        segmentation::active_segmentation(&ctx, "ct").map(|r| r.segmentation_id.as_str()),
        Some(SEG)
    );

    assert!(matches!(
        segmentation::add_segmentation_representations(
            &mut ctx,
            "ct",
            &[RepresentationInput::labelmap(SEG)]
        ),
        Err(CoordinationError::DuplicateRepresentation { .. })
    ));

    segmentation::set_active_segmentation(&mut ctx, "ct", "seg2").expect("seg2 aktivieren");
    assert_eq!(ctx.segmentation.active_segmentation_id("ct"), Some("seg2"));
}

#[test]
fn test_adding_representation_renders_group_viewports_with_overlay() {
    let mut ctx = ct_context();
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");

    assert_eq!(overlay_ids(&ctx, "CT_AXIAL"), vec![SEG.to_string()]);
    assert_eq!(overlay_ids(&ctx, "CT_SAGITTAL"), vec![SEG.to_string()]);
    assert!(overlay_ids(&ctx, "CT_CORONAL").is_empty());
    assert_eq!(
        headless(&ctx).last_render_request(),
        Some(["CT_AXIAL".to_string(), "CT_SAGITTAL".to_string()].as_slice())
    );
}

#[test]
fn test_labelmap_update_renders_exactly_the_affected_viewports() {
    let mut ctx = ct_context();
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");
    headless_mut(&mut ctx).clear_render_requests();

    let update = LabelmapUpdate::new(&vp("CT_CORONAL"), Some("CT"));
    let report = CoordinationController::new()
        .handle_labelmap_updated(&mut ctx, update)
        .expect("Update sollte durchlaufen");

    assert_eq!(report.rendered, vec![vp("CT_AXIAL"), vp("CT_SAGITTAL")]);
    assert_eq!(report.overlays_updated, report.rendered);
    let requests = headless(&ctx).render_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0], vec!["CT_AXIAL".to_string(), "CT_SAGITTAL".to_string()]);
}

/// Zählt Lesezugriffe auf ein Volume.
struct CountingVolumeStore {
    inner: MemoryVolumeStore,
    watched: &'static str,
    reads: Rc<Cell<usize>>,
}

impl VolumeStore for CountingVolumeStore {
    fn volume(&self, volume_id: &str) -> Option<&Volume> {
        if volume_id == self.watched {
            self.reads.set(self.reads.get() + 1);
        }
        self.inner.volume(volume_id)
    }

    fn volume_mut(&mut self, volume_id: &str) -> Option<&mut Volume> {
        self.inner.volume_mut(volume_id)
    }

    fn create_and_cache_volume(
        &mut self,
        volume_id: &str,
        spec: VolumeSpec,
    ) -> viewport_coordination::Result<&Volume> {
        self.inner.create_and_cache_volume(volume_id, spec)
    }

    fn create_and_cache_derived_volume(
        &mut self,
        source_volume_id: &str,
        spec: DerivedVolumeSpec,
    ) -> viewport_coordination::Result<&Volume> {
        self.inner.create_and_cache_derived_volume(source_volume_id, spec)
    }
}

#[test]
fn test_labelmap_update_computes_overlay_once_per_segmentation() {
    let mut ctx = ct_context();
    let reads = Rc::new(Cell::new(0));
    ctx.volumes = Box::new(CountingVolumeStore {
        inner: volumes(),
        watched: LABELMAP_VOLUME_ID,
        reads: Rc::clone(&reads),
    });
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");
    reads.set(0);

    let report = CoordinationController::new()
        .handle_labelmap_updated(&mut ctx, LabelmapUpdate::new(&vp("CT_AXIAL"), Some("CT")))
        .expect("Update sollte durchlaufen");

    assert_eq!(report.overlays_updated.len(), 2);
    assert_eq!(reads.get(), 1);
}

#[test]
fn test_labelmap_update_on_stack_viewport_is_unsupported() {
    let mut ctx = ct_context();
    headless_mut(&mut ctx).clear_render_requests();

    let err = CoordinationController::new()
        .handle_labelmap_updated(&mut ctx, LabelmapUpdate::new(&vp("DX"), None))
        .expect_err("Stack-Viewport muss abgelehnt werden");
    assert_eq!(err.category(), ErrorCategory::UnsupportedOperation);
    assert!(headless(&ctx).render_requests().is_empty());
}

#[test]
fn test_brush_stroke_updates_overlay_labels_in_same_turn() {
    let mut ctx = ct_context();
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");
    let group = ctx
        .tool_groups
        .get_tool_group_mut("ct")
        .expect("ToolGroup fehlt");
    group
        .add_tool(BrushTool::NAME, ToolOptions::new().with("segment_index", 2))
        .expect("Brush");
    group
        .set_tool_active(BrushTool::NAME, ActivationOptions::default())
        .expect("Brush aktivieren");

    let report = CoordinationController::new()
        .handle_input(
            &mut ctx,
            InputEvent::pointer_down(vp("CT_AXIAL"), InputButton::Primary, Vec3::ZERO),
        )
        .expect("Pinselstrich sollte durchlaufen");

    assert!(report.tool_handled);
    assert!(report.overlays_updated.contains(&vp("CT_SAGITTAL")));
    let viewport = ctx.viewports.resolve(&vp("CT_SAGITTAL")).expect("Viewport fehlt");
    let overlay = &viewport.segmentation_overlays()[0];
    assert_eq!(overlay.labels, vec![2]);
    assert_eq!(overlay.data_version, 1);
}

#[test]
fn test_brush_on_stack_viewport_is_rejected_before_painting() {
    let mut ctx = ct_context();
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");
    let group = ctx
        .tool_groups
        .get_tool_group_mut("ct")
        .expect("ToolGroup fehlt");
    group.add_viewport(vp("DX"));
    group
        .add_tool(BrushTool::NAME, ToolOptions::new())
        .expect("Brush");
    group
        .set_tool_active(BrushTool::NAME, ActivationOptions::default())
        .expect("Brush aktivieren");
    let turns_before = ctx.turn_log.len();

    let err = CoordinationController::new()
        .handle_input(
            &mut ctx,
            InputEvent::pointer_down(vp("DX"), InputButton::Primary, Vec3::ZERO),
        )
        .expect_err("Pinsel auf Stack muss abgelehnt werden");

    assert_eq!(err.category(), ErrorCategory::UnsupportedOperation);
    let labelmap = ctx
        .volumes
        .volume(LABELMAP_VOLUME_ID)
        .expect("Labelmap fehlt");
    assert_eq!(labelmap.version, 0);
    assert!(labelmap.distinct_labels().is_empty());
    assert_eq!(ctx.turn_log.len(), turns_before + 1);
    let recorded = ctx.turn_log.last().expect("Turn sollte protokolliert sein");
    assert_eq!(recorded.tool_group_id.as_deref(), Some("ct"));
    assert!(recorded.rendered.is_empty());
}

#[test]
fn test_hidden_representation_is_not_rendered_on_update() {
    let mut ctx = ct_context();
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");

    segmentation::set_representation_visibility(&mut ctx, "ct", SEG, false)
        .expect("Ausblenden sollte klappen");
    assert!(overlay_ids(&ctx, "CT_AXIAL").is_empty());

    let report = CoordinationController::new()
        .handle_labelmap_updated(&mut ctx, LabelmapUpdate::new(&vp("CT_AXIAL"), Some("CT")))
        .expect("Update sollte durchlaufen");
    assert!(report.rendered.is_empty());

    assert!(matches!(
        segmentation::set_representation_visibility(&mut ctx, "ct", "seg-x", true),
        Err(CoordinationError::UnknownSegmentation { .. })
    ));
}

#[test]
fn test_removing_segmentation_clears_overlays_and_outlives_tool_group() {
    let mut ctx = ct_context();
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");

    let removed = segmentation::remove_representations_for_tool_group(&mut ctx, "ct");
    assert_eq!(removed.len(), 1);
    assert!(ctx.tool_groups.destroy_tool_group("ct"));
    assert!(ctx.segmentation.segmentation(SEG).is_some());

    let record = segmentation::remove_segmentation(&mut ctx, SEG).expect("Entfernen sollte klappen");
    assert_eq!(record.volume_id, LABELMAP_VOLUME_ID);
    assert!(overlay_ids(&ctx, "CT_AXIAL").is_empty());
    assert!(ctx.segmentation.representations().is_empty());
}

#[test]
fn test_destroying_tool_group_drops_its_representations() {
    let mut ctx = ct_context();
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");
    assert_eq!(overlay_ids(&ctx, "CT_AXIAL"), vec![SEG.to_string()]);

    assert!(ctx.destroy_tool_group("ct"));
    assert!(!ctx.destroy_tool_group("ct"));
    assert!(ctx.segmentation.representations_for_tool_group("ct").next().is_none());
    assert!(segmentation::active_segmentation(&ctx, "ct").is_none());
    assert!(overlay_ids(&ctx, "CT_AXIAL").is_empty());
    assert!(ctx.segmentation.segmentation(SEG).is_some());

    ctx.tool_groups
        .create_tool_group("ct")
        .expect("ToolGroup sollte neu angelegt werden")
        .add_viewport(vp("CT_AXIAL"));
    let uids = segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("neue Gruppe sollte die Segmentierung wieder darstellen können");
    assert_eq!(uids.len(), 1);
}

#[test]
fn test_shutdown_drops_all_representations() {
    let mut ctx = ct_context();
    segmentation::add_segmentation_representations(
        &mut ctx,
        "ct",
        &[RepresentationInput::labelmap(SEG)],
    )
    .expect("Repräsentation sollte angelegt werden");

    ctx.shutdown();
    assert!(ctx.tool_groups.is_empty());
    assert!(ctx.segmentation.representations().is_empty());
    assert!(ctx.segmentation.segmentation(SEG).is_some());
}
