//! Viewport-Koordination Demo.
//!
//! Baut ein Headless-Layout (CT axial/sagittal/coronal, PT axial + MIP,
//! DX-Stack), verbindet ToolGroups, Synchronizer und eine Labelmap und
//! spielt eine feste Eingabefolge ab.

use anyhow::Context;
use glam::{Vec2, Vec3};
use viewport_coordination::app::reference_lines::{ReferenceLineTable, REFERENCE_LINES_OPTION};
use viewport_coordination::app::segmentation::{
    self, LabelmapUpdate, RepresentationInput, SegmentationInput,
};
use viewport_coordination::app::tools::{
    BrushTool, CrosshairsTool, MipJumpToClickTool, PanTool, SegmentationDisplayTool,
    StackScrollMouseWheelTool, VolumeRotateMouseWheelTool, WindowLevelTool, ZoomTool,
};
use viewport_coordination::core::{DerivedVolumeSpec, VolumeSpec};
use viewport_coordination::render::BlendMode;
use viewport_coordination::{
    ActivationOptions, Binding, CoordinationContext, CoordinationController, CoordinationOptions,
    HeadlessRenderingEngine, InputButton, InputEvent, MemoryVolumeStore, ModifierKey, Orientation,
    RenderingEngine, ToolOptions, TurnReport, ViewportInput, ViewportRef, VolumeStore,
};

const ENGINE_ID: &str = "demoRenderingEngine";
const CT_VOLUME_ID: &str = "ctVolume";
const SEGMENTATION_ID: &str = "ctSegmentation";
const LABELMAP_VOLUME_ID: &str = "ctSegmentationLabelmap";

fn main() -> anyhow::Result<()> {
    DemoRunner::run()
}

struct DemoRunner;

impl DemoRunner {
    fn run() -> anyhow::Result<()> {
        // Logger initialisieren
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();

        log::info!(
            "Viewport-Koordination Demo v{} startet...",
            env!("CARGO_PKG_VERSION")
        );

        let config_path = CoordinationOptions::config_path();
        let options = CoordinationOptions::load_from_file(&config_path);
        if !config_path.exists() {
            options
                .save_to_file(&config_path)
                .with_context(|| format!("Optionen nach {} schreiben", config_path.display()))?;
        }

        let mut ctx = CoordinationContext::new(options, Box::new(Self::volumes()?));
        ctx.viewports
            .register_engine(Box::new(Self::engine()))
            .context("Demo-Engine registrieren")?;
        Self::tool_groups(&mut ctx)?;
        Self::synchronizers(&mut ctx)?;
        Self::segmentation(&mut ctx)?;

        let mut controller = CoordinationController::new();
        for event in Self::script() {
            let label = format!("{:?} auf {}", event.kind, event.viewport);
            match controller.handle_input(&mut ctx, event) {
                Ok(report) => Self::log_report(&label, &report),
                Err(e) => log::error!("Turn '{}' fehlgeschlagen: {:#}", label, e),
            }
        }

        let axial = ViewportRef::new(ENGINE_ID, "CT_AXIAL");
        let annotations = controller
            .render_annotations(&ctx, &axial)
            .context("Overlays für CT_AXIAL")?;
        log::info!("{} Overlays auf {}", annotations.len(), axial);

        // Labelmap-Update auf einem Stack ist nicht definiert
        let stack_update = LabelmapUpdate::new(&ViewportRef::new(ENGINE_ID, "DX_STACK"), None);
        if let Err(e) = controller.handle_labelmap_updated(&mut ctx, stack_update) {
            log::warn!("Erwartet abgelehnt: {}", e);
        }

        if let Some(engine) = ctx.viewports.engine_as::<HeadlessRenderingEngine>(ENGINE_ID) {
            for id in engine.viewport_ids() {
                log::info!("{}: {} Renders", id, engine.render_count(&id));
            }
        }
        let hazards = ctx.tool_groups.shared_viewports();
        if !hazards.is_empty() {
            log::warn!("Viewports in mehreren ToolGroups: {:?}", hazards);
        }

        ctx.shutdown();
        Ok(())
    }

    fn volumes() -> anyhow::Result<MemoryVolumeStore> {
        let mut volumes = MemoryVolumeStore::new();
        let dimensions = [64, 64, 64];
        let voxel_count = dimensions.iter().product::<usize>();
        volumes
            .create_and_cache_volume(
                CT_VOLUME_ID,
                VolumeSpec {
                    dimensions,
                    spacing: Vec3::ONE,
                    origin: Vec3::splat(-32.0),
                    data: Some((0..voxel_count).map(|i| (i % 2048) as f32 - 1024.0).collect()),
                },
            )
            .context("CT-Volume anlegen")?;
        volumes
            .create_and_cache_derived_volume(
                CT_VOLUME_ID,
                DerivedVolumeSpec {
                    volume_id: LABELMAP_VOLUME_ID.to_string(),
                },
            )
            .context("Labelmap-Volume ableiten")?;
        Ok(volumes)
    }

    fn engine() -> HeadlessRenderingEngine {
        let mut engine = HeadlessRenderingEngine::new(ENGINE_ID);
        engine.set_viewports(vec![
            ViewportInput::orthographic("CT_AXIAL", "CT", Orientation::Axial),
            ViewportInput::orthographic("CT_SAGITTAL", "CT", Orientation::Sagittal),
            ViewportInput::orthographic("CT_CORONAL", "CT", Orientation::Coronal),
            ViewportInput::orthographic("PT_AXIAL", "PT", Orientation::Axial),
            ViewportInput::orthographic("PT_MIP", "PT", Orientation::Coronal)
                .with_blend_mode(BlendMode::MaximumIntensity),
            ViewportInput::stack("DX_STACK"),
        ]);
        if let Some(stack) = engine.headless_viewport_mut("DX_STACK") {
            stack.set_stack((0..12).map(|i| format!("dx-image-{i}")).collect(), 0);
        }
        engine
    }

    fn tool_groups(ctx: &mut CoordinationContext) -> anyhow::Result<()> {
        let vp = |id: &str| ViewportRef::new(ENGINE_ID, id);

        let mut crosshairs = ToolOptions::new();
        crosshairs.insert_serialized(
            REFERENCE_LINES_OPTION,
            &ReferenceLineTable {
                controllable: None,
                draggable_rotatable: Some(vec!["CT_SAGITTAL".into(), "CT_CORONAL".into()]),
                slab_thickness_controls: Some(vec!["CT_AXIAL".into()]),
                colors: [
                    ("CT_AXIAL".to_string(), [1.0, 0.2, 0.2, 1.0]),
                    ("CT_SAGITTAL".to_string(), [1.0, 1.0, 0.0, 1.0]),
                    ("CT_CORONAL".to_string(), [0.2, 1.0, 0.2, 1.0]),
                ]
                .into_iter()
                .collect(),
                default_color: None,
            },
        )?;

        let ct = ctx.tool_groups.create_tool_group("ctToolGroup")?;
        for id in ["CT_AXIAL", "CT_SAGITTAL", "CT_CORONAL"] {
            ct.add_viewport(vp(id));
        }
        ct.add_tool(CrosshairsTool::NAME, crosshairs)?;
        ct.add_tool(WindowLevelTool::NAME, ToolOptions::new())?;
        ct.add_tool(PanTool::NAME, ToolOptions::new())?;
        ct.add_tool(StackScrollMouseWheelTool::NAME, ToolOptions::new())?;
        ct.add_tool(BrushTool::NAME, ToolOptions::new().with("radius", 3.0))?;
        ct.add_tool(SegmentationDisplayTool::NAME, ToolOptions::new())?;
        ct.set_tool_active(CrosshairsTool::NAME, ActivationOptions::default())?;
        ct.set_tool_active(
            WindowLevelTool::NAME,
            ActivationOptions::with_bindings([Binding::new(InputButton::Secondary)]),
        )?;
        ct.set_tool_active(PanTool::NAME, ActivationOptions::default())?;
        ct.set_tool_active(StackScrollMouseWheelTool::NAME, ActivationOptions::default())?;
        ct.set_tool_active(
            BrushTool::NAME,
            ActivationOptions::with_bindings([Binding::with_modifiers(
                InputButton::Primary,
                ModifierKey::Alt,
            )]),
        )?;
        ct.set_tool_enabled(SegmentationDisplayTool::NAME)?;

        let pt = ctx.tool_groups.create_tool_group("ptToolGroup")?;
        pt.add_viewport(vp("PT_AXIAL"));
        pt.add_viewport(vp("PT_MIP"));
        pt.add_tool(
            MipJumpToClickTool::NAME,
            ToolOptions::new().with(
                "target_viewport_ids",
                vec!["PT_AXIAL", "CT_AXIAL", "CT_SAGITTAL"],
            ),
        )?;
        pt.add_tool(VolumeRotateMouseWheelTool::NAME, ToolOptions::new())?;
        pt.add_tool(ZoomTool::NAME, ToolOptions::new())?;
        pt.set_tool_active(MipJumpToClickTool::NAME, ActivationOptions::default())?;
        pt.set_tool_active(VolumeRotateMouseWheelTool::NAME, ActivationOptions::default())?;
        pt.set_tool_active(ZoomTool::NAME, ActivationOptions::default())?;

        let dx = ctx.tool_groups.create_tool_group("stackToolGroup")?;
        dx.add_viewport(vp("DX_STACK"));
        dx.add_tool(StackScrollMouseWheelTool::NAME, ToolOptions::new())?;
        dx.add_tool(WindowLevelTool::NAME, ToolOptions::new())?;
        dx.set_tool_active(StackScrollMouseWheelTool::NAME, ActivationOptions::default())?;
        dx.set_tool_active(WindowLevelTool::NAME, ActivationOptions::default())?;
        Ok(())
    }

    fn synchronizers(ctx: &mut CoordinationContext) -> anyhow::Result<()> {
        let vp = |id: &str| ViewportRef::new(ENGINE_ID, id);

        let voi = ctx.synchronizers.create_voi_synchronizer("ctVoiSync")?;
        for id in ["CT_AXIAL", "CT_SAGITTAL", "CT_CORONAL"] {
            voi.add_bidirectional(vp(id));
        }

        let axial = ctx
            .synchronizers
            .create_camera_position_synchronizer("axialCameraSync")?;
        axial.add_bidirectional(vp("CT_AXIAL"));
        axial.add_bidirectional(vp("PT_AXIAL"));
        Ok(())
    }

    fn segmentation(ctx: &mut CoordinationContext) -> anyhow::Result<()> {
        segmentation::add_segmentations(
            ctx,
            &[SegmentationInput::labelmap(SEGMENTATION_ID, LABELMAP_VOLUME_ID)],
        )?;
        let uids = segmentation::add_segmentation_representations(
            ctx,
            "ctToolGroup",
            &[RepresentationInput::labelmap(SEGMENTATION_ID)],
        )?;
        log::info!("Repräsentationen angelegt: {:?}", uids);
        Ok(())
    }

    fn script() -> Vec<InputEvent> {
        let vp = |id: &str| ViewportRef::new(ENGINE_ID, id);
        vec![
            InputEvent::drag(vp("CT_AXIAL"), InputButton::Secondary, Vec2::new(12.0, -4.0)),
            InputEvent::pointer_down(vp("CT_AXIAL"), InputButton::Primary, Vec3::new(5.0, -3.0, 0.0)),
            InputEvent::drag(vp("CT_SAGITTAL"), InputButton::Primary, Vec2::new(0.0, 8.0))
                .with_modifiers(ModifierKey::Ctrl),
            InputEvent::pointer_down(vp("CT_AXIAL"), InputButton::Primary, Vec3::new(2.0, 2.0, 0.0))
                .with_modifiers(ModifierKey::Alt),
            InputEvent::wheel(vp("CT_AXIAL"), 2.0).with_modifiers(ModifierKey::Shift),
            InputEvent::drag(vp("CT_AXIAL"), InputButton::Auxiliary, Vec2::new(-6.0, 3.0)),
            InputEvent::pointer_move(vp("CT_CORONAL"), Vec3::new(0.0, 0.0, 1.0)),
            InputEvent::pointer_down(vp("PT_MIP"), InputButton::Primary, Vec3::new(-4.0, 0.0, 9.0)),
            InputEvent::wheel(vp("PT_MIP"), 1.0),
            InputEvent::wheel(vp("DX_STACK"), 3.0),
            InputEvent::drag(vp("DX_STACK"), InputButton::Primary, Vec2::new(20.0, 0.0)),
        ]
    }

    fn log_report(label: &str, report: &TurnReport) {
        log::info!(
            "{}: Tool {:?}, {} geändert, {} synchronisiert, {} gerendert, {} Overlays",
            label,
            report
                .resolution
                .as_ref()
                .and_then(|r| r.active_tool())
                .unwrap_or("-"),
            report.mutated.len(),
            report.synchronized.len(),
            report.rendered.len(),
            report.overlays_updated.len()
        );
        for miss in &report.lookup_misses {
            log::warn!("  {}: {}", miss.origin, miss.error);
        }
    }
}
