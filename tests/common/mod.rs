//! Gemeinsame Fixtures der Integrationstests: Headless-Layout mit CT-, PT- und Stack-Viewports.
#![allow(dead_code)]

use glam::Vec3;
use viewport_coordination::core::{DerivedVolumeSpec, VolumeSpec};
use viewport_coordination::{
    CoordinationContext, CoordinationOptions, HeadlessRenderingEngine, MemoryVolumeStore,
    Orientation, RenderingEngine, ViewportInput, ViewportRef, VolumeStore,
};

pub const ENGINE_ID: &str = "testEngine";
pub const CT_VOLUME_ID: &str = "ctVolume";
pub const LABELMAP_VOLUME_ID: &str = "segLabelmap";

pub fn vp(id: &str) -> ViewportRef {
    ViewportRef::new(ENGINE_ID, id)
}

/// Volume-Store mit CT-Volume (32³, Ursprung bei -16) und leerer Labelmap.
pub fn volumes() -> MemoryVolumeStore {
    let mut volumes = MemoryVolumeStore::new();
    volumes
        .create_and_cache_volume(
            CT_VOLUME_ID,
            VolumeSpec {
                dimensions: [32, 32, 32],
                spacing: Vec3::ONE,
                origin: Vec3::splat(-16.0),
                data: None,
            },
        )
        .expect("CT-Volume sollte angelegt werden");
    volumes
        .create_and_cache_derived_volume(
            CT_VOLUME_ID,
            DerivedVolumeSpec {
                volume_id: LABELMAP_VOLUME_ID.to_string(),
            },
        )
        .expect("Labelmap sollte abgeleitet werden");
    volumes
}

/// Engine mit CT_AXIAL/CT_SAGITTAL/CT_CORONAL (Scene "CT"), PT_AXIAL (Scene "PT") und DX (Stack).
pub fn engine() -> HeadlessRenderingEngine {
    let mut engine = HeadlessRenderingEngine::new(ENGINE_ID);
    engine.set_viewports(vec![
        ViewportInput::orthographic("CT_AXIAL", "CT", Orientation::Axial),
        ViewportInput::orthographic("CT_SAGITTAL", "CT", Orientation::Sagittal),
        ViewportInput::orthographic("CT_CORONAL", "CT", Orientation::Coronal),
        ViewportInput::orthographic("PT_AXIAL", "PT", Orientation::Axial),
        ViewportInput::stack("DX"),
    ]);
    engine
        .headless_viewport_mut("DX")
        .expect("DX fehlt")
        .set_stack((0..10).map(|i| format!("dx-{i}")).collect(), 0);
    engine
}

pub fn context_with(options: CoordinationOptions) -> CoordinationContext {
    let mut ctx = CoordinationContext::new(options, Box::new(volumes()));
    ctx.viewports
        .register_engine(Box::new(engine()))
        .expect("Engine sollte registriert werden");
    ctx
}

pub fn context() -> CoordinationContext {
    context_with(CoordinationOptions::default())
}

pub fn headless(ctx: &CoordinationContext) -> &HeadlessRenderingEngine {
    ctx.viewports
        .engine_as::<HeadlessRenderingEngine>(ENGINE_ID)
        .expect("Headless-Engine fehlt")
}

pub fn headless_mut(ctx: &mut CoordinationContext) -> &mut HeadlessRenderingEngine {
    ctx.viewports
        .engine_as_mut::<HeadlessRenderingEngine>(ENGINE_ID)
        .expect("Headless-Engine fehlt")
}

pub fn render_count(ctx: &CoordinationContext, id: &str) -> u64 {
    headless(ctx).render_count(id)
}

/// Verschiebt die Kamera eines Viewports direkt (ohne Tool).
pub fn translate_camera(ctx: &mut CoordinationContext, id: &str, delta: Vec3) {
    let viewport = ctx.viewports.resolve_mut(&vp(id)).expect("Viewport fehlt");
    let mut camera = viewport.camera();
    camera.translate(delta);
    viewport.set_camera(camera);
}

pub fn focal_point(ctx: &CoordinationContext, id: &str) -> Vec3 {
    ctx.viewports
        .resolve(&vp(id))
        .expect("Viewport fehlt")
        .camera()
        .focal_point
}

/// Alle bereitliegenden Engine-Viewports in Registrierungsreihenfolge.
pub fn viewport_ids(ctx: &CoordinationContext) -> Vec<String> {
    headless(ctx).viewport_ids()
}
