use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};
use std::hint::black_box;
use viewport_coordination::app::tools::{
    BrushTool, CrosshairsTool, PanTool, StackScrollMouseWheelTool, WindowLevelTool, ZoomTool,
};
use viewport_coordination::{
    ActivationOptions, Binding, CoordinationContext, CoordinationController,
    HeadlessRenderingEngine, InputButton, InputEvent, ModifierKey, Orientation, RenderingEngine,
    ToolOptions, ViewportInput, ViewportRef,
};

const ENGINE_ID: &str = "benchEngine";

fn build_context(viewport_count: usize) -> CoordinationContext {
    let mut ctx = CoordinationContext::with_defaults();
    let mut engine = HeadlessRenderingEngine::new(ENGINE_ID);
    engine.set_viewports(
        (0..viewport_count)
            .map(|i| ViewportInput::orthographic(format!("VP_{i}"), "scene", Orientation::Axial))
            .collect(),
    );
    ctx.viewports
        .register_engine(Box::new(engine))
        .expect("Engine-Registrierung fehlgeschlagen");
    ctx
}

fn bench_binding_resolution(c: &mut Criterion) {
    let mut ctx = build_context(1);
    let group = ctx
        .tool_groups
        .create_tool_group("bench")
        .expect("ToolGroup anlegen fehlgeschlagen");
    group.add_viewport(ViewportRef::new(ENGINE_ID, "VP_0"));
    let tools = [
        (WindowLevelTool::NAME, Binding::new(InputButton::Primary)),
        (PanTool::NAME, Binding::new(InputButton::Auxiliary)),
        (ZoomTool::NAME, Binding::new(InputButton::Secondary)),
        (StackScrollMouseWheelTool::NAME, Binding::new(InputButton::Wheel)),
        (
            CrosshairsTool::NAME,
            Binding::with_modifiers(InputButton::Primary, ModifierKey::Ctrl),
        ),
        (
            BrushTool::NAME,
            Binding::with_modifiers(InputButton::Primary, ModifierKey::Alt),
        ),
    ];
    for (name, binding) in tools {
        group
            .add_tool(name, ToolOptions::new())
            .expect("Tool hinzufügen fehlgeschlagen");
        group
            .set_tool_active(name, ActivationOptions::with_bindings([binding]))
            .expect("Tool aktivieren fehlgeschlagen");
    }

    let viewport = ViewportRef::new(ENGINE_ID, "VP_0");
    let events = [
        InputEvent::drag(viewport.clone(), InputButton::Primary, Vec2::ONE),
        InputEvent::drag(viewport.clone(), InputButton::Primary, Vec2::ONE)
            .with_modifiers(ModifierKey::Alt),
        InputEvent::wheel(viewport.clone(), 1.0),
        InputEvent::pointer_move(viewport, Vec3::ZERO),
    ];

    let group = ctx
        .tool_groups
        .get_tool_group("bench")
        .expect("ToolGroup fehlt");
    c.bench_function("binding_resolution", |b| {
        b.iter(|| {
            for event in &events {
                black_box(group.resolve(black_box(event)));
            }
        })
    });
}

fn bench_sync_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("camera_sync_fan_out");

    for &viewport_count in &[4usize, 16, 64] {
        let mut ctx = build_context(viewport_count);
        let sync = ctx
            .synchronizers
            .create_camera_position_synchronizer("benchCamera")
            .expect("Synchronizer anlegen fehlgeschlagen");
        for i in 0..viewport_count {
            sync.add_bidirectional(ViewportRef::new(ENGINE_ID, format!("VP_{i}")));
        }
        let mut controller = CoordinationController::new();
        let source = ViewportRef::new(ENGINE_ID, "VP_0");

        group.bench_with_input(
            BenchmarkId::new("pan_source", viewport_count),
            &viewport_count,
            |b, _| {
                b.iter(|| {
                    let viewport = ctx.viewports.resolve_mut(&source).expect("Quelle fehlt");
                    let mut camera = viewport.camera();
                    camera.translate(Vec3::new(0.5, 0.0, 0.0));
                    viewport.set_camera(camera);
                    let report = controller
                        .process_pending_events(&mut ctx)
                        .expect("Turn fehlgeschlagen");
                    black_box(report.synchronized.len())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(coordination_benches, bench_binding_resolution, bench_sync_fan_out);
criterion_main!(coordination_benches);
