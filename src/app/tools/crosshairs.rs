//! Crosshairs: Referenzlinien aller anderen Ebenen plus Ebenen-Manipulation.
//!
//! - Drag (Primary): Ebenen der steuerbaren Viewports springen auf den Zeiger
//! - Ctrl+Drag: rotiert rotierbare Ebenen um die Normale des Viewports
//! - Shift+Rad: ändert die Slab-Dicke der Viewports mit Slab-Steuerung
//!
//! Die [`ReferenceLineTable`] wird bei jedem Aufruf neu aus den Optionen gelesen.

use super::{Annotation, RenderContext, Tool, ToolAction, ToolContext};
use crate::app::reference_lines::{
    reference_lines_for, three_plane_intersection, ReferenceLineTable, REFERENCE_LINES_OPTION,
};
use crate::app::tool_groups::ToolOptions;
use crate::core::{
    Binding, Camera, InputButton, InputEvent, InputEventKind, ModifierKey, ViewportRef,
};
use crate::error::Result;
use crate::render::ViewportKind;
use glam::Quat;

/// Rotation (Bogenmaß) pro Pixel horizontaler Bewegung.
const ROTATE_RADIANS_PER_PIXEL: f32 = 0.01;

pub struct CrosshairsTool;

impl CrosshairsTool {
    pub const NAME: &'static str = "Crosshairs";

    fn table(options: &ToolOptions) -> Result<ReferenceLineTable> {
        Ok(options
            .parse(Self::NAME, REFERENCE_LINES_OPTION)?
            .unwrap_or_default())
    }

    /// Andere Viewports der Gruppe in derselben Engine, die eine Ebene haben.
    fn planar_others(ctx: &ToolContext<'_>) -> Vec<ViewportRef> {
        ctx.group_viewports
            .iter()
            .filter(|vp| {
                *vp != ctx.viewport && vp.rendering_engine_id == ctx.viewport.rendering_engine_id
            })
            .filter(|vp| {
                ctx.viewports
                    .resolve(vp)
                    .is_ok_and(|v| v.kind() != ViewportKind::Stack)
            })
            .cloned()
            .collect()
    }

    /// Wendet `update` auf die Kamera jedes Ziels an; Lookup-Misses werden geloggt.
    fn update_cameras(
        ctx: &mut ToolContext<'_>,
        targets: &[ViewportRef],
        mut update: impl FnMut(&mut Camera),
    ) -> bool {
        let mut touched = false;
        for target in targets {
            match ctx.viewports.resolve_mut(target) {
                Ok(viewport) => {
                    let mut camera = viewport.camera();
                    update(&mut camera);
                    viewport.set_camera(camera);
                    touched = true;
                }
                Err(e) => log::warn!("Crosshairs: {}", e),
            }
        }
        touched
    }

    fn jump(ctx: &mut ToolContext<'_>, event: &InputEvent, table: &ReferenceLineTable) -> bool {
        let Some(world) = event.world_position else {
            return false;
        };
        let targets: Vec<ViewportRef> = Self::planar_others(ctx)
            .into_iter()
            .filter(|vp| table.is_reference_line_controllable(&vp.viewport_id))
            .collect();
        Self::update_cameras(ctx, &targets, |camera| camera.move_plane_through(world))
    }

    fn rotate(
        ctx: &mut ToolContext<'_>,
        event: &InputEvent,
        table: &ReferenceLineTable,
    ) -> Result<bool> {
        if event.delta.x == 0.0 {
            return Ok(false);
        }
        let drawn = ctx.viewports.resolve(ctx.viewport)?.camera();
        let others = Self::planar_others(ctx);
        let pivot = match others.as_slice() {
            [a, b, ..] => {
                let a = ctx.viewports.resolve(a)?.camera();
                let b = ctx.viewports.resolve(b)?.camera();
                three_plane_intersection(&drawn, &a, &b).unwrap_or(drawn.focal_point)
            }
            _ => drawn.focal_point,
        };
        let rotation =
            Quat::from_axis_angle(drawn.view_plane_normal, event.delta.x * ROTATE_RADIANS_PER_PIXEL);
        let targets: Vec<ViewportRef> = others
            .into_iter()
            .filter(|vp| table.is_reference_line_draggable_rotatable(&vp.viewport_id))
            .collect();
        Ok(Self::update_cameras(ctx, &targets, |camera| {
            camera.rotate_about(pivot, rotation)
        }))
    }

    fn change_slab(ctx: &mut ToolContext<'_>, event: &InputEvent, table: &ReferenceLineTable) -> bool {
        if event.delta.y == 0.0 {
            return false;
        }
        let step = ctx.settings.slab_thickness_step * event.delta.y;
        let max = ctx.settings.slab_thickness_max;
        let targets: Vec<ViewportRef> = Self::planar_others(ctx)
            .into_iter()
            .filter(|vp| table.is_slab_thickness_control_enabled(&vp.viewport_id))
            .collect();
        Self::update_cameras(ctx, &targets, |camera| {
            camera.slab_thickness =
                (camera.slab_thickness + step).clamp(Camera::MIN_SLAB_THICKNESS, max);
        })
    }
}

impl Tool for CrosshairsTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn default_bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new(InputButton::Primary),
            Binding::with_modifiers(InputButton::Primary, ModifierKey::Ctrl),
            Binding::with_modifiers(InputButton::Wheel, ModifierKey::Shift),
        ]
    }

    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction> {
        let table = Self::table(ctx.options)?;
        let handled = match (event.kind, event.button) {
            (InputEventKind::Wheel, _) if event.modifiers.contains(ModifierKey::Shift) => {
                Self::change_slab(ctx, event, &table)
            }
            (InputEventKind::PointerDrag, Some(InputButton::Primary))
                if event.modifiers.contains(ModifierKey::Ctrl) =>
            {
                Self::rotate(ctx, event, &table)?
            }
            (
                InputEventKind::PointerDown | InputEventKind::PointerDrag,
                Some(InputButton::Primary),
            ) => Self::jump(ctx, event, &table),
            _ => false,
        };
        Ok(if handled {
            ToolAction::Handled
        } else {
            ToolAction::Ignored
        })
    }

    fn on_hover(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<bool> {
        let Some(world) = event.world_position else {
            return Ok(false);
        };
        let table = Self::table(ctx.options)?;
        let lines = reference_lines_for(
            ctx.viewports,
            ctx.viewport,
            ctx.group_viewports,
            &table,
            ctx.settings.reference_line_color,
        )?;
        let pick = ctx.settings.reference_line_pick_distance;
        Ok(lines.iter().any(|line| line.distance_to(world) <= pick))
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<Vec<Annotation>> {
        let table = Self::table(ctx.options)?;
        let lines = reference_lines_for(
            ctx.viewports,
            ctx.viewport,
            ctx.group_viewports,
            &table,
            ctx.settings.reference_line_color,
        )?;

        let mut annotations = Vec::with_capacity(lines.len() + 1);
        if let [a, b, ..] = lines.as_slice() {
            let cameras = (
                ctx.viewports.resolve(ctx.viewport)?.camera(),
                ctx.viewports.resolve(&a.other)?.camera(),
                ctx.viewports.resolve(&b.other)?.camera(),
            );
            if let Some(position) = three_plane_intersection(&cameras.0, &cameras.1, &cameras.2) {
                annotations.push(Annotation::CrosshairCenter { position });
            }
        }
        annotations.extend(lines.into_iter().map(Annotation::ReferenceLine));
        Ok(annotations)
    }
}
