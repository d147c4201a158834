//! Kamera-Werkzeuge: verschieben, zoomen, rotieren.

use super::{Tool, ToolAction, ToolContext};
use crate::core::{Binding, Camera, InputButton, InputEvent, InputEventKind};
use crate::error::Result;
use glam::{Quat, Vec2, Vec3};

/// Rechnet ein Canvas-Delta in ein Welt-Delta in der Bildebene um.
///
/// Ohne Host-Welt-Delta entspricht ein Pixel bei Standard-Zoom einer
/// Welteinheit. Die Canvas-y-Achse zeigt nach unten.
fn canvas_to_world(camera: &Camera, delta: Vec2) -> Vec3 {
    let scale = camera.parallel_scale / Camera::DEFAULT_PARALLEL_SCALE;
    (camera.view_right() * delta.x - camera.view_up * delta.y) * scale
}

// ── Pan ──────────────────────────────────────────────────────────

/// Verschiebt Kamera und Fokuspunkt entgegen der Zeigerbewegung.
pub struct PanTool;

impl PanTool {
    pub const NAME: &'static str = "Pan";
}

impl Tool for PanTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn default_bindings(&self) -> Vec<Binding> {
        vec![Binding::new(InputButton::Auxiliary)]
    }

    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction> {
        if event.kind != InputEventKind::PointerDrag {
            return Ok(ToolAction::Ignored);
        }
        let viewport = ctx.viewports.resolve_mut(ctx.viewport)?;
        let mut camera = viewport.camera();
        let world_delta = event
            .world_delta
            .unwrap_or_else(|| canvas_to_world(&camera, event.delta));
        if world_delta == Vec3::ZERO {
            return Ok(ToolAction::Ignored);
        }
        camera.translate(-world_delta);
        viewport.set_camera(camera);
        Ok(ToolAction::Handled)
    }
}

// ── Zoom ─────────────────────────────────────────────────────────

/// Zoomt per vertikalem Drag (nach oben = hinein).
pub struct ZoomTool;

impl ZoomTool {
    pub const NAME: &'static str = "Zoom";
    const MIN_FACTOR: f32 = 0.1;
}

impl Tool for ZoomTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn default_bindings(&self) -> Vec<Binding> {
        vec![Binding::new(InputButton::Secondary)]
    }

    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction> {
        if event.kind != InputEventKind::PointerDrag || event.delta.y == 0.0 {
            return Ok(ToolAction::Ignored);
        }
        let settings = ctx.settings;
        let factor = (1.0 - event.delta.y * settings.zoom_sensitivity).max(Self::MIN_FACTOR);

        let viewport = ctx.viewports.resolve_mut(ctx.viewport)?;
        let mut camera = viewport.camera();
        camera.zoom_by_clamped(
            factor,
            settings.zoom_min_parallel_scale,
            settings.zoom_max_parallel_scale,
        );
        viewport.set_camera(camera);
        Ok(ToolAction::Handled)
    }
}

// ── VolumeRotate ─────────────────────────────────────────────────

/// Dreht die Kamera per Mausrad um `view_up` durch den Fokuspunkt.
pub struct VolumeRotateMouseWheelTool;

impl VolumeRotateMouseWheelTool {
    pub const NAME: &'static str = "VolumeRotateMouseWheel";
}

impl Tool for VolumeRotateMouseWheelTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn default_bindings(&self) -> Vec<Binding> {
        vec![Binding::new(InputButton::Wheel)]
    }

    fn on_input(&self, ctx: &mut ToolContext<'_>, event: &InputEvent) -> Result<ToolAction> {
        if event.kind != InputEventKind::Wheel || event.delta.y == 0.0 {
            return Ok(ToolAction::Ignored);
        }
        let step = ctx
            .options
            .f32("rotate_step_degrees")
            .map(f32::to_radians)
            .unwrap_or_else(|| ctx.settings.volume_rotate_step_radians());

        let viewport = ctx.viewports.resolve_mut(ctx.viewport)?;
        let mut camera = viewport.camera();
        let rotation = Quat::from_axis_angle(camera.view_up, step * event.delta.y);
        camera.rotate_about(camera.focal_point, rotation);
        viewport.set_camera(camera);
        Ok(ToolAction::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_canvas_delta_maps_to_view_plane() {
        let camera = Camera::default();
        let world = canvas_to_world(&camera, Vec2::new(10.0, 0.0));
        assert_relative_eq!(world.dot(camera.view_plane_normal), 0.0);
        assert_relative_eq!(world.length(), 10.0, epsilon = 1e-4);
    }
}
