use super::{SyncPayload, SyncStrategy};
use crate::core::{ViewportEvent, ViewportEventDetail};
use crate::error::Result;
use crate::render::{Viewport, ViewportRegistry};

/// Überträgt die Kamera-Änderung (Translation, Rotation, Zoom) der Quelle.
pub struct CameraPositionStrategy;

impl SyncStrategy for CameraPositionStrategy {
    fn extract(
        &self,
        viewports: &ViewportRegistry,
        event: &ViewportEvent,
    ) -> Result<Option<SyncPayload>> {
        let ViewportEventDetail::CameraModified { previous, .. } = &event.detail else {
            return Ok(None);
        };
        let current = viewports.resolve(&event.viewport)?.camera();
        let delta = previous.delta_to(&current);
        Ok((!delta.is_identity()).then_some(SyncPayload::Camera(delta)))
    }

    fn apply(&self, target: &mut dyn Viewport, payload: &SyncPayload) {
        let SyncPayload::Camera(delta) = payload else {
            return;
        };
        let mut camera = target.camera();
        camera.apply_delta(delta);
        target.set_camera(camera);
    }
}
