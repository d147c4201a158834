use super::{SyncPayload, SyncStrategy};
use crate::core::{ViewportEvent, ViewportEventDetail};
use crate::error::Result;
use crate::render::{Viewport, ViewportRegistry};

/// Überträgt Fensterbreite und -zentrum der Quelle unverändert.
pub struct VoiStrategy;

impl SyncStrategy for VoiStrategy {
    fn extract(
        &self,
        viewports: &ViewportRegistry,
        event: &ViewportEvent,
    ) -> Result<Option<SyncPayload>> {
        let ViewportEventDetail::VoiModified { range } = &event.detail else {
            return Ok(None);
        };
        let source = viewports.resolve(&event.viewport)?;
        let range = source.properties().voi_range.unwrap_or(*range);
        Ok(Some(SyncPayload::Voi(range)))
    }

    fn apply(&self, target: &mut dyn Viewport, payload: &SyncPayload) {
        let SyncPayload::Voi(range) = payload else {
            return;
        };
        let mut properties = target.properties();
        properties.voi_range = Some(*range);
        target.set_properties(properties);
    }
}
