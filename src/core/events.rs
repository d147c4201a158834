//! Zustandsänderungs-Events, die Viewports (bzw. Tools) auslösen.

use super::{Camera, ViewportRef, VoiRange};

/// Ereignis-Art, auf die ein Synchronizer abonniert werden kann.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CameraModified,
    VoiModified,
    StackNewImage,
    LabelmapUpdated,
}

/// Nutzlast eines Viewport-Events.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEventDetail {
    /// Kamera wurde gesetzt (alte und neue Parameter)
    CameraModified { previous: Camera, camera: Camera },
    /// VOI-Bereich wurde geändert
    VoiModified { range: VoiRange },
    /// Stack-Viewport zeigt ein anderes Bild
    StackNewImage { image_id: String, image_index: usize },
    /// Labelmap-Daten einer Segmentierung wurden verändert
    LabelmapUpdated { segmentation_id: Option<String> },
}

impl ViewportEventDetail {
    /// Ereignis-Art der Nutzlast.
    pub fn kind(&self) -> EventKind {
        match self {
            ViewportEventDetail::CameraModified { .. } => EventKind::CameraModified,
            ViewportEventDetail::VoiModified { .. } => EventKind::VoiModified,
            ViewportEventDetail::StackNewImage { .. } => EventKind::StackNewImage,
            ViewportEventDetail::LabelmapUpdated { .. } => EventKind::LabelmapUpdated,
        }
    }
}

/// Ein Event samt Herkunft (Viewport und dessen Scene-Zuordnung).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportEvent {
    pub viewport: ViewportRef,
    /// Scene/Gruppe des Viewports; Stack-Viewports haben keine
    pub scene_id: Option<String>,
    pub detail: ViewportEventDetail,
}

impl ViewportEvent {
    pub fn new(viewport: ViewportRef, scene_id: Option<String>, detail: ViewportEventDetail) -> Self {
        Self {
            viewport,
            scene_id,
            detail,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.detail.kind()
    }
}
