//! Schnittstellen zur externen Rendering-Engine und zum Volume-Store.
//!
//! Die Koordinationsschicht rendert selbst nichts. Sie spricht nur über die
//! Traits [`RenderingEngine`], [`Viewport`] und [`VolumeStore`] mit ihren
//! Kollaborateuren. `headless` liefert eine In-Memory-Implementierung für
//! Tests, Benchmarks und die Demo.

pub mod headless;
mod registry;
mod volume_store;

pub use headless::{HeadlessRenderingEngine, HeadlessViewport};
pub use registry::ViewportRegistry;
pub use volume_store::MemoryVolumeStore;

use crate::core::{
    Camera, DerivedVolumeSpec, Orientation, SegmentationRepresentationType, ViewportEventDetail,
    ViewportRef, VoiRange, Volume, VolumeSpec,
};
use crate::error::Result;
use std::any::Any;

/// Art eines Viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportKind {
    /// MPR-Schicht eines Volumes
    Orthographic,
    /// Einzelbild-Stack (ohne Scene)
    Stack,
    /// 3D-Volume-Rendering
    Volume3D,
}

/// Blend-Modus beim Volume-Rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Composite,
    /// Maximum-Intensity-Projection
    MaximumIntensity,
}

/// Darstellungs-Eigenschaften (`getProperties()/setProperties()`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportProperties {
    pub voi_range: Option<VoiRange>,
    pub blend_mode: BlendMode,
    pub invert: bool,
}

/// Eingabe für `setViewports`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportInput {
    pub viewport_id: String,
    pub kind: ViewportKind,
    /// Scene-Gruppierung (Volume-Viewports); `None` bei Stacks
    pub scene_id: Option<String>,
    pub orientation: Option<Orientation>,
    pub properties: ViewportProperties,
}

impl ViewportInput {
    /// Orthographischer Volume-Viewport in einer Scene.
    pub fn orthographic(
        viewport_id: impl Into<String>,
        scene_id: impl Into<String>,
        orientation: Orientation,
    ) -> Self {
        Self {
            viewport_id: viewport_id.into(),
            kind: ViewportKind::Orthographic,
            scene_id: Some(scene_id.into()),
            orientation: Some(orientation),
            properties: ViewportProperties::default(),
        }
    }

    /// Stack-Viewport ohne Scene.
    pub fn stack(viewport_id: impl Into<String>) -> Self {
        Self {
            viewport_id: viewport_id.into(),
            kind: ViewportKind::Stack,
            scene_id: None,
            orientation: None,
            properties: ViewportProperties::default(),
        }
    }

    /// Setzt den Blend-Modus (z.B. MIP).
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.properties.blend_mode = blend_mode;
        self
    }
}

/// Berechnetes Segmentierungs-Overlay eines Viewports.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOverlay {
    pub segmentation_id: String,
    pub volume_id: String,
    pub representation_type: SegmentationRepresentationType,
    /// Segment-Indizes, die in der Labelmap vorkommen
    pub labels: Vec<u32>,
    /// `Volume::version` zum Zeitpunkt der Berechnung
    pub data_version: u64,
}

/// Ein einzelner Rendering-Viewport der externen Engine.
pub trait Viewport {
    /// Viewport-ID innerhalb der Engine
    fn id(&self) -> &str;

    /// ID der besitzenden Engine
    fn rendering_engine_id(&self) -> &str;

    fn kind(&self) -> ViewportKind;

    /// Scene/Gruppe; `None` für Stack-Viewports
    fn scene_id(&self) -> Option<&str>;

    fn camera(&self) -> Camera;

    /// Setzt die Kamera und löst `CameraModified` aus, wenn sie sich ändert.
    fn set_camera(&mut self, camera: Camera);

    fn properties(&self) -> ViewportProperties;

    /// Setzt Eigenschaften und löst `VoiModified` aus, wenn sich der VOI-Bereich ändert.
    fn set_properties(&mut self, properties: ViewportProperties);

    /// Aktuelle Bild-ID (nur Stack-Viewports).
    fn current_image_id(&self) -> Option<&str> {
        None
    }

    /// Bildindex im Stack (nur Stack-Viewports).
    fn image_index(&self) -> Option<usize> {
        None
    }

    /// Anzahl Bilder im Stack.
    fn image_count(&self) -> usize {
        0
    }

    /// Springt auf einen Bildindex. `false` wenn kein Stack oder Index ungültig.
    fn set_image_index(&mut self, _index: usize) -> bool {
        false
    }

    /// Ersetzt das Overlay einer Segmentierung (löst kein Event aus).
    fn set_segmentation_overlay(&mut self, overlay: SegmentationOverlay);

    /// Entfernt das Overlay einer Segmentierung.
    fn remove_segmentation_overlay(&mut self, segmentation_id: &str);

    fn segmentation_overlays(&self) -> &[SegmentationOverlay];

    /// Entnimmt alle seit dem letzten Aufruf ausgelösten Events.
    fn take_events(&mut self) -> Vec<ViewportEventDetail>;

    /// Referenz auf diesen Viewport.
    fn viewport_ref(&self) -> ViewportRef {
        ViewportRef::new(self.rendering_engine_id(), self.id())
    }
}

/// Die externe Rendering-Engine: besitzt die maßgebliche Viewport-Tabelle.
pub trait RenderingEngine {
    fn id(&self) -> &str;

    fn viewport(&self, viewport_id: &str) -> Option<&dyn Viewport>;

    fn viewport_mut(&mut self, viewport_id: &str) -> Option<&mut dyn Viewport>;

    /// IDs aller lebenden Viewports in Anlagereihenfolge.
    fn viewport_ids(&self) -> Vec<String>;

    /// Ersetzt alle Viewports durch die angegebenen.
    fn set_viewports(&mut self, inputs: Vec<ViewportInput>);

    /// Rendert alle Viewports.
    fn render(&mut self);

    /// Rendert genau die angegebenen Viewports.
    fn render_viewports(&mut self, viewport_ids: &[String]);

    fn resize(&mut self, immediate: bool, keep_camera: bool);

    /// Für Downcasts auf die konkrete Engine (Tests, Demo).
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Externer Volume-/Labelmap-Cache.
pub trait VolumeStore {
    fn volume(&self, volume_id: &str) -> Option<&Volume>;

    fn volume_mut(&mut self, volume_id: &str) -> Option<&mut Volume>;

    /// Legt ein Volume an und cacht es.
    fn create_and_cache_volume(&mut self, volume_id: &str, spec: VolumeSpec) -> Result<&Volume>;

    /// Legt ein leeres Volume mit der Geometrie von `source_volume_id` an (Labelmaps).
    fn create_and_cache_derived_volume(
        &mut self,
        source_volume_id: &str,
        spec: DerivedVolumeSpec,
    ) -> Result<&Volume>;
}
