//! Headless-Engine: speichert Kamera/Properties im Speicher und zählt Renders.
//!
//! Ersetzt die GPU-Engine in Tests, Benchmarks und der Demo. Verhält sich an
//! den Trait-Grenzen wie die echte Engine: Setter lösen Events aus, entsorgte
//! Viewports verschwinden aus der Tabelle.

use super::{
    RenderingEngine, SegmentationOverlay, Viewport, ViewportInput, ViewportKind,
    ViewportProperties,
};
use crate::core::{Camera, ViewportEventDetail};
use glam::Vec3;
use indexmap::IndexMap;
use std::any::Any;

/// In-Memory-Viewport.
#[derive(Debug, Clone)]
pub struct HeadlessViewport {
    id: String,
    rendering_engine_id: String,
    kind: ViewportKind,
    scene_id: Option<String>,
    camera: Camera,
    properties: ViewportProperties,
    image_ids: Vec<String>,
    image_index: usize,
    overlays: Vec<SegmentationOverlay>,
    pending: Vec<ViewportEventDetail>,
    render_count: u64,
}

impl HeadlessViewport {
    /// Erstellt einen Viewport aus einer `setViewports`-Eingabe.
    pub fn from_input(rendering_engine_id: &str, input: ViewportInput) -> Self {
        let camera = input
            .orientation
            .map(|o| Camera::for_orientation(o, Vec3::ZERO))
            .unwrap_or_default();
        Self {
            id: input.viewport_id,
            rendering_engine_id: rendering_engine_id.to_string(),
            kind: input.kind,
            scene_id: input.scene_id,
            camera,
            properties: input.properties,
            image_ids: Vec::new(),
            image_index: 0,
            overlays: Vec::new(),
            pending: Vec::new(),
            render_count: 0,
        }
    }

    /// Setzt die Bild-IDs eines Stack-Viewports (ohne Event).
    pub fn set_stack(&mut self, image_ids: Vec<String>, initial_index: usize) {
        self.image_index = initial_index.min(image_ids.len().saturating_sub(1));
        self.image_ids = image_ids;
    }

    /// Wie oft dieser Viewport gerendert wurde.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }
}

impl Viewport for HeadlessViewport {
    fn id(&self) -> &str {
        &self.id
    }

    fn rendering_engine_id(&self) -> &str {
        &self.rendering_engine_id
    }

    fn kind(&self) -> ViewportKind {
        self.kind
    }

    fn scene_id(&self) -> Option<&str> {
        self.scene_id.as_deref()
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn set_camera(&mut self, camera: Camera) {
        if camera == self.camera {
            return;
        }
        let previous = std::mem::replace(&mut self.camera, camera);
        self.pending
            .push(ViewportEventDetail::CameraModified { previous, camera });
    }

    fn properties(&self) -> ViewportProperties {
        self.properties
    }

    fn set_properties(&mut self, properties: ViewportProperties) {
        let voi_changed = properties.voi_range != self.properties.voi_range;
        self.properties = properties;
        if let (true, Some(range)) = (voi_changed, properties.voi_range) {
            self.pending.push(ViewportEventDetail::VoiModified { range });
        }
    }

    fn current_image_id(&self) -> Option<&str> {
        if self.kind != ViewportKind::Stack {
            return None;
        }
        self.image_ids.get(self.image_index).map(String::as_str)
    }

    fn image_index(&self) -> Option<usize> {
        (self.kind == ViewportKind::Stack && !self.image_ids.is_empty()).then_some(self.image_index)
    }

    fn image_count(&self) -> usize {
        self.image_ids.len()
    }

    fn set_image_index(&mut self, index: usize) -> bool {
        if self.kind != ViewportKind::Stack || index >= self.image_ids.len() {
            return false;
        }
        if index != self.image_index {
            self.image_index = index;
            self.pending.push(ViewportEventDetail::StackNewImage {
                image_id: self.image_ids[index].clone(),
                image_index: index,
            });
        }
        true
    }

    fn set_segmentation_overlay(&mut self, overlay: SegmentationOverlay) {
        match self
            .overlays
            .iter_mut()
            .find(|o| o.segmentation_id == overlay.segmentation_id)
        {
            Some(existing) => *existing = overlay,
            None => self.overlays.push(overlay),
        }
    }

    fn remove_segmentation_overlay(&mut self, segmentation_id: &str) {
        self.overlays.retain(|o| o.segmentation_id != segmentation_id);
    }

    fn segmentation_overlays(&self) -> &[SegmentationOverlay] {
        &self.overlays
    }

    fn take_events(&mut self) -> Vec<ViewportEventDetail> {
        std::mem::take(&mut self.pending)
    }
}

/// In-Memory-RenderingEngine mit Protokoll aller Render-Anfragen.
#[derive(Debug, Clone)]
pub struct HeadlessRenderingEngine {
    id: String,
    viewports: IndexMap<String, HeadlessViewport>,
    render_requests: Vec<Vec<String>>,
    resize_count: u32,
}

impl HeadlessRenderingEngine {
    /// Erstellt eine Engine ohne Viewports.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            viewports: IndexMap::new(),
            render_requests: Vec::new(),
            resize_count: 0,
        }
    }

    /// Konkreter Zugriff auf einen Viewport (z.B. für `set_stack`).
    pub fn headless_viewport_mut(&mut self, viewport_id: &str) -> Option<&mut HeadlessViewport> {
        self.viewports.get_mut(viewport_id)
    }

    pub fn headless_viewport(&self, viewport_id: &str) -> Option<&HeadlessViewport> {
        self.viewports.get(viewport_id)
    }

    /// Entsorgt einen einzelnen Viewport (Referenzen darauf werden zu Lookup-Misses).
    pub fn dispose_viewport(&mut self, viewport_id: &str) -> bool {
        self.viewports.shift_remove(viewport_id).is_some()
    }

    /// Render-Anzahl eines Viewports (0 für unbekannte).
    pub fn render_count(&self, viewport_id: &str) -> u64 {
        self.viewports
            .get(viewport_id)
            .map_or(0, HeadlessViewport::render_count)
    }

    /// Alle Render-Anfragen in Reihenfolge (je Anfrage die gerenderten IDs).
    pub fn render_requests(&self) -> &[Vec<String>] {
        &self.render_requests
    }

    /// Letzte Render-Anfrage.
    pub fn last_render_request(&self) -> Option<&[String]> {
        self.render_requests.last().map(Vec::as_slice)
    }

    /// Setzt das Render-Protokoll zurück.
    pub fn clear_render_requests(&mut self) {
        self.render_requests.clear();
    }

    pub fn resize_count(&self) -> u32 {
        self.resize_count
    }
}

impl RenderingEngine for HeadlessRenderingEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn viewport(&self, viewport_id: &str) -> Option<&dyn Viewport> {
        self.viewports.get(viewport_id).map(|v| v as &dyn Viewport)
    }

    fn viewport_mut(&mut self, viewport_id: &str) -> Option<&mut dyn Viewport> {
        self.viewports
            .get_mut(viewport_id)
            .map(|v| v as &mut dyn Viewport)
    }

    fn viewport_ids(&self) -> Vec<String> {
        self.viewports.keys().cloned().collect()
    }

    fn set_viewports(&mut self, inputs: Vec<ViewportInput>) {
        self.viewports.clear();
        for input in inputs {
            let viewport = HeadlessViewport::from_input(&self.id, input);
            self.viewports.insert(viewport.id.clone(), viewport);
        }
        log::debug!(
            "Engine '{}': {} Viewports gesetzt",
            self.id,
            self.viewports.len()
        );
    }

    fn render(&mut self) {
        let ids = self.viewport_ids();
        self.render_viewports(&ids);
    }

    fn render_viewports(&mut self, viewport_ids: &[String]) {
        let mut rendered = Vec::with_capacity(viewport_ids.len());
        for id in viewport_ids {
            if let Some(viewport) = self.viewports.get_mut(id) {
                viewport.render_count += 1;
                rendered.push(id.clone());
            }
        }
        self.render_requests.push(rendered);
    }

    fn resize(&mut self, immediate: bool, _keep_camera: bool) {
        self.resize_count += 1;
        if immediate {
            self.render();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Orientation, VoiRange};

    fn engine() -> HeadlessRenderingEngine {
        let mut engine = HeadlessRenderingEngine::new("engine");
        engine.set_viewports(vec![
            ViewportInput::orthographic("CT_AXIAL", "CT", Orientation::Axial),
            ViewportInput::stack("DX"),
        ]);
        engine
    }

    #[test]
    fn test_set_camera_emits_only_on_change() {
        let mut engine = engine();
        let vp = engine.viewport_mut("CT_AXIAL").expect("Viewport fehlt");
        let camera = vp.camera();
        vp.set_camera(camera);
        assert!(vp.take_events().is_empty());

        let mut moved = camera;
        moved.translate(Vec3::X);
        vp.set_camera(moved);
        let events = vp.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            ViewportEventDetail::CameraModified { previous, .. } if previous == camera
        ));
    }

    #[test]
    fn test_set_properties_emits_voi_modified() {
        let mut engine = engine();
        let vp = engine.viewport_mut("CT_AXIAL").expect("Viewport fehlt");
        let mut props = vp.properties();
        props.voi_range = Some(VoiRange::from_window(80.0, 40.0));
        vp.set_properties(props);
        assert_eq!(vp.take_events().len(), 1);

        // Gleicher Bereich → kein Event
        vp.set_properties(props);
        assert!(vp.take_events().is_empty());
    }

    #[test]
    fn test_stack_navigation() {
        let mut engine = engine();
        engine
            .headless_viewport_mut("DX")
            .expect("Stack fehlt")
            .set_stack(vec!["img:1".into(), "img:2".into()], 0);
        let vp = engine.viewport_mut("DX").expect("Stack fehlt");
        assert_eq!(vp.current_image_id(), Some("img:1"));
        assert!(vp.set_image_index(1));
        assert!(!vp.set_image_index(5));
        assert_eq!(vp.current_image_id(), Some("img:2"));
        assert_eq!(vp.take_events().len(), 1);
    }

    #[test]
    fn test_render_viewports_skips_disposed() {
        let mut engine = engine();
        assert!(engine.dispose_viewport("DX"));
        engine.render_viewports(&["CT_AXIAL".to_string(), "DX".to_string()]);
        assert_eq!(engine.last_render_request(), Some(&["CT_AXIAL".to_string()][..]));
        assert_eq!(engine.render_count("CT_AXIAL"), 1);
    }
}
