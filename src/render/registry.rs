//! ViewportRegistry: löst `ViewportRef` über die registrierten Engines auf.

use super::{RenderingEngine, Viewport};
use crate::core::{ViewportEvent, ViewportRef};
use crate::error::{CoordinationError, Result};
use indexmap::IndexMap;

/// Tabelle aller Rendering-Engines, nach ID.
///
/// Hält keine Viewport-Handles: Jede Auflösung geht neu über die Engine,
/// ein entsorgter Viewport ist ein `ViewportNotFound`.
#[derive(Default)]
pub struct ViewportRegistry {
    engines: IndexMap<String, Box<dyn RenderingEngine>>,
    /// Events, die nicht aus einer Viewport-Mutation stammen (z.B. Labelmap-Updates)
    emitted: Vec<ViewportEvent>,
}

impl ViewportRegistry {
    /// Erstellt eine leere Registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert eine Engine unter ihrer ID.
    pub fn register_engine(&mut self, engine: Box<dyn RenderingEngine>) -> Result<()> {
        let id = engine.id().to_string();
        if self.engines.contains_key(&id) {
            return Err(CoordinationError::DuplicateRenderingEngine { id });
        }
        log::info!("RenderingEngine '{}' registriert", id);
        self.engines.insert(id, engine);
        Ok(())
    }

    /// Entfernt eine Engine; ihre Viewports werden danach zu Lookup-Misses.
    pub fn remove_engine(&mut self, id: &str) -> Option<Box<dyn RenderingEngine>> {
        self.engines.shift_remove(id)
    }

    pub fn engine(&self, id: &str) -> Option<&dyn RenderingEngine> {
        self.engines.get(id).map(|e| e.as_ref())
    }

    pub fn engine_mut(&mut self, id: &str) -> Option<&mut (dyn RenderingEngine + 'static)> {
        self.engines.get_mut(id).map(|e| e.as_mut())
    }

    /// Downcast auf einen konkreten Engine-Typ.
    pub fn engine_as<T: 'static>(&self, id: &str) -> Option<&T> {
        self.engines.get(id)?.as_any().downcast_ref::<T>()
    }

    /// Mutabler Downcast auf einen konkreten Engine-Typ.
    pub fn engine_as_mut<T: 'static>(&mut self, id: &str) -> Option<&mut T> {
        self.engines.get_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    /// Löst eine Referenz auf.
    pub fn resolve(&self, viewport: &ViewportRef) -> Result<&dyn Viewport> {
        self.engines
            .get(&viewport.rendering_engine_id)
            .and_then(|engine| engine.viewport(&viewport.viewport_id))
            .ok_or_else(|| CoordinationError::ViewportNotFound {
                viewport: viewport.clone(),
            })
    }

    /// Löst eine Referenz mutabel auf.
    pub fn resolve_mut(&mut self, viewport: &ViewportRef) -> Result<&mut dyn Viewport> {
        self.engines
            .get_mut(&viewport.rendering_engine_id)
            .and_then(|engine| engine.viewport_mut(&viewport.viewport_id))
            .ok_or_else(|| CoordinationError::ViewportNotFound {
                viewport: viewport.clone(),
            })
    }

    /// Prüft ob die Referenz aktuell auflösbar ist.
    pub fn contains(&self, viewport: &ViewportRef) -> bool {
        self.resolve(viewport).is_ok()
    }

    /// Alle Viewports einer Scene innerhalb einer Engine.
    pub fn viewports_in_scene(&self, rendering_engine_id: &str, scene_id: &str) -> Vec<ViewportRef> {
        let Some(engine) = self.engines.get(rendering_engine_id) else {
            return Vec::new();
        };
        engine
            .viewport_ids()
            .into_iter()
            .filter(|id| {
                engine
                    .viewport(id)
                    .is_some_and(|vp| vp.scene_id() == Some(scene_id))
            })
            .map(|id| ViewportRef::new(rendering_engine_id, id))
            .collect()
    }

    /// Reiht ein Event ein, das keine Viewport-Mutation ist.
    pub fn emit(&mut self, event: ViewportEvent) {
        self.emitted.push(event);
    }

    /// Entnimmt alle anstehenden Events (Viewport-Mutationen und `emit`).
    pub fn take_events(&mut self) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        for (engine_id, engine) in self.engines.iter_mut() {
            for viewport_id in engine.viewport_ids() {
                let Some(viewport) = engine.viewport_mut(&viewport_id) else {
                    continue;
                };
                let scene_id = viewport.scene_id().map(str::to_string);
                for detail in viewport.take_events() {
                    events.push(ViewportEvent::new(
                        ViewportRef::new(engine_id.clone(), viewport_id.clone()),
                        scene_id.clone(),
                        detail,
                    ));
                }
            }
        }
        events.append(&mut self.emitted);
        events
    }

    /// Fordert ein Rendering genau der angegebenen Viewports an (gruppiert nach Engine).
    pub fn render_viewports<'a>(&mut self, viewports: impl IntoIterator<Item = &'a ViewportRef>) {
        let mut per_engine: IndexMap<&str, Vec<String>> = IndexMap::new();
        for viewport in viewports {
            let ids = per_engine.entry(&viewport.rendering_engine_id).or_default();
            if !ids.contains(&viewport.viewport_id) {
                ids.push(viewport.viewport_id.clone());
            }
        }

        for (engine_id, ids) in per_engine {
            match self.engines.get_mut(engine_id) {
                Some(engine) => engine.render_viewports(&ids),
                None => log::warn!(
                    "Render-Anfrage für unbekannte Engine '{}' verworfen ({} Viewports)",
                    engine_id,
                    ids.len()
                ),
            }
        }
    }

    /// Anzahl registrierter Engines.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Orientation;
    use crate::render::{HeadlessRenderingEngine, ViewportInput};

    fn registry() -> ViewportRegistry {
        let mut engine = HeadlessRenderingEngine::new("engine");
        engine.set_viewports(vec![ViewportInput::orthographic(
            "AXIAL",
            "CT",
            Orientation::Axial,
        )]);
        let mut registry = ViewportRegistry::new();
        registry
            .register_engine(Box::new(engine))
            .expect("Engine sollte registriert werden");
        registry
    }

    #[test]
    fn test_engine_mut_reaches_registered_engine() {
        let mut registry = registry();

        registry
            .engine_mut("engine")
            .expect("Engine fehlt")
            .resize(false, true);
        assert!(registry.engine_mut("missing").is_none());

        let engine = registry
            .engine_as::<HeadlessRenderingEngine>("engine")
            .expect("Downcast sollte gelingen");
        assert_eq!(engine.resize_count(), 1);
    }

    #[test]
    fn test_duplicate_engine_and_unknown_viewport() {
        let mut registry = registry();
        assert!(matches!(
            registry.register_engine(Box::new(HeadlessRenderingEngine::new("engine"))),
            Err(CoordinationError::DuplicateRenderingEngine { .. })
        ));
        assert!(registry.resolve(&ViewportRef::new("engine", "AXIAL")).is_ok());
        assert!(matches!(
            registry.resolve(&ViewportRef::new("engine", "GONE")),
            Err(CoordinationError::ViewportNotFound { .. })
        ));
    }
}
