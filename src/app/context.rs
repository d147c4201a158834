//! Prozessweiter Koordinations-Kontext.

use super::input_bus::InputEventBus;
use super::segmentation::{self, SegmentationState};
use super::synchronizers::SynchronizerManager;
use super::tool_groups::ToolGroupManager;
use super::tools::ToolRegistry;
use super::turn_log::TurnLog;
use crate::render::{MemoryVolumeStore, ViewportRegistry, VolumeStore};
use crate::shared::CoordinationOptions;
use std::rc::Rc;

/// Besitzt alle Koordinations-Komponenten eines Prozesses.
///
/// Wird explizit an Controller und Use-Cases übergeben; es gibt keinen
/// globalen Zustand.
pub struct CoordinationContext {
    /// Laufzeit-Optionen (Empfindlichkeiten, Verkettung, Farben)
    pub options: CoordinationOptions,
    /// Verfügbare Tool-Verhalten
    pub tool_registry: Rc<ToolRegistry>,
    pub tool_groups: ToolGroupManager,
    pub synchronizers: SynchronizerManager,
    pub segmentation: SegmentationState,
    /// Registrierte Rendering-Engines
    pub viewports: ViewportRegistry,
    /// Externer Volume-Cache
    pub volumes: Box<dyn VolumeStore>,
    pub input_bus: InputEventBus,
    /// Berichte der letzten Event-Turns
    pub turn_log: TurnLog,
}

impl CoordinationContext {
    /// Erstellt einen Kontext mit den Standard-Tools.
    pub fn new(options: CoordinationOptions, volumes: Box<dyn VolumeStore>) -> Self {
        Self::with_registry(options, volumes, ToolRegistry::with_default_tools())
    }

    /// Erstellt einen Kontext mit eigener Tool-Registry.
    pub fn with_registry(
        options: CoordinationOptions,
        volumes: Box<dyn VolumeStore>,
        registry: ToolRegistry,
    ) -> Self {
        let tool_registry = Rc::new(registry);
        let input_bus = InputEventBus::new();
        let tool_groups = ToolGroupManager::new(
            Rc::clone(&tool_registry),
            input_bus.clone(),
            options.warn_shared_viewports,
        );
        Self {
            synchronizers: SynchronizerManager::new(options.sync_chaining),
            options,
            tool_registry,
            tool_groups,
            segmentation: SegmentationState::new(),
            viewports: ViewportRegistry::new(),
            volumes,
            input_bus,
            turn_log: TurnLog::new(),
        }
    }

    /// Standard-Optionen mit In-Memory-Volume-Store.
    pub fn with_defaults() -> Self {
        Self::new(
            CoordinationOptions::default(),
            Box::new(MemoryVolumeStore::new()),
        )
    }

    /// Entfernt eine ToolGroup samt ihrer Segmentierungs-Repräsentationen.
    ///
    /// Die Segmentierungen selbst bleiben registriert; eine später unter
    /// derselben ID angelegte Gruppe startet ohne Repräsentationen.
    pub fn destroy_tool_group(&mut self, id: &str) -> bool {
        if self.tool_groups.get_tool_group(id).is_none() {
            return false;
        }
        let removed = segmentation::remove_representations_for_tool_group(self, id);
        if !removed.is_empty() {
            log::debug!(
                "{} Repräsentation(en) mit ToolGroup '{}' entfernt",
                removed.len(),
                id
            );
        }
        self.tool_groups.destroy_tool_group(id)
    }

    /// Löst alle Gruppen und Synchronizer auf (Segmentierungen bleiben).
    pub fn shutdown(&mut self) {
        let ids: Vec<String> = self.tool_groups.ids().into_iter().map(str::to_string).collect();
        for id in &ids {
            segmentation::remove_representations_for_tool_group(self, id);
        }
        self.tool_groups.destroy();
        self.synchronizers.destroy();
        log::info!(
            "Koordination beendet ({} Turns protokolliert)",
            self.turn_log.len()
        );
    }
}

impl Default for CoordinationContext {
    fn default() -> Self {
        Self::with_defaults()
    }
}
