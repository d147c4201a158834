//! Synchronizer-Engine: Fan-out von Viewport-Events an Ziel-Viewports.
//!
//! Ein Synchronizer hört auf eine Event-Art seiner Quellen, extrahiert beim
//! Feuern eine Nutzlast aus der Quelle und wendet sie auf jedes Ziel an.
//! Während der eigenen Übertragung ist er über `propagating` gesperrt,
//! dadurch terminieren Zyklen.

mod camera_position;
mod synchronizer;
mod voi;

pub use camera_position::CameraPositionStrategy;
pub use synchronizer::Synchronizer;
pub use voi::VoiStrategy;

use super::turn_log::{SyncApplication, TurnReport};
use crate::core::{CameraDelta, EventKind, ViewportEvent, ViewportRef, VoiRange};
use crate::error::{CoordinationError, Result};
use crate::render::{Viewport, ViewportRegistry};
use crate::shared::SyncChaining;
use indexmap::IndexMap;
use std::rc::Rc;

/// Vordefinierte Synchronizer-Arten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SynchronizerKind {
    /// Kamera-Deltas (Translation, Rotation, Zoom)
    CameraPosition,
    /// VOI-Bereich unverändert
    Voi,
}

impl SynchronizerKind {
    pub fn event_kind(self) -> EventKind {
        match self {
            SynchronizerKind::CameraPosition => EventKind::CameraModified,
            SynchronizerKind::Voi => EventKind::VoiModified,
        }
    }

    fn strategy(self) -> Rc<dyn SyncStrategy> {
        match self {
            SynchronizerKind::CameraPosition => Rc::new(CameraPositionStrategy),
            SynchronizerKind::Voi => Rc::new(VoiStrategy),
        }
    }
}

/// Von der Quelle extrahierte Nutzlast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncPayload {
    Camera(CameraDelta),
    Voi(VoiRange),
}

/// Extraktion und Anwendung einer Synchronizer-Art.
pub trait SyncStrategy {
    /// Nutzlast aus dem Quell-Viewport; `Ok(None)` = nichts zu übertragen.
    fn extract(
        &self,
        viewports: &ViewportRegistry,
        event: &ViewportEvent,
    ) -> Result<Option<SyncPayload>>;

    /// Wendet die Nutzlast auf ein Ziel an.
    fn apply(&self, target: &mut dyn Viewport, payload: &SyncPayload);
}

/// Registry aller Synchronizer nach ID.
pub struct SynchronizerManager {
    synchronizers: IndexMap<String, Synchronizer>,
    chaining: SyncChaining,
}

impl Default for SynchronizerManager {
    fn default() -> Self {
        Self::new(SyncChaining::default())
    }
}

impl SynchronizerManager {
    pub fn new(chaining: SyncChaining) -> Self {
        Self {
            synchronizers: IndexMap::new(),
            chaining,
        }
    }

    pub fn chaining(&self) -> SyncChaining {
        self.chaining
    }

    pub fn set_chaining(&mut self, chaining: SyncChaining) {
        self.chaining = chaining;
    }

    /// Legt einen Synchronizer an (aktiviert, ohne Quellen/Ziele).
    pub fn create_synchronizer(
        &mut self,
        id: &str,
        kind: SynchronizerKind,
    ) -> Result<&mut Synchronizer> {
        if self.synchronizers.contains_key(id) {
            return Err(CoordinationError::DuplicateSynchronizer { id: id.to_string() });
        }
        log::info!("Synchronizer '{}' ({:?}) erstellt", id, kind);
        Ok(self
            .synchronizers
            .entry(id.to_string())
            .or_insert_with(|| Synchronizer::new(id, kind)))
    }

    pub fn create_camera_position_synchronizer(&mut self, id: &str) -> Result<&mut Synchronizer> {
        self.create_synchronizer(id, SynchronizerKind::CameraPosition)
    }

    pub fn create_voi_synchronizer(&mut self, id: &str) -> Result<&mut Synchronizer> {
        self.create_synchronizer(id, SynchronizerKind::Voi)
    }

    pub fn get_synchronizer(&self, id: &str) -> Option<&Synchronizer> {
        self.synchronizers.get(id)
    }

    pub fn get_synchronizer_mut(&mut self, id: &str) -> Option<&mut Synchronizer> {
        self.synchronizers.get_mut(id)
    }

    pub fn destroy_synchronizer(&mut self, id: &str) -> bool {
        let removed = self.synchronizers.shift_remove(id).is_some();
        if removed {
            log::info!("Synchronizer '{}' entfernt", id);
        }
        removed
    }

    /// Synchronizer, in denen der Viewport Quelle oder Ziel ist.
    pub fn synchronizers_for_viewport(&self, viewport: &ViewportRef) -> Vec<&Synchronizer> {
        self.synchronizers
            .values()
            .filter(|s| s.involves(viewport))
            .collect()
    }

    pub fn destroy(&mut self) {
        self.synchronizers.clear();
        log::info!("Alle Synchronizer entfernt");
    }

    pub fn ids(&self) -> Vec<&str> {
        self.synchronizers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.synchronizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synchronizers.is_empty()
    }

    // ── Dispatch ─────────────────────────────────────────────────

    /// Leitet ein Viewport-Event an alle passenden Synchronizer weiter.
    ///
    /// Labelmap-Events, die während der Übertragung auf Zielen entstehen,
    /// landen in `deferred`. Alle übrigen Target-Events laufen bei
    /// `Transitive` sofort weiter, bei `Isolated` werden sie verworfen.
    pub fn dispatch(
        &mut self,
        viewports: &mut ViewportRegistry,
        event: &ViewportEvent,
        report: &mut TurnReport,
        deferred: &mut Vec<ViewportEvent>,
    ) {
        let mut chain = Vec::new();
        self.dispatch_in_chain(viewports, event, report, deferred, &mut chain);
    }

    /// `chain`: Viewports, deren Events die aktuelle Kette ausgelöst haben.
    /// Sie werden nie erneut als Ziel beschrieben.
    fn dispatch_in_chain(
        &mut self,
        viewports: &mut ViewportRegistry,
        event: &ViewportEvent,
        report: &mut TurnReport,
        deferred: &mut Vec<ViewportEvent>,
        chain: &mut Vec<ViewportRef>,
    ) {
        let kind = event.kind();
        let ids: Vec<String> = self
            .synchronizers
            .values()
            .filter(|s| s.event_kind() == kind && s.has_source(&event.viewport))
            .map(|s| s.id().to_string())
            .collect();
        if ids.is_empty() {
            return;
        }

        chain.push(event.viewport.clone());
        for id in ids {
            self.fire(&id, viewports, event, report, deferred, chain);
        }
        chain.pop();
    }

    fn fire(
        &mut self,
        id: &str,
        viewports: &mut ViewportRegistry,
        event: &ViewportEvent,
        report: &mut TurnReport,
        deferred: &mut Vec<ViewportEvent>,
        chain: &mut Vec<ViewportRef>,
    ) {
        let chaining = self.chaining;
        let Some(sync) = self.synchronizers.get_mut(id) else {
            return;
        };
        if !sync.is_enabled() {
            return;
        }
        if sync.propagating {
            log::debug!("Synchronizer '{}' läuft bereits, Event unterdrückt", id);
            report.suppressed += 1;
            return;
        }

        let strategy = Rc::clone(&sync.strategy);
        let payload = match strategy.extract(viewports, event) {
            Ok(Some(payload)) => payload,
            Ok(None) => return,
            Err(e) => {
                report.record_lookup_miss(format!("Synchronizer '{}'", id), e);
                return;
            }
        };

        sync.propagating = true;
        let targets: Vec<ViewportRef> = sync
            .targets()
            .filter(|target| !chain.contains(*target))
            .cloned()
            .collect();
        log::debug!(
            "Synchronizer '{}': {} → {} Ziele",
            id,
            event.viewport,
            targets.len()
        );

        for target in targets {
            match viewports.resolve_mut(&target) {
                Ok(viewport) => strategy.apply(viewport, &payload),
                Err(e) => {
                    report.record_lookup_miss(format!("Synchronizer '{}'", id), e);
                    continue;
                }
            }
            report.synchronized.push(SyncApplication {
                synchronizer_id: id.to_string(),
                target: target.clone(),
            });

            for nested in viewports.take_events() {
                report.mark_mutated(&nested.viewport);
                match (nested.kind(), chaining) {
                    (EventKind::LabelmapUpdated, _) => deferred.push(nested),
                    (_, SyncChaining::Transitive) => {
                        self.dispatch_in_chain(viewports, &nested, report, deferred, chain)
                    }
                    (_, SyncChaining::Isolated) => {}
                }
            }
        }

        if let Some(sync) = self.synchronizers.get_mut(id) {
            sync.propagating = false;
        }
    }
}

impl std::fmt::Debug for SynchronizerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynchronizerManager")
            .field("synchronizers", &self.synchronizers.values().collect::<Vec<_>>())
            .field("chaining", &self.chaining)
            .finish()
    }
}
