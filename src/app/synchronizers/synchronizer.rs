//! Ein Synchronizer: Quell- und Ziel-Viewports mit Re-Entrancy-Guard.

use super::{SyncStrategy, SynchronizerKind};
use crate::core::{EventKind, ViewportRef};
use indexmap::IndexSet;
use std::rc::Rc;

/// Einseitige Zustandsübertragung von `sources` nach `targets`.
pub struct Synchronizer {
    id: String,
    kind: SynchronizerKind,
    sources: IndexSet<ViewportRef>,
    targets: IndexSet<ViewportRef>,
    enabled: bool,
    /// Re-Entrancy-Guard: gesetzt während der eigenen Übertragung
    pub(super) propagating: bool,
    pub(super) strategy: Rc<dyn SyncStrategy>,
}

impl Synchronizer {
    pub(crate) fn new(id: &str, kind: SynchronizerKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            sources: IndexSet::new(),
            targets: IndexSet::new(),
            enabled: true,
            propagating: false,
            strategy: kind.strategy(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> SynchronizerKind {
        self.kind
    }

    /// Event-Art, auf die der Synchronizer hört.
    pub fn event_kind(&self) -> EventKind {
        self.kind.event_kind()
    }

    /// Nimmt eine Quelle auf. `false` wenn bereits vorhanden.
    pub fn add(&mut self, viewport: ViewportRef) -> bool {
        self.sources.insert(viewport)
    }

    /// Entfernt eine Quelle. `false` wenn nicht vorhanden.
    pub fn remove(&mut self, viewport: &ViewportRef) -> bool {
        self.sources.shift_remove(viewport)
    }

    /// Nimmt ein Ziel auf. `false` wenn bereits vorhanden.
    pub fn add_target(&mut self, viewport: ViewportRef) -> bool {
        self.targets.insert(viewport)
    }

    /// Entfernt ein Ziel. `false` wenn nicht vorhanden.
    pub fn remove_target(&mut self, viewport: &ViewportRef) -> bool {
        self.targets.shift_remove(viewport)
    }

    /// Quelle und Ziel zugleich (gegenseitige Synchronisation).
    pub fn add_bidirectional(&mut self, viewport: ViewportRef) {
        self.sources.insert(viewport.clone());
        self.targets.insert(viewport);
    }

    /// Wirkt ab dem nächsten Turn; eine laufende Übertragung läuft zu Ende.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::debug!(
                "Synchronizer '{}' {}",
                self.id,
                if enabled { "aktiviert" } else { "deaktiviert" }
            );
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_propagating(&self) -> bool {
        self.propagating
    }

    pub fn sources(&self) -> impl Iterator<Item = &ViewportRef> {
        self.sources.iter()
    }

    pub fn targets(&self) -> impl Iterator<Item = &ViewportRef> {
        self.targets.iter()
    }

    pub fn has_source(&self, viewport: &ViewportRef) -> bool {
        self.sources.contains(viewport)
    }

    pub fn has_target(&self, viewport: &ViewportRef) -> bool {
        self.targets.contains(viewport)
    }

    /// Ist der Viewport Quelle oder Ziel?
    pub fn involves(&self, viewport: &ViewportRef) -> bool {
        self.has_source(viewport) || self.has_target(viewport)
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("sources", &self.sources)
            .field("targets", &self.targets)
            .field("enabled", &self.enabled)
            .field("propagating", &self.propagating)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_and_target_sets() {
        let mut sync = Synchronizer::new("VOI", SynchronizerKind::Voi);
        let ct = ViewportRef::new("engine", "CT_AXIAL");
        let pt = ViewportRef::new("engine", "PT_AXIAL");
        assert!(sync.add(ct.clone()));
        assert!(!sync.add(ct.clone()));
        assert!(sync.add_target(pt.clone()));
        assert!(!sync.remove(&pt));
        assert!(sync.has_source(&ct) && sync.has_target(&pt));
        assert!(!sync.involves(&ViewportRef::new("engine", "DX")));

        sync.add_bidirectional(pt.clone());
        assert!(sync.has_source(&pt));
        assert_eq!(sync.targets().count(), 1);
        assert_eq!(sync.event_kind(), EventKind::VoiModified);
    }
}
