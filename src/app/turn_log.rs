//! Protokoll der Event-Turns (Eingabe → Tool → Synchronizer → Render).

use super::tool_groups::Resolution;
use crate::core::{InputEventKind, ViewportRef};
use crate::error::CoordinationError;

/// Auslöser eines Turns.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnTrigger {
    /// Eingabe-Event auf einem Viewport
    Input {
        viewport: ViewportRef,
        kind: InputEventKind,
    },
    /// Von außen ausgelöste Viewport-Events (`process_pending_events`)
    PendingEvents,
    /// Direkter Labelmap-Update-Aufruf
    LabelmapUpdated { viewport: ViewportRef },
}

/// Ein Synchronizer hat einen Ziel-Viewport aktualisiert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncApplication {
    pub synchronizer_id: String,
    pub target: ViewportRef,
}

/// Eine verschluckte, wiederherstellbare Auflösungs-Panne.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupMiss {
    /// Wer die Referenz auflösen wollte (Synchronizer, Tool, Dispatcher)
    pub origin: String,
    pub error: CoordinationError,
}

/// Ergebnis eines einzelnen Turns.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub trigger: TurnTrigger,
    /// Abonnierte ToolGroup, falls das Event geroutet wurde
    pub tool_group_id: Option<String>,
    /// Ergebnis der Binding-Auflösung
    pub resolution: Option<Resolution>,
    /// Das Tool hat das Event verarbeitet
    pub tool_handled: bool,
    pub synchronized: Vec<SyncApplication>,
    /// Durch den Re-Entrancy-Guard unterdrückte Synchronizer-Aufrufe
    pub suppressed: usize,
    pub lookup_misses: Vec<LookupMiss>,
    /// Viewports, deren Zustand im Turn geändert wurde
    pub mutated: Vec<ViewportRef>,
    /// Viewports, deren Segmentierungs-Overlay neu berechnet wurde
    pub overlays_updated: Vec<ViewportRef>,
    /// Viewports, für die ein Render angefordert wurde
    pub rendered: Vec<ViewportRef>,
}

impl TurnReport {
    pub fn new(trigger: TurnTrigger) -> Self {
        Self {
            trigger,
            tool_group_id: None,
            resolution: None,
            tool_handled: false,
            synchronized: Vec::new(),
            suppressed: 0,
            lookup_misses: Vec::new(),
            mutated: Vec::new(),
            overlays_updated: Vec::new(),
            rendered: Vec::new(),
        }
    }

    /// Merkt einen geänderten Viewport (ohne Duplikate).
    pub fn mark_mutated(&mut self, viewport: &ViewportRef) {
        if !self.mutated.contains(viewport) {
            self.mutated.push(viewport.clone());
        }
    }

    /// Protokolliert eine Lookup-Panne als Warnung.
    pub fn record_lookup_miss(&mut self, origin: impl Into<String>, error: CoordinationError) {
        let origin = origin.into();
        log::warn!("{}: {}", origin, error);
        self.lookup_misses.push(LookupMiss { origin, error });
    }

    /// Hat ein Synchronizer `target` in diesem Turn erreicht?
    pub fn synchronized_target(&self, target: &ViewportRef) -> bool {
        self.synchronized.iter().any(|s| &s.target == target)
    }
}

/// Speichert Turn-Berichte in Reihenfolge.
#[derive(Default)]
pub struct TurnLog {
    entries: Vec<TurnReport>,
}

impl TurnLog {
    const MAX_ENTRIES: usize = 1000;

    /// Erstellt ein leeres Turn-Log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Fügt einen Bericht hinzu.
    /// Begrenzt auf MAX_ENTRIES, ältere Einträge werden verworfen.
    pub fn record(&mut self, report: TurnReport) {
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.drain(..Self::MAX_ENTRIES / 2);
        }
        self.entries.push(report);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Liefert eine read-only Sicht auf alle Einträge.
    pub fn entries(&self) -> &[TurnReport] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TurnReport> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = TurnLog::new();
        for _ in 0..TurnLog::MAX_ENTRIES + 1 {
            log.record(TurnReport::new(TurnTrigger::PendingEvents));
        }
        assert_eq!(log.len(), TurnLog::MAX_ENTRIES / 2 + 1);
    }

    #[test]
    fn test_mark_mutated_deduplicates() {
        let mut report = TurnReport::new(TurnTrigger::PendingEvents);
        let vp = ViewportRef::new("engine", "CT_AXIAL");
        report.mark_mutated(&vp);
        report.mark_mutated(&vp);
        assert_eq!(report.mutated, vec![vp]);
    }
}
