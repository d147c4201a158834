//! Fehler-Taxonomie der Koordinationsschicht.
//!
//! Alle Varianten lassen sich über [`CoordinationError::category`] einer der
//! vier Kategorien zuordnen. `Configuration` und `State` brechen den Aufruf
//! sofort ab, `Lookup` wird innerhalb von Fan-out-Schleifen geschluckt und nur
//! als Warnung protokolliert.

use crate::core::ViewportRef;
use thiserror::Error;

/// Grobe Einordnung eines Fehlers (bestimmt die Propagations-Regel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Falsche Konfiguration durch den Aufrufer (Duplikate, unbekannte Namen)
    Configuration,
    /// Operation ist für diesen Viewport-Typ nicht definiert
    UnsupportedOperation,
    /// Referenz ließ sich nicht auflösen (wiederherstellbar)
    Lookup,
    /// Modus-Wechsel auf einem Tool, das nicht in der Gruppe liegt
    State,
}

/// Fehler der Koordinationsschicht.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
    // ── Configuration ───────────────────────────────────────────────
    /// ToolGroup-ID ist bereits vergeben
    #[error("ToolGroup '{id}' existiert bereits")]
    DuplicateToolGroup { id: String },

    /// ToolGroup-ID ist unbekannt
    #[error("ToolGroup '{id}' nicht gefunden")]
    UnknownToolGroup { id: String },

    /// Tool wurde der Gruppe bereits hinzugefügt
    #[error("Tool '{tool}' ist in ToolGroup '{tool_group_id}' bereits registriert")]
    DuplicateTool { tool_group_id: String, tool: String },

    /// Tool-Name ist in der ToolRegistry unbekannt
    #[error("Tool '{tool}' nicht gefunden")]
    ToolNotFound { tool: String },

    /// Tool-Verhalten wurde doppelt in der Registry angemeldet
    #[error("Tool '{tool}' ist in der ToolRegistry bereits angemeldet")]
    DuplicateToolRegistration { tool: String },

    /// Tool-Optionen ließen sich nicht in den erwarteten Typ lesen
    #[error("Ungültige Option '{key}' für Tool '{tool}': {reason}")]
    InvalidToolOptions {
        tool: String,
        key: String,
        reason: String,
    },

    /// Synchronizer-ID ist bereits vergeben
    #[error("Synchronizer '{id}' existiert bereits")]
    DuplicateSynchronizer { id: String },

    /// Segmentierung ist bereits registriert
    #[error("Segmentierung '{segmentation_id}' existiert bereits")]
    DuplicateSegmentation { segmentation_id: String },

    /// Segmentierung ist unbekannt
    #[error("Segmentierung '{segmentation_id}' nicht gefunden")]
    UnknownSegmentation { segmentation_id: String },

    /// `(toolGroupId, segmentationId)` ist bereits repräsentiert
    #[error(
        "Segmentierung '{segmentation_id}' hat in ToolGroup '{tool_group_id}' bereits eine Repräsentation"
    )]
    DuplicateRepresentation {
        tool_group_id: String,
        segmentation_id: String,
    },

    /// Segmentierung ist in der ToolGroup nicht repräsentiert
    #[error("Segmentierung '{segmentation_id}' hat in ToolGroup '{tool_group_id}' keine Repräsentation")]
    RepresentationNotFound {
        tool_group_id: String,
        segmentation_id: String,
    },

    /// Labelmap-Volume der Segmentierung fehlt im Volume-Store
    #[error("Volume '{volume_id}' für Segmentierung '{segmentation_id}' nicht im Cache")]
    MissingBackingVolume {
        segmentation_id: String,
        volume_id: String,
    },

    /// Volume-ID ist im Store bereits belegt
    #[error("Volume '{volume_id}' existiert bereits im Cache")]
    DuplicateVolume { volume_id: String },

    /// Voxel-Daten passen nicht zu den Dimensionen
    #[error("Volume '{volume_id}': {reason}")]
    InvalidVolume { volume_id: String, reason: String },

    /// RenderingEngine-ID ist in der Registry bereits belegt
    #[error("RenderingEngine '{id}' ist bereits registriert")]
    DuplicateRenderingEngine { id: String },

    // ── UnsupportedOperation ────────────────────────────────────────
    /// Operation ist für den Viewport nicht definiert (z.B. Stack ohne Scene)
    #[error("{operation} wird für Viewport '{viewport}' nicht unterstützt: {reason}")]
    UnsupportedOperation {
        operation: String,
        viewport: ViewportRef,
        reason: String,
    },

    // ── Lookup ──────────────────────────────────────────────────────
    /// Viewport-Referenz zeigt auf keinen lebenden Viewport
    #[error("Viewport '{viewport}' nicht gefunden")]
    ViewportNotFound { viewport: ViewportRef },

    /// Volume ist nicht (mehr) im Cache
    #[error("Volume '{volume_id}' nicht gefunden")]
    VolumeNotFound { volume_id: String },

    // ── State ───────────────────────────────────────────────────────
    /// Tool ist bekannt, aber der Gruppe nicht hinzugefügt
    #[error("Tool '{tool}' ist in ToolGroup '{tool_group_id}' nicht registriert")]
    ToolNotInGroup { tool_group_id: String, tool: String },
}

impl CoordinationError {
    /// Ordnet den Fehler seiner Kategorie zu.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoordinationError::DuplicateToolGroup { .. }
            | CoordinationError::UnknownToolGroup { .. }
            | CoordinationError::DuplicateTool { .. }
            | CoordinationError::ToolNotFound { .. }
            | CoordinationError::DuplicateToolRegistration { .. }
            | CoordinationError::InvalidToolOptions { .. }
            | CoordinationError::DuplicateSynchronizer { .. }
            | CoordinationError::DuplicateSegmentation { .. }
            | CoordinationError::UnknownSegmentation { .. }
            | CoordinationError::DuplicateRepresentation { .. }
            | CoordinationError::RepresentationNotFound { .. }
            | CoordinationError::MissingBackingVolume { .. }
            | CoordinationError::DuplicateVolume { .. }
            | CoordinationError::InvalidVolume { .. }
            | CoordinationError::DuplicateRenderingEngine { .. } => ErrorCategory::Configuration,
            CoordinationError::UnsupportedOperation { .. } => ErrorCategory::UnsupportedOperation,
            CoordinationError::ViewportNotFound { .. } | CoordinationError::VolumeNotFound { .. } => {
                ErrorCategory::Lookup
            }
            CoordinationError::ToolNotInGroup { .. } => ErrorCategory::State,
        }
    }

    /// `true` für wiederherstellbare Lookup-Fehler.
    pub fn is_lookup_miss(&self) -> bool {
        self.category() == ErrorCategory::Lookup
    }
}

/// Result-Alias der Koordinationsschicht.
pub type Result<T> = std::result::Result<T, CoordinationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_follow_propagation_policy() {
        let dup = CoordinationError::DuplicateToolGroup { id: "CT".into() };
        assert_eq!(dup.category(), ErrorCategory::Configuration);

        let miss = CoordinationError::ViewportNotFound {
            viewport: ViewportRef::new("engine", "CT_AXIAL"),
        };
        assert!(miss.is_lookup_miss());

        let state = CoordinationError::ToolNotInGroup {
            tool_group_id: "CT".into(),
            tool: "Pan".into(),
        };
        assert_eq!(state.category(), ErrorCategory::State);
    }

    #[test]
    fn test_display_names_viewport() {
        let err = CoordinationError::ViewportNotFound {
            viewport: ViewportRef::new("myRenderingEngine", "CT_AXIAL"),
        };
        assert!(err.to_string().contains("myRenderingEngine/CT_AXIAL"));
    }
}
