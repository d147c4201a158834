//! Zentrale Konfiguration der Viewport-Koordination.
//!
//! `CoordinationOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Synchronizer ────────────────────────────────────────────────────

/// Weitergabe von Target-Events an andere Synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncChaining {
    /// Target-Events einer Übertragung laufen sofort durch alle anderen Synchronizer.
    #[default]
    Transitive,
    /// Target-Events erreichen keinen Synchronizer.
    Isolated,
}

// ── Window/Level ────────────────────────────────────────────────────

/// Fensterbreiten-Änderung pro Pixel horizontaler Mausbewegung.
pub const WINDOW_LEVEL_SENSITIVITY: f32 = 4.0;

// ── Kamera ──────────────────────────────────────────────────────────

/// Zoom-Faktor pro Pixel vertikaler Mausbewegung.
pub const ZOOM_SENSITIVITY: f32 = 0.01;
/// Minimaler Parallel-Scale (stärkster Zoom).
pub const ZOOM_MIN_PARALLEL_SCALE: f32 = 1.0;
/// Maximaler Parallel-Scale.
pub const ZOOM_MAX_PARALLEL_SCALE: f32 = 4096.0;
/// Drehwinkel (Grad) pro Mausrad-Stufe bei VolumeRotate.
pub const VOLUME_ROTATE_STEP_DEGREES: f32 = 10.0;

// ── Stack ───────────────────────────────────────────────────────────

/// Bilder pro Mausrad-Stufe.
pub const STACK_SCROLL_STEP: i32 = 1;

// ── Segmentierung ───────────────────────────────────────────────────

/// Standard-Pinselradius in Voxeln.
pub const BRUSH_RADIUS_VOXELS: f32 = 2.0;
/// Standard-Segmentindex beim Malen.
pub const BRUSH_SEGMENT_INDEX: u32 = 1;

// ── Referenzlinien ──────────────────────────────────────────────────

/// Standardfarbe von Referenzlinien (RGBA: Gelb).
pub const REFERENCE_LINE_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
/// Slab-Änderung pro Mausrad-Stufe (Welteinheiten).
pub const SLAB_THICKNESS_STEP: f32 = 1.0;
/// Maximale Slab-Dicke.
pub const SLAB_THICKNESS_MAX: f32 = 200.0;
/// Pick-Abstand (Welteinheiten) für Hover auf Referenzlinien.
pub const REFERENCE_LINE_PICK_DISTANCE: f32 = 5.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Koordinations-Optionen.
/// Wird als `viewport_coordination.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationOptions {
    // ── Synchronizer ────────────────────────────────────────────
    /// Weitergabe verschachtelter Target-Events
    pub sync_chaining: SyncChaining,

    // ── Tools ────────────────────────────────────────────────────
    /// Fensterbreiten-Änderung pro Pixel
    pub window_level_sensitivity: f32,
    /// Zoom-Faktor pro Pixel
    pub zoom_sensitivity: f32,
    /// Untere Grenze für `parallel_scale`
    pub zoom_min_parallel_scale: f32,
    /// Obere Grenze für `parallel_scale`
    pub zoom_max_parallel_scale: f32,
    /// Bilder pro Mausrad-Stufe
    pub stack_scroll_step: i32,
    /// Drehwinkel pro Mausrad-Stufe (Grad)
    pub volume_rotate_step_degrees: f32,
    /// Standard-Pinselradius (Voxel)
    pub brush_radius_voxels: f32,

    // ── Referenzlinien ──────────────────────────────────────────
    /// Standardfarbe, wenn die Tabelle keine Farbe vorgibt
    pub reference_line_color: [f32; 4],
    /// Slab-Änderung pro Mausrad-Stufe
    pub slab_thickness_step: f32,
    /// Obere Grenze der Slab-Dicke
    pub slab_thickness_max: f32,
    /// Pick-Abstand für Hover
    pub reference_line_pick_distance: f32,

    // ── Diagnose ────────────────────────────────────────────────
    /// Viewports in mehreren ToolGroups als Warnung loggen
    pub warn_shared_viewports: bool,
}

impl Default for CoordinationOptions {
    fn default() -> Self {
        Self {
            sync_chaining: SyncChaining::default(),
            window_level_sensitivity: WINDOW_LEVEL_SENSITIVITY,
            zoom_sensitivity: ZOOM_SENSITIVITY,
            zoom_min_parallel_scale: ZOOM_MIN_PARALLEL_SCALE,
            zoom_max_parallel_scale: ZOOM_MAX_PARALLEL_SCALE,
            stack_scroll_step: STACK_SCROLL_STEP,
            volume_rotate_step_degrees: VOLUME_ROTATE_STEP_DEGREES,
            brush_radius_voxels: BRUSH_RADIUS_VOXELS,
            reference_line_color: REFERENCE_LINE_COLOR,
            slab_thickness_step: SLAB_THICKNESS_STEP,
            slab_thickness_max: SLAB_THICKNESS_MAX,
            reference_line_pick_distance: REFERENCE_LINE_PICK_DISTANCE,
            warn_shared_viewports: true,
        }
    }
}

impl CoordinationOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("viewport-coordination-demo"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("viewport_coordination.toml")
    }

    /// Drehwinkel pro Mausrad-Stufe im Bogenmaß.
    pub fn volume_rotate_step_radians(&self) -> f32 {
        self.volume_rotate_step_degrees.to_radians()
    }
}
