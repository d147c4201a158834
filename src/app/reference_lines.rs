//! Referenzlinien: Konfigurationstabelle und Ebenenschnitt-Geometrie.
//!
//! Die Tabelle liegt in den Tool-Optionen (`reference_lines`) und wird bei
//! jedem Zeichnen und jeder Eingabe neu gelesen.

use crate::core::{Camera, ViewportRef};
use crate::error::Result;
use crate::render::{ViewportKind, ViewportRegistry};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optionsschlüssel der Tabelle in den Tool-Optionen.
pub const REFERENCE_LINES_OPTION: &str = "reference_lines";

/// Quadrat der Kreuzprodukt-Länge, unter dem zwei Ebenen als parallel gelten.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Pro-Viewport-Eigenschaften der Referenzlinien.
///
/// Listen mit `None` erlauben alle Viewports, `Some(vec![])` keinen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceLineTable {
    /// Viewports, deren Ebene per Drag verschoben werden darf
    pub controllable: Option<Vec<String>>,
    /// Viewports, deren Ebene rotiert werden darf
    pub draggable_rotatable: Option<Vec<String>>,
    /// Viewports mit Slab-Dicken-Steuerung
    pub slab_thickness_controls: Option<Vec<String>>,
    /// Linienfarbe je Viewport-ID (RGBA)
    pub colors: BTreeMap<String, [f32; 4]>,
    /// Farbe für Viewports ohne Eintrag in `colors`
    pub default_color: Option<[f32; 4]>,
}

fn listed(list: &Option<Vec<String>>, viewport_id: &str) -> bool {
    list.as_ref()
        .is_none_or(|ids| ids.iter().any(|id| id == viewport_id))
}

impl ReferenceLineTable {
    pub fn is_reference_line_controllable(&self, viewport_id: &str) -> bool {
        listed(&self.controllable, viewport_id)
    }

    pub fn is_reference_line_draggable_rotatable(&self, viewport_id: &str) -> bool {
        listed(&self.draggable_rotatable, viewport_id)
    }

    pub fn is_slab_thickness_control_enabled(&self, viewport_id: &str) -> bool {
        listed(&self.slab_thickness_controls, viewport_id)
    }

    /// Farbe der Linie, die die Ebene von `viewport_id` erzeugt.
    pub fn reference_line_color(&self, viewport_id: &str) -> Option<[f32; 4]> {
        self.colors.get(viewport_id).copied().or(self.default_color)
    }
}

/// Eine gezeichnete Referenzlinie im Weltkoordinatensystem.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    /// Viewport, dessen Ebene die Linie erzeugt
    pub other: ViewportRef,
    pub start: Vec3,
    pub end: Vec3,
    pub color: [f32; 4],
    pub controllable: bool,
    pub draggable_rotatable: bool,
    pub slab_thickness_controls: bool,
}

impl ReferenceLine {
    /// Abstand eines Punkts zum Liniensegment.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        let segment = self.end - self.start;
        let length_sq = segment.length_squared();
        if length_sq <= f32::EPSILON {
            return point.distance(self.start);
        }
        let t = ((point - self.start).dot(segment) / length_sq).clamp(0.0, 1.0);
        point.distance(self.start + segment * t)
    }
}

// ── Geometrie ────────────────────────────────────────────────────

/// Schnittgerade zweier Bildebenen als `(Punkt, normierte Richtung)`.
///
/// Parallele Ebenen → `None`.
pub fn plane_intersection(a: &Camera, b: &Camera) -> Option<(Vec3, Vec3)> {
    let n1 = a.view_plane_normal;
    let n2 = b.view_plane_normal;
    let direction = n1.cross(n2);
    let denom = direction.length_squared();
    if denom < PARALLEL_EPSILON {
        return None;
    }
    let d1 = n1.dot(a.focal_point);
    let d2 = n2.dot(b.focal_point);
    let n1n2 = n1.dot(n2);
    let point = ((d1 * n2.length_squared() - d2 * n1n2) * n1
        + (d2 * n1.length_squared() - d1 * n1n2) * n2)
        / denom;
    Some((point, direction / denom.sqrt()))
}

/// Schnittpunkt dreier Bildebenen (Crosshair-Zentrum).
pub fn three_plane_intersection(a: &Camera, b: &Camera, c: &Camera) -> Option<Vec3> {
    let (n1, n2, n3) = (a.view_plane_normal, b.view_plane_normal, c.view_plane_normal);
    let det = n1.dot(n2.cross(n3));
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let d1 = n1.dot(a.focal_point);
    let d2 = n2.dot(b.focal_point);
    let d3 = n3.dot(c.focal_point);
    Some((d1 * n2.cross(n3) + d2 * n3.cross(n1) + d3 * n1.cross(n2)) / det)
}

/// Schnittlinie von `other` mit `drawn`, beschnitten auf den sichtbaren Bereich von `drawn`.
///
/// Das Segment liegt symmetrisch um die Projektion des Fokuspunkts von
/// `drawn` und ist so lang wie die Diagonale des sichtbaren Quadrats.
pub fn clipped_reference_segment(drawn: &Camera, other: &Camera) -> Option<(Vec3, Vec3)> {
    let (point, direction) = plane_intersection(drawn, other)?;
    let center = point + direction * (drawn.focal_point - point).dot(direction);
    let half_length = drawn.parallel_scale * std::f32::consts::SQRT_2;
    Some((center - direction * half_length, center + direction * half_length))
}

/// Alle Referenzlinien, die im Viewport `drawn` zu zeichnen sind.
///
/// Kandidaten sind die anderen Viewports der Gruppe in derselben Engine mit
/// einer Bildebene (keine Stacks). Nicht auflösbare Kandidaten werden mit
/// Warnung übersprungen, ein nicht auflösbares `drawn` ist ein Fehler.
pub fn reference_lines_for(
    viewports: &ViewportRegistry,
    drawn: &ViewportRef,
    group_viewports: &[ViewportRef],
    table: &ReferenceLineTable,
    fallback_color: [f32; 4],
) -> Result<Vec<ReferenceLine>> {
    let drawn_camera = viewports.resolve(drawn)?.camera();
    let mut lines = Vec::new();

    for other in group_viewports {
        if other == drawn || other.rendering_engine_id != drawn.rendering_engine_id {
            continue;
        }
        let viewport = match viewports.resolve(other) {
            Ok(viewport) => viewport,
            Err(e) => {
                log::warn!("Referenzlinie übersprungen: {}", e);
                continue;
            }
        };
        if viewport.kind() == ViewportKind::Stack {
            continue;
        }
        let Some((start, end)) = clipped_reference_segment(&drawn_camera, &viewport.camera())
        else {
            continue;
        };
        let id = other.viewport_id.as_str();
        lines.push(ReferenceLine {
            other: other.clone(),
            start,
            end,
            color: table.reference_line_color(id).unwrap_or(fallback_color),
            controllable: table.is_reference_line_controllable(id),
            draggable_rotatable: table.is_reference_line_draggable_rotatable(id),
            slab_thickness_controls: table.is_slab_thickness_control_enabled(id),
        });
    }
    Ok(lines)
}
