//! Voxel-Volumes (Bildvolume und Labelmaps) wie sie der Volume-Store liefert.

use glam::Vec3;
use std::collections::BTreeSet;

/// Ein gecachtes Volume: Dimensionen, Geometrie und Voxel-Daten.
///
/// Labelmaps verwenden denselben Typ; die Voxel enthalten dann Segment-Indizes
/// (0 = Hintergrund).
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub id: String,
    /// Anzahl Voxel pro Achse `[i, j, k]`
    pub dimensions: [usize; 3],
    /// Voxel-Abstand in Welteinheiten
    pub spacing: Vec3,
    /// Weltposition von Voxel `[0, 0, 0]`
    pub origin: Vec3,
    pub data: Vec<f32>,
    /// Wird bei jeder Datenänderung erhöht
    pub version: u64,
}

impl Volume {
    /// Anzahl aller Voxel.
    pub fn voxel_count(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Linearer Index eines Voxels (i schnellste Achse).
    pub fn index_of(&self, ijk: [usize; 3]) -> Option<usize> {
        let [di, dj, dk] = self.dimensions;
        let [i, j, k] = ijk;
        (i < di && j < dj && k < dk).then(|| i + j * di + k * di * dj)
    }

    /// Welt-Koordinate eines Voxel-Mittelpunkts.
    pub fn voxel_to_world(&self, ijk: [usize; 3]) -> Vec3 {
        self.origin + Vec3::new(ijk[0] as f32, ijk[1] as f32, ijk[2] as f32) * self.spacing
    }

    /// Nächstgelegener Voxel zu einer Weltposition (außerhalb → `None`).
    pub fn world_to_voxel(&self, world: Vec3) -> Option<[usize; 3]> {
        let continuous = (world - self.origin) / self.spacing;
        let rounded = continuous.round();
        if rounded.min_element() < 0.0 {
            return None;
        }
        let ijk = [rounded.x as usize, rounded.y as usize, rounded.z as usize];
        self.index_of(ijk).map(|_| ijk)
    }

    /// Voxel-Wert (außerhalb → `None`).
    pub fn voxel(&self, ijk: [usize; 3]) -> Option<f32> {
        self.index_of(ijk).and_then(|idx| self.data.get(idx).copied())
    }

    /// Setzt alle Voxel innerhalb einer Kugel auf `value`.
    ///
    /// Gibt die Anzahl geänderter Voxel zurück; bei Änderungen wird `version`
    /// erhöht.
    pub fn paint_sphere(&mut self, center: Vec3, radius: f32, value: f32) -> usize {
        let radius = radius.max(0.0);
        let lo = ((center - Vec3::splat(radius) - self.origin) / self.spacing).floor();
        let hi = ((center + Vec3::splat(radius) - self.origin) / self.spacing).ceil();
        let clamp_axis = |v: f32, dim: usize| (v.max(0.0) as usize).min(dim.saturating_sub(1));

        let [di, dj, dk] = self.dimensions;
        if di == 0 || dj == 0 || dk == 0 || hi.min_element() < 0.0 {
            return 0;
        }

        let mut changed = 0;
        for k in clamp_axis(lo.z, dk)..=clamp_axis(hi.z, dk) {
            for j in clamp_axis(lo.y, dj)..=clamp_axis(hi.y, dj) {
                for i in clamp_axis(lo.x, di)..=clamp_axis(hi.x, di) {
                    if self.voxel_to_world([i, j, k]).distance(center) > radius {
                        continue;
                    }
                    let Some(idx) = self.index_of([i, j, k]) else {
                        continue;
                    };
                    if let Some(voxel) = self.data.get_mut(idx) {
                        if *voxel != value {
                            *voxel = value;
                            changed += 1;
                        }
                    }
                }
            }
        }

        if changed > 0 {
            self.version += 1;
        }
        changed
    }

    /// Sortierte Menge aller Segment-Indizes ≠ 0 (für Labelmaps).
    pub fn distinct_labels(&self) -> Vec<u32> {
        self.data
            .iter()
            .filter(|v| **v > 0.0)
            .map(|v| v.round() as u32)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Parameter für `createAndCacheVolume`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSpec {
    pub dimensions: [usize; 3],
    pub spacing: Vec3,
    pub origin: Vec3,
    /// Voxel-Daten; `None` = mit Nullen gefüllt
    pub data: Option<Vec<f32>>,
}

impl VolumeSpec {
    /// Leeres Volume mit Einheits-Spacing im Ursprung.
    pub fn empty(dimensions: [usize; 3]) -> Self {
        Self {
            dimensions,
            spacing: Vec3::ONE,
            origin: Vec3::ZERO,
            data: None,
        }
    }
}

/// Parameter für `createAndCacheDerivedVolume`: gleiche Geometrie, leere Daten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedVolumeSpec {
    /// ID des neuen (abgeleiteten) Volumes
    pub volume_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelmap(dim: usize) -> Volume {
        Volume {
            id: "seg".into(),
            dimensions: [dim, dim, dim],
            spacing: Vec3::ONE,
            origin: Vec3::ZERO,
            data: vec![0.0; dim * dim * dim],
            version: 0,
        }
    }

    #[test]
    fn test_world_to_voxel_respects_bounds() {
        let volume = labelmap(4);
        assert_eq!(volume.world_to_voxel(Vec3::new(1.2, 2.8, 0.0)), Some([1, 3, 0]));
        assert_eq!(volume.world_to_voxel(Vec3::new(-1.0, 0.0, 0.0)), None);
        assert_eq!(volume.world_to_voxel(Vec3::new(4.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_paint_sphere_bumps_version_and_labels() {
        let mut volume = labelmap(8);
        let changed = volume.paint_sphere(Vec3::splat(4.0), 1.0, 2.0);
        // Mittelpunkt + 6 direkte Nachbarn
        assert_eq!(changed, 7);
        assert_eq!(volume.version, 1);
        assert_eq!(volume.distinct_labels(), vec![2]);

        // Erneutes Malen mit gleichem Wert ändert nichts
        assert_eq!(volume.paint_sphere(Vec3::splat(4.0), 1.0, 2.0), 0);
        assert_eq!(volume.version, 1);
    }

    #[test]
    fn test_paint_outside_volume_is_noop() {
        let mut volume = labelmap(4);
        assert_eq!(volume.paint_sphere(Vec3::splat(-20.0), 2.0, 1.0), 0);
        assert_eq!(volume.version, 0);
    }
}
