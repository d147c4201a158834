//! In-Memory-Volume-Cache.

use super::VolumeStore;
use crate::core::{DerivedVolumeSpec, Volume, VolumeSpec};
use crate::error::{CoordinationError, Result};
use std::collections::HashMap;

/// Hält Volumes und Labelmaps vollständig im Speicher.
#[derive(Debug, Default)]
pub struct MemoryVolumeStore {
    volumes: HashMap<String, Volume>,
}

impl MemoryVolumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entfernt ein Volume aus dem Cache.
    pub fn remove(&mut self, volume_id: &str) -> Option<Volume> {
        self.volumes.remove(volume_id)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    fn insert_new(&mut self, volume: Volume) -> Result<&Volume> {
        if self.volumes.contains_key(&volume.id) {
            return Err(CoordinationError::DuplicateVolume {
                volume_id: volume.id,
            });
        }
        log::debug!(
            "Volume '{}' gecacht ({:?}, {} Voxel)",
            volume.id,
            volume.dimensions,
            volume.voxel_count()
        );
        let id = volume.id.clone();
        Ok(self.volumes.entry(id).or_insert(volume))
    }
}

impl VolumeStore for MemoryVolumeStore {
    fn volume(&self, volume_id: &str) -> Option<&Volume> {
        self.volumes.get(volume_id)
    }

    fn volume_mut(&mut self, volume_id: &str) -> Option<&mut Volume> {
        self.volumes.get_mut(volume_id)
    }

    fn create_and_cache_volume(&mut self, volume_id: &str, spec: VolumeSpec) -> Result<&Volume> {
        let voxel_count: usize = spec.dimensions.iter().product();
        let data = spec.data.unwrap_or_else(|| vec![0.0; voxel_count]);
        if data.len() != voxel_count {
            return Err(CoordinationError::InvalidVolume {
                volume_id: volume_id.to_string(),
                reason: format!("{} Werte für {} Voxel", data.len(), voxel_count),
            });
        }
        self.insert_new(Volume {
            id: volume_id.to_string(),
            dimensions: spec.dimensions,
            spacing: spec.spacing,
            origin: spec.origin,
            data,
            version: 0,
        })
    }

    fn create_and_cache_derived_volume(
        &mut self,
        source_volume_id: &str,
        spec: DerivedVolumeSpec,
    ) -> Result<&Volume> {
        let source = self
            .volumes
            .get(source_volume_id)
            .ok_or_else(|| CoordinationError::VolumeNotFound {
                volume_id: source_volume_id.to_string(),
            })?;
        let derived = Volume {
            id: spec.volume_id,
            dimensions: source.dimensions,
            spacing: source.spacing,
            origin: source.origin,
            data: vec![0.0; source.voxel_count()],
            version: 0,
        };
        self.insert_new(derived)
    }
}
