//! Segmentierungs-Zustand: Datensätze, Repräsentationen je ToolGroup, aktive Segmentierung.

use crate::core::SegmentationRepresentationType;
use crate::error::{CoordinationError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Eingaben ─────────────────────────────────────────────────────

/// Daten einer Labelmap-Repräsentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelmapData {
    pub volume_id: String,
}

/// Repräsentations-Teil einer Segmentierungs-Konfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentationConfig {
    #[serde(rename = "type")]
    pub representation_type: SegmentationRepresentationType,
    pub data: LabelmapData,
}

/// Eingabe für `add_segmentations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationInput {
    pub segmentation_id: String,
    pub representation: RepresentationConfig,
}

impl SegmentationInput {
    /// Labelmap-Segmentierung auf einem gecachten Volume.
    pub fn labelmap(segmentation_id: impl Into<String>, volume_id: impl Into<String>) -> Self {
        Self {
            segmentation_id: segmentation_id.into(),
            representation: RepresentationConfig {
                representation_type: SegmentationRepresentationType::Labelmap,
                data: LabelmapData {
                    volume_id: volume_id.into(),
                },
            },
        }
    }
}

/// Eingabe für `add_segmentation_representations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationInput {
    pub segmentation_id: String,
    #[serde(rename = "type")]
    pub representation_type: SegmentationRepresentationType,
}

impl RepresentationInput {
    pub fn labelmap(segmentation_id: impl Into<String>) -> Self {
        Self {
            segmentation_id: segmentation_id.into(),
            representation_type: SegmentationRepresentationType::Labelmap,
        }
    }
}

// ── Datensätze ───────────────────────────────────────────────────

/// Registrierte Segmentierung; lebt unabhängig von ToolGroups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationRecord {
    pub segmentation_id: String,
    /// Labelmap-Volume im Volume-Store
    pub volume_id: String,
    pub representation_type: SegmentationRepresentationType,
}

/// Darstellung einer Segmentierung in einer ToolGroup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationRepresentation {
    pub uid: String,
    pub tool_group_id: String,
    pub segmentation_id: String,
    pub representation_type: SegmentationRepresentationType,
    pub visible: bool,
}

/// Gesamter Segmentierungs-Zustand des Prozesses.
///
/// Invariante: `(tool_group_id, segmentation_id)` ist über alle
/// Repräsentationen eindeutig.
#[derive(Debug, Default)]
pub struct SegmentationState {
    segmentations: IndexMap<String, SegmentationRecord>,
    representations: Vec<SegmentationRepresentation>,
    /// ToolGroup → aktive Segmentierung
    active: HashMap<String, String>,
    next_uid: u64,
}

impl SegmentationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segmentation(&self, segmentation_id: &str) -> Option<&SegmentationRecord> {
        self.segmentations.get(segmentation_id)
    }

    pub fn require_segmentation(&self, segmentation_id: &str) -> Result<&SegmentationRecord> {
        self.segmentation(segmentation_id)
            .ok_or_else(|| CoordinationError::UnknownSegmentation {
                segmentation_id: segmentation_id.to_string(),
            })
    }

    pub fn segmentations(&self) -> impl Iterator<Item = &SegmentationRecord> {
        self.segmentations.values()
    }

    pub fn representations(&self) -> &[SegmentationRepresentation] {
        &self.representations
    }

    pub fn representations_for_tool_group<'a>(
        &'a self,
        tool_group_id: &'a str,
    ) -> impl Iterator<Item = &'a SegmentationRepresentation> + 'a {
        self.representations
            .iter()
            .filter(move |rep| rep.tool_group_id == tool_group_id)
    }

    pub fn representation(
        &self,
        tool_group_id: &str,
        segmentation_id: &str,
    ) -> Option<&SegmentationRepresentation> {
        self.representations
            .iter()
            .find(|rep| rep.tool_group_id == tool_group_id && rep.segmentation_id == segmentation_id)
    }

    /// ToolGroups mit einer Repräsentation der Segmentierung.
    pub fn tool_groups_representing(&self, segmentation_id: &str) -> Vec<String> {
        self.representations
            .iter()
            .filter(|rep| rep.segmentation_id == segmentation_id)
            .map(|rep| rep.tool_group_id.clone())
            .collect()
    }

    pub fn active_segmentation_id(&self, tool_group_id: &str) -> Option<&str> {
        self.active.get(tool_group_id).map(String::as_str)
    }

    pub fn active_segmentation(&self, tool_group_id: &str) -> Option<&SegmentationRecord> {
        self.active_segmentation_id(tool_group_id)
            .and_then(|id| self.segmentations.get(id))
    }

    // ── Mutationen ───────────────────────────────────────────────

    pub(crate) fn insert_segmentation(&mut self, record: SegmentationRecord) -> Result<()> {
        if self.segmentations.contains_key(&record.segmentation_id) {
            return Err(CoordinationError::DuplicateSegmentation {
                segmentation_id: record.segmentation_id,
            });
        }
        self.segmentations
            .insert(record.segmentation_id.clone(), record);
        Ok(())
    }

    /// Legt eine Repräsentation an; die erste einer Gruppe wird deren aktive Segmentierung.
    pub(crate) fn insert_representation(
        &mut self,
        tool_group_id: &str,
        input: &RepresentationInput,
    ) -> Result<&SegmentationRepresentation> {
        self.require_segmentation(&input.segmentation_id)?;
        if self
            .representation(tool_group_id, &input.segmentation_id)
            .is_some()
        {
            return Err(CoordinationError::DuplicateRepresentation {
                tool_group_id: tool_group_id.to_string(),
                segmentation_id: input.segmentation_id.clone(),
            });
        }

        self.next_uid += 1;
        let uid = format!("{}-{}-{}", tool_group_id, input.segmentation_id, self.next_uid);
        self.active
            .entry(tool_group_id.to_string())
            .or_insert_with(|| input.segmentation_id.clone());
        self.representations.push(SegmentationRepresentation {
            uid,
            tool_group_id: tool_group_id.to_string(),
            segmentation_id: input.segmentation_id.clone(),
            representation_type: input.representation_type,
            visible: true,
        });
        Ok(&self.representations[self.representations.len() - 1])
    }

    /// Entfernt eine Segmentierung samt aller Repräsentationen.
    pub(crate) fn remove_segmentation(
        &mut self,
        segmentation_id: &str,
    ) -> Result<(SegmentationRecord, Vec<SegmentationRepresentation>)> {
        let record = self
            .segmentations
            .shift_remove(segmentation_id)
            .ok_or_else(|| CoordinationError::UnknownSegmentation {
                segmentation_id: segmentation_id.to_string(),
            })?;
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.representations)
            .into_iter()
            .partition(|rep| rep.segmentation_id == segmentation_id);
        self.representations = kept;
        for rep in &removed {
            self.reassign_active(&rep.tool_group_id);
        }
        Ok((record, removed))
    }

    /// Entfernt alle Repräsentationen einer Gruppe.
    pub(crate) fn remove_representations_for_tool_group(
        &mut self,
        tool_group_id: &str,
    ) -> Vec<SegmentationRepresentation> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.representations)
            .into_iter()
            .partition(|rep| rep.tool_group_id == tool_group_id);
        self.representations = kept;
        self.active.remove(tool_group_id);
        removed
    }

    pub(crate) fn set_active(&mut self, tool_group_id: &str, segmentation_id: &str) -> Result<()> {
        self.require_representation(tool_group_id, segmentation_id)?;
        self.active
            .insert(tool_group_id.to_string(), segmentation_id.to_string());
        Ok(())
    }

    /// Setzt die Sichtbarkeit. Gibt zurück, ob sie sich geändert hat.
    pub(crate) fn set_visibility(
        &mut self,
        tool_group_id: &str,
        segmentation_id: &str,
        visible: bool,
    ) -> Result<bool> {
        self.require_representation(tool_group_id, segmentation_id)?;
        let rep = self
            .representations
            .iter_mut()
            .find(|rep| rep.tool_group_id == tool_group_id && rep.segmentation_id == segmentation_id)
            .ok_or_else(|| CoordinationError::RepresentationNotFound {
                tool_group_id: tool_group_id.to_string(),
                segmentation_id: segmentation_id.to_string(),
            })?;
        let changed = rep.visible != visible;
        rep.visible = visible;
        Ok(changed)
    }

    fn require_representation(&self, tool_group_id: &str, segmentation_id: &str) -> Result<()> {
        self.require_segmentation(segmentation_id)?;
        match self.representation(tool_group_id, segmentation_id) {
            Some(_) => Ok(()),
            None => Err(CoordinationError::RepresentationNotFound {
                tool_group_id: tool_group_id.to_string(),
                segmentation_id: segmentation_id.to_string(),
            }),
        }
    }

    /// Aktive Segmentierung auf die nächste verbleibende Repräsentation setzen.
    fn reassign_active(&mut self, tool_group_id: &str) {
        let still_valid = self
            .active
            .get(tool_group_id)
            .is_some_and(|id| self.representation(tool_group_id, id).is_some());
        if still_valid {
            return;
        }
        let next = self
            .representations_for_tool_group(tool_group_id)
            .next()
            .map(|rep| rep.segmentation_id.clone());
        match next {
            Some(id) => {
                self.active.insert(tool_group_id.to_string(), id);
            }
            None => {
                self.active.remove(tool_group_id);
            }
        }
    }
}
