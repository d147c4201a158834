//! Darstellungsarten von Segmentierungen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wie eine Segmentierung in einer ToolGroup dargestellt wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentationRepresentationType {
    /// Voxel-Labelmap über dem Basis-Volume
    #[serde(rename = "LABELMAP")]
    Labelmap,
}

impl fmt::Display for SegmentationRepresentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentationRepresentationType::Labelmap => write!(f, "LABELMAP"),
        }
    }
}
