//! Application-Layer: Kontext, Controller, ToolGroups, Synchronizer und Segmentierung.

pub mod context;
pub mod controller;
pub mod input_bus;
pub mod reference_lines;
pub mod segmentation;
pub mod synchronizers;
pub mod tool_groups;
pub mod tools;
pub mod turn_log;

pub use context::CoordinationContext;
pub use controller::CoordinationController;
pub use input_bus::{InputEventBus, InputSubscription};
pub use reference_lines::{ReferenceLine, ReferenceLineTable};
pub use segmentation::{
    LabelmapUpdate, RepresentationInput, SegmentationInput, SegmentationRecord,
    SegmentationRepresentation, SegmentationState,
};
pub use synchronizers::{Synchronizer, SynchronizerKind, SynchronizerManager};
pub use tool_groups::{
    ActivationOptions, Resolution, ToolConfig, ToolGroup, ToolGroupManager, ToolMode, ToolOptions,
};
pub use tools::{Annotation, Tool, ToolAction, ToolRegistry};
pub use turn_log::{TurnLog, TurnReport, TurnTrigger};
