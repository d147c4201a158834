//! Viewport-Koordination Library.
//! ToolGroups, Synchronizer und Segmentierungs-Dispatch für Multi-Viewport-Bildbetrachter.

pub mod app;
pub mod core;
pub mod error;
pub mod render;
pub mod shared;

pub use app::{
    ActivationOptions, CoordinationContext, CoordinationController, SynchronizerKind, ToolGroup,
    ToolGroupManager, ToolMode, ToolOptions, TurnReport,
};
pub use core::{
    Binding, Camera, InputButton, InputEvent, ModifierKey, ModifierKeys, Orientation, ViewportRef,
    VoiRange,
};
pub use error::{CoordinationError, ErrorCategory, Result};
pub use render::{
    HeadlessRenderingEngine, HeadlessViewport, MemoryVolumeStore, RenderingEngine, Viewport,
    ViewportInput, ViewportRegistry, VolumeStore,
};
pub use shared::{CoordinationOptions, SyncChaining};
