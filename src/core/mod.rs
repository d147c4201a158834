//! Core-Domänentypen: Viewport-Referenzen, Eingaben, Kamera, VOI, Volumes, Events.

pub mod camera;
pub mod events;
pub mod input;
pub mod segmentation;
pub mod viewport_ref;
pub mod voi;
pub mod volume;

pub use camera::{Camera, CameraDelta, Orientation};
pub use events::{EventKind, ViewportEvent, ViewportEventDetail};
pub use input::{
    Binding, BindingMatch, InputButton, InputEvent, InputEventKind, ModifierKey, ModifierKeys,
};
pub use segmentation::SegmentationRepresentationType;
pub use viewport_ref::ViewportRef;
pub use voi::VoiRange;
pub use volume::{DerivedVolumeSpec, Volume, VolumeSpec};
