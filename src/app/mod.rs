//! Application-Layer: Host-Schnittstelle, Container, Registry, Controller und Events.

/// Container einer Oberfläche
///
/// Blasen, Ebenen je Level, Handles, Drag-Routing und Layout-Wiederholung.
pub mod container;
pub mod controller;
pub mod events;
pub mod host;
mod intent_mapping;
pub mod registry;

pub use container::{Container, PointerTarget, TailRef};
pub use controller::EditorController;
pub use events::{EditorCommand, EditorIntent};
pub use host::{
    ContentChange, ContentId, InMemorySurface, Notify, RegionDocument, SurfaceDocument,
    SurfaceHost,
};
pub use registry::{EditorRegistry, StoppedSurface, SurfaceId};
