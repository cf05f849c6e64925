//! Comic-Blasen-Editor Library.
//!
//! Sprech- und Schreiblasen mit gebogenen Schwänzen um Content-Bereiche
//! einer Oberfläche: Geometrie, Familien (verbundene Blasen), Ebenen je
//! Level, Drag-Handles und SVG-Export. Der Host liefert die Content-Bereiche
//! über [`SurfaceHost`].

pub mod app;
pub mod codec;
pub mod core;
pub mod render;
pub mod shared;

pub use app::{
    Container, ContentId, EditorCommand, EditorController, EditorIntent, EditorRegistry,
    InMemorySurface, Notify, PointerTarget, SurfaceDocument, SurfaceHost, SurfaceId, TailRef,
};
pub use codec::{decode_bubble_spec, encode_bubble_spec, CodecError};
pub use core::{Bubble, BubbleSpec, Rect, TailSpec};
pub use render::Scene;
pub use shared::EditorOptions;
