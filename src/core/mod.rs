//! Core-Domäne: Geometrie, Blasen-Specs, Umriss-Vorlagen, Schwänze, Blasen, Familien.

pub mod bubble;
pub mod bubble_spec;
pub mod family;
/// Reine Geometrie-Funktionen
///
/// - `default_midpoint` / `default_tip`: Standard-Platzierung neuer Schwänze
/// - `tail_outline`: Umriss eines Schwanzes aus zwei Kreisbögen
/// - `Rect`, `ClosedPath`: Rechtecke und geschlossene Pfade mit Trefferprüfung
pub mod geometry;
pub mod outline;
pub mod tail;

pub use bubble::{Bubble, ContentId};
pub use bubble_spec::{default_bubble_spec, BubbleSpec, TailSpec};
pub use family::{find_ancestors, find_child, find_parent, find_relatives};
pub use geometry::{default_midpoint, default_tip, tail_outline, Rect, TailOutline};
pub use outline::{OutlineGeometry, OutlineLibrary, OutlineTemplate};
pub use tail::{DragState, Tail, TailHandle, TailKind, TailLayers, TailPaint};
