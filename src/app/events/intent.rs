use crate::app::host::ContentId;
use crate::app::registry::SurfaceId;
use glam::Vec2;
use std::time::Instant;

/// Editor-Intents.
/// Intents sind Eingaben des Hosts ohne direkte Mutationslogik.
#[derive(Debug, Clone)]
pub enum EditorIntent {
    /// Pointer gedrückt (Oberflächen-Koordinaten)
    PointerPressed { surface: SurfaceId, pos: Vec2 },
    /// Pointer bei gedrückter Taste bewegt
    PointerDragged { surface: SurfaceId, pos: Vec2 },
    /// Pointer losgelassen
    PointerReleased { surface: SurfaceId },
    /// Klick ohne Drag
    Clicked { surface: SurfaceId, pos: Vec2 },
    /// Host wählt einen Content-Bereich aus (oder keinen)
    ContentActivated { content: Option<ContentId> },
    /// Oberfläche neu aufbauen (z.B. nach Einfügen eines Bereichs)
    SurfaceUpdateRequested { surface: SurfaceId },
    /// `child` soll als neues Familienmitglied nach `parent` angelegt werden
    ChildInitializationRequested { child: ContentId, parent: ContentId },
    /// Host hat Änderungen an beobachteten Bereichen gemeldet
    ContentChanged { surface: SurfaceId },
    /// Periodischer Takt für ausstehende Platzierungen
    LayoutTick { now: Instant },
}
