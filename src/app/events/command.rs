use crate::app::host::ContentId;
use crate::app::registry::SurfaceId;
use glam::Vec2;
use std::time::Instant;

/// Commands sind mutierende Schritte, die zentral ausgeführt werden.
#[derive(Debug, Clone)]
pub enum EditorCommand {
    /// Drag-Ziel (Handle oder Blase) ermitteln und sperren
    BeginPointer { surface: SurfaceId, pos: Vec2 },
    /// Gesperrtes Handle ziehen
    DragPointer { surface: SurfaceId, pos: Vec2 },
    /// Drag beenden
    EndPointer { surface: SurfaceId },
    /// Klick-Aktion eines getroffenen Schwanzes auslösen
    RunTailClick { surface: SurfaceId, pos: Vec2 },
    /// Blase unter dem Punkt aktivieren (keine Blase → Auswahl aufheben)
    ActivateBubbleAt { surface: SurfaceId, pos: Vec2 },
    /// Blase eines Content-Bereichs aktivieren
    ActivateContent { content: Option<ContentId> },
    /// Container neu aufbauen
    UpdateSurface { surface: SurfaceId },
    /// Kind an Familie anhängen
    InitializeChild { child: ContentId, parent: ContentId },
    /// Gemeldete Host-Änderungen verarbeiten
    ProcessContentChanges { surface: SurfaceId },
    /// Ausstehende Platzierungen erneut versuchen
    RetryLayout { now: Instant },
}
