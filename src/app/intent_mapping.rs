//! Mapping von Host-Intents auf mutierende Editor-Commands.

use super::host::SurfaceHost;
use super::registry::EditorRegistry;
use super::{EditorCommand, EditorIntent};

/// Übersetzt einen `EditorIntent` in eine Sequenz ausführbarer `EditorCommand`s.
pub fn map_intent_to_commands<H: SurfaceHost>(
    registry: &EditorRegistry<H>,
    intent: EditorIntent,
) -> Vec<EditorCommand> {
    match intent {
        EditorIntent::PointerPressed { surface, pos } => {
            vec![EditorCommand::BeginPointer { surface, pos }]
        }
        EditorIntent::PointerDragged { surface, pos } => {
            vec![EditorCommand::DragPointer { surface, pos }]
        }
        EditorIntent::PointerReleased { surface } => vec![EditorCommand::EndPointer { surface }],
        EditorIntent::Clicked { surface, pos } => {
            // Klick auf ein Handle (außerhalb jeder Blase) lässt die Auswahl stehen
            let on_bubble = registry.bubble_hit_by_point(surface, pos).is_some();
            if !on_bubble && registry.something_hit(surface, pos) {
                vec![EditorCommand::RunTailClick { surface, pos }]
            } else {
                vec![
                    EditorCommand::RunTailClick { surface, pos },
                    EditorCommand::ActivateBubbleAt { surface, pos },
                ]
            }
        }
        EditorIntent::ContentActivated { content } => {
            vec![EditorCommand::ActivateContent { content }]
        }
        EditorIntent::SurfaceUpdateRequested { surface } => {
            vec![EditorCommand::UpdateSurface { surface }]
        }
        EditorIntent::ChildInitializationRequested { child, parent } => {
            vec![
                EditorCommand::InitializeChild { child, parent },
                EditorCommand::ActivateContent {
                    content: Some(child),
                },
            ]
        }
        EditorIntent::ContentChanged { surface } => {
            vec![EditorCommand::ProcessContentChanges { surface }]
        }
        EditorIntent::LayoutTick { now } => vec![EditorCommand::RetryLayout { now }],
    }
}

#[cfg(test)]
mod tests;
