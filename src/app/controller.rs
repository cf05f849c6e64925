//! Editor-Controller für zentrale Event-Verarbeitung.

use super::host::SurfaceHost;
use super::registry::EditorRegistry;
use super::{EditorCommand, EditorIntent};

/// Orchestriert Host-Events auf die Registry.
#[derive(Debug, Default)]
pub struct EditorController;

impl EditorController {
    /// Erstellt einen neuen Controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    pub fn handle_intent<H: SurfaceHost>(
        &mut self,
        registry: &mut EditorRegistry<H>,
        intent: EditorIntent,
    ) -> anyhow::Result<()> {
        let commands = super::intent_mapping::map_intent_to_commands(registry, intent);
        for command in commands {
            self.handle_command(registry, command)?;
        }

        Ok(())
    }

    /// Führt mutierende Commands auf der Registry aus.
    pub fn handle_command<H: SurfaceHost>(
        &mut self,
        registry: &mut EditorRegistry<H>,
        command: EditorCommand,
    ) -> anyhow::Result<()> {
        log::trace!("Command: {:?}", command);

        match command {
            // === Pointer ===
            EditorCommand::BeginPointer { surface, pos } => {
                let target = registry.pointer_down(surface, pos);
                log::debug!("Pointer-Down auf {} bei {:?}: {:?}", surface, pos, target);
            }
            EditorCommand::DragPointer { surface, pos } => {
                registry.pointer_drag(surface, pos);
            }
            EditorCommand::EndPointer { surface } => registry.pointer_up(surface),
            EditorCommand::RunTailClick { surface, pos } => {
                registry.click(surface, pos);
            }

            // === Auswahl ===
            EditorCommand::ActivateBubbleAt { surface, pos } => {
                registry.activate_bubble_at(surface, pos)
            }
            EditorCommand::ActivateContent { content } => registry.activate_content(content),

            // === Container ===
            EditorCommand::UpdateSurface { surface } => registry.update(surface),
            EditorCommand::InitializeChild { child, parent } => {
                anyhow::ensure!(
                    registry.initialize_child(child, parent),
                    "{} konnte nicht an die Familie von {} angehängt werden",
                    child,
                    parent
                );
            }
            EditorCommand::ProcessContentChanges { surface } => {
                registry.content_changed(surface);
            }
            EditorCommand::RetryLayout { now } => {
                registry.tick(now);
            }
        }

        Ok(())
    }
}
