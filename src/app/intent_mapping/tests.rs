use crate::app::host::InMemorySurface;
use crate::app::registry::{EditorRegistry, SurfaceId};
use crate::app::{EditorCommand, EditorIntent};
use crate::core::{BubbleSpec, Rect};
use crate::shared::EditorOptions;
use glam::Vec2;

use super::map_intent_to_commands;

fn registry_with_bubble() -> EditorRegistry<InMemorySurface> {
    let mut surface = InMemorySurface::new(Vec2::new(400.0, 300.0));
    surface
        .add_bubble(
            Rect::new(100.0, 100.0, 60.0, 40.0),
            &BubbleSpec::new("speech", 1, vec![]),
        )
        .expect("Spec kodierbar");
    let mut registry = EditorRegistry::new(EditorOptions::default()).expect("Vorlagen");
    registry
        .start_editing(SurfaceId(1), surface)
        .expect("Bearbeitung startet");
    registry
}

#[test]
fn test_child_initialization_maps_to_initialize_then_activate() {
    let registry = registry_with_bubble();
    let child = crate::core::ContentId::new(900);
    let parent = crate::core::ContentId::new(901);

    let commands = map_intent_to_commands(
        &registry,
        EditorIntent::ChildInitializationRequested { child, parent },
    );

    assert_eq!(commands.len(), 2);
    assert!(matches!(commands[0], EditorCommand::InitializeChild { .. }));
    assert!(matches!(
        commands[1],
        EditorCommand::ActivateContent { content: Some(c) } if c == child
    ));
}

#[test]
fn test_click_on_bubble_also_activates() {
    let registry = registry_with_bubble();

    let commands = map_intent_to_commands(
        &registry,
        EditorIntent::Clicked {
            surface: SurfaceId(1),
            pos: Vec2::new(130.0, 120.0),
        },
    );

    assert_eq!(commands.len(), 2);
    assert!(matches!(commands[0], EditorCommand::RunTailClick { .. }));
    assert!(matches!(commands[1], EditorCommand::ActivateBubbleAt { .. }));
}

#[test]
fn test_click_on_empty_surface_clears_selection() {
    let registry = registry_with_bubble();

    let commands = map_intent_to_commands(
        &registry,
        EditorIntent::Clicked {
            surface: SurfaceId(1),
            pos: Vec2::new(390.0, 290.0),
        },
    );

    assert!(matches!(
        commands.last(),
        Some(EditorCommand::ActivateBubbleAt { .. })
    ));
}

#[test]
fn test_layout_tick_maps_to_retry() {
    let registry = registry_with_bubble();
    let now = std::time::Instant::now();

    let commands = map_intent_to_commands(&registry, EditorIntent::LayoutTick { now });

    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], EditorCommand::RetryLayout { now: n } if n == now));
}
