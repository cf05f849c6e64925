//! Container einer Oberfläche: Blasen, Ebenen je Level, Handles und Drag-Routing.
//!
//! Ein Container existiert, solange seine Oberfläche bearbeitet wird. Die
//! Blasen-Liste und die Ebenen-Zuordnung werden nur in [`Container::update`]
//! verändert und dort jedes Mal vollständig neu aufgebaut.

use super::host::{ContentChange, ContentId, Notify, SurfaceHost};
use crate::codec;
use crate::core::bubble::Bubble;
use crate::core::family;
use crate::core::outline::OutlineLibrary;
use crate::core::tail::{Tail, TailHandle, TailKind, TailLayers, TailPaint};
use crate::render::scene::{LayerId, Scene};
use crate::render::svg_export;
use crate::shared::EditorOptions;
use glam::Vec2;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Referenz auf einen Schwanz: Blase + Index in ihrer Schwanz-Liste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TailRef {
    pub content: ContentId,
    pub index: usize,
}

/// Ziel eines Pointer-Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Handle eines Schwanzes der aktiven Blase
    Handle(TailRef, TailHandle),
    /// Blase (Umriss oder Schwanz)
    Bubble(ContentId),
    Nothing,
}

/// Gesperrtes Drag-Ziel bis zum Pointer-Up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragTarget {
    Handle(TailRef),
    Bubble(ContentId),
}

type ClickAction = Box<dyn FnMut()>;

/// Alle Blasen einer Oberfläche samt Szene.
pub struct Container<H: SurfaceHost> {
    host: H,
    options: EditorOptions,
    templates: OutlineLibrary,
    scene: Scene,
    bubbles: Vec<Bubble>,
    /// Level → (untere Ebene, obere Ebene)
    level_layers: BTreeMap<i32, (LayerId, LayerId)>,
    handle_layer: Option<LayerId>,
    /// Blasen, deren Content-Bereich noch keine Größe hat
    pending_layout: Vec<ContentId>,
    last_layout_attempt: Option<Instant>,
    drag: Option<DragTarget>,
    /// Blase, deren Handles gerade angezeigt werden
    handles_for: Option<ContentId>,
    tail_click_actions: HashMap<TailRef, ClickAction>,
}

impl<H: SurfaceHost> Container<H> {
    /// Erstellt einen Container und baut ihn sofort auf.
    pub fn new(host: H, options: EditorOptions, templates: OutlineLibrary) -> Self {
        let mut container = Self {
            host,
            options,
            templates,
            scene: Scene::new(),
            bubbles: Vec::new(),
            level_layers: BTreeMap::new(),
            handle_layer: None,
            pending_layout: Vec::new(),
            last_layout_attempt: None,
            drag: None,
            handles_for: None,
            tail_click_actions: HashMap::new(),
        };
        container.update();
        container
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direkter Zugriff auf den Host; Änderungen werden erst mit
    /// [`Container::process_changes`] oder [`Container::update`] wirksam.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn bubble(&self, content: ContentId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.content() == content)
    }

    fn index_of(&self, content: ContentId) -> Option<usize> {
        self.bubbles.iter().position(|b| b.content() == content)
    }

    /// Ebenen-Paare je Level, aufsteigend.
    pub fn level_layers(&self) -> impl Iterator<Item = (i32, (LayerId, LayerId))> + '_ {
        self.level_layers.iter().map(|(level, layers)| (*level, *layers))
    }

    pub fn handle_layer(&self) -> Option<LayerId> {
        self.handle_layer
    }

    pub fn pending_layout(&self) -> &[ContentId] {
        &self.pending_layout
    }

    pub fn handles_shown_for(&self) -> Option<ContentId> {
        self.handles_for
    }

    fn arc_steps(&self) -> usize {
        self.options.arc_flatten_steps
    }

    // ── Aufbau ──────────────────────────────────────────────────────

    /// Baut Blasen, Ebenen und Formen vollständig neu auf.
    ///
    /// Blasen mit ungültiger Spec werden übersprungen. Pro Level entsteht ein
    /// Ebenen-Paar (aufsteigend), darüber eine gemeinsame Handle-Ebene.
    pub fn update(&mut self) {
        self.stop_monitoring();
        // ältere Meldungen sind durch den Neuaufbau überholt
        self.host.take_changes();
        if let Some(DragTarget::Handle(tail)) = self.drag.take() {
            log::debug!("Drag an {} durch Neuaufbau beendet", tail.content);
        }
        self.scene.truncate_to_base();
        self.level_layers.clear();
        self.pending_layout.clear();
        self.last_layout_attempt = None;
        // Klick-Aktionen gehören zu den alten Schwänzen
        self.tail_click_actions.clear();
        let handles_for = self.handles_for.take();

        let mut bubbles = Vec::new();
        for content in self.host.bubble_contents() {
            match codec::read_bubble_spec(&self.host, content) {
                Ok(spec) => bubbles.push(Bubble::new(
                    content,
                    spec,
                    self.options.default_fill_color,
                )),
                Err(e) => log::error!("Keine Blase für {}: {}", content, e),
            }
        }

        let mut levels: Vec<i32> = bubbles.iter().map(Bubble::level).collect();
        levels.sort_unstable();
        levels.dedup();
        for level in levels {
            let lower = self.scene.add_layer();
            let upper = self.scene.add_layer();
            self.level_layers.insert(level, (lower, upper));
        }
        let handle_layer = self.scene.add_layer();
        self.handle_layer = Some(handle_layer);

        for bubble in &mut bubbles {
            if let Some(&(lower, upper)) = self.level_layers.get(&bubble.level()) {
                bubble.set_layers(TailLayers {
                    lower,
                    upper,
                    handles: handle_layer,
                });
            }
        }
        self.bubbles = bubbles;
        self.layout_bubbles();

        for bubble in &self.bubbles {
            self.host.observe(bubble.content());
        }
        if let Some(content) = handles_for.filter(|c| self.index_of(*c).is_some()) {
            self.show_handles(content);
        }

        log::debug!(
            "Container aufgebaut: {} Blasen, {} Level, {} ausstehend",
            self.bubbles.len(),
            self.level_layers.len(),
            self.pending_layout.len()
        );
    }

    /// Platziert alle noch nicht platzierten Blasen und baut die Schwänze auf.
    fn layout_bubbles(&mut self) -> bool {
        let paint = self.options.tail_paint();
        let Self {
            host,
            templates,
            scene,
            bubbles,
            pending_layout,
            ..
        } = self;

        let mut placed_any = false;
        for bubble in bubbles.iter_mut().filter(|b| !b.is_placed()) {
            let content_box = host.content_box(bubble.content()).unwrap_or_default();
            if bubble.place(content_box, templates, scene, &paint) {
                pending_layout.retain(|c| *c != bubble.content());
                placed_any = true;
            } else if !pending_layout.contains(&bubble.content()) {
                pending_layout.push(bubble.content());
            }
        }

        if placed_any {
            self.build_tails();
            self.refresh_visibility();
        }
        placed_any
    }

    /// Baut die Schwänze aller platzierten Blasen neu auf.
    fn build_tails(&mut self) {
        let joiner_tips = self.parent_start_points();
        let paint = self.options.tail_paint();
        self.tail_click_actions.clear();
        let Self {
            scene,
            bubbles,
            handles_for,
            ..
        } = self;
        for (bubble, joiner_tip) in bubbles.iter_mut().zip(joiner_tips) {
            if bubble.is_placed() {
                bubble.build_tails(scene, &paint, joiner_tip);
                if *handles_for == Some(bubble.content()) {
                    bubble.show_handles(scene, &paint);
                }
            }
        }
    }

    /// Startpunkt des platzierten Familien-Elternteils je Blase.
    fn parent_start_points(&self) -> Vec<Option<Vec2>> {
        self.bubbles
            .iter()
            .map(|bubble| {
                family::find_parent(&self.bubbles, bubble)
                    .filter(|parent| parent.is_placed())
                    .map(Bubble::calculate_tail_start_point)
            })
            .collect()
    }

    /// Blendet Schwänze aus, deren Blase ihren Familien-Elternteil überlappt.
    fn refresh_visibility(&mut self) {
        let overlapping: Vec<bool> = self
            .bubbles
            .iter()
            .map(|bubble| {
                family::find_parent(&self.bubbles, bubble)
                    .is_some_and(|parent| bubble.is_overlapping(parent))
            })
            .collect();
        for (bubble, overlapping) in self.bubbles.iter_mut().zip(overlapping) {
            bubble.set_tail_visibility(!overlapping, &mut self.scene);
        }
    }

    /// Erneuter Platzierungsversuch für Blasen ohne Layout, höchstens einmal
    /// pro konfiguriertem Intervall. Gibt `true` zurück, wenn eine Blase
    /// platziert wurde.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.pending_layout.is_empty() {
            return false;
        }
        if let Some(last) = self.last_layout_attempt {
            if now.saturating_duration_since(last) < self.options.layout_retry_interval() {
                return false;
            }
        }
        self.last_layout_attempt = Some(now);
        self.layout_bubbles()
    }

    // ── Abfragen ────────────────────────────────────────────────────

    /// Höchstes Level aller Blasen, 0 ohne Blasen.
    pub fn max_level(&self) -> i32 {
        self.bubbles.iter().map(Bubble::level).max().unwrap_or(0)
    }

    /// Blase unter `p`; höhere Level zuerst, bei Gleichstand Dokument-Reihenfolge.
    pub fn bubble_hit_by_point(&self, p: Vec2) -> Option<ContentId> {
        let mut by_level: Vec<&Bubble> = self.bubbles.iter().collect();
        by_level.sort_by_key(|b| std::cmp::Reverse(b.level()));
        by_level
            .into_iter()
            .find(|b| b.is_hit_by_point(&self.scene, p, self.arc_steps()))
            .map(Bubble::content)
    }

    /// Irgendeine sichtbare Form (Umriss, Schwanz, Handle) liegt unter `p`.
    pub fn something_hit(&self, p: Vec2) -> bool {
        self.scene.hit_test(p, self.arc_steps()).is_some()
    }

    /// `p` liegt nicht im Inneren einer anderen Blase.
    pub fn ok_to_move_to(&self, content: ContentId, p: Vec2) -> bool {
        !self
            .bubbles
            .iter()
            .any(|b| b.content() != content && b.interior_contains(p))
    }

    pub fn find_parent_of(&self, content: ContentId) -> Option<ContentId> {
        let bubble = self.bubble(content)?;
        family::find_parent(&self.bubbles, bubble).map(Bubble::content)
    }

    pub fn find_child_of(&self, content: ContentId) -> Option<ContentId> {
        let bubble = self.bubble(content)?;
        family::find_child(&self.bubbles, bubble).map(Bubble::content)
    }

    pub fn find_ancestors_of(&self, content: ContentId) -> Vec<ContentId> {
        self.bubble(content)
            .map(|b| family::find_ancestors(&self.bubbles, b))
            .unwrap_or_default()
            .into_iter()
            .map(Bubble::content)
            .collect()
    }

    pub fn find_relatives_of(&self, content: ContentId) -> Vec<ContentId> {
        self.bubble(content)
            .map(|b| family::find_relatives(&self.bubbles, b))
            .unwrap_or_default()
            .into_iter()
            .map(Bubble::content)
            .collect()
    }

    // ── Familien ────────────────────────────────────────────────────

    /// Hängt `child` als neues letztes Mitglied an die Familie von `parent`.
    ///
    /// Hat `parent` noch keine Reihenfolge, bekommt es 1. Die bisherige Spec
    /// des Kindes wird verworfen. Danach wird der Container neu aufgebaut.
    pub fn initialize_child(&mut self, child: ContentId, parent: ContentId) -> bool {
        let Some(parent_index) = self.index_of(parent) else {
            log::error!("{} ist keine aktive Blase, Kind wird nicht angelegt", parent);
            return false;
        };
        if child == parent {
            log::warn!("{} kann nicht sein eigenes Kind werden", child);
            return false;
        }
        let Some(child_box) = self.host.content_box(child) else {
            log::error!("{} gehört nicht zu dieser Oberfläche", child);
            return false;
        };

        if !self.bubbles[parent_index].spec().is_family_member() {
            self.bubbles[parent_index].set_order(1);
            self.persist(parent_index, Notify::Observers);
        }

        let level = self.bubbles[parent_index].level();
        let Some(last) = family::last_in_family(&self.bubbles, level) else {
            return false;
        };
        let last_order = last.spec().order_value();
        let tip = last.calculate_tail_start_point();
        let root = child_box.center();

        let spec = family::child_spec(self.bubbles[parent_index].spec(), last_order, root, tip);
        log::info!(
            "{} wird Kind in Familie von {} (Reihenfolge {})",
            child,
            parent,
            spec.order_value()
        );
        if let Err(e) = codec::write_bubble_spec(&mut self.host, child, &spec, Notify::Observers) {
            log::error!("Spec für {} nicht geschrieben: {}", child, e);
            return false;
        }
        self.update();
        true
    }

    // ── Schwänze ────────────────────────────────────────────────────

    fn paint_for(&self, index: usize) -> TailPaint {
        self.bubbles[index].tail_paint(&self.options.tail_paint())
    }

    /// Verschiebt die Wurzel eines Schwanzes; speichert ohne Beobachter.
    pub fn adjust_root(&mut self, tail: TailRef, root: Vec2) -> bool {
        self.adjust_tail(tail, |t, scene, paint| t.adjust_root(root, scene, paint))
    }

    /// Verschiebt die Spitze eines Schwanzes; speichert ohne Beobachter.
    pub fn adjust_tip(&mut self, tail: TailRef, tip: Vec2) -> bool {
        self.adjust_tail(tail, |t, scene, paint| t.adjust_tip(tip, scene, paint))
    }

    fn adjust_tail(
        &mut self,
        tail: TailRef,
        adjust: impl FnOnce(&mut Tail, &mut Scene, &TailPaint) -> bool,
    ) -> bool {
        let Some(index) = self.index_of(tail.content) else {
            return false;
        };
        let paint = self.paint_for(index);
        let Some(target) = self.bubbles[index].tails_mut().get_mut(tail.index) else {
            log::warn!("{} hat keinen Schwanz {}", tail.content, tail.index);
            return false;
        };
        if !adjust(target, &mut self.scene, &paint) {
            return false;
        }
        self.persist(index, Notify::Silent);
        true
    }

    /// Schreibt die Spec einer Blase an ihren Content-Bereich.
    fn persist(&mut self, index: usize, notify: Notify) {
        let bubble = &mut self.bubbles[index];
        bubble.sync_spec();
        let result = codec::write_bubble_spec(&mut self.host, bubble.content(), bubble.spec(), notify);
        if let Err(e) = result {
            log::error!("Spec für {} nicht gespeichert: {}", bubble.content(), e);
        }
    }

    /// Registriert eine Aktion für Klicks auf einen Schwanz.
    ///
    /// Die Aktion gilt bis zum nächsten Neuaufbau der Schwänze.
    pub fn on_tail_click(&mut self, tail: TailRef, action: impl FnMut() + 'static) {
        self.tail_click_actions.insert(tail, Box::new(action));
    }

    // ── Handles ─────────────────────────────────────────────────────

    /// Zeigt die Handles einer Blase (und blendet alle anderen aus).
    pub fn show_handles(&mut self, content: ContentId) {
        self.hide_handles();
        let Some(index) = self.index_of(content) else {
            return;
        };
        let paint = self.options.tail_paint();
        self.bubbles[index].show_handles(&mut self.scene, &paint);
        self.handles_for = Some(content);
        self.refresh_visibility();
    }

    pub fn hide_handles(&mut self) {
        for bubble in &mut self.bubbles {
            bubble.hide_handles(&mut self.scene);
        }
        self.handles_for = None;
    }

    // ── Pointer ─────────────────────────────────────────────────────

    /// Pointer gedrückt: Handles haben Vorrang vor Blasen. Das Ziel bleibt
    /// bis zum Pointer-Up gesperrt.
    pub fn pointer_down(&mut self, p: Vec2) -> PointerTarget {
        self.end_drag();
        let steps = self.arc_steps();
        if let Some(index) = self.handles_for.and_then(|c| self.index_of(c)) {
            let bubble = &mut self.bubbles[index];
            let content = bubble.content();
            for (tail_index, tail) in bubble.tails_mut().iter_mut().enumerate() {
                if let Some(handle) = tail.handle_at(&self.scene, p, steps) {
                    tail.begin_drag(handle);
                    let tail_ref = TailRef {
                        content,
                        index: tail_index,
                    };
                    self.drag = Some(DragTarget::Handle(tail_ref));
                    log::debug!("Drag {:?} an {} beginnt", handle, content);
                    return PointerTarget::Handle(tail_ref, handle);
                }
            }
        }
        match self.bubble_hit_by_point(p) {
            Some(content) => {
                self.drag = Some(DragTarget::Bubble(content));
                PointerTarget::Bubble(content)
            }
            None => PointerTarget::Nothing,
        }
    }

    /// Pointer bewegt: zieht das gesperrte Handle. Positionen im Inneren
    /// anderer Blasen werden verworfen.
    pub fn pointer_drag(&mut self, p: Vec2) -> bool {
        let Some(DragTarget::Handle(tail)) = self.drag else {
            return false;
        };
        if !self.ok_to_move_to(tail.content, p) {
            log::debug!("Position {:?} liegt in einer anderen Blase, verworfen", p);
            return false;
        }
        let Some(index) = self.index_of(tail.content) else {
            return false;
        };
        let paint = self.paint_for(index);
        let moved = self.bubbles[index]
            .tails_mut()
            .get_mut(tail.index)
            .is_some_and(|t| t.drag_to(p, &mut self.scene, &paint));
        if moved {
            self.persist(index, Notify::Silent);
        }
        moved
    }

    /// Pointer losgelassen: zurück in den Ruhezustand.
    pub fn pointer_up(&mut self) {
        self.end_drag();
    }

    fn end_drag(&mut self) {
        if let Some(DragTarget::Handle(tail)) = self.drag.take() {
            if let Some(index) = self.index_of(tail.content) {
                if let Some(t) = self.bubbles[index].tails_mut().get_mut(tail.index) {
                    t.end_drag();
                }
            }
        }
    }

    /// Klick: löst die Aktion des obersten getroffenen Schwanzes aus.
    pub fn click(&mut self, p: Vec2) -> bool {
        let steps = self.arc_steps();
        let mut by_level: Vec<&Bubble> = self.bubbles.iter().collect();
        by_level.sort_by_key(|b| std::cmp::Reverse(b.level()));
        let hit = by_level.into_iter().find_map(|bubble| {
            bubble
                .tails()
                .iter()
                .position(|t| t.is_hit(&self.scene, p, steps))
                .map(|index| TailRef {
                    content: bubble.content(),
                    index,
                })
        });
        match hit.and_then(|tail| self.tail_click_actions.get_mut(&tail)) {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    // ── Host-Änderungen ─────────────────────────────────────────────

    /// Verarbeitet gemeldete Änderungen. Geänderte Attribute führen zu einem
    /// Neuaufbau, Größenänderungen verschieben Umriss und Schwanz-Wurzeln.
    pub fn process_changes(&mut self) -> bool {
        let changes = self.host.take_changes();
        let mut rebuild = false;
        let mut resized = false;
        for change in changes {
            match change {
                ContentChange::Attribute(content) => {
                    let current = codec::read_bubble_spec(&self.host, content);
                    let unchanged = match (current, self.bubble(content)) {
                        (Ok(spec), Some(bubble)) => &spec == bubble.spec(),
                        _ => false,
                    };
                    rebuild |= !unchanged;
                }
                ContentChange::Resized(content) => {
                    resized |= self.adjust_bubble_size(content);
                }
            }
        }
        if rebuild {
            self.update();
        } else if resized {
            self.refresh_joiners();
            self.refresh_visibility();
        }
        rebuild
    }

    fn adjust_bubble_size(&mut self, content: ContentId) -> bool {
        let index = self.index_of(content);
        let (Some(index), Some(content_box)) = (index, self.host.content_box(content)) else {
            return false;
        };
        if !self.bubbles[index].is_placed() {
            return self.layout_bubbles();
        }
        let paint = self.options.tail_paint();
        let Self {
            templates,
            scene,
            bubbles,
            ..
        } = self;
        if bubbles[index].adjust_size(content_box, templates, scene, &paint) {
            self.persist(index, Notify::Silent);
        }
        true
    }

    /// Richtet Verbindungsschwänze auf den aktuellen Startpunkt ihres Elternteils aus.
    fn refresh_joiners(&mut self) {
        let joiner_tips = self.parent_start_points();
        for (index, tip) in joiner_tips.into_iter().enumerate() {
            let Some(tip) = tip else {
                continue;
            };
            let content = self.bubbles[index].content();
            let joiners: Vec<usize> = self.bubbles[index]
                .tails()
                .iter()
                .enumerate()
                .filter(|(_, t)| t.kind() == TailKind::Joiner)
                .map(|(i, _)| i)
                .collect();
            for tail_index in joiners {
                self.adjust_tip(
                    TailRef {
                        content,
                        index: tail_index,
                    },
                    tip,
                );
            }
        }
    }

    // ── Ende ────────────────────────────────────────────────────────

    /// Beendet die Beobachtung aller Content-Bereiche.
    pub fn stop_monitoring(&mut self) {
        for bubble in &self.bubbles {
            self.host.unobserve(bubble.content());
        }
    }

    /// Entfernt die Handles und exportiert die Szene als SVG (nur mit Blasen).
    pub fn export_svg(&mut self) -> Option<String> {
        if self.bubbles.is_empty() {
            return None;
        }
        self.hide_handles();
        Some(svg_export::export_svg(&self.scene, self.host.surface_size()))
    }
}
