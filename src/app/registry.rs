//! Registry aller Oberflächen im Bearbeitungsmodus.
//!
//! Die Registry gehört dem Host. Sie besitzt je Oberfläche einen
//! [`Container`], die aktive Blase und den Listener für deren Wechsel.

use super::container::{Container, PointerTarget, TailRef};
use super::host::{ContentId, SurfaceHost};
use crate::core::outline::OutlineLibrary;
use crate::shared::EditorOptions;
use anyhow::{bail, Context, Result};
use glam::Vec2;
use indexmap::IndexMap;
use std::fmt;
use std::time::Instant;

/// Kennung einer Oberfläche, vom Host vergeben.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Ergebnis von [`EditorRegistry::stop_editing`].
pub struct StoppedSurface<H> {
    /// Host mit den zuletzt gespeicherten Specs
    pub host: H,
    /// Exportiertes SVG, nur wenn die Oberfläche Blasen hatte
    pub svg: Option<String>,
}

type ActiveListener = Box<dyn FnMut(Option<ContentId>)>;

/// Alle Container im Bearbeitungsmodus plus aktive Blase.
pub struct EditorRegistry<H: SurfaceHost> {
    containers: IndexMap<SurfaceId, Container<H>>,
    options: EditorOptions,
    templates: OutlineLibrary,
    active: Option<(SurfaceId, ContentId)>,
    listener: Option<ActiveListener>,
}

impl<H: SurfaceHost> EditorRegistry<H> {
    /// Erstellt eine leere Registry mit den eingebauten Umriss-Vorlagen.
    pub fn new(options: EditorOptions) -> Result<Self> {
        let templates = OutlineLibrary::builtin().context("Eingebaute Umriss-Vorlagen")?;
        Ok(Self::with_templates(options, templates))
    }

    pub fn with_templates(options: EditorOptions, templates: OutlineLibrary) -> Self {
        Self {
            containers: IndexMap::new(),
            options,
            templates,
            active: None,
            listener: None,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    // ── Lebenszyklus ────────────────────────────────────────────────

    /// Versetzt eine Oberfläche in den Bearbeitungsmodus.
    pub fn start_editing(&mut self, surface: SurfaceId, host: H) -> Result<()> {
        if self.containers.contains_key(&surface) {
            bail!("{} wird bereits bearbeitet", surface);
        }
        let container = Container::new(host, self.options.clone(), self.templates.clone());
        log::info!(
            "Bearbeitung von {} gestartet ({} Blasen)",
            surface,
            container.bubbles().len()
        );
        self.containers.insert(surface, container);
        Ok(())
    }

    /// Beendet die Bearbeitung: Beobachter werden gelöst, Handles entfernt
    /// und die Szene als SVG exportiert.
    pub fn stop_editing(&mut self, surface: SurfaceId) -> Option<StoppedSurface<H>> {
        let Some(mut container) = self.containers.shift_remove(&surface) else {
            log::error!("NotActiveContainer: {} wird nicht bearbeitet", surface);
            return None;
        };
        container.stop_monitoring();
        if self.active.is_some_and(|(s, _)| s == surface) {
            self.set_active(None);
        }
        let svg = container.export_svg();
        log::info!(
            "Bearbeitung von {} beendet ({})",
            surface,
            if svg.is_some() { "SVG exportiert" } else { "ohne Blasen" }
        );
        Some(StoppedSurface {
            host: container.into_host(),
            svg,
        })
    }

    /// Beendet die Bearbeitung aller Oberflächen, in Start-Reihenfolge.
    pub fn stop_editing_all(&mut self) -> Vec<(SurfaceId, StoppedSurface<H>)> {
        let surfaces: Vec<SurfaceId> = self.containers.keys().copied().collect();
        surfaces
            .into_iter()
            .filter_map(|surface| self.stop_editing(surface).map(|stopped| (surface, stopped)))
            .collect()
    }

    pub fn is_editing(&self, surface: SurfaceId) -> bool {
        self.containers.contains_key(&surface)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.containers.keys().copied()
    }

    /// Baut den Container einer Oberfläche neu auf.
    pub fn update(&mut self, surface: SurfaceId) {
        let Some(container) = self.containers.get_mut(&surface) else {
            log::error!("NotActiveContainer: update für {} ignoriert", surface);
            return;
        };
        container.update();
        self.drop_stale_active();
    }

    // ── Abfragen ────────────────────────────────────────────────────

    pub fn container(&self, surface: SurfaceId) -> Option<&Container<H>> {
        self.containers.get(&surface)
    }

    pub fn container_mut(&mut self, surface: SurfaceId) -> Option<&mut Container<H>> {
        self.containers.get_mut(&surface)
    }

    /// Oberfläche, deren Host den Content-Bereich enthält.
    pub fn find_surface_of(&self, content: ContentId) -> Option<SurfaceId> {
        self.containers
            .iter()
            .find(|(_, c)| c.host().contains(content))
            .map(|(surface, _)| *surface)
    }

    /// Höchstes Level auf der Oberfläche des Content-Bereichs (0 ohne Bearbeitung).
    pub fn max_level(&self, content: ContentId) -> i32 {
        self.find_surface_of(content)
            .and_then(|surface| self.containers.get(&surface))
            .map_or(0, Container::max_level)
    }

    pub fn something_hit(&self, surface: SurfaceId, p: Vec2) -> bool {
        match self.containers.get(&surface) {
            Some(container) => container.something_hit(p),
            None => {
                log::error!("NotActiveContainer: Trefferprüfung auf {}", surface);
                false
            }
        }
    }

    pub fn bubble_hit_by_point(&self, surface: SurfaceId, p: Vec2) -> Option<ContentId> {
        self.containers.get(&surface)?.bubble_hit_by_point(p)
    }

    // ── Aktive Blase ────────────────────────────────────────────────

    pub fn active_content(&self) -> Option<ContentId> {
        self.active.map(|(_, content)| content)
    }

    /// Registriert den Listener für Wechsel der aktiven Blase (ersetzt den alten).
    pub fn set_active_bubble_listener(&mut self, listener: impl FnMut(Option<ContentId>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Aktiviert die Blase eines Content-Bereichs (oder keine).
    ///
    /// Unveränderte Auswahl ist ein No-Op. Sonst werden alle Handles
    /// ausgeblendet, die der neuen Blase gezeigt und der Listener informiert.
    pub fn activate_content(&mut self, content: Option<ContentId>) {
        let target = content.and_then(|content| {
            let surface = self.find_surface_of(content)?;
            self.containers
                .get(&surface)?
                .bubble(content)
                .map(|_| (surface, content))
        });
        if content.is_some() && target.is_none() {
            log::warn!("{:?} ist keine Blase einer bearbeiteten Oberfläche", content);
        }
        if target == self.active {
            return;
        }
        self.set_active(target);
    }

    /// Aktiviert die Blase unter `p` auf einer Oberfläche.
    pub fn activate_bubble_at(&mut self, surface: SurfaceId, p: Vec2) {
        let hit = self.bubble_hit_by_point(surface, p);
        self.activate_content(hit);
    }

    fn set_active(&mut self, target: Option<(SurfaceId, ContentId)>) {
        for container in self.containers.values_mut() {
            container.hide_handles();
        }
        if let Some((surface, content)) = target {
            if let Some(container) = self.containers.get_mut(&surface) {
                container.show_handles(content);
            }
        }
        self.active = target;
        log::debug!("Aktive Blase: {:?}", self.active_content());
        if let Some(listener) = self.listener.as_mut() {
            listener(target.map(|(_, content)| content));
        }
    }

    /// Verwirft die aktive Blase, wenn sie nach einem Neuaufbau fehlt.
    fn drop_stale_active(&mut self) {
        let stale = self.active.is_some_and(|(surface, content)| {
            self.containers
                .get(&surface)
                .and_then(|c| c.bubble(content))
                .is_none()
        });
        if stale {
            self.set_active(None);
        }
    }

    // ── Familien ────────────────────────────────────────────────────

    /// Legt `child` als neues Familienmitglied nach `parent` an.
    pub fn initialize_child(&mut self, child: ContentId, parent: ContentId) -> bool {
        let Some(surface) = self.find_surface_of(parent) else {
            log::error!("NotActiveContainer: {} liegt auf keiner bearbeiteten Oberfläche", parent);
            return false;
        };
        if self.find_surface_of(child) != Some(surface) {
            log::error!("{} und {} liegen nicht auf derselben Oberfläche", child, parent);
            return false;
        }
        let Some(container) = self.containers.get_mut(&surface) else {
            return false;
        };
        let created = container.initialize_child(child, parent);
        if created {
            self.drop_stale_active();
        }
        created
    }

    // ── Pointer & Klicks ────────────────────────────────────────────

    pub fn pointer_down(&mut self, surface: SurfaceId, p: Vec2) -> PointerTarget {
        match self.containers.get_mut(&surface) {
            Some(container) => container.pointer_down(p),
            None => {
                log::error!("NotActiveContainer: Pointer auf {}", surface);
                PointerTarget::Nothing
            }
        }
    }

    pub fn pointer_drag(&mut self, surface: SurfaceId, p: Vec2) -> bool {
        self.containers
            .get_mut(&surface)
            .is_some_and(|c| c.pointer_drag(p))
    }

    pub fn pointer_up(&mut self, surface: SurfaceId) {
        if let Some(container) = self.containers.get_mut(&surface) {
            container.pointer_up();
        }
    }

    pub fn click(&mut self, surface: SurfaceId, p: Vec2) -> bool {
        self.containers
            .get_mut(&surface)
            .is_some_and(|c| c.click(p))
    }

    /// Registriert eine Klick-Aktion für einen Schwanz.
    pub fn on_tail_click(&mut self, tail: TailRef, action: impl FnMut() + 'static) {
        let Some(surface) = self.find_surface_of(tail.content) else {
            log::error!("NotActiveContainer: Klick-Aktion für {} ignoriert", tail.content);
            return;
        };
        if let Some(container) = self.containers.get_mut(&surface) {
            container.on_tail_click(tail, action);
        }
    }

    // ── Host-Änderungen & Layout ────────────────────────────────────

    /// Verarbeitet die gemeldeten Änderungen einer Oberfläche.
    pub fn content_changed(&mut self, surface: SurfaceId) -> bool {
        let Some(container) = self.containers.get_mut(&surface) else {
            log::error!("NotActiveContainer: Änderungen an {} ignoriert", surface);
            return false;
        };
        let rebuilt = container.process_changes();
        if rebuilt {
            self.drop_stale_active();
        }
        rebuilt
    }

    /// Layout-Wiederholung für alle Oberflächen.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut placed = false;
        for container in self.containers.values_mut() {
            placed |= container.tick(now);
        }
        placed
    }
}
