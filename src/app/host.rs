//! Schnittstelle zum Host-Dokument und eine In-Memory-Implementierung.
//!
//! Der Host besitzt die Content-Bereiche (Position, Größe, Blasen-Attribut)
//! und meldet Änderungen an beobachteten Bereichen. Der Editor liest und
//! schreibt ausschließlich über [`SurfaceHost`].

use crate::codec::{encode_bubble_spec, BUBBLE_ATTRIBUTE};
use crate::core::bubble_spec::{default_bubble_spec, BubbleSpec};
use crate::core::geometry::Rect;
pub use crate::core::ContentId;
use anyhow::{Context, Result};
use glam::Vec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Ob ein Schreibvorgang die Beobachter des Hosts auslöst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notify {
    /// Änderung wird an Beobachter gemeldet
    Observers,
    /// Programmatische Änderung (z.B. während eines Drags), kein Rückkanal
    Silent,
}

/// Vom Host gemeldete Änderung eines beobachteten Content-Bereichs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentChange {
    /// Blasen-Attribut wurde geändert
    Attribute(ContentId),
    /// Position oder Größe hat sich geändert
    Resized(ContentId),
}

/// Fähigkeiten, die der Editor vom Host-Dokument benötigt.
pub trait SurfaceHost {
    /// Größe der gemeinsamen Oberfläche.
    fn surface_size(&self) -> Vec2;
    /// Content-Bereiche mit Blasen-Attribut in Dokument-Reihenfolge.
    fn bubble_contents(&self) -> Vec<ContentId>;
    /// Gehört der Content-Bereich zu dieser Oberfläche?
    fn contains(&self, content: ContentId) -> bool;
    /// Aktuelle Box relativ zur Oberfläche; `None` für unbekannte Bereiche.
    fn content_box(&self, content: ContentId) -> Option<Rect>;
    fn read_bubble_attribute(&self, content: ContentId) -> Option<String>;
    /// Schreibt (oder entfernt mit `None`) das Blasen-Attribut.
    fn write_bubble_attribute(&mut self, content: ContentId, value: Option<String>, notify: Notify);
    fn observe(&mut self, content: ContentId);
    fn unobserve(&mut self, content: ContentId);
    /// Entnimmt alle seit dem letzten Aufruf gemeldeten Änderungen.
    fn take_changes(&mut self) -> Vec<ContentChange>;
}

// ── In-Memory-Host ──────────────────────────────────────────────────

/// Content-IDs sind prozessweit eindeutig, auch über mehrere Oberflächen.
static NEXT_CONTENT_ID: AtomicU64 = AtomicU64::new(1);

/// Ein Content-Bereich der In-Memory-Oberfläche.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRegion {
    pub content_box: Rect,
    pub bubble: Option<String>,
}

/// Einfache Oberfläche für Tests, CLI und Hosts ohne eigenes Dokumentmodell.
#[derive(Debug, Clone)]
pub struct InMemorySurface {
    size: Vec2,
    regions: IndexMap<ContentId, ContentRegion>,
    observed: HashSet<ContentId>,
    changes: Vec<ContentChange>,
    write_counts: HashMap<ContentId, usize>,
}

impl InMemorySurface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            regions: IndexMap::new(),
            observed: HashSet::new(),
            changes: Vec::new(),
            write_counts: HashMap::new(),
        }
    }

    /// Fügt einen Content-Bereich hinzu (mit rohem Attribut-Wert oder ohne).
    pub fn add_region(&mut self, content_box: Rect, bubble: Option<String>) -> ContentId {
        let id = ContentId::new(NEXT_CONTENT_ID.fetch_add(1, Ordering::Relaxed));
        self.regions.insert(
            id,
            ContentRegion {
                content_box,
                bubble,
            },
        );
        id
    }

    /// Fügt einen Content-Bereich mit kodierter Spec hinzu.
    pub fn add_bubble(&mut self, content_box: Rect, spec: &BubbleSpec) -> Result<ContentId> {
        let value = encode_bubble_spec(spec).context("Spec für neuen Bereich")?;
        Ok(self.add_region(content_box, Some(value)))
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Ändert die Box eines Bereichs (wie ein Layout-Wechsel im Host).
    pub fn set_content_box(&mut self, content: ContentId, content_box: Rect) {
        let Some(region) = self.regions.get_mut(&content) else {
            log::warn!("{} existiert nicht", content);
            return;
        };
        region.content_box = content_box;
        if self.observed.contains(&content) {
            self.changes.push(ContentChange::Resized(content));
        }
    }

    pub fn region(&self, content: ContentId) -> Option<&ContentRegion> {
        self.regions.get(&content)
    }

    /// Alle Bereiche in Dokument-Reihenfolge.
    pub fn regions(&self) -> impl Iterator<Item = (ContentId, &ContentRegion)> {
        self.regions.iter().map(|(id, region)| (*id, region))
    }

    pub fn is_observed(&self, content: ContentId) -> bool {
        self.observed.contains(&content)
    }

    /// Anzahl der Schreibvorgänge auf das Blasen-Attribut.
    pub fn write_count(&self, content: ContentId) -> usize {
        self.write_counts.get(&content).copied().unwrap_or(0)
    }

    /// Baut eine Oberfläche aus einer Dokument-Beschreibung.
    pub fn from_document(document: &SurfaceDocument) -> Result<Self> {
        let size = Vec2::new(document.width, document.height);
        let mut surface = Self::new(size);
        for (index, region) in document.regions.iter().enumerate() {
            let content_box = Rect::new(region.x, region.y, region.width, region.height);
            let bubble = match (&region.bubble, &region.style) {
                (Some(raw), _) => Some(raw.clone()),
                (None, Some(style)) => {
                    let spec = default_bubble_spec(style, content_box, size);
                    Some(
                        encode_bubble_spec(&spec)
                            .with_context(|| format!("Bereich {} ({})", index, style))?,
                    )
                }
                (None, None) => None,
            };
            surface.add_region(content_box, bubble);
        }
        Ok(surface)
    }
}

impl SurfaceHost for InMemorySurface {
    fn surface_size(&self) -> Vec2 {
        self.size
    }

    fn bubble_contents(&self) -> Vec<ContentId> {
        self.regions
            .iter()
            .filter(|(_, region)| region.bubble.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    fn contains(&self, content: ContentId) -> bool {
        self.regions.contains_key(&content)
    }

    fn content_box(&self, content: ContentId) -> Option<Rect> {
        self.regions.get(&content).map(|r| r.content_box)
    }

    fn read_bubble_attribute(&self, content: ContentId) -> Option<String> {
        self.regions.get(&content)?.bubble.clone()
    }

    fn write_bubble_attribute(&mut self, content: ContentId, value: Option<String>, notify: Notify) {
        let Some(region) = self.regions.get_mut(&content) else {
            log::warn!("{} an unbekanntem Bereich {} ignoriert", BUBBLE_ATTRIBUTE, content);
            return;
        };
        region.bubble = value;
        *self.write_counts.entry(content).or_default() += 1;
        if notify == Notify::Observers && self.observed.contains(&content) {
            self.changes.push(ContentChange::Attribute(content));
        }
    }

    fn observe(&mut self, content: ContentId) {
        self.observed.insert(content);
    }

    fn unobserve(&mut self, content: ContentId) {
        self.observed.remove(&content);
    }

    fn take_changes(&mut self) -> Vec<ContentChange> {
        std::mem::take(&mut self.changes)
    }
}

// ── Dokument-Beschreibung (JSON) ────────────────────────────────────

/// Serialisierbare Beschreibung einer Oberfläche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDocument {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub regions: Vec<RegionDocument>,
}

/// Ein Content-Bereich der Dokument-Beschreibung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDocument {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Roher Attribut-Wert (Backtick-kodiertes JSON)
    #[serde(default)]
    pub bubble: Option<String>,
    /// Stil für eine Standard-Spec, falls `bubble` fehlt
    #[serde(default)]
    pub style: Option<String>,
}
