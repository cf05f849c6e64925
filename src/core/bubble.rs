//! Blase zur Laufzeit: Content-Referenz, Spec, Umriss und Schwänze.

use super::bubble_spec::BubbleSpec;
use super::geometry::{default_midpoint, Rect};
use super::outline::{OutlineGeometry, OutlineLibrary};
use super::tail::{Tail, TailLayers, TailPaint};
use crate::render::scene::{Scene, Shape, ShapeGeometry, ShapeId};
use glam::Vec2;
use std::fmt;

/// Undurchsichtige Referenz auf einen Content-Bereich des Hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(u64);

impl ContentId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content#{}", self.0)
    }
}

/// Eine Blase innerhalb eines Containers.
#[derive(Debug, Clone)]
pub struct Bubble {
    content: ContentId,
    spec: BubbleSpec,
    tails: Vec<Tail>,
    fill_color: [f32; 4],
    layers: Option<TailLayers>,
    content_box: Rect,
    outline: Option<OutlineGeometry>,
    outline_stroke: Option<ShapeId>,
    outline_fill: Option<ShapeId>,
    placed: bool,
}

impl Bubble {
    /// Erstellt eine noch nicht platzierte Blase.
    ///
    /// Die Füllfarbe ist die erste gültige Hintergrundfarbe der Spec, sonst `default_fill`.
    pub fn new(content: ContentId, spec: BubbleSpec, default_fill: [f32; 4]) -> Self {
        let fill_color = spec.background_color().unwrap_or(default_fill);
        Self {
            content,
            spec,
            tails: Vec::new(),
            fill_color,
            layers: None,
            content_box: Rect::default(),
            outline: None,
            outline_stroke: None,
            outline_fill: None,
            placed: false,
        }
    }

    pub fn content(&self) -> ContentId {
        self.content
    }

    pub fn spec(&self) -> &BubbleSpec {
        &self.spec
    }

    pub fn level(&self) -> i32 {
        self.spec.level
    }

    pub fn tails(&self) -> &[Tail] {
        &self.tails
    }

    pub fn tails_mut(&mut self) -> &mut [Tail] {
        &mut self.tails
    }

    pub fn fill_color(&self) -> [f32; 4] {
        self.fill_color
    }

    pub fn layers(&self) -> Option<TailLayers> {
        self.layers
    }

    pub fn set_layers(&mut self, layers: TailLayers) {
        self.layers = Some(layers);
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    pub fn content_box(&self) -> Rect {
        self.content_box
    }

    pub fn outline(&self) -> Option<&OutlineGeometry> {
        self.outline.as_ref()
    }

    /// Ersetzt die Spec (Formen bleiben bis zum nächsten Aufbau bestehen).
    pub fn set_spec(&mut self, spec: BubbleSpec) {
        self.spec = spec;
    }

    /// Setzt die Familien-Position (0 = keine).
    pub fn set_order(&mut self, order: u32) {
        self.spec = self.spec.clone().with_order(order);
    }

    /// Darstellungsparameter der Schwänze mit der Füllfarbe dieser Blase.
    pub fn tail_paint(&self, base: &TailPaint) -> TailPaint {
        TailPaint {
            fill_color: self.fill_color,
            ..*base
        }
    }

    /// Startpunkt der Schwänze: Mitte der Content-Box.
    pub fn calculate_tail_start_point(&self) -> Vec2 {
        self.content_box.center()
    }

    /// Platziert den Umriss um die Content-Box.
    ///
    /// Gibt `false` zurück, solange die Box noch keine Größe hat; die Blase
    /// bleibt dann unplatziert und muss später erneut versucht werden.
    pub fn place(
        &mut self,
        content_box: Rect,
        templates: &OutlineLibrary,
        scene: &mut Scene,
        paint: &TailPaint,
    ) -> bool {
        if !content_box.has_layout() {
            log::debug!("{}: Content-Box {:?} noch ohne Layout", self.content, content_box);
            return false;
        }
        self.content_box = content_box;
        self.outline = templates
            .for_style(&self.spec.style)
            .map(|template| template.place(content_box));
        self.make_outline_shapes(scene, paint);
        self.placed = true;
        true
    }

    fn make_outline_shapes(&mut self, scene: &mut Scene, paint: &TailPaint) {
        let Some(layers) = self.layers else {
            log::warn!("{}: keine Ebenen zugewiesen, Umriss wird nicht gezeichnet", self.content);
            return;
        };
        let geometry = self.outline.as_ref().map(outline_shape_geometry);
        match geometry {
            Some(geometry) => {
                let stroke =
                    Shape::stroked(geometry.clone(), paint.stroke_color, paint.stroke_width);
                let fill = Shape::filled(geometry, self.fill_color);
                self.outline_stroke = Some(match self.outline_stroke {
                    Some(old) => scene.replace(old, stroke, layers.lower),
                    None => scene.push(layers.lower, stroke),
                });
                self.outline_fill = Some(match self.outline_fill {
                    Some(old) => scene.replace(old, fill, layers.upper),
                    None => scene.push(layers.upper, fill),
                });
            }
            None => {
                for shape in [self.outline_stroke.take(), self.outline_fill.take()]
                    .into_iter()
                    .flatten()
                {
                    scene.remove(shape);
                }
            }
        }
    }

    /// Baut alle Schwänze aus der Spec neu auf.
    ///
    /// `joiner_tip` ist der Startpunkt des Familien-Elternteils; Verbindungs-
    /// schwänze werden darauf ausgerichtet.
    pub fn build_tails(&mut self, scene: &mut Scene, paint: &TailPaint, joiner_tip: Option<Vec2>) {
        for tail in &mut self.tails {
            tail.remove(scene);
        }
        self.tails.clear();
        let Some(layers) = self.layers else {
            return;
        };

        let root = self.calculate_tail_start_point();
        let paint = self.tail_paint(paint);
        for spec in &self.spec.tails {
            let mut spec = *spec;
            if let (true, Some(tip)) = (spec.joiner, joiner_tip) {
                spec.set_tip(tip);
                spec.set_midpoint(default_midpoint(root, tip));
            }
            let mut tail = Tail::new(root, &spec, Some(self.content), layers);
            tail.make_shapes(scene, &paint, self.outline_stroke);
            self.tails.push(tail);
        }
        self.sync_spec();
    }

    /// Übernimmt die aktuellen Schwanz-Positionen in die Spec.
    pub fn sync_spec(&mut self) {
        if self.tails.is_empty() {
            return;
        }
        self.spec.tails = self.tails.iter().map(Tail::to_spec).collect();
    }

    /// Passt Umriss und Schwanz-Wurzeln an eine neue Content-Box an.
    ///
    /// Gibt `true` zurück, wenn sich eine Wurzel tatsächlich bewegt hat.
    pub fn adjust_size(
        &mut self,
        content_box: Rect,
        templates: &OutlineLibrary,
        scene: &mut Scene,
        paint: &TailPaint,
    ) -> bool {
        if self.placed && content_box == self.content_box {
            return false;
        }
        if !self.place(content_box, templates, scene, paint) {
            return false;
        }
        let root = self.calculate_tail_start_point();
        let paint = self.tail_paint(paint);
        let mut moved = false;
        for tail in &mut self.tails {
            moved |= tail.adjust_root(root, scene, &paint);
        }
        if moved {
            self.sync_spec();
        }
        moved
    }

    /// Umschließendes Rechteck des gezeichneten Umrisses (ohne Umriss: Content-Box).
    pub fn extent(&self) -> Rect {
        match &self.outline {
            Some(outline) => outline.bounds(),
            None => self.content_box,
        }
    }

    /// Die gezeichneten Umrisse beider Blasen überlappen sich.
    pub fn is_overlapping(&self, other: &Bubble) -> bool {
        self.placed && other.placed && self.extent().intersects(&other.extent())
    }

    /// Punkt liegt im Inneren der Blase (Umriss, ohne Umriss die Content-Box).
    pub fn interior_contains(&self, p: Vec2) -> bool {
        if !self.placed {
            return false;
        }
        match &self.outline {
            Some(outline) => outline.contains(p),
            None => self.content_box.contains(p),
        }
    }

    /// Blase oder einer ihrer sichtbaren Schwänze liegt unter `p`.
    pub fn is_hit_by_point(&self, scene: &Scene, p: Vec2, arc_steps: usize) -> bool {
        self.interior_contains(p) || self.tails.iter().any(|t| t.is_hit(scene, p, arc_steps))
    }

    pub fn owns_shape(&self, shape: ShapeId) -> bool {
        self.outline_stroke == Some(shape)
            || self.outline_fill == Some(shape)
            || self.tails.iter().any(|t| t.owns_shape(shape))
    }

    pub fn show_handles(&mut self, scene: &mut Scene, paint: &TailPaint) {
        let paint = self.tail_paint(paint);
        for tail in &mut self.tails {
            tail.show_handles(scene, &paint);
        }
    }

    pub fn hide_handles(&mut self, scene: &mut Scene) {
        for tail in &mut self.tails {
            tail.hide_handles(scene);
        }
    }

    /// Blendet alle Schwänze (samt Handles) ein oder aus.
    pub fn set_tail_visibility(&mut self, visible: bool, scene: &mut Scene) {
        for tail in &mut self.tails {
            tail.set_visibility(visible, scene);
        }
    }

    /// Entfernt alle Formen der Blase aus der Szene.
    pub fn remove_shapes(&mut self, scene: &mut Scene) {
        for tail in &mut self.tails {
            tail.remove(scene);
        }
        self.tails.clear();
        for shape in [self.outline_stroke.take(), self.outline_fill.take()]
            .into_iter()
            .flatten()
        {
            scene.remove(shape);
        }
        self.placed = false;
    }
}

fn outline_shape_geometry(outline: &OutlineGeometry) -> ShapeGeometry {
    match outline {
        OutlineGeometry::Ellipse { center, radii } => ShapeGeometry::Ellipse {
            center: *center,
            radii: *radii,
        },
        OutlineGeometry::Polygon(_) => match outline.to_path() {
            Some(path) => ShapeGeometry::Path(path),
            None => ShapeGeometry::Ellipse {
                center: Vec2::ZERO,
                radii: Vec2::ZERO,
            },
        },
    }
}
