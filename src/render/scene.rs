//! Retained Szene: geordnete Ebenen mit Formen, Trefferprüfung und Z-Reihenfolge.
//!
//! Ebenen werden von unten nach oben gezeichnet, innerhalb einer Ebene in
//! Einfügereihenfolge. Formen werden nie verändert, sondern ersetzt
//! ([`Scene::replace`]). Die neue Form erhält eine neue ID an derselben
//! Z-Position.

use crate::core::geometry::{ClosedPath, Rect};
use glam::Vec2;

/// ID einer Ebene (stabil bis zum nächsten [`Scene::truncate_to_base`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

/// ID einer Form (nie wiederverwendet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

/// Geometrie einer Form.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    /// Achsenparallele Ellipse
    Ellipse { center: Vec2, radii: Vec2 },
    /// Kreis (Handles)
    Circle { center: Vec2, radius: f32 },
    /// Geschlossener Pfad aus Linien und Bögen
    Path(ClosedPath),
}

/// Eine zeichenbare Form.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub geometry: ShapeGeometry,
    /// Linienfarbe (RGBA), `None` = keine Linie
    pub stroke: Option<[f32; 4]>,
    pub stroke_width: f32,
    /// Füllfarbe (RGBA), `None` = keine Füllung
    pub fill: Option<[f32; 4]>,
    pub visible: bool,
}

impl Shape {
    /// Form nur mit Linie.
    pub fn stroked(geometry: ShapeGeometry, color: [f32; 4], width: f32) -> Self {
        Self {
            geometry,
            stroke: Some(color),
            stroke_width: width,
            fill: None,
            visible: true,
        }
    }

    /// Form nur mit Füllung.
    pub fn filled(geometry: ShapeGeometry, color: [f32; 4]) -> Self {
        Self {
            geometry,
            stroke: None,
            stroke_width: 0.0,
            fill: Some(color),
            visible: true,
        }
    }

    /// Punkt liegt in der Fläche der Form (Bögen werden mit `arc_steps` angenähert).
    pub fn contains(&self, p: Vec2, arc_steps: usize) -> bool {
        match &self.geometry {
            ShapeGeometry::Ellipse { center, radii } => {
                if radii.x <= 0.0 || radii.y <= 0.0 {
                    return false;
                }
                ((p - *center) / *radii).length_squared() <= 1.0
            }
            ShapeGeometry::Circle { center, radius } => p.distance(*center) <= *radius,
            ShapeGeometry::Path(path) => path.contains(p, arc_steps),
        }
    }

    /// Umschließendes Rechteck.
    pub fn bounds(&self, arc_steps: usize) -> Rect {
        match &self.geometry {
            ShapeGeometry::Ellipse { center, radii } => {
                Rect::from_min_max(*center - *radii, *center + *radii)
            }
            ShapeGeometry::Circle { center, radius } => {
                Rect::from_min_max(*center - Vec2::splat(*radius), *center + Vec2::splat(*radius))
            }
            ShapeGeometry::Path(path) => path.bounds(arc_steps),
        }
    }
}

/// Eine Ebene der Szene.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    shapes: Vec<(ShapeId, Shape)>,
}

impl Layer {
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Formen von unten nach oben.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes.iter().map(|(id, shape)| (*id, shape))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Szene einer Oberfläche. Die unterste Ebene (Basis) existiert immer.
#[derive(Debug, Clone)]
pub struct Scene {
    layers: Vec<Layer>,
    next_layer_id: u32,
    next_shape_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Erstellt eine Szene mit leerer Basis-Ebene.
    pub fn new() -> Self {
        Self {
            layers: vec![Layer {
                id: LayerId(0),
                shapes: Vec::new(),
            }],
            next_layer_id: 1,
            next_shape_id: 1,
        }
    }

    pub fn base_layer(&self) -> LayerId {
        self.layers[0].id
    }

    /// Entfernt alle Ebenen außer der Basis und leert diese.
    pub fn truncate_to_base(&mut self) {
        self.layers.truncate(1);
        self.layers[0].shapes.clear();
    }

    /// Legt eine neue Ebene oberhalb aller bestehenden an.
    pub fn add_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        self.layers.push(Layer {
            id,
            shapes: Vec::new(),
        });
        id
    }

    /// Ebenen von unten nach oben.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Index der Ebene in der Zeichenreihenfolge.
    pub fn layer_index(&self, layer: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == layer)
    }

    fn next_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_shape_id);
        self.next_shape_id += 1;
        id
    }

    /// Position einer Form: (Ebenen-Index, Index innerhalb der Ebene).
    pub fn position_of(&self, shape: ShapeId) -> Option<(usize, usize)> {
        self.layers.iter().enumerate().find_map(|(li, layer)| {
            layer
                .shapes
                .iter()
                .position(|(id, _)| *id == shape)
                .map(|si| (li, si))
        })
    }

    /// Fügt eine Form oben auf der Ebene ein. Unbekannte Ebene → Basis.
    pub fn push(&mut self, layer: LayerId, shape: Shape) -> ShapeId {
        let id = self.next_id();
        let target = match self.layer_index(layer) {
            Some(index) => index,
            None => {
                log::warn!("Ebene {:?} existiert nicht, verwende Basis-Ebene", layer);
                0
            }
        };
        self.layers[target].shapes.push((id, shape));
        id
    }

    /// Fügt eine Form direkt unterhalb von `reference` ein (gleiche Ebene).
    pub fn insert_below(&mut self, reference: ShapeId, shape: Shape) -> Option<ShapeId> {
        let (li, si) = self.position_of(reference)?;
        let id = self.next_id();
        self.layers[li].shapes.insert(si, (id, shape));
        Some(id)
    }

    /// Ersetzt eine Form an derselben Z-Position durch eine neue.
    ///
    /// Existiert `old` nicht mehr, wird die Form oben auf `fallback` abgelegt.
    pub fn replace(&mut self, old: ShapeId, shape: Shape, fallback: LayerId) -> ShapeId {
        match self.position_of(old) {
            Some((li, si)) => {
                let id = self.next_id();
                self.layers[li].shapes[si] = (id, shape);
                id
            }
            None => self.push(fallback, shape),
        }
    }

    pub fn remove(&mut self, shape: ShapeId) -> bool {
        match self.position_of(shape) {
            Some((li, si)) => {
                self.layers[li].shapes.remove(si);
                true
            }
            None => false,
        }
    }

    pub fn shape(&self, shape: ShapeId) -> Option<&Shape> {
        let (li, si) = self.position_of(shape)?;
        Some(&self.layers[li].shapes[si].1)
    }

    pub fn set_visible(&mut self, shape: ShapeId, visible: bool) {
        if let Some((li, si)) = self.position_of(shape) {
            self.layers[li].shapes[si].1.visible = visible;
        }
    }

    /// Prüft, ob eine sichtbare Form `p` enthält.
    pub fn shape_contains(&self, shape: ShapeId, p: Vec2, arc_steps: usize) -> bool {
        self.shape(shape)
            .is_some_and(|s| s.visible && s.contains(p, arc_steps))
    }

    /// Oberste sichtbare Form unter `p`.
    pub fn hit_test(&self, p: Vec2, arc_steps: usize) -> Option<ShapeId> {
        self.layers.iter().rev().find_map(|layer| {
            layer
                .shapes
                .iter()
                .rev()
                .find(|(_, shape)| shape.visible && shape.contains(p, arc_steps))
                .map(|(id, _)| *id)
        })
    }

    /// Anzahl aller Formen über alle Ebenen.
    pub fn shape_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }
}
