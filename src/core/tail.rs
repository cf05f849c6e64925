//! Laufzeit-Zustand eines Schwanzes: Punkte, Formen, Handles, Drag-Zustand.

use super::bubble::ContentId;
use super::bubble_spec::TailSpec;
use super::geometry::{default_midpoint, tail_outline, MOVE_EPSILON};
use crate::render::scene::{LayerId, Scene, Shape, ShapeGeometry, ShapeId};
use glam::Vec2;

/// Alpha der hohlen Spitzen-Handles (fast transparent, aber noch trefferbar).
const HOLLOW_HANDLE_ALPHA: f32 = 0.01;
const HANDLE_STROKE_WIDTH: f32 = 1.0;

/// Variante eines Schwanzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailKind {
    /// Frei gebogener Schwanz mit Spitzen- und Kontrollpunkt-Handle
    Curved,
    /// Verbindung zu einem Familienmitglied, ohne Handles
    Joiner,
}

impl TailKind {
    pub fn for_spec(spec: &TailSpec) -> Self {
        if spec.joiner {
            TailKind::Joiner
        } else {
            TailKind::Curved
        }
    }

    /// Anpassung nach Verschiebung der Wurzel um `delta`.
    pub fn on_root_changed(self, points: &mut TailPoints, delta: Vec2) {
        match self {
            TailKind::Curved => points.mid += delta / 2.0,
            TailKind::Joiner => points.mid = default_midpoint(points.root, points.tip),
        }
    }

    /// Anpassung nach Verschiebung der Spitze um `delta`.
    pub fn on_tip_changed(self, points: &mut TailPoints, delta: Vec2) {
        match self {
            TailKind::Curved => points.mid += delta / 2.0,
            TailKind::Joiner => points.mid = default_midpoint(points.root, points.tip),
        }
    }

    pub fn has_handles(self) -> bool {
        self == TailKind::Curved
    }
}

/// Wurzel, Spitze und Kontrollpunkt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailPoints {
    pub root: Vec2,
    pub tip: Vec2,
    pub mid: Vec2,
}

/// Drag-Zustand eines Schwanzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingTip,
    DraggingMid,
}

/// Welches Handle getroffen wurde.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailHandle {
    Tip,
    Mid,
}

/// Ebenen, in die ein Schwanz zeichnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailLayers {
    /// Linie (unter den Blasen-Füllungen der Ebene)
    pub lower: LayerId,
    /// Füllung (verdeckt die Umriss-Linie am Ansatz)
    pub upper: LayerId,
    pub handles: LayerId,
}

/// Darstellungsparameter, vom Container aus den Optionen und der Blase gebildet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailPaint {
    pub base_width: f32,
    pub stroke_color: [f32; 4],
    pub stroke_width: f32,
    pub fill_color: [f32; 4],
    pub handle_color: [f32; 4],
    pub handle_radius: f32,
}

/// Ein Schwanz zur Laufzeit.
#[derive(Debug, Clone)]
pub struct Tail {
    kind: TailKind,
    points: TailPoints,
    /// Besitzende Blase (nicht-besitzende Rückreferenz)
    bubble: Option<ContentId>,
    layers: TailLayers,
    stroke: Option<ShapeId>,
    fill: Option<ShapeId>,
    tip_handle: Option<ShapeId>,
    mid_handle: Option<ShapeId>,
    visible: bool,
    drag: DragState,
}

impl Tail {
    /// Erstellt einen Schwanz aus seiner Spec; Formen entstehen erst mit [`Tail::make_shapes`].
    pub fn new(root: Vec2, spec: &TailSpec, bubble: Option<ContentId>, layers: TailLayers) -> Self {
        Self {
            kind: TailKind::for_spec(spec),
            points: TailPoints {
                root,
                tip: spec.tip(),
                mid: spec.midpoint(),
            },
            bubble,
            layers,
            stroke: None,
            fill: None,
            tip_handle: None,
            mid_handle: None,
            visible: true,
            drag: DragState::Idle,
        }
    }

    pub fn kind(&self) -> TailKind {
        self.kind
    }

    pub fn points(&self) -> TailPoints {
        self.points
    }

    pub fn bubble(&self) -> Option<ContentId> {
        self.bubble
    }

    pub fn layers(&self) -> TailLayers {
        self.layers
    }

    pub fn stroke_shape(&self) -> Option<ShapeId> {
        self.stroke
    }

    pub fn fill_shape(&self) -> Option<ShapeId> {
        self.fill
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn handles_shown(&self) -> bool {
        self.tip_handle.is_some() || self.mid_handle.is_some()
    }

    /// Aktueller Stand als Spec (Wurzel wird nie gespeichert).
    pub fn to_spec(&self) -> TailSpec {
        TailSpec::new(
            self.points.tip,
            self.points.mid,
            self.kind == TailKind::Joiner,
        )
    }

    /// Erzeugt Linie und Füllung neu.
    ///
    /// Bestehende Formen werden an derselben Z-Position ersetzt. Beim ersten
    /// Aufruf landet die Linie direkt unter `line_behind` (falls angegeben),
    /// sonst oben auf der unteren Ebene.
    pub fn make_shapes(&mut self, scene: &mut Scene, paint: &TailPaint, line_behind: Option<ShapeId>) {
        let outline = tail_outline(
            self.points.root,
            self.points.tip,
            self.points.mid,
            paint.base_width,
        );
        let geometry = ShapeGeometry::Path(outline.to_path());

        let mut stroke = Shape::stroked(geometry.clone(), paint.stroke_color, paint.stroke_width);
        stroke.visible = self.visible;
        let mut fill = Shape::filled(geometry, paint.fill_color);
        fill.visible = self.visible;

        self.stroke = Some(match self.stroke {
            Some(old) => scene.replace(old, stroke, self.layers.lower),
            None => match line_behind {
                Some(reference) => scene
                    .insert_below(reference, stroke.clone())
                    .unwrap_or_else(|| scene.push(self.layers.lower, stroke)),
                None => scene.push(self.layers.lower, stroke),
            },
        });
        self.fill = Some(match self.fill {
            Some(old) => scene.replace(old, fill, self.layers.upper),
            None => scene.push(self.layers.upper, fill),
        });

        if self.handles_shown() {
            self.place_handles(scene, paint);
        }
    }

    /// Verschiebt die Wurzel. Gibt `false` zurück (ohne jede Wirkung), wenn
    /// die Verschiebung kleiner als [`MOVE_EPSILON`] ist.
    pub fn adjust_root(&mut self, new_root: Vec2, scene: &mut Scene, paint: &TailPaint) -> bool {
        let delta = new_root - self.points.root;
        if delta.length() < MOVE_EPSILON {
            return false;
        }
        self.points.root = new_root;
        self.kind.on_root_changed(&mut self.points, delta);
        self.make_shapes(scene, paint, None);
        true
    }

    /// Verschiebt die Spitze; der Kontrollpunkt folgt je nach Variante.
    pub fn adjust_tip(&mut self, new_tip: Vec2, scene: &mut Scene, paint: &TailPaint) -> bool {
        let delta = new_tip - self.points.tip;
        if delta.length() < MOVE_EPSILON {
            return false;
        }
        self.points.tip = new_tip;
        self.kind.on_tip_changed(&mut self.points, delta);
        self.make_shapes(scene, paint, None);
        true
    }

    /// Verschiebt nur den Kontrollpunkt.
    pub fn adjust_mid(&mut self, new_mid: Vec2, scene: &mut Scene, paint: &TailPaint) -> bool {
        if new_mid.distance(self.points.mid) < MOVE_EPSILON {
            return false;
        }
        self.points.mid = new_mid;
        self.make_shapes(scene, paint, None);
        true
    }

    // ── Handles ─────────────────────────────────────────────────────

    /// Zeigt die Handles (nur gebogene Schwänze).
    pub fn show_handles(&mut self, scene: &mut Scene, paint: &TailPaint) {
        self.drag = DragState::Idle;
        if !self.kind.has_handles() {
            return;
        }
        self.place_handles(scene, paint);
    }

    pub fn hide_handles(&mut self, scene: &mut Scene) {
        for handle in [self.tip_handle.take(), self.mid_handle.take()]
            .into_iter()
            .flatten()
        {
            scene.remove(handle);
        }
        self.drag = DragState::Idle;
    }

    fn place_handles(&mut self, scene: &mut Scene, paint: &TailPaint) {
        let mut tip = handle_shape(self.points.tip, paint, false);
        tip.visible = self.visible;
        let mut mid = handle_shape(self.points.mid, paint, true);
        mid.visible = self.visible;

        // Kontrollpunkt-Handle liegt über dem Spitzen-Handle
        self.tip_handle = Some(match self.tip_handle {
            Some(old) => scene.replace(old, tip, self.layers.handles),
            None => scene.push(self.layers.handles, tip),
        });
        self.mid_handle = Some(match self.mid_handle {
            Some(old) => scene.replace(old, mid, self.layers.handles),
            None => scene.push(self.layers.handles, mid),
        });
    }

    /// Handle dieses Schwanzes unter `p` (oberstes zuerst).
    pub fn handle_at(&self, scene: &Scene, p: Vec2, arc_steps: usize) -> Option<TailHandle> {
        if self
            .mid_handle
            .is_some_and(|h| scene.shape_contains(h, p, arc_steps))
        {
            return Some(TailHandle::Mid);
        }
        if self
            .tip_handle
            .is_some_and(|h| scene.shape_contains(h, p, arc_steps))
        {
            return Some(TailHandle::Tip);
        }
        None
    }

    pub fn owns_shape(&self, shape: ShapeId) -> bool {
        [self.stroke, self.fill, self.tip_handle, self.mid_handle].contains(&Some(shape))
    }

    /// Fläche des Schwanzes enthält `p`.
    pub fn is_hit(&self, scene: &Scene, p: Vec2, arc_steps: usize) -> bool {
        self.fill
            .is_some_and(|f| scene.shape_contains(f, p, arc_steps))
    }

    // ── Drag ────────────────────────────────────────────────────────

    pub fn begin_drag(&mut self, handle: TailHandle) {
        self.drag = match handle {
            TailHandle::Tip => DragState::DraggingTip,
            TailHandle::Mid => DragState::DraggingMid,
        };
    }

    /// Zieht das aktive Handle nach `p`. `false`, wenn nicht gezogen wird
    /// oder sich nichts geändert hat.
    pub fn drag_to(&mut self, p: Vec2, scene: &mut Scene, paint: &TailPaint) -> bool {
        match self.drag {
            DragState::Idle => false,
            DragState::DraggingTip => self.adjust_tip(p, scene, paint),
            DragState::DraggingMid => self.adjust_mid(p, scene, paint),
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    // ── Sichtbarkeit ────────────────────────────────────────────────

    /// Blendet Schwanz und Handles ein oder aus.
    pub fn set_visibility(&mut self, visible: bool, scene: &mut Scene) {
        self.visible = visible;
        for shape in [self.stroke, self.fill, self.tip_handle, self.mid_handle]
            .into_iter()
            .flatten()
        {
            scene.set_visible(shape, visible);
        }
    }

    /// Entfernt alle Formen aus der Szene.
    pub fn remove(&mut self, scene: &mut Scene) {
        self.hide_handles(scene);
        for shape in [self.stroke.take(), self.fill.take()].into_iter().flatten() {
            scene.remove(shape);
        }
    }
}

fn handle_shape(center: Vec2, paint: &TailPaint, solid: bool) -> Shape {
    let mut fill = paint.handle_color;
    if !solid {
        fill[3] = HOLLOW_HANDLE_ALPHA;
    }
    Shape {
        geometry: ShapeGeometry::Circle {
            center,
            radius: paint.handle_radius,
        },
        stroke: Some(paint.handle_color),
        stroke_width: HANDLE_STROKE_WIDTH,
        fill: Some(fill),
        visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::TAIL_BASE_WIDTH;

    fn paint() -> TailPaint {
        TailPaint {
            base_width: TAIL_BASE_WIDTH,
            stroke_color: [0.0, 0.0, 0.0, 1.0],
            stroke_width: 1.0,
            fill_color: [1.0, 1.0, 1.0, 1.0],
            handle_color: [0.11, 0.58, 0.64, 1.0],
            handle_radius: 5.0,
        }
    }

    fn setup(joiner: bool) -> (Scene, Tail) {
        let mut scene = Scene::new();
        let layers = TailLayers {
            lower: scene.add_layer(),
            upper: scene.add_layer(),
            handles: scene.add_layer(),
        };
        let spec = TailSpec::new(Vec2::new(100.0, 0.0), Vec2::new(50.0, 10.0), joiner);
        let mut tail = Tail::new(Vec2::ZERO, &spec, None, layers);
        tail.make_shapes(&mut scene, &paint(), None);
        (scene, tail)
    }

    #[test]
    fn test_make_shapes_puts_stroke_below_fill() {
        let (scene, tail) = setup(false);
        let stroke = scene.position_of(tail.stroke_shape().expect("Linie")).expect("in Szene");
        let fill = scene.position_of(tail.fill_shape().expect("Füllung")).expect("in Szene");
        assert!(stroke.0 < fill.0, "Linie muss unter der Füllung liegen");
    }

    #[test]
    fn test_adjust_below_epsilon_is_noop() {
        let (mut scene, mut tail) = setup(false);
        let before = (tail.stroke_shape(), tail.fill_shape(), tail.points());

        assert!(!tail.adjust_tip(Vec2::new(100.00005, 0.0), &mut scene, &paint()));
        assert!(!tail.adjust_root(Vec2::new(0.0, 0.00005), &mut scene, &paint()));
        assert_eq!((tail.stroke_shape(), tail.fill_shape(), tail.points()), before);
    }

    #[test]
    fn test_curved_tip_move_drags_mid_by_half() {
        let (mut scene, mut tail) = setup(false);
        assert!(tail.adjust_tip(Vec2::new(120.0, 20.0), &mut scene, &paint()));
        assert_eq!(tail.points().mid, Vec2::new(60.0, 20.0));
        assert_eq!(tail.to_spec().tip(), Vec2::new(120.0, 20.0));
    }

    #[test]
    fn test_joiner_recomputes_default_midpoint() {
        let (mut scene, mut tail) = setup(true);
        assert!(tail.adjust_root(Vec2::new(0.0, 40.0), &mut scene, &paint()));
        let points = tail.points();
        assert_eq!(points.mid, default_midpoint(points.root, points.tip));
        assert!(tail.to_spec().joiner);
    }

    #[test]
    fn test_rebuild_keeps_z_position_with_new_ids() {
        let (mut scene, mut tail) = setup(false);
        let old_fill = tail.fill_shape().expect("Füllung");
        let old_position = scene.position_of(old_fill);

        assert!(tail.adjust_tip(Vec2::new(80.0, 60.0), &mut scene, &paint()));
        let new_fill = tail.fill_shape().expect("Füllung");
        assert_ne!(new_fill, old_fill);
        assert_eq!(scene.position_of(new_fill), old_position);
        assert_eq!(scene.shape_count(), 2);
    }

    #[test]
    fn test_joiner_has_no_handles() {
        let (mut scene, mut tail) = setup(true);
        tail.show_handles(&mut scene, &paint());
        assert!(!tail.handles_shown());
        assert_eq!(tail.handle_at(&scene, Vec2::new(100.0, 0.0), 8), None);
    }

    #[test]
    fn test_drag_tip_via_handle() {
        let (mut scene, mut tail) = setup(false);
        tail.show_handles(&mut scene, &paint());
        assert_eq!(scene.shape_count(), 4);

        let handle = tail.handle_at(&scene, Vec2::new(101.0, 1.0), 8);
        assert_eq!(handle, Some(TailHandle::Tip));
        tail.begin_drag(TailHandle::Tip);
        assert_eq!(tail.drag_state(), DragState::DraggingTip);
        assert!(tail.drag_to(Vec2::new(110.0, 0.0), &mut scene, &paint()));
        tail.end_drag();
        assert!(!tail.drag_to(Vec2::new(130.0, 0.0), &mut scene, &paint()));

        // Handles folgen dem Schwanz
        assert_eq!(tail.handle_at(&scene, Vec2::new(110.0, 0.0), 8), Some(TailHandle::Tip));
        assert_eq!(scene.shape_count(), 4);
    }

    #[test]
    fn test_mid_handle_wins_over_tip_handle() {
        let mut scene = Scene::new();
        let layers = TailLayers {
            lower: scene.add_layer(),
            upper: scene.add_layer(),
            handles: scene.add_layer(),
        };
        let spec = TailSpec::new(Vec2::new(50.0, 0.0), Vec2::new(52.0, 0.0), false);
        let mut tail = Tail::new(Vec2::ZERO, &spec, None, layers);
        tail.make_shapes(&mut scene, &paint(), None);
        tail.show_handles(&mut scene, &paint());
        assert_eq!(tail.handle_at(&scene, Vec2::new(51.0, 0.0), 8), Some(TailHandle::Mid));
    }

    #[test]
    fn test_hidden_tail_is_not_hit() {
        let (mut scene, mut tail) = setup(false);
        let inside = Vec2::new(20.0, 1.0);
        assert!(tail.is_hit(&scene, inside, 16));
        tail.set_visibility(false, &mut scene);
        assert!(!tail.is_hit(&scene, inside, 16));
        assert_eq!(scene.hit_test(inside, 16), None);
    }
}
