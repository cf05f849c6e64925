//! Reine Geometrie-Funktionen für Blasen und Schwänze.
//!
//! Keine Abhängigkeiten auf Szene oder Host: alle Funktionen sind deterministisch
//! und arbeiten ausschließlich auf `glam::Vec2` und [`Rect`].

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Standard-Breite der Schwanz-Basis (Pixel).
pub const TAIL_BASE_WIDTH: f32 = 25.0;
/// Positionsänderungen unterhalb dieser Schwelle gelten als "nicht bewegt".
pub const MOVE_EPSILON: f32 = 1e-4;
/// Vertikaler Abstand der Standard-Spitze zur Content-Box.
const TIP_VERTICAL_OFFSET: f32 = 20.0;
/// Mindestabstand der Standard-Spitze zum oberen/unteren Rand.
const TIP_EDGE_MARGIN: f32 = 5.0;

/// Achsenparalleles Rechteck (Ursprung oben links, y wächst nach unten).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Erstellt ein Rechteck aus Position und Größe.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Erstellt ein Rechteck aus zwei Eckpunkten.
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Kleinstes Rechteck, das alle Punkte umschließt (leer → Nullrechteck).
    pub fn from_points(points: &[Vec2]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self::from_min_max(min, max)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Prüft, ob das Rechteck eine messbare Größe hat (Layout abgeschlossen).
    ///
    /// Gefordert ist mindestens eine Einheit je Achse, nicht nur eine Größe
    /// ungleich null: Hosts melden während des Layouts Bruchteil-Größen. Ein
    /// 0.5px-Bereich bleibt daher absichtlich unplatziert und wartet auf die
    /// nächste Layout-Wiederholung.
    pub fn has_layout(&self) -> bool {
        self.width >= 1.0 && self.height >= 1.0
    }

    /// Punkt liegt innerhalb oder auf dem Rand.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Echte Überlappung (bloße Berührung der Kanten zählt nicht).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Umschließendes Rechteck beider Rechtecke.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }
}

/// Standard-Kontrollpunkt zwischen Wurzel und Ziel.
///
/// Mittelpunkt der Strecke, senkrecht um ein Zehntel des rohen (dx, dy)
/// versetzt. Der Versatz ist nicht auf die Distanz normiert.
pub fn default_midpoint(root: Vec2, target: Vec2) -> Vec2 {
    let mid = (root + target) * 0.5;
    let delta = target - root;
    Vec2::new(mid.x - delta.y / 10.0, mid.y + delta.x / 10.0)
}

/// Standard-Spitze eines neuen Schwanzes für eine Content-Box.
///
/// `content` ist relativ zur Oberfläche der Größe `surface`.
/// Gibt `(spitze, kontrollpunkt)` zurück.
///
/// Die vertikale Logik klemmt zuerst und prüft danach, ob nach oben
/// umgeklappt werden muss (Reihenfolge bewusst beibehalten).
pub fn default_tip(content: Rect, surface: Vec2) -> (Vec2, Vec2) {
    let mut target_x = content.left() - content.width / 2.0;
    if content.left() < surface.x - content.right() {
        // näher am linken Rand → Schwanz zeigt nach rechts
        target_x = content.right() + content.width / 2.0;
    }

    let mut target_y = content.bottom() + TIP_VERTICAL_OFFSET;
    if target_y > surface.y - TIP_EDGE_MARGIN {
        target_y = surface.y - TIP_EDGE_MARGIN;
    }
    if target_y < content.bottom() {
        // Oberfläche zu niedrig → nach oben zeigen
        target_y = content.top() - TIP_VERTICAL_OFFSET;
        if target_y < TIP_EDGE_MARGIN {
            target_y = TIP_EDGE_MARGIN;
        }
    }

    let tip = Vec2::new(
        target_x.clamp(0.0, surface.x.max(0.0)),
        target_y.clamp(0.0, surface.y.max(0.0)),
    );
    (tip, default_midpoint(content.center(), tip))
}

/// Eckpunkte eines Schwanz-Umrisses.
///
/// Der Umriss läuft `begin → mid1 → tip → mid2 → end` und wird über die
/// Basis geschlossen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailOutline {
    pub begin: Vec2,
    pub mid1: Vec2,
    pub tip: Vec2,
    pub mid2: Vec2,
    pub end: Vec2,
}

impl TailOutline {
    /// Geschlossener Pfad aus zwei Kreisbögen.
    pub fn to_path(&self) -> ClosedPath {
        ClosedPath {
            start: self.begin,
            segments: vec![
                PathSegment::Arc {
                    through: self.mid1,
                    to: self.tip,
                },
                PathSegment::Arc {
                    through: self.mid2,
                    to: self.end,
                },
            ],
        }
    }

    /// Länge der Basis (`begin` ↔ `end`).
    pub fn base_length(&self) -> f32 {
        self.begin.distance(self.end)
    }
}

/// Berechnet den Umriss eines Schwanzes.
///
/// Die Basis der Länge `base_width` steht senkrecht auf (mid − root) und ist
/// um `root` zentriert. Die Bogen-Mittelpunkte liegen `base_width / 4`
/// beidseits von `mid`, senkrecht zu (tip − root).
pub fn tail_outline(root: Vec2, tip: Vec2, mid: Vec2, base_width: f32) -> TailOutline {
    let base_offset = perpendicular_direction(mid - root) * (base_width / 2.0);
    let mid_offset = perpendicular_direction(tip - root) * (base_width / 4.0);
    TailOutline {
        begin: root + base_offset,
        mid1: mid + mid_offset,
        tip,
        mid2: mid - mid_offset,
        end: root - base_offset,
    }
}

/// Einheitsvektor um +90° gedreht; Nullvektor verhält sich wie Winkel 0.
fn perpendicular_direction(v: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(Vec2::X).perp()
}

// ── Pfade ───────────────────────────────────────────────────────────

/// Segment eines geschlossenen Pfads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Gerade Linie zum Zielpunkt
    Line(Vec2),
    /// Kreisbogen durch `through` zum Zielpunkt
    Arc { through: Vec2, to: Vec2 },
}

impl PathSegment {
    /// Endpunkt des Segments.
    pub fn end_point(&self) -> Vec2 {
        match self {
            PathSegment::Line(to) => *to,
            PathSegment::Arc { to, .. } => *to,
        }
    }
}

/// Geschlossener Pfad (implizite Linie vom letzten Segment zurück zu `start`).
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedPath {
    pub start: Vec2,
    pub segments: Vec<PathSegment>,
}

impl ClosedPath {
    /// Polygon-Näherung des Pfads (`arc_steps` Stützpunkte pro Bogen).
    pub fn flatten(&self, arc_steps: usize) -> Vec<Vec2> {
        let mut points = vec![self.start];
        let mut current = self.start;
        for segment in &self.segments {
            match *segment {
                PathSegment::Line(to) => points.push(to),
                PathSegment::Arc { through, to } => {
                    points.extend(arc_points(current, through, to, arc_steps));
                }
            }
            current = segment.end_point();
        }
        points
    }

    pub fn contains(&self, p: Vec2, arc_steps: usize) -> bool {
        polygon_contains(&self.flatten(arc_steps), p)
    }

    pub fn bounds(&self, arc_steps: usize) -> Rect {
        Rect::from_points(&self.flatten(arc_steps))
    }
}

/// Kreis durch drei Punkte; `None` wenn die Punkte (fast) kollinear sind.
pub fn circle_through(a: Vec2, b: Vec2, c: Vec2) -> Option<(Vec2, f32)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-6 {
        return None;
    }
    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    let center = Vec2::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    );
    Some((center, center.distance(a)))
}

/// Stützpunkte eines Kreisbogens `from → through → to` (ohne `from`).
///
/// Kollineare Punkte ergeben eine gerade Linie über `through`.
pub fn arc_points(from: Vec2, through: Vec2, to: Vec2, steps: usize) -> Vec<Vec2> {
    let Some((center, radius)) = circle_through(from, through, to) else {
        return vec![through, to];
    };
    let angle_of = |p: Vec2| (p - center).to_angle();
    let start = angle_of(from);
    let to_through = (angle_of(through) - start).rem_euclid(TAU);
    let to_end = (angle_of(to) - start).rem_euclid(TAU);
    // Drehrichtung so wählen, dass `through` auf dem Bogen liegt
    let sweep = if to_through < to_end {
        to_end
    } else {
        to_end - TAU
    };

    let steps = steps.max(2);
    let mut points: Vec<Vec2> = (1..steps)
        .map(|i| center + Vec2::from_angle(start + sweep * i as f32 / steps as f32) * radius)
        .collect();
    points.push(to);
    points
}

/// Even-Odd-Test: liegt `p` im Polygon?
pub fn polygon_contains(points: &[Vec2], p: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_midpoint_fixed_point() {
        for p in [Vec2::ZERO, Vec2::new(12.5, -3.0), Vec2::new(400.0, 250.0)] {
            assert_eq!(default_midpoint(p, p), p);
        }
    }

    #[test]
    fn test_default_midpoint_bias() {
        // dx = 100, dy = 0 → Mittelpunkt (50, 0) um +10 in y versetzt
        let mid = default_midpoint(Vec2::ZERO, Vec2::new(100.0, 0.0));
        assert_eq!(mid, Vec2::new(50.0, 10.0));

        let mid = default_midpoint(Vec2::new(10.0, 10.0), Vec2::new(10.0, 50.0));
        assert_eq!(mid, Vec2::new(6.0, 30.0));
    }

    #[test]
    fn test_tail_outline_base_is_perpendicular_with_configured_width() {
        let cases = [
            (Vec2::new(0.0, 0.0), Vec2::new(100.0, 40.0), Vec2::new(50.0, 30.0)),
            (Vec2::new(200.0, 80.0), Vec2::new(20.0, 300.0), Vec2::new(90.0, 150.0)),
            (Vec2::new(5.0, 5.0), Vec2::new(5.0, 90.0), Vec2::new(-40.0, 60.0)),
        ];
        for (root, tip, mid) in cases {
            let outline = tail_outline(root, tip, mid, TAIL_BASE_WIDTH);
            assert_abs_diff_eq!(outline.base_length(), TAIL_BASE_WIDTH, epsilon = 1e-3);
            let base = outline.end - outline.begin;
            assert_abs_diff_eq!(base.dot(mid - root), 0.0, epsilon = 1e-2);
            assert!(((outline.begin + outline.end) * 0.5).abs_diff_eq(root, 1e-4));
        }
    }

    #[test]
    fn test_tail_outline_arc_midpoints_straddle_control() {
        let root = Vec2::new(0.0, 0.0);
        let tip = Vec2::new(100.0, 0.0);
        let mid = Vec2::new(50.0, 10.0);
        let outline = tail_outline(root, tip, mid, 20.0);
        assert_abs_diff_eq!(outline.mid1.distance(mid), 5.0, epsilon = 1e-4);
        assert!(((outline.mid1 + outline.mid2) * 0.5).abs_diff_eq(mid, 1e-4));
        assert_eq!(outline.tip, tip);
    }

    #[test]
    fn test_tail_outline_degenerate_root_equals_mid() {
        let p = Vec2::new(30.0, 30.0);
        let outline = tail_outline(p, p, p, 24.0);
        // Winkel 0 → Basis vertikal
        assert!(outline.begin.abs_diff_eq(Vec2::new(30.0, 42.0), 1e-4));
        assert!(outline.end.abs_diff_eq(Vec2::new(30.0, 18.0), 1e-4));
    }

    #[test]
    fn test_tail_path_is_closed_and_contains_interior() {
        let outline = tail_outline(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(50.0, 0.0),
            TAIL_BASE_WIDTH,
        );
        let path = outline.to_path();
        let polygon = path.flatten(16);
        assert_eq!(polygon.first().copied(), Some(outline.begin));
        assert_eq!(polygon.last().copied(), Some(outline.end));
        assert!(path.contains(Vec2::new(20.0, 0.0), 16));
        assert!(!path.contains(Vec2::new(20.0, 40.0), 16));
    }

    #[test]
    fn test_default_tip_points_right_when_close_to_left_edge() {
        let content = Rect::new(10.0, 10.0, 100.0, 50.0);
        let (tip, mid) = default_tip(content, Vec2::new(500.0, 300.0));
        assert_eq!(tip, Vec2::new(160.0, 80.0));
        assert_eq!(mid, default_midpoint(content.center(), tip));
    }

    #[test]
    fn test_default_tip_points_left_when_close_to_right_edge() {
        let content = Rect::new(350.0, 10.0, 100.0, 50.0);
        let (tip, _) = default_tip(content, Vec2::new(500.0, 300.0));
        assert_eq!(tip, Vec2::new(300.0, 80.0));
    }

    #[test]
    fn test_default_tip_flips_upwards_in_short_surface() {
        let content = Rect::new(10.0, 100.0, 100.0, 80.0);
        let (tip, _) = default_tip(content, Vec2::new(500.0, 190.0));
        // bottom + 20 = 200 → auf 185 geklemmt, liegt noch unter der Box
        assert_eq!(tip.y, 185.0);

        let (tip, _) = default_tip(content, Vec2::new(500.0, 182.0));
        // auf 177 geklemmt, liegt über bottom (180) → nach oben: 100 - 20
        assert_eq!(tip.y, 80.0);
    }

    #[test]
    fn test_default_tip_stays_inside_surface_for_oversized_content() {
        let surface = Vec2::new(200.0, 100.0);
        let boxes = [
            Rect::new(-50.0, -50.0, 400.0, 300.0),
            Rect::new(150.0, 90.0, 300.0, 300.0),
            Rect::new(0.0, 0.0, 0.0, 0.0),
            Rect::new(190.0, 2.0, 5.0, 1.0),
        ];
        for content in boxes {
            let (tip, _) = default_tip(content, surface);
            assert!(
                (0.0..=surface.x).contains(&tip.x) && (0.0..=surface.y).contains(&tip.y),
                "Spitze {tip:?} außerhalb für {content:?}"
            );
        }
    }

    #[test]
    fn test_arc_points_pass_through_control() {
        let from = Vec2::new(-10.0, 0.0);
        let through = Vec2::new(0.0, 10.0);
        let to = Vec2::new(10.0, 0.0);
        let points = arc_points(from, through, to, 8);
        assert_eq!(points.last().copied(), Some(to));
        // Bogen muss über die positive y-Seite laufen
        assert!(points.iter().any(|p| p.y > 9.0));
        assert!(points.iter().all(|p| p.y >= -1e-3));
    }

    #[test]
    fn test_arc_points_collinear_fall_back_to_line() {
        let points = arc_points(Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(10.0, 0.0), 8);
        assert_eq!(points, vec![Vec2::new(5.0, 0.0), Vec2::new(10.0, 0.0)]);
    }

    #[test]
    fn test_rect_intersection_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_sub_unit_rect_has_no_layout() {
        assert!(!Rect::new(0.0, 0.0, 0.5, 40.0).has_layout());
        assert!(!Rect::new(0.0, 0.0, 60.0, 0.0).has_layout());
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).has_layout());
    }
}
