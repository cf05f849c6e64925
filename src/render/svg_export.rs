//! Export der Szene als statisches SVG-Dokument.

use super::scene::{Scene, Shape, ShapeGeometry};
use crate::core::geometry::{circle_through, PathSegment};
use glam::Vec2;
use std::fmt::Write;

/// CSS-Klasse des erzeugten Dokuments (erkennbar beim erneuten Bearbeiten).
pub const GENERATED_CLASS: &str = "comical-generated";

/// Schreibt alle sichtbaren Formen der Szene von unten nach oben als SVG.
pub fn export_svg(scene: &Scene, size: Vec2) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="{}" width="{:.3}" height="{:.3}" viewBox="0 0 {:.3} {:.3}">"#,
        GENERATED_CLASS, size.x, size.y, size.x, size.y
    );
    for (index, layer) in scene.layers().iter().enumerate() {
        if layer.is_empty() {
            continue;
        }
        let _ = writeln!(out, r#"  <g id="layer{}">"#, index);
        for (_, shape) in layer.shapes().filter(|(_, s)| s.visible) {
            let _ = writeln!(out, "    {}", shape_element(shape));
        }
        out.push_str("  </g>\n");
    }
    out.push_str("</svg>\n");
    out
}

fn shape_element(shape: &Shape) -> String {
    let paint = paint_attributes(shape);
    match &shape.geometry {
        ShapeGeometry::Ellipse { center, radii } => format!(
            r#"<ellipse cx="{:.3}" cy="{:.3}" rx="{:.3}" ry="{:.3}" {}/>"#,
            center.x, center.y, radii.x, radii.y, paint
        ),
        ShapeGeometry::Circle { center, radius } => format!(
            r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" {}/>"#,
            center.x, center.y, radius, paint
        ),
        ShapeGeometry::Path(path) => {
            let mut d = format!("M {:.3} {:.3}", path.start.x, path.start.y);
            let mut current = path.start;
            for segment in &path.segments {
                match *segment {
                    PathSegment::Line(to) => {
                        let _ = write!(d, " L {:.3} {:.3}", to.x, to.y);
                    }
                    PathSegment::Arc { through, to } => d.push_str(&arc_command(current, through, to)),
                }
                current = segment.end_point();
            }
            d.push_str(" Z");
            format!(r#"<path d="{}" {}/>"#, d, paint)
        }
    }
}

/// SVG-Bogenbefehl von `from` über `through` nach `to`; kollinear → Linie.
fn arc_command(from: Vec2, through: Vec2, to: Vec2) -> String {
    let Some((center, radius)) = circle_through(from, through, to) else {
        return format!(" L {:.3} {:.3}", to.x, to.y);
    };
    let chord = to - from;
    // Bogen > 180°, wenn Mittelpunkt und `through` auf derselben Seite der Sehne liegen
    let large_arc = chord.perp_dot(center - from) * chord.perp_dot(through - from) > 0.0;
    let sweep = (through - from).perp_dot(to - through) > 0.0;
    format!(
        " A {:.3} {:.3} 0 {} {} {:.3} {:.3}",
        radius,
        radius,
        u8::from(large_arc),
        u8::from(sweep),
        to.x,
        to.y
    )
}

fn paint_attributes(shape: &Shape) -> String {
    let mut attrs = String::new();
    match shape.fill {
        Some(color) => {
            let _ = write!(attrs, r#"fill="{}""#, hex_color(color));
            if color[3] < 1.0 {
                let _ = write!(attrs, r#" fill-opacity="{:.3}""#, color[3]);
            }
        }
        None => attrs.push_str(r#"fill="none""#),
    }
    if let Some(color) = shape.stroke {
        let _ = write!(
            attrs,
            r#" stroke="{}" stroke-width="{:.3}""#,
            hex_color(color),
            shape.stroke_width
        );
    }
    attrs
}

fn hex_color(color: [f32; 4]) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(color[0]),
        channel(color[1]),
        channel(color[2])
    )
}
