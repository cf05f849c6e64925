//! Umriss-Vorlagen der Blasen-Stile ("speech", "shout").
//!
//! Die Vorlagen sind kleine SVG-Dokumente. Gelesen werden nur
//! `<g transform="translate(..)">`, `<ellipse>`, `<path d>` und das Rechteck
//! mit `id="content-holder"`, das angibt, wo der Inhalt im Umriss sitzt.

use super::geometry::{polygon_contains, ClosedPath, PathSegment, Rect};
use anyhow::{bail, Context, Result};
use glam::Vec2;
use indexmap::IndexMap;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use svgtypes::{SimplePathSegment, SimplifyingPathParser};

pub const STYLE_SPEECH: &str = "speech";
pub const STYLE_SHOUT: &str = "shout";
const CONTENT_HOLDER_ID: &str = "content-holder";

const SPEECH_TEMPLATE: &str = include_str!("speech_bubble.svg");
const SHOUT_TEMPLATE: &str = include_str!("shout_bubble.svg");

/// Geometrie eines Umrisses.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineGeometry {
    /// Achsenparallele Ellipse
    Ellipse { center: Vec2, radii: Vec2 },
    /// Geschlossenes Polygon
    Polygon(Vec<Vec2>),
}

impl OutlineGeometry {
    pub fn bounds(&self) -> Rect {
        match self {
            OutlineGeometry::Ellipse { center, radii } => {
                Rect::from_min_max(*center - *radii, *center + *radii)
            }
            OutlineGeometry::Polygon(points) => Rect::from_points(points),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            OutlineGeometry::Ellipse { center, radii } => {
                radii.x > 0.0 && radii.y > 0.0 && ((p - *center) / *radii).length_squared() <= 1.0
            }
            OutlineGeometry::Polygon(points) => polygon_contains(points, p),
        }
    }

    /// Polygon als geschlossener Linien-Pfad; Ellipsen liefern `None`.
    pub fn to_path(&self) -> Option<ClosedPath> {
        match self {
            OutlineGeometry::Ellipse { .. } => None,
            OutlineGeometry::Polygon(points) => {
                let (first, rest) = points.split_first()?;
                Some(ClosedPath {
                    start: *first,
                    segments: rest.iter().map(|p| PathSegment::Line(*p)).collect(),
                })
            }
        }
    }

    /// Skaliert um `origin` und verschiebt `origin` nach `target`.
    fn scaled_about(&self, origin: Vec2, scale: Vec2, target: Vec2) -> Self {
        let map = |p: Vec2| target + (p - origin) * scale;
        match self {
            OutlineGeometry::Ellipse { center, radii } => OutlineGeometry::Ellipse {
                center: map(*center),
                radii: *radii * scale.abs(),
            },
            OutlineGeometry::Polygon(points) => {
                OutlineGeometry::Polygon(points.iter().map(|p| map(*p)).collect())
            }
        }
    }
}

/// Eine geparste Umriss-Vorlage.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineTemplate {
    style: String,
    outline: OutlineGeometry,
    content_holder: Rect,
}

impl OutlineTemplate {
    /// Parst eine SVG-Vorlage.
    pub fn parse(style: &str, svg: &str) -> Result<Self> {
        let mut reader = Reader::from_str(svg);
        reader.config_mut().trim_text(true);
        let decoder = reader.decoder();

        let mut buffer = Vec::new();
        // Verschiebung je offenem Element (Start → push, End → pop)
        let mut offsets: Vec<Vec2> = vec![Vec2::ZERO];
        let mut outline: Option<OutlineGeometry> = None;
        let mut content_holder: Option<Rect> = None;

        loop {
            buffer.clear();
            let (element, is_empty) = match reader.read_event_into(&mut buffer) {
                Ok(Event::Start(e)) => (e.into_owned(), false),
                Ok(Event::Empty(e)) => (e.into_owned(), true),
                Ok(Event::End(_)) => {
                    offsets.pop();
                    if offsets.is_empty() {
                        bail!("Unausgeglichene Elemente in Vorlage '{}'", style);
                    }
                    continue;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(e).with_context(|| format!("SVG-Fehler in Vorlage '{}'", style))
                }
                _ => continue,
            };

            let name = element.name();
            let tag = decoder.decode(name.as_ref())?.into_owned();
            let attrs = attribute_map(decoder, &element)?;
            let parent_offset = offsets.last().copied().unwrap_or(Vec2::ZERO);
            let offset = match attrs.get("transform") {
                Some(transform) => match translation_of(transform) {
                    Some(translation) => parent_offset + translation,
                    None => {
                        log::warn!("Transformation '{}' nicht unterstützt, ignoriert", transform);
                        parent_offset
                    }
                },
                None => parent_offset,
            };

            match tag.as_str() {
                "rect" if attrs.get("id").map(String::as_str) == Some(CONTENT_HOLDER_ID) => {
                    let rect = Rect::new(
                        number_attr(&attrs, "x")? + offset.x,
                        number_attr(&attrs, "y")? + offset.y,
                        number_attr(&attrs, "width")?,
                        number_attr(&attrs, "height")?,
                    );
                    if rect.width <= 0.0 || rect.height <= 0.0 {
                        bail!("content-holder in Vorlage '{}' hat keine Fläche", style);
                    }
                    content_holder = Some(rect);
                }
                "ellipse" | "path" if outline.is_some() => {
                    log::warn!("Vorlage '{}': weiterer Umriss <{}> ignoriert", style, tag);
                }
                "ellipse" => {
                    outline = Some(OutlineGeometry::Ellipse {
                        center: Vec2::new(number_attr(&attrs, "cx")?, number_attr(&attrs, "cy")?)
                            + offset,
                        radii: Vec2::new(number_attr(&attrs, "rx")?, number_attr(&attrs, "ry")?),
                    });
                }
                "path" => {
                    let d = attrs
                        .get("d")
                        .with_context(|| format!("<path> ohne d in Vorlage '{}'", style))?;
                    let points = path_points(d, offset)
                        .with_context(|| format!("Pfad in Vorlage '{}'", style))?;
                    if points.len() < 3 {
                        bail!("Umriss in Vorlage '{}' hat weniger als 3 Punkte", style);
                    }
                    outline = Some(OutlineGeometry::Polygon(points));
                }
                _ => {}
            }

            if !is_empty {
                offsets.push(offset);
            }
        }

        let outline = outline.with_context(|| format!("Vorlage '{}' ohne Umriss", style))?;
        let content_holder = content_holder
            .with_context(|| format!("Vorlage '{}' ohne content-holder", style))?;

        Ok(Self {
            style: style.to_string(),
            outline,
            content_holder,
        })
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn outline(&self) -> &OutlineGeometry {
        &self.outline
    }

    pub fn content_holder(&self) -> Rect {
        self.content_holder
    }

    /// Umschließendes Rechteck von Umriss und content-holder.
    pub fn bounds(&self) -> Rect {
        self.outline.bounds().union(&self.content_holder)
    }

    /// Platziert den Umriss um eine Content-Box.
    ///
    /// Die gesamte Vorlage wird um ihren Mittelpunkt mit
    /// (Content-Größe / Holder-Größe) skaliert und dann auf den Mittelpunkt
    /// der Content-Box gesetzt.
    pub fn place(&self, content: Rect) -> OutlineGeometry {
        let scale = content.size() / self.content_holder.size();
        self.outline
            .scaled_about(self.bounds().center(), scale, content.center())
    }
}

/// Alle bekannten Umriss-Vorlagen, nach Stil.
#[derive(Debug, Clone, Default)]
pub struct OutlineLibrary {
    templates: IndexMap<String, OutlineTemplate>,
}

impl OutlineLibrary {
    /// Lädt die eingebauten Vorlagen "speech" und "shout".
    pub fn builtin() -> Result<Self> {
        let mut library = Self::default();
        library.insert(OutlineTemplate::parse(STYLE_SPEECH, SPEECH_TEMPLATE)?);
        library.insert(OutlineTemplate::parse(STYLE_SHOUT, SHOUT_TEMPLATE)?);
        Ok(library)
    }

    pub fn insert(&mut self, template: OutlineTemplate) {
        self.templates.insert(template.style.clone(), template);
    }

    pub fn styles(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Vorlage für einen Stil. "none" → kein Umriss; unbekannt → "speech".
    pub fn for_style(&self, style: &str) -> Option<&OutlineTemplate> {
        if style == super::bubble_spec::STYLE_NONE {
            return None;
        }
        if let Some(template) = self.templates.get(style) {
            return Some(template);
        }
        log::warn!("Unbekannter Blasen-Stil '{}', verwende '{}'", style, STYLE_SPEECH);
        self.templates.get(STYLE_SPEECH)
    }
}

// ── SVG-Hilfen ──────────────────────────────────────────────────────

fn attribute_map(decoder: Decoder, element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in element.attributes().with_checks(false) {
        let attr = attr?;
        let key = decoder.decode(attr.key.as_ref())?.into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn number_attr(attrs: &HashMap<String, String>, key: &str) -> Result<f32> {
    let value = attrs
        .get(key)
        .with_context(|| format!("Attribut '{}' fehlt", key))?;
    value
        .trim()
        .parse()
        .with_context(|| format!("Attribut '{}' ist keine Zahl: {}", key, value))
}

/// Verschiebung eines `transform`-Attributs. Nur reine Translationen.
fn translation_of(transform: &str) -> Option<Vec2> {
    let t: svgtypes::Transform = transform.parse().ok()?;
    let pure = t.a == 1.0 && t.b == 0.0 && t.c == 0.0 && t.d == 1.0;
    pure.then(|| Vec2::new(t.e as f32, t.f as f32))
}

/// Eckpunkte des ersten Teilpfads, absolut und um `offset` verschoben.
///
/// Kurven gehen nur mit ihrem Endpunkt ein.
fn path_points(d: &str, offset: Vec2) -> Result<Vec<Vec2>> {
    let mut points = Vec::new();
    for segment in SimplifyingPathParser::from(d) {
        let segment = segment.with_context(|| format!("Ungültige Pfad-Daten: {}", d))?;
        let (x, y) = match segment {
            SimplePathSegment::MoveTo { .. } if !points.is_empty() => {
                log::warn!("Weitere Teilpfade im Umriss ignoriert");
                break;
            }
            SimplePathSegment::MoveTo { x, y } | SimplePathSegment::LineTo { x, y } => (x, y),
            SimplePathSegment::CurveTo { x, y, .. } | SimplePathSegment::Quadratic { x, y, .. } => {
                (x, y)
            }
            SimplePathSegment::ClosePath => continue,
        };
        points.push(Vec2::new(x as f32, y as f32) + offset);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_builtin_speech_template_is_translated_ellipse() {
        let library = OutlineLibrary::builtin().expect("eingebaute Vorlagen");
        let speech = library.for_style("speech").expect("speech vorhanden");
        match speech.outline() {
            OutlineGeometry::Ellipse { center, radii } => {
                assert!(center.abs_diff_eq(Vec2::new(50.36533, 50.10715), 1e-3));
                assert!(radii.abs_diff_eq(Vec2::new(49.608364, 49.702854), 1e-4));
            }
            other => panic!("Ellipse erwartet, war {other:?}"),
        }
        assert_abs_diff_eq!(speech.content_holder().y, 17.03423, epsilon = 1e-3);
    }

    #[test]
    fn test_builtin_shout_template_is_polygon() {
        let library = OutlineLibrary::builtin().expect("eingebaute Vorlagen");
        let shout = library.for_style("shout").expect("shout vorhanden");
        let OutlineGeometry::Polygon(points) = shout.outline() else {
            panic!("Polygon erwartet");
        };
        assert_eq!(points.len(), 20);
        assert!(points[0].abs_diff_eq(Vec2::new(34.773809, 26.10566), 1e-3));
        // zweiter Punkt relativ zum ersten
        assert!(points[1].abs_diff_eq(Vec2::new(48.947916, 0.21429), 1e-3));
        // nach L absolut
        assert!(points[15].abs_diff_eq(Vec2::new(4.346726, 93.00744), 1e-3));
    }

    #[test]
    fn test_style_lookup_fallbacks() {
        let library = OutlineLibrary::builtin().expect("eingebaute Vorlagen");
        assert!(library.for_style("none").is_none());
        assert_eq!(library.for_style("wolke").map(|t| t.style()), Some("speech"));
        assert_eq!(library.styles().collect::<Vec<_>>(), vec!["speech", "shout"]);
    }

    #[test]
    fn test_place_scales_to_content_box() {
        let library = OutlineLibrary::builtin().expect("eingebaute Vorlagen");
        let speech = library.for_style("speech").expect("speech vorhanden");
        let holder = speech.content_holder();
        let content = Rect::new(200.0, 100.0, holder.width * 2.0, holder.height * 2.0);

        match speech.place(content) {
            OutlineGeometry::Ellipse { center, radii } => {
                // Ellipse bestimmt die Bounds → Mittelpunkt landet genau in der Box-Mitte
                assert!(center.abs_diff_eq(content.center(), 1e-3));
                assert!(radii.abs_diff_eq(Vec2::new(99.216728, 99.405708), 1e-3));
            }
            other => panic!("Ellipse erwartet, war {other:?}"),
        }
    }

    #[test]
    fn test_placed_outline_contains_content_center() {
        let library = OutlineLibrary::builtin().expect("eingebaute Vorlagen");
        let content = Rect::new(10.0, 10.0, 120.0, 60.0);
        for style in ["speech", "shout"] {
            let placed = library.for_style(style).expect("Vorlage").place(content);
            assert!(placed.contains(content.center()), "{style}");
            assert!(!placed.contains(Vec2::new(-500.0, -500.0)), "{style}");
        }
    }

    #[test]
    fn test_template_without_content_holder_is_rejected() {
        let svg = r#"<svg><ellipse cx="1" cy="1" rx="1" ry="1"/></svg>"#;
        let err = OutlineTemplate::parse("test", svg).expect_err("kein Holder");
        assert!(err.to_string().contains("content-holder"));
    }

    #[test]
    fn test_nested_translations_accumulate() {
        let svg = r#"<svg>
            <g transform="translate(10,20)">
              <g transform="translate(5)">
                <path d="M0,0 L10,0 10,10z"/>
              </g>
              <rect id="content-holder" x="0" y="0" width="4" height="4"/>
            </g>
        </svg>"#;
        let template = OutlineTemplate::parse("test", svg).expect("gültig");
        assert_eq!(
            template.outline(),
            &OutlineGeometry::Polygon(vec![
                Vec2::new(15.0, 20.0),
                Vec2::new(25.0, 20.0),
                Vec2::new(25.0, 30.0),
            ])
        );
        assert_eq!(template.content_holder(), Rect::new(10.0, 20.0, 4.0, 4.0));
    }

    #[test]
    fn test_path_points_resolve_relative_and_axis_commands() {
        let points = path_points("m10-5h20v1e1l-20,0z", Vec2::new(0.0, 100.0)).expect("gültig");
        assert_eq!(
            points,
            vec![
                Vec2::new(10.0, 95.0),
                Vec2::new(30.0, 95.0),
                Vec2::new(30.0, 105.0),
                Vec2::new(10.0, 105.0),
            ]
        );
        assert!(path_points("M0,0 L10", Vec2::ZERO).is_err());
    }

    #[test]
    fn test_only_pure_translations_are_applied() {
        assert_eq!(translation_of("translate(5)"), Some(Vec2::new(5.0, 0.0)));
        assert_eq!(translation_of("translate(0,-197)"), Some(Vec2::new(0.0, -197.0)));
        assert_eq!(translation_of("scale(2)"), None);
        assert_eq!(translation_of("kein transform"), None);
    }
}
