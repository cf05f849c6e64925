//! Serialisierbare Beschreibung einer Blase (Stil, Ebene, Reihenfolge, Schwänze).

use super::geometry::{default_tip, Rect};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Aktuelle Version des Spec-Formats.
pub const BUBBLE_VERSION: &str = "1.0";
/// Stil ohne Umriss.
pub const STYLE_NONE: &str = "none";
/// Ebene der Standard-Spec für Inhalte ohne Attribut.
pub const DEFAULT_SPEC_LEVEL: i32 = 1;

/// Ein Schwanz: Spitze, Kontrollpunkt und ob er zwei Familienmitglieder verbindet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailSpec {
    /// Spitze x (Legacy-Name: `targetX`)
    #[serde(alias = "targetX")]
    pub tip_x: f32,
    /// Spitze y (Legacy-Name: `targetY`)
    #[serde(alias = "targetY")]
    pub tip_y: f32,
    pub midpoint_x: f32,
    pub midpoint_y: f32,
    /// Verbindungsschwanz zwischen Familienmitgliedern (kein Spitzen-Handle)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub joiner: bool,
}

impl TailSpec {
    pub fn new(tip: Vec2, midpoint: Vec2, joiner: bool) -> Self {
        Self {
            tip_x: tip.x,
            tip_y: tip.y,
            midpoint_x: midpoint.x,
            midpoint_y: midpoint.y,
            joiner,
        }
    }

    /// Standard-Schwanz für eine Content-Box innerhalb einer Oberfläche.
    pub fn default_for(content: Rect, surface: Vec2) -> Self {
        let (tip, midpoint) = default_tip(content, surface);
        Self::new(tip, midpoint, false)
    }

    pub fn tip(&self) -> Vec2 {
        Vec2::new(self.tip_x, self.tip_y)
    }

    pub fn midpoint(&self) -> Vec2 {
        Vec2::new(self.midpoint_x, self.midpoint_y)
    }

    pub fn set_tip(&mut self, tip: Vec2) {
        self.tip_x = tip.x;
        self.tip_y = tip.y;
    }

    pub fn set_midpoint(&mut self, midpoint: Vec2) {
        self.midpoint_x = midpoint.x;
        self.midpoint_y = midpoint.y;
    }
}

/// Vollständige Blasen-Spec, wie sie am Content-Bereich gespeichert wird.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleSpec {
    pub version: String,
    /// Stil-Name ("speech", "shout", "none", …)
    pub style: String,
    /// Z-Ebene: höhere Ebenen werden über niedrigeren gezeichnet
    pub level: i32,
    /// Position in der Familie; `None` = keine Familienzugehörigkeit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<NonZeroU32>,
    pub tails: Vec<TailSpec>,
    /// CSS-Farben des Hintergrunds; die erste wird als Füllung verwendet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_colors: Option<Vec<String>>,
}

impl BubbleSpec {
    /// Erstellt eine Spec ohne Familienzugehörigkeit.
    pub fn new(style: impl Into<String>, level: i32, tails: Vec<TailSpec>) -> Self {
        Self {
            version: BUBBLE_VERSION.to_string(),
            style: style.into(),
            level,
            order: None,
            tails,
            background_colors: None,
        }
    }

    /// Standard-Spec für Inhalte ohne gespeichertes Attribut.
    pub fn none() -> Self {
        Self::new(STYLE_NONE, DEFAULT_SPEC_LEVEL, Vec::new())
    }

    /// Setzt die Familien-Position (0 = keine).
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = NonZeroU32::new(order);
        self
    }

    /// Mitglied einer Familie genau dann, wenn eine Reihenfolge vergeben ist.
    pub fn is_family_member(&self) -> bool {
        self.order.is_some()
    }

    /// Reihenfolge als Zahl (0 = nicht vergeben).
    pub fn order_value(&self) -> u32 {
        self.order.map_or(0, NonZeroU32::get)
    }

    pub fn has_outline(&self) -> bool {
        self.style != STYLE_NONE
    }

    /// Erste gültige Hintergrundfarbe als RGBA.
    pub fn background_color(&self) -> Option<[f32; 4]> {
        self.background_colors
            .as_ref()?
            .first()
            .and_then(|c| parse_css_color(c))
    }
}

/// Standard-Spec für einen Stil: "none" ohne Schwanz, sonst mit einem Standard-Schwanz.
pub fn default_bubble_spec(style: &str, content: Rect, surface: Vec2) -> BubbleSpec {
    if style.is_empty() || style == STYLE_NONE {
        return BubbleSpec::none();
    }
    BubbleSpec::new(
        style,
        DEFAULT_SPEC_LEVEL,
        vec![TailSpec::default_for(content, surface)],
    )
}

/// Parst `#rgb` / `#rrggbb` / `#rrggbbaa` nach RGBA (0.0..=1.0).
pub fn parse_css_color(value: &str) -> Option<[f32; 4]> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let mut rgb = [0.0; 3];
            for (i, c) in hex.chars().enumerate() {
                rgb[i] = channel(&c.to_string().repeat(2))?;
            }
            Some([rgb[0], rgb[1], rgb[2], 1.0])
        }
        6 | 8 => {
            let alpha = if hex.len() == 8 {
                channel(hex.get(6..8)?)?
            } else {
                1.0
            };
            Some([
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
                alpha,
            ])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_order_means_no_family() {
        let spec = BubbleSpec::new("speech", 0, vec![]).with_order(0);
        assert!(!spec.is_family_member());
        assert_eq!(spec.order_value(), 0);

        let spec = spec.with_order(3);
        assert!(spec.is_family_member());
        assert_eq!(spec.order_value(), 3);
    }

    #[test]
    fn test_default_spec_for_none_has_no_tails() {
        let spec = default_bubble_spec("none", Rect::new(0.0, 0.0, 10.0, 10.0), Vec2::ONE);
        assert_eq!(spec, BubbleSpec::none());
        assert_eq!(spec.level, 1);
        assert!(!spec.has_outline());
    }

    #[test]
    fn test_default_spec_for_style_has_default_tail() {
        let content = Rect::new(10.0, 10.0, 100.0, 50.0);
        let spec = default_bubble_spec("shout", content, Vec2::new(500.0, 300.0));
        assert_eq!(spec.style, "shout");
        assert_eq!(spec.tails.len(), 1);
        assert_eq!(spec.tails[0].tip(), Vec2::new(160.0, 80.0));
        assert!(!spec.tails[0].joiner);
    }

    #[test]
    fn test_background_color_parsing() {
        let mut spec = BubbleSpec::new("speech", 0, vec![]);
        assert_eq!(spec.background_color(), None);

        spec.background_colors = Some(vec!["#ff0000".into(), "#00ff00".into()]);
        assert_eq!(spec.background_color(), Some([1.0, 0.0, 0.0, 1.0]));

        spec.background_colors = Some(vec!["#fff".into()]);
        assert_eq!(spec.background_color(), Some([1.0, 1.0, 1.0, 1.0]));

        spec.background_colors = Some(vec!["blau".into()]);
        assert_eq!(spec.background_color(), None);
    }
}
