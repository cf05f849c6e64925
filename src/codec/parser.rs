//! Parser für Blasen-Specs.

use super::{CodecError, QUOTE_PLACEHOLDER};
use crate::app::host::{ContentId, SurfaceHost};
use crate::core::bubble_spec::{BubbleSpec, TailSpec, BUBBLE_VERSION};
use serde::Deserialize;

/// Rohform der Spec: alle Felder optional, Legacy-Namen als Alias.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBubbleSpec {
    version: Option<String>,
    style: Option<String>,
    level: Option<i32>,
    order: Option<u32>,
    #[serde(alias = "tips")]
    tails: Option<Vec<TailSpec>>,
    background_colors: Option<Vec<String>>,
}

/// Dekodiert einen Attribut-Wert.
///
/// Fehlende Pflichtfelder werden mit Standardwerten ergänzt (Warnung im Log);
/// ungültiges JSON ist ein harter Fehler.
pub fn decode_bubble_spec(value: &str) -> Result<BubbleSpec, CodecError> {
    // Nach dem Zurückersetzen sind ursprüngliche Backticks noch als ` maskiert
    let json = value.replace(QUOTE_PLACEHOLDER, "\"");
    let raw: RawBubbleSpec = serde_json::from_str(&json).map_err(CodecError::MalformedSpec)?;

    let version = raw.version.filter(|v| !v.is_empty()).unwrap_or_else(|| {
        log::warn!("Blasen-Spec ohne Version, verwende {}", BUBBLE_VERSION);
        BUBBLE_VERSION.to_string()
    });
    let style = raw.style.filter(|s| !s.is_empty()).unwrap_or_else(|| {
        log::warn!("Blasen-Spec ohne Stil, verwende 'speech'");
        "speech".to_string()
    });
    let tails = raw.tails.unwrap_or_else(|| {
        log::warn!("Blasen-Spec ohne Schwanz-Liste");
        Vec::new()
    });

    let mut spec = BubbleSpec::new(style, raw.level.unwrap_or(0), tails)
        .with_order(raw.order.unwrap_or(0));
    spec.version = version;
    spec.background_colors = raw.background_colors;
    Ok(spec)
}

/// Liest die Spec eines Content-Bereichs; ohne Attribut gilt [`BubbleSpec::none`].
pub fn read_bubble_spec<H: SurfaceHost + ?Sized>(
    host: &H,
    content: ContentId,
) -> Result<BubbleSpec, CodecError> {
    match host.read_bubble_attribute(content) {
        Some(value) => decode_bubble_spec(&value),
        None => Ok(BubbleSpec::none()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_bubble_spec;
    use glam::Vec2;

    #[test]
    fn test_decode_legacy_field_names() {
        let value = "{`version`:`1.0`,`style`:`shout`,`level`:3,`tips`:[{`targetX`:10,`targetY`:20,`midpointX`:5,`midpointY`:6}]}";
        let spec = decode_bubble_spec(value).expect("Legacy-Format");
        assert_eq!(spec.style, "shout");
        assert_eq!(spec.level, 3);
        assert_eq!(spec.tails.len(), 1);
        assert_eq!(spec.tails[0].tip(), Vec2::new(10.0, 20.0));
        assert!(!spec.tails[0].joiner);
        assert!(!spec.is_family_member());
    }

    #[test]
    fn test_decode_fills_missing_fields() {
        let spec = decode_bubble_spec("{`order`:0}").expect("Defaults");
        assert_eq!(spec.version, BUBBLE_VERSION);
        assert_eq!(spec.style, "speech");
        assert_eq!(spec.level, 0);
        assert!(spec.tails.is_empty());
        assert_eq!(spec.order, None);
    }

    #[test]
    fn test_decode_malformed_is_error() {
        let result = decode_bubble_spec("{`style`:");
        assert!(matches!(result, Err(CodecError::MalformedSpec(_))));
        assert!(decode_bubble_spec("kein json").is_err());
    }

    #[test]
    fn test_roundtrip_with_quotes_and_backticks_in_style() {
        let mut spec = BubbleSpec::new("say \"hi\" `now`", 4, vec![]).with_order(2);
        spec.background_colors = Some(vec!["#abc".into()]);
        let value = encode_bubble_spec(&spec).expect("Kodierung");
        assert_eq!(decode_bubble_spec(&value).expect("Dekodierung"), spec);
    }
}
