//! Writer für Blasen-Specs.

use super::{CodecError, BUBBLE_ATTRIBUTE, ESCAPED_BACKTICK, QUOTE_PLACEHOLDER};
use crate::app::host::{ContentId, Notify, SurfaceHost};
use crate::core::BubbleSpec;

/// Serialisiert eine Spec in den Attribut-Wert.
pub fn encode_bubble_spec(spec: &BubbleSpec) -> Result<String, CodecError> {
    debug_assert!(!spec.version.is_empty(), "Spec ohne Version");
    debug_assert!(!spec.style.is_empty(), "Spec ohne Stil");

    let json = serde_json::to_string(spec).map_err(CodecError::Encode)?;
    // serde_json gibt Backticks unverändert aus
    let json = json.replace(QUOTE_PLACEHOLDER, ESCAPED_BACKTICK);
    Ok(json.replace('"', &QUOTE_PLACEHOLDER.to_string()))
}

/// Schreibt die Spec an den Content-Bereich.
pub fn write_bubble_spec<H: SurfaceHost + ?Sized>(
    host: &mut H,
    content: ContentId,
    spec: &BubbleSpec,
    notify: Notify,
) -> Result<(), CodecError> {
    let value = encode_bubble_spec(spec)?;
    log::debug!(
        "Schreibe {} an {:?} ({} Zeichen, {:?})",
        BUBBLE_ATTRIBUTE,
        content,
        value.len(),
        notify
    );
    host.write_bubble_attribute(content, Some(value), notify);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TailSpec;
    use glam::Vec2;

    #[test]
    fn test_encoded_value_contains_no_quotes() {
        let spec = BubbleSpec::new(
            "speech",
            2,
            vec![TailSpec::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), false)],
        )
        .with_order(1);
        let value = encode_bubble_spec(&spec).expect("Kodierung");
        assert!(!value.contains('"'));
        assert!(value.starts_with("{`version`:`1.0`"));
        assert!(value.contains("`order`:1"));
        assert!(!value.contains("joiner"), "false-Joiner wird weggelassen");
    }

    #[test]
    fn test_literal_backtick_is_escaped() {
        let spec = BubbleSpec::new("we`ird", 0, vec![]);
        let value = encode_bubble_spec(&spec).expect("Kodierung");
        assert!(value.contains("we\\u0060ird"));
    }
}
