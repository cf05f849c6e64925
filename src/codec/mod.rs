//! Kodierung der Blasen-Spec als Attribut-Wert am Content-Bereich.
//!
//! Das Format ist JSON, in dem alle `"` durch Backticks ersetzt sind, damit
//! der Wert ohne Escaping in einem Markup-Attribut stehen kann. Wörtliche
//! Backticks werden vorher als ``` maskiert, die Ersetzung ist damit
//! umkehrbar.

pub mod parser;
pub mod writer;

pub use parser::{decode_bubble_spec, read_bubble_spec};
pub use writer::{encode_bubble_spec, write_bubble_spec};

use thiserror::Error;

/// Name des Attributs, in dem die Spec gespeichert wird.
pub const BUBBLE_ATTRIBUTE: &str = "data-bubble";
/// Platzhalter für `"` im Attribut-Wert.
pub(crate) const QUOTE_PLACEHOLDER: char = '`';
/// JSON-Escape für wörtliche Backticks.
pub(crate) const ESCAPED_BACKTICK: &str = "\\u0060";

/// Fehler beim Kodieren oder Dekodieren einer Spec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Attribut-Wert ist kein gültiges Spec-JSON
    #[error("Ungültige Blasen-Spec: {0}")]
    MalformedSpec(#[source] serde_json::Error),
    /// Serialisierung fehlgeschlagen
    #[error("Blasen-Spec konnte nicht serialisiert werden: {0}")]
    Encode(#[source] serde_json::Error),
}
