//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält die Editor-Optionen, die von `core`-Darstellung, `app` und der
//! Binary gemeinsam genutzt werden.

pub mod options;

pub use options::EditorOptions;
pub use options::{ARC_FLATTEN_STEPS, HANDLE_COLOR, HANDLE_RADIUS};
