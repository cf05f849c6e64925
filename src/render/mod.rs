//! Retained Szene der Blasen und ihr Export als statisches SVG.

pub mod scene;
pub mod svg_export;

pub use scene::{Layer, LayerId, Scene, Shape, ShapeGeometry, ShapeId};
pub use svg_export::export_svg;
