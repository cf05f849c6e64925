//! Zentrale Konfiguration des Blasen-Editors.
//!
//! `EditorOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use crate::core::geometry::TAIL_BASE_WIDTH;
use crate::core::tail::TailPaint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Linien & Füllung ────────────────────────────────────────────────

/// Linienfarbe von Umrissen und Schwänzen (RGBA: Schwarz).
pub const STROKE_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
/// Linienstärke von Umrissen und Schwänzen.
pub const STROKE_WIDTH: f32 = 1.0;
/// Füllfarbe ohne Hintergrundfarbe in der Spec (RGBA: Weiß).
pub const DEFAULT_FILL_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

// ── Handles ─────────────────────────────────────────────────────────

/// Radius der Drag-Handles.
pub const HANDLE_RADIUS: f32 = 5.0;
/// Farbe der Drag-Handles (RGBA: #1d94a4).
pub const HANDLE_COLOR: [f32; 4] = [29.0 / 255.0, 148.0 / 255.0, 164.0 / 255.0, 1.0];

// ── Layout & Trefferprüfung ─────────────────────────────────────────

/// Mindestabstand zwischen zwei Platzierungsversuchen (ms).
pub const LAYOUT_RETRY_INTERVAL_MS: u64 = 100;
/// Stützpunkte pro Kreisbogen bei Trefferprüfung und Bounds.
pub const ARC_FLATTEN_STEPS: usize = 16;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Editor-Optionen.
/// Wird als `comic_bubbles.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    // ── Schwänze ────────────────────────────────────────────────
    /// Breite der Schwanz-Basis
    pub tail_base_width: f32,

    // ── Linien & Füllung ────────────────────────────────────────
    pub stroke_color: [f32; 4],
    pub stroke_width: f32,
    /// Füllfarbe, wenn die Spec keine Hintergrundfarbe hat
    pub default_fill_color: [f32; 4],

    // ── Handles ─────────────────────────────────────────────────
    pub handle_radius: f32,
    pub handle_color: [f32; 4],

    // ── Layout ──────────────────────────────────────────────────
    /// Mindestabstand zwischen Platzierungsversuchen für Inhalte ohne Größe
    pub layout_retry_interval_ms: u64,
    /// Stützpunkte pro Kreisbogen (Trefferprüfung)
    pub arc_flatten_steps: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            tail_base_width: TAIL_BASE_WIDTH,

            stroke_color: STROKE_COLOR,
            stroke_width: STROKE_WIDTH,
            default_fill_color: DEFAULT_FILL_COLOR,

            handle_radius: HANDLE_RADIUS,
            handle_color: HANDLE_COLOR,

            layout_retry_interval_ms: LAYOUT_RETRY_INTERVAL_MS,
            arc_flatten_steps: ARC_FLATTEN_STEPS,
        }
    }
}

impl EditorOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("comic-bubbles"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("comic_bubbles.toml")
    }

    /// Mindestabstand zwischen Platzierungsversuchen.
    pub fn layout_retry_interval(&self) -> Duration {
        Duration::from_millis(self.layout_retry_interval_ms)
    }

    /// Schwanz-Darstellung mit der Standard-Füllfarbe.
    pub fn tail_paint(&self) -> TailPaint {
        TailPaint {
            base_width: self.tail_base_width,
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            fill_color: self.default_fill_color,
            handle_color: self.handle_color,
            handle_radius: self.handle_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let opts: EditorOptions =
            toml::from_str("tail_base_width = 40.0\n").expect("gültiges TOML");
        assert_eq!(opts.tail_base_width, 40.0);
        assert_eq!(opts.handle_radius, HANDLE_RADIUS);
        assert_eq!(opts.layout_retry_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "comic_bubbles_options_test_{}.toml",
            std::process::id()
        ));
        let opts = EditorOptions {
            stroke_width: 2.5,
            arc_flatten_steps: 32,
            ..EditorOptions::default()
        };
        opts.save_to_file(&path).expect("Speichern");
        let loaded = EditorOptions::load_from_file(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, opts);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let loaded = EditorOptions::load_from_file(std::path::Path::new(
            "/nonexistent/comic_bubbles.toml",
        ));
        assert_eq!(loaded, EditorOptions::default());
    }
}
