//! Comic-Blasen-Editor (Kommandozeile).
//!
//! Liest eine Oberflächen-Beschreibung (JSON), baut alle Blasen auf und
//! schreibt die Szene als SVG.
//!
//! Aufruf: `comic-bubbles <oberflaeche.json> [ausgabe.svg]`

use anyhow::{bail, Context, Result};
use comic_bubbles::app::{InMemorySurface, SurfaceDocument, SurfaceId};
use comic_bubbles::{EditorOptions, EditorRegistry};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Comic-Blasen-Editor v{} startet...", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("Aufruf: comic-bubbles <oberflaeche.json> [ausgabe.svg]");
    };
    let output = args.next().map(PathBuf::from);

    // Optionen aus TOML laden (oder Standardwerte)
    let options = EditorOptions::load_from_file(&EditorOptions::config_path());

    let svg = run_session(&input, options)?;
    match output {
        Some(path) => {
            std::fs::write(&path, svg)
                .with_context(|| format!("SVG nicht geschrieben: {}", path.display()))?;
            log::info!("SVG geschrieben nach: {}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}

/// Eine Bearbeitungssitzung: Oberfläche laden, aufbauen, exportieren.
fn run_session(input: &Path, options: EditorOptions) -> Result<String> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Oberfläche nicht lesbar: {}", input.display()))?;
    let document: SurfaceDocument = serde_json::from_str(&content)
        .with_context(|| format!("Ungültige Oberflächen-Beschreibung: {}", input.display()))?;
    let surface = InMemorySurface::from_document(&document)?;

    let mut registry = EditorRegistry::new(options)?;
    let id = SurfaceId(0);
    registry.start_editing(id, surface)?;

    if let Some(container) = registry.container(id) {
        for content in container.pending_layout() {
            log::warn!("{} hat keine Größe und wird nicht gezeichnet", content);
        }
    }

    let stopped = registry
        .stop_editing(id)
        .context("Oberfläche war nicht im Bearbeitungsmodus")?;
    stopped
        .svg
        .with_context(|| format!("Keine Blasen in {}", input.display()))
}
