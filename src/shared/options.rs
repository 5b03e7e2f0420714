//! Zentrale Konfiguration des Vektor-Editors.
//!
//! `EditorOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Snapping ────────────────────────────────────────────────────────

/// Snap-Radius (Welteinheiten): Cursor innerhalb dieses Radius rastet ein.
pub const SNAP_RADIUS: f64 = 3.0;
/// Gitterweite für Grid-Snapping (Welteinheiten).
pub const GRID_SIZE: f64 = 1.0;
/// Dürfen Vertices/Kanten der gerade gezeichneten Shape Snap-Ziele sein?
pub const INCLUDE_EDITING_SHAPE: bool = false;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Editor-Optionen.
/// Wird als `gis_vector_edit.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorOptions {
    /// Snap-Radius in Welteinheiten
    pub snap_radius: f64,
    /// Gitterweite für Grid-Snapping in Welteinheiten
    pub grid_size: f64,
    /// Eigene Shape als Snap-Ziel einbeziehen (Ring-Schließen)
    #[serde(default)]
    pub include_editing_shape: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            snap_radius: SNAP_RADIUS,
            grid_size: GRID_SIZE,
            include_editing_shape: INCLUDE_EDITING_SHAPE,
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
            .unwrap_or_else(|_| std::path::PathBuf::from("gis_vector_edit"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("gis_vector_edit.toml")
    }
}
