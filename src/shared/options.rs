//! Zentrale Konfiguration für den WFS-T-Editor.
//!
//! `EditorOptions` wird als TOML neben der Binary gelesen. Die `const`-Werte
//! bleiben als Fallback/Default erhalten.

use crate::core::{LayerTransactionConfig, VectorLayer};
use serde::{Deserialize, Serialize};

// ── Transaktionen ───────────────────────────────────────────────────

/// Insert-ID, mit der ein Shapefile-Store meldet, dass er alle Features neu indiziert hat.
pub const RELOAD_SENTINEL: &str = "new0";
/// Standard-`srsName` für GML-Geometrien (Web-Mercator).
pub const DEFAULT_SRS_NAME: &str = "EPSG:3857";
/// Timeout eines einzelnen WFS-T-POST in Sekunden.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// ── Layer ───────────────────────────────────────────────────────────

/// Konfiguration eines Layers, wie sie in der TOML-Datei steht.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerOptions {
    /// Layer-ID (= Source-Name)
    pub id: String,
    /// Anzeigename (Standard: ID)
    #[serde(default)]
    pub title: Option<String>,
    /// Bearbeitbar über WFS-T
    #[serde(default)]
    pub editable: bool,
    /// WFS-T-Konfiguration
    #[serde(default)]
    pub wfs: Option<LayerTransactionConfig>,
}

impl LayerOptions {
    /// Baut einen leeren Vektor-Layer aus der Konfiguration.
    ///
    /// Ein fehlender Layer-`srs_name` wird mit `default_srs` belegt.
    pub fn to_layer(&self, default_srs: &str) -> VectorLayer {
        let wfs = self.wfs.clone().map(|mut config| {
            if config.srs_name.is_none() {
                config.srs_name = Some(default_srs.to_string());
            }
            config
        });
        VectorLayer {
            id: self.id.clone(),
            title: self.title.clone().unwrap_or_else(|| self.id.clone()),
            editable: self.editable,
            wfs,
            source: Default::default(),
        }
    }
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Editor-Optionen.
/// Wird als `wfst_editor.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorOptions {
    /// `srsName` für Geometrien ohne Layer-eigenen Wert
    #[serde(default = "default_srs_name")]
    pub srs_name: String,
    /// Timeout pro Transaktion in Sekunden
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Insert-ID, die ein Neuladen des Layers auslöst
    #[serde(default = "default_reload_sentinel")]
    pub reload_sentinel: String,
    /// Konfigurierte Layer
    #[serde(default)]
    pub layers: Vec<LayerOptions>,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            srs_name: DEFAULT_SRS_NAME.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            reload_sentinel: RELOAD_SENTINEL.to_string(),
            layers: Vec::new(),
        }
    }
}

fn default_srs_name() -> String {
    DEFAULT_SRS_NAME.to_string()
}

fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_reload_sentinel() -> String {
    RELOAD_SENTINEL.to_string()
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

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("wfst_editor"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("wfst_editor.toml")
    }

    /// Baut alle konfigurierten Layer.
    pub fn build_layers(&self) -> Vec<VectorLayer> {
        self.layers
            .iter()
            .map(|layer| layer.to_layer(&self.srs_name))
            .collect()
    }

    /// Timeout als `Duration`.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
