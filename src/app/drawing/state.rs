//! Zustand des Zeichen-/Mess-Modus.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Welche Interaktion der Modus anfordert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interaction {
    /// Explizit keine Interaktion
    #[serde(rename = "none")]
    Inactive,
    Draw,
    Select,
    Modify,
    MeasurePoint,
    MeasureLine,
    MeasurePolygon,
}

/// Abgeschlossene Messung: Geometrie und Teilstrecken bzw. Teilflächen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredFeature {
    pub feature: Option<Value>,
    pub segments: Option<Vec<f64>>,
}

/// Zustand des Zeichen-Modus.
///
/// Modi, Optionen, Features und Styles sind für den Kern opake Werte.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingModeState {
    /// Angeforderte Interaktion (None = idle)
    pub interaction: Option<Interaction>,
    /// Ziel-Source der Interaktion
    pub source_name: Option<String>,
    /// Feature, das gerade bearbeitet wird
    pub feature: Option<Value>,
    pub current_mode: Option<String>,
    pub after_mode: Option<String>,
    pub current_mode_options: Option<Value>,
    /// Laufende Messung
    pub measure_feature: Option<Value>,
    pub measure_segments: Option<Vec<f64>>,
    pub measure_done: bool,
    pub measure_finish_geometry: bool,
    /// Abgeschlossene Messungen, neueste zuerst
    pub measured_features: Vec<MeasuredFeature>,
    pub edit_style: Option<Value>,
    pub select_style: Option<Value>,
    pub modify_style: Option<Value>,
    pub measure_style: Option<Value>,
}
