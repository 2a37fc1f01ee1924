//! Aktionen des Zeichen-Modus und ihre Konstruktoren.

use super::Interaction;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Diskrete Nachricht an den Reducer.
///
/// Unbekannte `type`-Tags werden zu `Unknown` und lassen den Zustand unverändert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum DrawingAction {
    Start {
        #[serde(default)]
        interaction: Option<Interaction>,
        #[serde(default)]
        source_name: Option<String>,
        #[serde(default)]
        current_mode: Option<String>,
        #[serde(default)]
        after_mode: Option<String>,
        #[serde(default)]
        current_mode_options: Option<Value>,
        #[serde(default)]
        feature: Option<Value>,
        #[serde(default)]
        segments: Option<Vec<f64>>,
    },
    End {
        #[serde(default)]
        after_mode: Option<String>,
        #[serde(default)]
        current_mode: Option<String>,
        #[serde(default)]
        feature: Option<Value>,
        #[serde(default)]
        segments: Option<Vec<f64>>,
    },
    SetMeasureFeature {
        #[serde(default)]
        feature: Option<Value>,
        #[serde(default)]
        segments: Option<Vec<f64>>,
    },
    FinalizeMeasureFeature {
        #[serde(default)]
        feature: Option<Value>,
        #[serde(default)]
        segments: Option<Vec<f64>>,
    },
    FinishMeasureGeometry,
    ClearMeasureFeature,
    SetEditStyle {
        #[serde(default)]
        style: Option<Value>,
    },
    SetSelectStyle {
        #[serde(default)]
        style: Option<Value>,
    },
    SetModifyStyle {
        #[serde(default)]
        style: Option<Value>,
    },
    SetMeasureStyle {
        #[serde(default)]
        style: Option<Value>,
    },
    #[serde(other)]
    Unknown,
}

/// Startet eine Interaktion auf einer Source.
pub fn start_drawing(
    source_name: Option<String>,
    interaction: Option<Interaction>,
    after_mode: Option<String>,
    current_mode: Option<String>,
    current_mode_options: Option<Value>,
    feature: Option<Value>,
) -> DrawingAction {
    DrawingAction::Start {
        interaction,
        source_name,
        current_mode,
        after_mode,
        current_mode_options,
        feature,
        segments: None,
    }
}

/// Startet Modify für ein Feature.
pub fn start_modify(
    source_name: impl Into<String>,
    after_mode: Option<String>,
    current_mode: Option<String>,
    feature: Option<Value>,
) -> DrawingAction {
    start_drawing(
        Some(source_name.into()),
        Some(Interaction::Modify),
        after_mode,
        current_mode,
        None,
        feature,
    )
}

/// Startet die Selektion auf einer Source.
pub fn start_select(source_name: impl Into<String>) -> DrawingAction {
    start_drawing(Some(source_name.into()), Some(Interaction::Select), None, None, None, None)
}

/// Startet eine Messung (ohne Source).
pub fn start_measure(interaction: Interaction) -> DrawingAction {
    start_drawing(None, Some(interaction), None, None, None, None)
}

/// Beendet die aktive Interaktion.
pub fn end_drawing(after_mode: Option<String>) -> DrawingAction {
    DrawingAction::End {
        after_mode,
        current_mode: None,
        feature: None,
        segments: None,
    }
}

pub fn end_modify(after_mode: Option<String>) -> DrawingAction {
    end_drawing(after_mode)
}

pub fn end_select() -> DrawingAction {
    end_drawing(None)
}

/// Aktualisiert die laufende Messung.
pub fn set_measure_feature(feature: Option<Value>, segments: Option<Vec<f64>>) -> DrawingAction {
    DrawingAction::SetMeasureFeature { feature, segments }
}

/// Schließt die laufende Messung ab und legt sie in die Historie.
pub fn finalize_measure_feature(
    feature: Option<Value>,
    segments: Option<Vec<f64>>,
) -> DrawingAction {
    DrawingAction::FinalizeMeasureFeature { feature, segments }
}

pub fn finish_measure_geometry() -> DrawingAction {
    DrawingAction::FinishMeasureGeometry
}

/// Verwirft laufende Messung und Historie.
pub fn clear_measure_feature() -> DrawingAction {
    DrawingAction::ClearMeasureFeature
}

pub fn set_edit_style(style: Value) -> DrawingAction {
    DrawingAction::SetEditStyle { style: Some(style) }
}

pub fn set_select_style(style: Value) -> DrawingAction {
    DrawingAction::SetSelectStyle { style: Some(style) }
}

pub fn set_modify_style(style: Value) -> DrawingAction {
    DrawingAction::SetModifyStyle { style: Some(style) }
}

pub fn set_measure_style(style: Value) -> DrawingAction {
    DrawingAction::SetMeasureStyle { style: Some(style) }
}
