//! Reiner Reducer des Zeichen-Modus.

use super::{DrawingAction, DrawingModeState, MeasuredFeature};

/// Berechnet den Folgezustand. Total und ohne Seiteneffekte.
pub fn reduce(state: &DrawingModeState, action: &DrawingAction) -> DrawingModeState {
    let mut next = state.clone();
    match action {
        DrawingAction::Start {
            interaction,
            source_name,
            current_mode,
            after_mode,
            current_mode_options,
            feature,
            segments,
        } => {
            next.interaction = *interaction;
            next.source_name = source_name.clone();
            next.current_mode = current_mode.clone();
            next.after_mode = after_mode.clone();
            next.current_mode_options = current_mode_options.clone();
            next.measure_done = false;
            next.measure_feature = feature.clone();
            next.measure_segments = segments.clone();
            next.feature = feature.clone();
        }
        DrawingAction::End {
            after_mode,
            current_mode,
            feature,
            segments,
        } => {
            next.interaction = None;
            next.source_name = None;
            next.current_mode_options = None;
            next.current_mode = current_mode.clone();
            next.after_mode = after_mode.clone();
            next.measure_done = false;
            next.measure_feature = feature.clone();
            next.measure_segments = segments.clone();
        }
        DrawingAction::SetMeasureFeature { feature, segments } => {
            next.measure_done = false;
            next.measure_feature = feature.clone();
            next.measure_segments = segments.clone();
        }
        DrawingAction::FinalizeMeasureFeature { feature, segments } => {
            next.measure_done = true;
            next.measure_finish_geometry = false;
            next.measure_feature = feature.clone();
            next.measure_segments = segments.clone();
            next.measured_features.insert(
                0,
                MeasuredFeature {
                    feature: feature.clone(),
                    segments: segments.clone(),
                },
            );
        }
        DrawingAction::FinishMeasureGeometry => next.measure_finish_geometry = true,
        DrawingAction::ClearMeasureFeature => {
            next.measure_feature = None;
            next.measure_segments = None;
            next.measure_done = false;
            next.measured_features.clear();
        }
        DrawingAction::SetEditStyle { style } => next.edit_style = style.clone(),
        DrawingAction::SetSelectStyle { style } => next.select_style = style.clone(),
        DrawingAction::SetModifyStyle { style } => next.modify_style = style.clone(),
        DrawingAction::SetMeasureStyle { style } => next.measure_style = style.clone(),
        DrawingAction::Unknown => {}
    }
    next
}
