//! Mapping von Edit-Intents auf mutierende Edit-Commands.

use super::{EditCommand, EditIntent};

/// Übersetzt einen `EditIntent` in eine Sequenz ausführbarer `EditCommand`s.
///
/// Intents ohne Layer-ID beziehen sich auf `current_layer`. Ist keiner
/// ausgewählt, entsteht kein Command. Eine explizite, abweichende Layer-ID
/// wählt den Layer vorher aus.
pub fn map_intent_to_commands(current_layer: Option<&str>, intent: EditIntent) -> Vec<EditCommand> {
    match intent {
        EditIntent::LayerSelected { layer_id } => vec![EditCommand::SelectLayer { layer_id }],
        EditIntent::DrawRequested { layer_id } => {
            with_layer(current_layer, layer_id, |layer_id| EditCommand::ArmDraw { layer_id })
        }
        EditIntent::ModifyRequested { layer_id } => {
            with_layer(current_layer, layer_id, |layer_id| EditCommand::ArmModify { layer_id })
        }
        EditIntent::DeleteRequested { layer_id } => {
            with_layer(current_layer, layer_id, |layer_id| EditCommand::DeleteSelected {
                layer_id,
            })
        }
        EditIntent::FlushRequested { layer_id } => {
            with_layer(current_layer, layer_id, |layer_id| EditCommand::FlushDirty { layer_id })
        }
        EditIntent::DeactivateRequested => vec![EditCommand::Deactivate],
        EditIntent::FeaturesLoaded { layer_id, features } => {
            vec![EditCommand::LoadFeatures { layer_id, features }]
        }
        EditIntent::DrawFinished {
            geometry,
            properties,
        } => vec![EditCommand::FinishDraw {
            geometry,
            properties,
        }],
        EditIntent::FeatureSelected { key } => vec![EditCommand::SelectFeature { key }],
        EditIntent::GeometryModified { key, geometry } => {
            vec![EditCommand::ModifyGeometry { key, geometry }]
        }
        EditIntent::FeatureDeselected { key } => vec![EditCommand::DeselectFeature { key }],
    }
}

fn with_layer(
    current_layer: Option<&str>,
    requested: Option<String>,
    command: impl FnOnce(String) -> EditCommand,
) -> Vec<EditCommand> {
    match (requested, current_layer) {
        (Some(layer_id), Some(current)) if layer_id == current => vec![command(layer_id)],
        (Some(layer_id), _) => vec![
            EditCommand::SelectLayer {
                layer_id: layer_id.clone(),
            },
            command(layer_id),
        ],
        (None, Some(current)) => vec![command(current.to_string())],
        (None, None) => {
            log::warn!("Kein Layer ausgewählt, Intent wird ignoriert");
            Vec::new()
        }
    }
}
