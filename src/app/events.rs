//! EditIntent-, EditCommand- und Outcome-Typen für den Intent/Command-Datenfluss.

use super::ArmState;
use crate::core::{FeatureKey, Geometry, Properties};
use crate::shared::EditError;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Eingaben aus Host-Oberfläche oder Karten-Engine.
///
/// Intents enthalten keine Mutationslogik; fehlende Layer-IDs werden beim
/// Mapping mit dem aktuell ausgewählten Layer belegt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent")]
pub enum EditIntent {
    /// Layer im Layer-Baum ausgewählt
    LayerSelected { layer_id: String },
    /// Zeichnen auf einem Layer starten
    DrawRequested {
        #[serde(default)]
        layer_id: Option<String>,
    },
    /// Select + Modify auf einem Layer starten
    ModifyRequested {
        #[serde(default)]
        layer_id: Option<String>,
    },
    /// Selektiertes Feature löschen
    DeleteRequested {
        #[serde(default)]
        layer_id: Option<String>,
    },
    /// Alle Interaktionen abschalten
    DeactivateRequested,
    /// Vom Server geladene Features in den Layer-Cache übernehmen
    FeaturesLoaded {
        layer_id: String,
        features: Vec<crate::core::FeatureEdit>,
    },
    /// Draw-Interaktion hat eine Geometrie fertiggestellt
    DrawFinished {
        geometry: Geometry,
        #[serde(default)]
        properties: Properties,
    },
    /// Select-Interaktion hat ein Feature hinzugefügt
    FeatureSelected { key: FeatureKey },
    /// Modify-Interaktion hat eine Geometrie verändert
    GeometryModified { key: FeatureKey, geometry: Geometry },
    /// Select-Interaktion hat ein Feature entfernt
    FeatureDeselected { key: FeatureKey },
    /// Alle dirty Features eines Layers erneut speichern
    FlushRequested {
        #[serde(default)]
        layer_id: Option<String>,
    },
}

/// Aufgelöste, mutierende Commands.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    SelectLayer { layer_id: String },
    ArmDraw { layer_id: String },
    ArmModify { layer_id: String },
    DeleteSelected { layer_id: String },
    Deactivate,
    LoadFeatures {
        layer_id: String,
        features: Vec<crate::core::FeatureEdit>,
    },
    FinishDraw {
        geometry: Geometry,
        properties: Properties,
    },
    SelectFeature { key: FeatureKey },
    ModifyGeometry { key: FeatureKey, geometry: Geometry },
    DeselectFeature { key: FeatureKey },
    FlushDirty { layer_id: String },
}

/// Ergebnis eines abgeschlossenen Zeichenvorgangs.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// Feature liegt im Cache und trägt die Server-ID
    Inserted { key: FeatureKey, id: String },
    /// Server meldete die Reload-ID; der Layer-Cache wurde geleert
    ReloadRequested { layer_id: String },
    /// Erfolg ohne `InsertResults`; Feature liegt ohne ID im Cache
    Unidentified { key: FeatureKey },
}

/// Ergebnis einer Deselektion.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Keine Änderungen, kein Request
    Clean,
    /// Update bestätigt, Dirty-Flag zurückgesetzt
    Updated { key: FeatureKey, id: String },
    /// Update nicht bestätigt, Feature bleibt dirty
    Pending { key: FeatureKey, reason: String },
}

/// Ergebnis einer Lösch-Anfrage.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Nicht genau ein Feature selektiert: nichts passiert
    Skipped { selected: usize },
    /// Feature gelöscht und aus Cache und Selektion entfernt
    Deleted { key: FeatureKey, id: String },
}

/// Ergebnis eines verarbeiteten Commands.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Aktiver Layer gewechselt
    LayerSelected { layer_id: String },
    /// Neue Interaktions-Gruppe
    Armed(ArmState),
    Loaded(Vec<FeatureKey>),
    Inserted(InsertOutcome),
    Selected { key: FeatureKey, newly: bool },
    Modified { key: FeatureKey, dirty: bool },
    Updated(UpdateOutcome),
    Deleted(DeleteOutcome),
    Flushed(Vec<Result<UpdateOutcome, EditError>>),
}

/// Sendeseite der Intent-Queue. Kann beliebig geklont werden.
#[derive(Debug, Clone)]
pub struct IntentSender(mpsc::UnboundedSender<EditIntent>);

impl IntentSender {
    /// Stellt einen Intent ein. `false`, wenn der Empfänger nicht mehr existiert.
    pub fn publish(&self, intent: EditIntent) -> bool {
        self.0.send(intent).is_ok()
    }
}

/// Empfangsseite der Intent-Queue; gehört dem Controller-Besitzer.
#[derive(Debug)]
pub struct IntentReceiver(mpsc::UnboundedReceiver<EditIntent>);

impl IntentReceiver {
    /// Nächster wartender Intent ohne zu blockieren.
    pub fn try_next(&mut self) -> Option<EditIntent> {
        self.0.try_recv().ok()
    }
}

/// Erzeugt eine unbeschränkte Intent-Queue.
pub fn intent_channel() -> (IntentSender, IntentReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IntentSender(tx), IntentReceiver(rx))
}
