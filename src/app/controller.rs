//! Interaction-Controller: verbindet Karten-Interaktionen mit WFS-T-Transaktionen.

use super::drawing::{DrawingModeState, Interaction};
use super::intent_mapping::map_intent_to_commands;
use super::{
    ArmState, DeleteOutcome, DirtyTracker, EditCommand, EditIntent, EditOutcome, InsertOutcome,
    InteractionArena, IntentReceiver, TransactionLog, TransactionRecord, TransactionResult,
    UpdateOutcome,
};
use crate::core::{
    FeatureEdit, FeatureKey, Geometry, LayerTransactionConfig, Properties, VectorLayer,
};
use crate::shared::{EditError, EditorOptions, RELOAD_SENTINEL};
use crate::transport::TransactionClient;
use crate::xml::{self, TransactionKind, TransactionOutcome, TransactionRequest};
use indexmap::IndexMap;

/// Besitzt Layer, Interaktionen und Dirty-Tracker und führt Transaktionen aus.
///
/// Alle Operationen laufen sequentiell über `&mut self`; innerhalb einer
/// Geste gilt strikt encode → send → decode → anwenden. Der Layer-Cache wird
/// erst verändert, wenn das Ergebnis der Transaktion feststeht.
pub struct InteractionController<C> {
    client: C,
    layers: IndexMap<String, VectorLayer>,
    current_layer: Option<String>,
    interactions: InteractionArena,
    dirty: DirtyTracker,
    log: TransactionLog,
    reload_sentinel: String,
}

impl<C: TransactionClient> InteractionController<C> {
    /// Erstellt einen Controller ohne Layer.
    pub fn new(client: C) -> Self {
        Self {
            client,
            layers: IndexMap::new(),
            current_layer: None,
            interactions: InteractionArena::new(),
            dirty: DirtyTracker::new(),
            log: TransactionLog::new(),
            reload_sentinel: RELOAD_SENTINEL.to_string(),
        }
    }

    /// Erstellt einen Controller mit den konfigurierten Layern.
    pub fn with_options(client: C, options: &EditorOptions) -> Self {
        let mut controller = Self::new(client);
        controller.reload_sentinel = options.reload_sentinel.clone();
        for layer in options.build_layers() {
            controller.add_layer(layer);
        }
        controller
    }

    // === Zugriff ===

    /// Registriert einen Layer (ersetzt einen gleichnamigen).
    pub fn add_layer(&mut self, layer: VectorLayer) {
        log::info!(
            "Layer '{}' registriert (bearbeitbar: {})",
            layer.id,
            layer.transaction_config().is_some()
        );
        self.layers.insert(layer.id.clone(), layer);
    }

    pub fn layer(&self, layer_id: &str) -> Option<&VectorLayer> {
        self.layers.get(layer_id)
    }

    pub fn layers(&self) -> impl Iterator<Item = &VectorLayer> {
        self.layers.values()
    }

    /// Aktuell ausgewählter Layer.
    pub fn current_layer(&self) -> Option<&str> {
        self.current_layer.as_deref()
    }

    /// Aktuell scharf geschaltete Interaktions-Gruppe.
    pub fn arm_state(&self) -> &ArmState {
        self.interactions.state()
    }

    pub fn interactions(&self) -> &InteractionArena {
        &self.interactions
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    /// Dirty-Flag eines Features im Layer-Cache, abgeleitet aus dem Tracker.
    pub fn is_feature_dirty(&self, layer_id: &str, key: FeatureKey) -> bool {
        self.layers
            .get(layer_id)
            .and_then(|layer| layer.source.get(key))
            .is_some_and(|feature| self.dirty.is_dirty(layer_id, &feature.id))
    }

    pub fn transaction_log(&self) -> &TransactionLog {
        &self.log
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn transaction_config(&self, layer_id: &str) -> Result<&LayerTransactionConfig, EditError> {
        let layer = self
            .layers
            .get(layer_id)
            .ok_or_else(|| EditError::UnknownLayer(layer_id.to_string()))?;
        layer
            .transaction_config()
            .ok_or_else(|| EditError::LayerNotEditable(layer_id.to_string()))
    }

    /// Wählt den Layer aus, auf den sich Intents ohne Layer-ID beziehen.
    pub fn select_layer(&mut self, layer_id: &str) -> Result<(), EditError> {
        self.transaction_config(layer_id)?;
        if self.current_layer.as_deref() != Some(layer_id) {
            log::info!("Layer '{}' ausgewählt", layer_id);
            self.current_layer = Some(layer_id.to_string());
        }
        Ok(())
    }

    /// Übernimmt vom Dienst geladene Features in den Layer-Cache.
    pub fn load_features(
        &mut self,
        layer_id: &str,
        features: impl IntoIterator<Item = FeatureEdit>,
    ) -> Result<Vec<FeatureKey>, EditError> {
        let layer = self
            .layers
            .get_mut(layer_id)
            .ok_or_else(|| EditError::UnknownLayer(layer_id.to_string()))?;
        let keys: Vec<FeatureKey> = features.into_iter().map(|f| layer.source.add(f)).collect();
        log::info!("{} Features in Layer '{}' geladen", keys.len(), layer_id);
        Ok(keys)
    }

    // === Interaktionen scharf schalten ===

    /// Aktiviert die (pro Layer einmal erzeugte) Draw-Interaktion.
    pub fn arm_draw(&mut self, layer_id: &str) -> Result<(), EditError> {
        let config = self.transaction_config(layer_id)?.clone();
        self.interactions.draw_for(layer_id, &config);
        self.switch_to(ArmState::Drawing {
            layer_id: layer_id.to_string(),
        });
        self.current_layer = Some(layer_id.to_string());
        Ok(())
    }

    /// Aktiviert Select + Modify auf dem Layer.
    pub fn arm_modify(&mut self, layer_id: &str) -> Result<(), EditError> {
        self.transaction_config(layer_id)?;
        let previous_layer = self.interactions.select.layer_id().map(str::to_string);
        let dropped = self.interactions.select.bind(layer_id);
        if let Some(previous_layer) = previous_layer {
            self.release_features(&previous_layer, &dropped);
        }
        self.switch_to(ArmState::Modifying {
            layer_id: layer_id.to_string(),
        });
        self.current_layer = Some(layer_id.to_string());
        Ok(())
    }

    /// Schaltet eine Interaktions-Gruppe scharf; `Idle` deaktiviert alles.
    pub fn activate(&mut self, next: ArmState) -> Result<(), EditError> {
        match next {
            ArmState::Idle => {
                self.deactivate();
                Ok(())
            }
            ArmState::Drawing { layer_id } => self.arm_draw(&layer_id),
            ArmState::Modifying { layer_id } => self.arm_modify(&layer_id),
        }
    }

    /// Deaktiviert die aktive Gruppe und liefert sie zurück.
    pub fn deactivate(&mut self) -> ArmState {
        let previous = self.interactions.deactivate();
        if previous != ArmState::Idle {
            log::info!("Interaktion deaktiviert: {:?}", previous);
        }
        previous
    }

    /// Entfernt alle Interaktionen von der Karte. Dirty-Features bleiben vorgemerkt.
    pub fn teardown(&mut self) {
        if let Some(layer_id) = self.interactions.select.layer_id().map(str::to_string) {
            let selected: Vec<FeatureKey> = self.interactions.select.selected().collect();
            self.release_features(&layer_id, &selected);
        }
        self.interactions.detach_all();
        log::info!("Alle Interaktionen entfernt");
    }

    /// Folgt dem Zeichen-Modus: Draw, Select/Modify oder nichts.
    pub fn follow_drawing_state(
        &mut self,
        state: &DrawingModeState,
    ) -> Result<ArmState, EditError> {
        let wanted = match (state.interaction, state.source_name.as_deref()) {
            (Some(Interaction::Draw), Some(source)) => ArmState::Drawing {
                layer_id: source.to_string(),
            },
            (Some(Interaction::Select | Interaction::Modify), Some(source)) => {
                ArmState::Modifying {
                    layer_id: source.to_string(),
                }
            }
            _ => ArmState::Idle,
        };
        if &wanted != self.arm_state() {
            self.activate(wanted)?;
        }
        Ok(self.arm_state().clone())
    }

    fn switch_to(&mut self, next: ArmState) {
        self.interactions.activate(next);
        log::info!("Interaktion aktiviert: {:?}", self.interactions.state());
    }

    /// Beendet die Beobachtung von Features, die ohne Deselect-Event aus der Selektion fielen.
    fn release_features(&mut self, layer_id: &str, keys: &[FeatureKey]) {
        let Some(layer) = self.layers.get(layer_id) else {
            return;
        };
        for feature in keys.iter().filter_map(|key| layer.source.get(*key)) {
            if self.dirty.on_feature_deselected(layer_id, &feature.id) {
                log::warn!(
                    "Feature '{}' hat ungespeicherte Änderungen und bleibt vorgemerkt",
                    feature.id
                );
            }
        }
    }

    // === Draw ===

    /// Verarbeitet eine fertig gezeichnete Geometrie als Insert.
    ///
    /// Nur Transport-Fehler deaktivieren die Draw-Interaktion; eine
    /// Service-Exception wird gemeldet, Draw bleibt aktiv.
    pub async fn finish_draw(
        &mut self,
        geometry: Geometry,
        properties: Properties,
    ) -> Result<InsertOutcome, EditError> {
        let ArmState::Drawing { layer_id } = self.interactions.state().clone() else {
            return Err(EditError::NoActiveInteraction);
        };
        let draw = self
            .interactions
            .draw(&layer_id)
            .ok_or(EditError::NoActiveInteraction)?;
        draw.accepts(&geometry)?;

        let mut feature = FeatureEdit::new(draw.geometry_name.clone(), geometry);
        feature.properties = properties;
        let config = self.transaction_config(&layer_id)?.clone();
        let request = TransactionRequest::insert(feature.clone(), config);

        let summary = match self.execute(&layer_id, &request).await {
            Ok(TransactionOutcome::Success(summary)) => summary,
            Ok(TransactionOutcome::ServiceException { message }) => {
                let result = TransactionResult::Rejected(message.clone());
                self.record(TransactionKind::Insert, &layer_id, "", result);
                return Err(EditError::ServiceException { message });
            }
            Err(err) => {
                let result = TransactionResult::Failed(err.to_string());
                self.record(TransactionKind::Insert, &layer_id, "", result);
                if err.is_transport() {
                    self.deactivate();
                }
                return Err(err);
            }
        };

        match summary.inserted_ids.first() {
            Some(id) if *id == self.reload_sentinel => {
                log::warn!(
                    "Dienst hat alle Features neu indiziert, Cache von Layer '{}' wird verworfen",
                    layer_id
                );
                self.record(TransactionKind::Insert, &layer_id, id, TransactionResult::Applied);
                self.discard_layer_cache(&layer_id);
                Ok(InsertOutcome::ReloadRequested { layer_id })
            }
            Some(id) => {
                let id = id.clone();
                feature.id = id.clone();
                let key = self.add_to_source(&layer_id, feature)?;
                self.record(TransactionKind::Insert, &layer_id, &id, TransactionResult::Applied);
                log::info!("Feature '{}' in Layer '{}' angelegt", id, layer_id);
                Ok(InsertOutcome::Inserted { key, id })
            }
            None => {
                let key = self.add_to_source(&layer_id, feature)?;
                self.record(TransactionKind::Insert, &layer_id, "", TransactionResult::Applied);
                log::warn!("Insert ohne zurückgegebene Feature-ID in Layer '{}'", layer_id);
                Ok(InsertOutcome::Unidentified { key })
            }
        }
    }

    fn add_to_source(
        &mut self,
        layer_id: &str,
        feature: FeatureEdit,
    ) -> Result<FeatureKey, EditError> {
        let layer = self
            .layers
            .get_mut(layer_id)
            .ok_or_else(|| EditError::UnknownLayer(layer_id.to_string()))?;
        Ok(layer.source.add(feature))
    }

    fn discard_layer_cache(&mut self, layer_id: &str) {
        let Some(layer) = self.layers.get_mut(layer_id) else {
            return;
        };
        for (_, feature) in layer.source.iter().filter(|(_, f)| f.has_id()) {
            self.dirty.forget(layer_id, &feature.id);
        }
        layer.source.clear();
        if self.interactions.select.layer_id() == Some(layer_id) {
            self.interactions.select.clear();
        }
    }

    // === Select / Modify / Update ===

    fn modifying_layer(&self) -> Result<String, EditError> {
        match self.interactions.state() {
            ArmState::Modifying { layer_id } => Ok(layer_id.clone()),
            _ => Err(EditError::NoActiveInteraction),
        }
    }

    /// Fügt ein Feature zur Selektion hinzu und beginnt die Beobachtung.
    pub fn select_feature(&mut self, key: FeatureKey) -> Result<bool, EditError> {
        let layer_id = self.modifying_layer()?;
        let feature = self
            .layers
            .get(&layer_id)
            .and_then(|layer| layer.source.get(key))
            .ok_or(EditError::UnknownFeature(key))?;
        let newly = self.interactions.select.select(key);
        if newly {
            self.dirty.on_feature_selected(&layer_id, &feature.id);
            log::debug!("Feature {:?} ('{}') selektiert", key, feature.id);
        }
        Ok(newly)
    }

    /// Übernimmt eine von Modify veränderte Geometrie. Liefert das Dirty-Flag.
    pub fn modify_geometry(
        &mut self,
        key: FeatureKey,
        geometry: Geometry,
    ) -> Result<bool, EditError> {
        let layer_id = self.modifying_layer()?;
        if !self.interactions.select.contains(key) {
            return Err(EditError::NoActiveInteraction);
        }
        let feature = self
            .layers
            .get_mut(&layer_id)
            .and_then(|layer| layer.source.get_mut(key))
            .ok_or(EditError::UnknownFeature(key))?;
        feature.geometry = Some(geometry);
        Ok(self.dirty.on_geometry_changed(&layer_id, &feature.id))
    }

    /// Entfernt ein Feature aus der Selektion; ist es dirty, folgt ein Update.
    pub async fn deselect_feature(&mut self, key: FeatureKey) -> Result<UpdateOutcome, EditError> {
        if !self.interactions.select.deselect(key) {
            log::debug!("Feature {:?} war nicht selektiert", key);
            return Ok(UpdateOutcome::Clean);
        }
        let Some(layer_id) = self.interactions.select.layer_id().map(str::to_string) else {
            return Ok(UpdateOutcome::Clean);
        };
        let Some(feature) = self
            .layers
            .get(&layer_id)
            .and_then(|layer| layer.source.get(key))
        else {
            return Ok(UpdateOutcome::Clean);
        };
        if !self.dirty.on_feature_deselected(&layer_id, &feature.id) {
            log::debug!("Feature '{}' unverändert, kein Update", feature.id);
            return Ok(UpdateOutcome::Clean);
        }
        self.send_update(&layer_id, key).await
    }

    /// Schickt erneut ein Update für jedes dirty Feature des Layers.
    pub async fn flush_dirty(
        &mut self,
        layer_id: &str,
    ) -> Result<Vec<Result<UpdateOutcome, EditError>>, EditError> {
        self.transaction_config(layer_id)?;
        let pending: Vec<FeatureKey> = self
            .layers
            .get(layer_id)
            .map(|layer| {
                layer
                    .source
                    .iter()
                    .filter(|(_, feature)| {
                        feature.has_id() && self.dirty.is_dirty(layer_id, &feature.id)
                    })
                    .map(|(key, _)| key)
                    .collect()
            })
            .unwrap_or_default();

        log::info!("{} vorgemerkte Features in Layer '{}'", pending.len(), layer_id);
        let mut results = Vec::with_capacity(pending.len());
        for key in pending {
            results.push(self.send_update(layer_id, key).await);
        }
        Ok(results)
    }

    /// Update aus einer projizierten Kopie; das Live-Feature bleibt unberührt.
    async fn send_update(
        &mut self,
        layer_id: &str,
        key: FeatureKey,
    ) -> Result<UpdateOutcome, EditError> {
        let config = self.transaction_config(layer_id)?.clone();
        let feature = self
            .layers
            .get(layer_id)
            .and_then(|layer| layer.source.get(key))
            .ok_or(EditError::UnknownFeature(key))?;
        let id = feature.id.clone();
        let request = TransactionRequest::update(feature.projected_for(&config), config);

        match self.execute(layer_id, &request).await {
            Ok(TransactionOutcome::Success(summary)) if summary.total_updated == 1 => {
                self.dirty.clear(layer_id, &id);
                self.record(TransactionKind::Update, layer_id, &id, TransactionResult::Applied);
                log::info!("Feature '{}' aktualisiert", id);
                Ok(UpdateOutcome::Updated { key, id })
            }
            Ok(TransactionOutcome::Success(summary)) => {
                let reason = format!("totalUpdated = {}", summary.total_updated);
                log::warn!(
                    "Update von '{}' nicht bestätigt ({}), bleibt vorgemerkt",
                    id,
                    reason
                );
                let result = TransactionResult::Rejected(reason.clone());
                self.record(TransactionKind::Update, layer_id, &id, result);
                Ok(UpdateOutcome::Pending { key, reason })
            }
            Ok(TransactionOutcome::ServiceException { message }) => {
                log::warn!("Update von '{}' abgelehnt: {}", id, message);
                let result = TransactionResult::Rejected(message.clone());
                self.record(TransactionKind::Update, layer_id, &id, result);
                Ok(UpdateOutcome::Pending { key, reason: message })
            }
            Err(err) => {
                let result = TransactionResult::Failed(err.to_string());
                self.record(TransactionKind::Update, layer_id, &id, result);
                Err(err)
            }
        }
    }

    // === Delete ===

    /// Löscht das einzige selektierte Feature. Bei mehr oder weniger: no-op.
    pub async fn delete_selected(&mut self, layer_id: &str) -> Result<DeleteOutcome, EditError> {
        let config = self.transaction_config(layer_id)?.clone();
        let selected = self.interactions.select.len();
        let single = self.interactions.select.selected().next();
        let key = match single {
            Some(key)
                if selected == 1 && self.interactions.select.layer_id() == Some(layer_id) =>
            {
                key
            }
            _ => {
                log::debug!("Löschen übersprungen: {} Features selektiert", selected);
                return Ok(DeleteOutcome::Skipped { selected });
            }
        };
        let feature = self
            .layers
            .get(layer_id)
            .and_then(|layer| layer.source.get(key))
            .ok_or(EditError::UnknownFeature(key))?
            .clone();
        let id = feature.id.clone();
        let request = TransactionRequest::delete(feature, config);

        match self.execute(layer_id, &request).await {
            Ok(TransactionOutcome::Success(summary)) if summary.total_deleted == 1 => {
                self.interactions.select.clear();
                if let Some(layer) = self.layers.get_mut(layer_id) {
                    layer.source.remove(key);
                }
                self.dirty.forget(layer_id, &id);
                self.record(TransactionKind::Delete, layer_id, &id, TransactionResult::Applied);
                log::info!("Feature '{}' aus Layer '{}' gelöscht", id, layer_id);
                Ok(DeleteOutcome::Deleted { key, id })
            }
            Ok(TransactionOutcome::Success(summary)) => {
                let reason = format!("totalDeleted = {}", summary.total_deleted);
                let result = TransactionResult::Rejected(reason.clone());
                self.record(TransactionKind::Delete, layer_id, &id, result);
                Err(EditError::DeleteFailed(reason))
            }
            Ok(TransactionOutcome::ServiceException { message }) => {
                let result = TransactionResult::Rejected(message.clone());
                self.record(TransactionKind::Delete, layer_id, &id, result);
                Err(EditError::DeleteFailed(message))
            }
            Err(EditError::MalformedResponse(message)) => {
                let result = TransactionResult::Failed(message.clone());
                self.record(TransactionKind::Delete, layer_id, &id, result);
                Err(EditError::DeleteFailed(message))
            }
            Err(err) => {
                let result = TransactionResult::Failed(err.to_string());
                self.record(TransactionKind::Delete, layer_id, &id, result);
                Err(err)
            }
        }
    }

    // === Transaktionen ===

    async fn execute(
        &mut self,
        layer_id: &str,
        request: &TransactionRequest,
    ) -> Result<TransactionOutcome, EditError> {
        let body = xml::encode(request)?;
        log::info!(
            "{:?} für Layer '{}' an {} ({} Bytes)",
            request.kind,
            layer_id,
            request.config.url,
            body.len()
        );
        let response = self.client.send(body, &request.config.url).await?;
        xml::decode(&response)
    }

    fn record(
        &mut self,
        kind: TransactionKind,
        layer_id: &str,
        feature_id: &str,
        result: TransactionResult,
    ) {
        self.log.record(TransactionRecord {
            kind,
            layer_id: layer_id.to_string(),
            feature_id: feature_id.to_string(),
            result,
        });
    }

    // === Intents ===

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    ///
    /// Bricht beim ersten fehlgeschlagenen Command ab.
    pub async fn handle_intent(
        &mut self,
        intent: EditIntent,
    ) -> Result<Vec<EditOutcome>, EditError> {
        let commands = map_intent_to_commands(self.current_layer.as_deref(), intent);
        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            outcomes.push(self.handle_command(command).await?);
        }
        Ok(outcomes)
    }

    /// Führt einen mutierenden Command aus.
    pub async fn handle_command(&mut self, command: EditCommand) -> Result<EditOutcome, EditError> {
        match command {
            EditCommand::SelectLayer { layer_id } => {
                self.select_layer(&layer_id)?;
                Ok(EditOutcome::LayerSelected { layer_id })
            }
            EditCommand::ArmDraw { layer_id } => {
                self.arm_draw(&layer_id)?;
                Ok(EditOutcome::Armed(self.arm_state().clone()))
            }
            EditCommand::ArmModify { layer_id } => {
                self.arm_modify(&layer_id)?;
                Ok(EditOutcome::Armed(self.arm_state().clone()))
            }
            EditCommand::DeleteSelected { layer_id } => {
                self.delete_selected(&layer_id).await.map(EditOutcome::Deleted)
            }
            EditCommand::Deactivate => {
                self.deactivate();
                Ok(EditOutcome::Armed(ArmState::Idle))
            }
            EditCommand::LoadFeatures { layer_id, features } => {
                self.load_features(&layer_id, features).map(EditOutcome::Loaded)
            }
            EditCommand::FinishDraw {
                geometry,
                properties,
            } => self
                .finish_draw(geometry, properties)
                .await
                .map(EditOutcome::Inserted),
            EditCommand::SelectFeature { key } => self
                .select_feature(key)
                .map(|newly| EditOutcome::Selected { key, newly }),
            EditCommand::ModifyGeometry { key, geometry } => self
                .modify_geometry(key, geometry)
                .map(|dirty| EditOutcome::Modified { key, dirty }),
            EditCommand::DeselectFeature { key } => {
                self.deselect_feature(key).await.map(EditOutcome::Updated)
            }
            EditCommand::FlushDirty { layer_id } => {
                self.flush_dirty(&layer_id).await.map(EditOutcome::Flushed)
            }
        }
    }

    /// Arbeitet alle wartenden Intents der Queue in Reihenfolge ab.
    pub async fn process_pending(
        &mut self,
        queue: &mut IntentReceiver,
    ) -> Vec<Result<Vec<EditOutcome>, EditError>> {
        let mut results = Vec::new();
        while let Some(intent) = queue.try_next() {
            results.push(self.handle_intent(intent).await);
        }
        results
    }
}
