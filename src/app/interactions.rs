//! Karten-Interaktionen und ihre Arena.
//!
//! Draw-Interaktionen werden pro Layer einmal erzeugt und danach
//! wiederverwendet. Select und Modify gibt es genau einmal; sie arbeiten
//! immer zusammen.

use crate::core::{FeatureKey, Geometry, GeometryType, LayerTransactionConfig};
use crate::shared::EditError;
use indexmap::{IndexMap, IndexSet};

/// Art einer Karten-Interaktion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// Zeichnet neue Features
    Draw,
    /// Selektiert bestehende Features
    Select,
    /// Verändert Geometrien selektierter Features
    Modify,
}

/// Gemeinsame Schnittstelle der Interaktionen, die auf der Karte hängen.
pub trait MapInteraction {
    /// Art der Interaktion.
    fn kind(&self) -> InteractionKind;
    /// Ob die Interaktion gerade auf der Karte aktiv ist.
    fn is_active(&self) -> bool;
    /// Aktiviert bzw. deaktiviert die Interaktion.
    fn set_active(&mut self, active: bool);
}

/// Zeichen-Interaktion für einen Layer.
#[derive(Debug, Clone)]
pub struct DrawInteraction {
    /// Ziel-Layer
    pub layer_id: String,
    /// Erwarteter Geometrietyp
    pub geometry_type: GeometryType,
    /// Attributname, unter dem neue Features ihre Geometrie tragen
    pub geometry_name: String,
    active: bool,
}

impl DrawInteraction {
    fn new(layer_id: &str, config: &LayerTransactionConfig) -> Self {
        Self {
            layer_id: layer_id.to_string(),
            geometry_type: config.geometry_type,
            geometry_name: config.geometry_name.clone(),
            active: false,
        }
    }

    /// Prüft, ob eine fertig gezeichnete Geometrie zum Layer passt.
    pub fn accepts(&self, geometry: &Geometry) -> Result<(), EditError> {
        let actual = geometry.geometry_type();
        if actual == self.geometry_type {
            Ok(())
        } else {
            Err(EditError::GeometryMismatch {
                expected: self.geometry_type,
                actual,
            })
        }
    }
}

impl MapInteraction for DrawInteraction {
    fn kind(&self) -> InteractionKind {
        InteractionKind::Draw
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Selektions-Interaktion mit der Menge selektierter Features.
#[derive(Debug, Default)]
pub struct SelectInteraction {
    layer_id: Option<String>,
    selected: IndexSet<FeatureKey>,
    active: bool,
}

impl SelectInteraction {
    /// Layer, auf dem selektiert wird.
    pub fn layer_id(&self) -> Option<&str> {
        self.layer_id.as_deref()
    }

    /// Bindet die Selektion an einen Layer. Ein Layerwechsel verwirft die Selektion.
    pub(crate) fn bind(&mut self, layer_id: &str) -> Vec<FeatureKey> {
        if self.layer_id.as_deref() == Some(layer_id) {
            return Vec::new();
        }
        self.layer_id = Some(layer_id.to_string());
        self.clear()
    }

    /// Fügt ein Feature zur Selektion hinzu. `true`, wenn es neu ist.
    pub(crate) fn select(&mut self, key: FeatureKey) -> bool {
        self.selected.insert(key)
    }

    /// Entfernt ein Feature aus der Selektion. `true`, wenn es selektiert war.
    pub(crate) fn deselect(&mut self, key: FeatureKey) -> bool {
        self.selected.shift_remove(&key)
    }

    /// Leert die Selektion und liefert die bisher selektierten Features.
    pub(crate) fn clear(&mut self) -> Vec<FeatureKey> {
        self.selected.drain(..).collect()
    }

    /// Ob ein Feature selektiert ist.
    pub fn contains(&self, key: FeatureKey) -> bool {
        self.selected.contains(&key)
    }

    /// Selektierte Features in Selektionsreihenfolge.
    pub fn selected(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.selected.iter().copied()
    }

    /// Anzahl selektierter Features.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Gibt `true` zurück, wenn nichts selektiert ist.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

impl MapInteraction for SelectInteraction {
    fn kind(&self) -> InteractionKind {
        InteractionKind::Select
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Modify-Interaktion; arbeitet auf den Features der Selektion.
#[derive(Debug, Default)]
pub struct ModifyInteraction {
    active: bool,
}

impl MapInteraction for ModifyInteraction {
    fn kind(&self) -> InteractionKind {
        InteractionKind::Modify
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Welche Interaktions-Gruppe aktuell scharf geschaltet ist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArmState {
    /// Keine Interaktion aktiv
    #[default]
    Idle,
    /// Draw-Interaktion des Layers aktiv
    Drawing {
        /// Ziel-Layer
        layer_id: String,
    },
    /// Select + Modify auf dem Layer aktiv
    Modifying {
        /// Ziel-Layer
        layer_id: String,
    },
}

impl ArmState {
    /// Layer der aktiven Gruppe.
    pub fn layer_id(&self) -> Option<&str> {
        match self {
            ArmState::Idle => None,
            ArmState::Drawing { layer_id } | ArmState::Modifying { layer_id } => Some(layer_id),
        }
    }
}

/// Besitzt alle Interaktions-Objekte; höchstens eine Gruppe ist aktiv.
#[derive(Debug, Default)]
pub struct InteractionArena {
    draws: IndexMap<String, DrawInteraction>,
    /// Selektion (geteilt von Select und Modify)
    pub select: SelectInteraction,
    modify: ModifyInteraction,
    state: ArmState,
}

impl InteractionArena {
    /// Erstellt eine leere Arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aktuell scharf geschaltete Gruppe.
    pub fn state(&self) -> &ArmState {
        &self.state
    }

    /// Liefert die Draw-Interaktion eines Layers, erzeugt sie beim ersten Zugriff.
    pub(crate) fn draw_for(
        &mut self,
        layer_id: &str,
        config: &LayerTransactionConfig,
    ) -> &mut DrawInteraction {
        self.draws.entry(layer_id.to_string()).or_insert_with(|| {
            log::debug!(
                "Draw-Interaktion für Layer '{}' erzeugt ({})",
                layer_id,
                config.geometry_type
            );
            DrawInteraction::new(layer_id, config)
        })
    }

    /// Bereits erzeugte Draw-Interaktion eines Layers.
    pub fn draw(&self, layer_id: &str) -> Option<&DrawInteraction> {
        self.draws.get(layer_id)
    }

    /// Anzahl erzeugter Draw-Interaktionen.
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Schaltet eine Gruppe scharf; die vorherige wird vorher deaktiviert.
    pub(crate) fn activate(&mut self, next: ArmState) {
        self.deactivate();
        match &next {
            ArmState::Idle => {}
            ArmState::Drawing { layer_id } => {
                if let Some(draw) = self.draws.get_mut(layer_id) {
                    draw.set_active(true);
                }
            }
            ArmState::Modifying { .. } => {
                self.select.set_active(true);
                self.modify.set_active(true);
            }
        }
        self.state = next;
    }

    /// Deaktiviert die aktive Gruppe. Die Selektion bleibt erhalten.
    pub(crate) fn deactivate(&mut self) -> ArmState {
        for draw in self.draws.values_mut() {
            draw.set_active(false);
        }
        self.select.set_active(false);
        self.modify.set_active(false);
        std::mem::take(&mut self.state)
    }

    /// Entfernt alle Interaktionen (Teardown).
    pub(crate) fn detach_all(&mut self) {
        self.deactivate();
        self.draws.clear();
        self.select = SelectInteraction::default();
    }

    /// Alle Interaktionen, die gerade aktiv sind.
    pub fn active_interactions(&self) -> Vec<&dyn MapInteraction> {
        let mut active: Vec<&dyn MapInteraction> = Vec::new();
        for draw in self.draws.values().filter(|d| d.is_active()) {
            active.push(draw);
        }
        if self.select.is_active() {
            active.push(&self.select);
        }
        if self.modify.is_active() {
            active.push(&self.modify);
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn config(geometry_type: GeometryType) -> LayerTransactionConfig {
        LayerTransactionConfig {
            feature_ns: "http://ex.org".into(),
            feature_type: "Parcels".into(),
            geometry_type,
            geometry_name: "geom".into(),
            url: "http://svc/wfs".into(),
            srs_name: None,
        }
    }

    #[test]
    fn test_draw_interaction_is_memoized_per_layer() {
        let mut arena = InteractionArena::new();
        arena.draw_for("a", &config(GeometryType::Point));
        arena.draw_for("a", &config(GeometryType::Polygon));
        arena.draw_for("b", &config(GeometryType::Polygon));

        assert_eq!(arena.draw_count(), 2);
        // Erste Konfiguration bleibt
        assert_eq!(arena.draw("a").unwrap().geometry_type, GeometryType::Point);
    }

    #[test]
    fn test_only_one_group_is_active() {
        let mut arena = InteractionArena::new();
        arena.draw_for("a", &config(GeometryType::Point));
        arena.activate(ArmState::Drawing {
            layer_id: "a".into(),
        });
        assert_eq!(arena.active_interactions().len(), 1);

        arena.activate(ArmState::Modifying {
            layer_id: "a".into(),
        });
        let kinds: Vec<_> = arena.active_interactions().iter().map(|i| i.kind()).collect();
        assert_eq!(kinds, vec![InteractionKind::Select, InteractionKind::Modify]);
        assert!(!arena.draw("a").unwrap().is_active());
    }

    #[test]
    fn test_draw_rejects_wrong_geometry_type() {
        let draw = DrawInteraction::new("a", &config(GeometryType::Polygon));
        let err = draw
            .accepts(&Geometry::Point(DVec2::ZERO))
            .expect_err("Punkt passt nicht zu Polygon");
        assert!(matches!(err, EditError::GeometryMismatch { .. }));
    }

    #[test]
    fn test_rebinding_select_to_other_layer_clears_selection() {
        let mut select = SelectInteraction::default();
        select.bind("a");
        select.select(FeatureKey(1));
        assert!(select.bind("a").is_empty());
        assert_eq!(select.bind("b"), vec![FeatureKey(1)]);
        assert!(select.is_empty());
    }
}
