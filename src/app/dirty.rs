//! Buchführung über Features mit ungespeicherten Geometrieänderungen.

use indexmap::IndexSet;

/// Feature-Adresse: Layer-ID und Server-ID.
///
/// Feature-IDs sind nur innerhalb eines Layers eindeutig.
type TrackedId = (String, String);

fn tracked(layer_id: &str, id: &str) -> TrackedId {
    (layer_id.to_string(), id.to_string())
}

/// Verfolgt, welche Features seit ihrer Selektion geändert wurden.
///
/// Ein Feature, das hier nicht als dirty geführt wird, ist per Definition
/// nicht dirty.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    observed: IndexSet<TrackedId>,
    dirty: IndexSet<TrackedId>,
}

impl DirtyTracker {
    /// Erstellt einen leeren Tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Beginnt die Beobachtung eines selektierten Features.
    pub fn on_feature_selected(&mut self, layer_id: &str, id: &str) {
        if id.is_empty() {
            log::debug!("Feature ohne ID selektiert, keine Änderungsverfolgung");
            return;
        }
        self.observed.insert(tracked(layer_id, id));
    }

    /// Meldet eine Geometrieänderung. Nur beobachtete Features werden dirty.
    ///
    /// Gibt zurück, ob das Feature danach dirty ist.
    pub fn on_geometry_changed(&mut self, layer_id: &str, id: &str) -> bool {
        let key = tracked(layer_id, id);
        if self.observed.contains(&key) {
            self.dirty.insert(key);
        }
        self.is_dirty(layer_id, id)
    }

    /// Beendet die Beobachtung. Gibt zurück, ob ein Update fällig ist.
    pub fn on_feature_deselected(&mut self, layer_id: &str, id: &str) -> bool {
        self.observed.shift_remove(&tracked(layer_id, id));
        self.is_dirty(layer_id, id)
    }

    /// Setzt das Dirty-Flag nach bestätigtem Update zurück.
    pub fn clear(&mut self, layer_id: &str, id: &str) {
        self.dirty.shift_remove(&tracked(layer_id, id));
    }

    /// Entfernt ein Feature komplett (z.B. nach Delete oder Reload).
    pub fn forget(&mut self, layer_id: &str, id: &str) {
        let key = tracked(layer_id, id);
        self.observed.shift_remove(&key);
        self.dirty.shift_remove(&key);
    }

    /// Ob das Feature ungespeicherte Änderungen hat.
    pub fn is_dirty(&self, layer_id: &str, id: &str) -> bool {
        self.dirty.contains(&tracked(layer_id, id))
    }

    /// Alle dirty Features als `(layer_id, id)` in Änderungsreihenfolge.
    pub fn dirty_features(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dirty
            .iter()
            .map(|(layer_id, id)| (layer_id.as_str(), id.as_str()))
    }

    /// Anzahl der dirty Features über alle Layer.
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }
}
