//! Vektor-Layer mit lokalem Feature-Store und WFS-T-Konfiguration.

use super::{FeatureEdit, FeatureKey, GeometryType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Unveränderliche Transaktions-Konfiguration eines WFS-T-Layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTransactionConfig {
    /// Namespace-URI des Feature-Typs
    pub feature_ns: String,
    /// Name des Feature-Typs ohne Präfix
    pub feature_type: String,
    /// Geometrietyp neuer Features
    pub geometry_type: GeometryType,
    /// Name des Geometrie-Attributs auf dem Server
    pub geometry_name: String,
    /// Online-Resource des WFS-Endpunkts
    pub url: String,
    /// Optionaler `srsName` für GML-Geometrien
    #[serde(default)]
    pub srs_name: Option<String>,
}

/// Lokaler Feature-Cache eines Layers.
///
/// Features werden über ein lokales `FeatureKey`-Handle adressiert, weil frisch
/// gezeichnete Features noch keine Server-ID haben.
#[derive(Debug, Clone, Default)]
pub struct FeatureSource {
    features: IndexMap<FeatureKey, FeatureEdit>,
    next_key: u64,
    /// Zählt, wie oft der Cache komplett verworfen wurde
    clear_count: u32,
}

impl FeatureSource {
    /// Erstellt einen leeren Feature-Store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fügt ein Feature hinzu und liefert dessen lokales Handle.
    pub fn add(&mut self, feature: FeatureEdit) -> FeatureKey {
        self.next_key += 1;
        let key = FeatureKey(self.next_key);
        self.features.insert(key, feature);
        key
    }

    /// Liefert ein Feature per Handle.
    pub fn get(&self, key: FeatureKey) -> Option<&FeatureEdit> {
        self.features.get(&key)
    }

    pub(crate) fn get_mut(&mut self, key: FeatureKey) -> Option<&mut FeatureEdit> {
        self.features.get_mut(&key)
    }

    /// Entfernt ein Feature aus dem Store.
    pub(crate) fn remove(&mut self, key: FeatureKey) -> Option<FeatureEdit> {
        self.features.shift_remove(&key)
    }

    /// Verwirft den gesamten Cache (Signal zum Neuladen).
    pub(crate) fn clear(&mut self) {
        self.features.clear();
        self.clear_count += 1;
    }

    /// Wie oft der Cache seit Erstellung verworfen wurde.
    pub fn clear_count(&self) -> u32 {
        self.clear_count
    }

    /// Anzahl der Features im Store.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Gibt `true` zurück, wenn der Store leer ist.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iteriert in Einfügereihenfolge über alle Features.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, &FeatureEdit)> {
        self.features.iter().map(|(key, feature)| (*key, feature))
    }
}

/// Ein Vektor-Layer der Karte.
///
/// Nur Layer mit `editable == true` und gesetzter `wfs`-Konfiguration können
/// bearbeitet werden.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    /// Eindeutige Layer-ID (entspricht dem Source-Namen)
    pub id: String,
    /// Anzeigename
    pub title: String,
    /// Ob der Layer über WFS-T bearbeitbar ist
    pub editable: bool,
    /// Transaktions-Konfiguration
    pub wfs: Option<LayerTransactionConfig>,
    /// Lokaler Feature-Cache
    pub source: FeatureSource,
}

impl VectorLayer {
    /// Erstellt einen bearbeitbaren WFS-T-Layer.
    pub fn editable(id: impl Into<String>, wfs: LayerTransactionConfig) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            editable: true,
            wfs: Some(wfs),
            source: FeatureSource::new(),
        }
    }

    /// Liefert die Transaktions-Konfiguration, falls der Layer bearbeitbar ist.
    pub fn transaction_config(&self) -> Option<&LayerTransactionConfig> {
        if self.editable { self.wfs.as_ref() } else { None }
    }
}
