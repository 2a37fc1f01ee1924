//! Editierbares Feature und seine Projektion auf eine Layer-Konfiguration.

use super::{Geometry, LayerTransactionConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name der Bounding-Box-Pseudo-Property, die nie zum Server geht.
pub const BBOX_PROPERTY: &str = "bbox";

/// Standard-Name des Geometrie-Attributs frisch gezeichneter Features.
pub const DEFAULT_GEOMETRY_NAME: &str = "geometry";

/// Attribut-Werte eines Features (Name -> Wert, Reihenfolge bleibt erhalten).
pub type Properties = IndexMap<String, Value>;

/// Ein Feature in Bearbeitung oder bereits persistiert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEdit {
    /// Server-ID (leer, bis der Server eine vergibt)
    #[serde(default)]
    pub id: String,
    /// Name des Attributs, unter dem die Geometrie im Feature liegt
    #[serde(default = "default_geometry_name")]
    pub geometry_name: String,
    /// Geometrie (None = Feature ohne Geometrie)
    pub geometry: Option<Geometry>,
    /// Sachattribute ohne die Geometrie selbst
    #[serde(default)]
    pub properties: Properties,
}

fn default_geometry_name() -> String {
    DEFAULT_GEOMETRY_NAME.to_string()
}

impl FeatureEdit {
    /// Erstellt ein neues Feature ohne ID mit der Geometrie unter `geometry_name`.
    pub fn new(geometry_name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: String::new(),
            geometry_name: geometry_name.into(),
            geometry: Some(geometry),
            properties: Properties::new(),
        }
    }

    /// Builder: setzt die Server-ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: setzt eine Property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Ob das Feature bereits eine Server-ID besitzt.
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Erzeugt eine neue, transaktionsfertige Kopie für den Ziel-Layer.
    ///
    /// Die Geometrie landet unter `config.geometry_name`, die Bounding-Box-
    /// Pseudo-Property und ein gleichnamiges Attribut zum Geometrie-Namen
    /// entfallen. `self` bleibt unverändert.
    pub fn projected_for(&self, config: &LayerTransactionConfig) -> FeatureEdit {
        let properties = self
            .properties
            .iter()
            .filter(|(name, _)| {
                name.as_str() != BBOX_PROPERTY
                    && name.as_str() != config.geometry_name
                    && name.as_str() != self.geometry_name
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        FeatureEdit {
            id: self.id.clone(),
            geometry_name: config.geometry_name.clone(),
            geometry: self.geometry.clone(),
            properties,
        }
    }
}

/// Lokales Handle eines Features im Feature-Store (stabil, auch ohne Server-ID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureKey(pub u64);
