//! Geometrie-Werte, wie sie die Karten-Engine an Features hängt.
//!
//! Der Editier-Kern rechnet nicht mit Geometrien, er transportiert sie nur
//! zwischen Interaktionen, Feature-Store und GML-Codec.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geometrietyp eines WFS-Layers (entspricht dem GML-Elementnamen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    /// Einzelner Punkt
    Point,
    /// Linienzug
    LineString,
    /// Polygon mit Außen- und optionalen Innenringen
    Polygon,
    /// Punkt-Sammlung
    MultiPoint,
    /// Linien-Sammlung
    MultiLineString,
    /// Polygon-Sammlung
    MultiPolygon,
}

impl GeometryType {
    /// Name des Typs, wie ihn WFS-Layer-Konfigurationen verwenden.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Point" => Ok(GeometryType::Point),
            "LineString" | "Curve" => Ok(GeometryType::LineString),
            "Polygon" | "Surface" => Ok(GeometryType::Polygon),
            "MultiPoint" => Ok(GeometryType::MultiPoint),
            "MultiLineString" | "MultiCurve" => Ok(GeometryType::MultiLineString),
            "MultiPolygon" | "MultiSurface" => Ok(GeometryType::MultiPolygon),
            other => anyhow::bail!("Unbekannter Geometrietyp: '{}'", other),
        }
    }
}

/// Ein Ring bzw. Linienzug als Koordinatenfolge.
pub type Path = Vec<DVec2>;

/// Geometrie eines Features in Kartenkoordinaten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// Einzelner Punkt
    Point(DVec2),
    /// Linienzug
    LineString(Path),
    /// Ringe eines Polygons; Ring 0 ist der Außenring
    Polygon(Vec<Path>),
    /// Punkt-Sammlung
    MultiPoint(Vec<DVec2>),
    /// Linien-Sammlung
    MultiLineString(Vec<Path>),
    /// Polygon-Sammlung
    MultiPolygon(Vec<Vec<Path>>),
}

impl Geometry {
    /// Liefert den Geometrietyp dieses Werts.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// Anzahl aller Stützpunkte (für Logging).
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::LineString(path) => path.len(),
            Geometry::MultiPoint(points) => points.len(),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().map(Vec::len).sum()
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter())
                .map(Vec::len)
                .sum(),
        }
    }
}
