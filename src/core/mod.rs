//! Core-Domänentypen: Geometrien, Features, Feature-Store und Layer.

pub mod feature;
pub mod geometry;
pub mod layer;

pub use feature::{BBOX_PROPERTY, DEFAULT_GEOMETRY_NAME, FeatureEdit, FeatureKey, Properties};
pub use geometry::{Geometry, GeometryType, Path};
pub use layer::{FeatureSource, LayerTransactionConfig, VectorLayer};
