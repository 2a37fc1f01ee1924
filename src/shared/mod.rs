//! Gemeinsame Typen: Laufzeit-Optionen und Fehler-Taxonomie.

pub mod error;
pub mod options;

pub use error::EditError;
pub use options::{EditorOptions, LayerOptions, RELOAD_SENTINEL};
