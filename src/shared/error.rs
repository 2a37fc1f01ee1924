//! Fehler-Taxonomie des Editier-Kerns.

use crate::core::{FeatureKey, GeometryType};
use thiserror::Error;

/// Fehler, die eine Editier-Operation an den Aufrufer meldet.
///
/// Der Kern hält keinen Anzeige-Zustand; der Host entscheidet, wie ein Fehler
/// dargestellt wird.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    /// HTTP-Status ungleich 2xx oder Netzwerkfehler
    #[error("Transport fehlgeschlagen: {}", format_transport(.status, .message))]
    TransportFailure {
        /// HTTP-Status, falls eine Antwort kam
        status: Option<u16>,
        /// Status-Text oder Netzwerkfehler
        message: String,
    },

    /// Der Server hat die Transaktion abgelehnt
    #[error("Fehler beim Speichern des Features: {message}")]
    ServiceException {
        /// Extrahierter `ExceptionText`
        message: String,
    },

    /// Antwort ist weder ExceptionReport noch TransactionResponse
    #[error("Unbekannte Server-Antwort: {0}")]
    MalformedResponse(String),

    /// Delete lieferte nicht `totalDeleted == 1`
    #[error("Feature konnte nicht gelöscht werden: {0}")]
    DeleteFailed(String),

    /// Layer-ID ist nicht registriert
    #[error("Unbekannter Layer: '{0}'")]
    UnknownLayer(String),

    /// Layer ist nicht als WFS-T markiert oder hat keine Konfiguration
    #[error("Layer '{0}' ist nicht über WFS-T bearbeitbar")]
    LayerNotEditable(String),

    /// Gezeichnete Geometrie passt nicht zum Layer
    #[error("Geometrietyp {actual} passt nicht zu Layer-Typ {expected}")]
    GeometryMismatch {
        /// Typ laut Layer-Konfiguration
        expected: GeometryType,
        /// Typ der gelieferten Geometrie
        actual: GeometryType,
    },

    /// Feature-Handle existiert im Layer-Cache nicht (mehr)
    #[error("Unbekanntes Feature im Layer-Cache: {0:?}")]
    UnknownFeature(FeatureKey),

    /// Ereignis für eine Interaktion, die nicht aktiv ist
    #[error("Keine passende Interaktion aktiv")]
    NoActiveInteraction,

    /// Request konnte nicht kodiert werden
    #[error("Transaktion konnte nicht kodiert werden: {0}")]
    Encode(String),
}

fn format_transport(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{} {}", code, message),
        None => message.to_string(),
    }
}

impl EditError {
    /// Ob der Fehler auf Transport-Ebene entstand.
    pub fn is_transport(&self) -> bool {
        matches!(self, EditError::TransportFailure { .. })
    }
}
