//! Transaktions-Requests und dekodierte Ergebnisse.

use crate::core::{FeatureEdit, LayerTransactionConfig};

/// Art einer WFS-T-Operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Neues Feature anlegen
    Insert,
    /// Bestehendes Feature aktualisieren
    Update,
    /// Bestehendes Feature löschen
    Delete,
}

/// Ein einzelner Transaktions-Request: genau ein Feature pro Request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    /// Operation
    pub kind: TransactionKind,
    /// Betroffenes Feature
    pub feature: FeatureEdit,
    /// Konfiguration des Ziel-Layers
    pub config: LayerTransactionConfig,
}

impl TransactionRequest {
    /// Insert-Request.
    pub fn insert(feature: FeatureEdit, config: LayerTransactionConfig) -> Self {
        Self {
            kind: TransactionKind::Insert,
            feature,
            config,
        }
    }

    /// Update-Request.
    pub fn update(feature: FeatureEdit, config: LayerTransactionConfig) -> Self {
        Self {
            kind: TransactionKind::Update,
            feature,
            config,
        }
    }

    /// Delete-Request.
    pub fn delete(feature: FeatureEdit, config: LayerTransactionConfig) -> Self {
        Self {
            kind: TransactionKind::Delete,
            feature,
            config,
        }
    }
}

/// Zusammenfassung einer erfolgreichen Transaktion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionSummary {
    /// Neu vergebene Feature-IDs in Server-Reihenfolge
    pub inserted_ids: Vec<String>,
    /// `totalInserted`
    pub total_inserted: u32,
    /// `totalUpdated`
    pub total_updated: u32,
    /// `totalDeleted`
    pub total_deleted: u32,
}

/// Dekodierte Server-Antwort: entweder Erfolg oder Service-Exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// TransactionResponse
    Success(TransactionSummary),
    /// ExceptionReport mit extrahiertem Text
    ServiceException {
        /// Inhalt von `ows:ExceptionText`
        message: String,
    },
}

impl TransactionOutcome {
    /// Zusammenfassung, falls erfolgreich.
    pub fn summary(&self) -> Option<&TransactionSummary> {
        match self {
            TransactionOutcome::Success(summary) => Some(summary),
            TransactionOutcome::ServiceException { .. } => None,
        }
    }
}
