//! Protokoll der an den Dienst geschickten Transaktionen.

use crate::xml::TransactionKind;

/// Ergebnis einer protokollierten Transaktion.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionResult {
    /// Dienst hat die Änderung bestätigt
    Applied,
    /// Dienst hat geantwortet, die Änderung aber nicht bestätigt
    Rejected(String),
    /// Transport oder Dekodierung fehlgeschlagen
    Failed(String),
}

/// Ein Eintrag im Transaktions-Protokoll.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    pub layer_id: String,
    /// Feature-ID zum Zeitpunkt des Requests (leer bei Insert)
    pub feature_id: String,
    pub result: TransactionResult,
}

/// Speichert ausgeführte Transaktionen in Reihenfolge.
#[derive(Debug, Default)]
pub struct TransactionLog {
    entries: Vec<TransactionRecord>,
}

impl TransactionLog {
    const MAX_ENTRIES: usize = 1000;

    /// Erstellt ein leeres Protokoll.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Fügt eine Transaktion hinzu.
    /// Begrenzt auf MAX_ENTRIES, ältere Einträge werden verworfen.
    pub fn record(&mut self, record: TransactionRecord) {
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.drain(..Self::MAX_ENTRIES / 2);
        }
        self.entries.push(record);
    }

    /// Gibt die Anzahl der protokollierten Transaktionen zurück.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Gibt `true` zurück, wenn nichts protokolliert ist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Liefert eine read-only Sicht auf alle Einträge.
    pub fn entries(&self) -> &[TransactionRecord] {
        &self.entries
    }

    /// Letzter Eintrag.
    pub fn last(&self) -> Option<&TransactionRecord> {
        self.entries.last()
    }
}
