//! Gemeinsame Test-Hilfen: aufzeichnender Mock-Client und Layer-Fixtures.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use wfst_editor::core::{GeometryType, LayerTransactionConfig, VectorLayer};
use wfst_editor::{EditError, TransactionClient};

pub const WFS_URL: &str = "http://svc/wfs";

/// Ein aufgezeichneter POST.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub url: String,
    pub body: String,
}

/// Liefert vorbereitete Antworten in Reihenfolge und merkt sich jeden Request.
#[derive(Default)]
pub struct RecordingClient {
    responses: RefCell<VecDeque<Result<Vec<u8>, EditError>>>,
    sent: RefCell<Vec<SentRequest>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nächste Antwort: HTTP 200 mit diesem Body.
    pub fn respond(self, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(body.as_bytes().to_vec()));
        self
    }

    /// Nächste Antwort: HTTP-Fehlerstatus.
    pub fn fail(self, status: u16, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(EditError::TransportFailure {
                status: Some(status),
                message: message.to_string(),
            }));
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.borrow().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl TransactionClient for RecordingClient {
    async fn send(&self, body: Vec<u8>, url: &str) -> Result<Vec<u8>, EditError> {
        self.sent.borrow_mut().push(SentRequest {
            url: url.to_string(),
            body: String::from_utf8(body).expect("Request sollte UTF-8 sein"),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("Keine vorbereitete Antwort mehr")
    }
}

pub fn parcels_config() -> LayerTransactionConfig {
    LayerTransactionConfig {
        feature_ns: "http://ex.org".into(),
        feature_type: "Parcels".into(),
        geometry_type: GeometryType::Polygon,
        geometry_name: "geom".into(),
        url: WFS_URL.into(),
        srs_name: Some("EPSG:3857".into()),
    }
}

pub fn wells_config() -> LayerTransactionConfig {
    LayerTransactionConfig {
        feature_ns: "http://example.com/water".into(),
        feature_type: "Wells".into(),
        geometry_type: GeometryType::Point,
        geometry_name: "geom".into(),
        url: WFS_URL.into(),
        srs_name: Some("EPSG:3857".into()),
    }
}

pub fn parcels_layer() -> VectorLayer {
    VectorLayer::editable("parcels", parcels_config())
}

pub fn wells_layer() -> VectorLayer {
    VectorLayer::editable("wells", wells_config())
}
