//! HTTP-Transport für WFS-T-Requests.

use crate::shared::EditError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Schickt einen kodierten Request an den Dienst und liefert den rohen Body.
///
/// Kein Retry, kein Caching: ein Aufruf, ein Round-Trip. Alles außer
/// HTTP 200 ist ein `EditError::TransportFailure`.
pub trait TransactionClient {
    /// POSTet `body` als `text/xml` an `url`.
    fn send(&self, body: Vec<u8>, url: &str) -> impl Future<Output = Result<Vec<u8>, EditError>>;
}

/// `TransactionClient` auf Basis von reqwest.
#[derive(Clone)]
pub struct HttpTransactionClient {
    client: Client,
}

impl HttpTransactionClient {
    /// Erstellt einen Client mit festem Timeout pro Request.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl TransactionClient for HttpTransactionClient {
    async fn send(&self, body: Vec<u8>, url: &str) -> Result<Vec<u8>, EditError> {
        log::debug!("POST {} ({} Bytes)", url, body.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| EditError::TransportFailure {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(EditError::TransportFailure {
                status: Some(status.as_u16()),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EditError::TransportFailure {
                status: Some(status.as_u16()),
                message: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }
}
