//! Parser für WFS-T-Antworten und Transaction-Requests.

mod request;

pub use request::{TransactionOperation, parse_transaction_request};

use super::transaction::{TransactionOutcome, TransactionSummary};
use super::tree::{Element, parse_document};
use super::{OWS_NS, OWS_11_NS};
use anyhow::{Context, Result, bail};

/// Parsed eine Server-Antwort auf einen Transaction-Request.
///
/// Erkennt `ExceptionReport` (OWS), `ServiceExceptionReport` (WFS 1.0) und
/// `TransactionResponse` (WFS 1.1 / 2.0). Alles andere ist ein Fehler.
pub fn parse_transaction_response(xml: &str) -> Result<TransactionOutcome> {
    let root = parse_document(xml).context("Antwort ist kein gültiges XML")?;

    match root.name.as_str() {
        "ExceptionReport" => {
            let text = root
                .find(|e| {
                    e.name == "ExceptionText"
                        && matches!(e.namespace.as_deref(), Some(OWS_NS) | Some(OWS_11_NS))
                })
                .context("ExceptionReport ohne ows:ExceptionText")?;
            Ok(TransactionOutcome::ServiceException {
                message: text.text().to_string(),
            })
        }
        "ServiceExceptionReport" => {
            let exception = root
                .find(|e| e.name == "ServiceException")
                .context("ServiceExceptionReport ohne ServiceException")?;
            Ok(TransactionOutcome::ServiceException {
                message: exception.text().to_string(),
            })
        }
        "TransactionResponse" => Ok(TransactionOutcome::Success(read_summary(&root)?)),
        other => bail!("Unerwartetes Wurzelelement <{}> in der Antwort", other),
    }
}

fn read_summary(root: &Element) -> Result<TransactionSummary> {
    let mut summary = TransactionSummary::default();

    if let Some(totals) = root.child("TransactionSummary") {
        summary.total_inserted = read_count(totals, "totalInserted")?;
        summary.total_updated = read_count(totals, "totalUpdated")?;
        summary.total_deleted = read_count(totals, "totalDeleted")?;
    } else {
        log::debug!("TransactionResponse ohne TransactionSummary, Zähler bleiben 0");
    }

    if let Some(results) = root.child("InsertResults") {
        let mut ids = Vec::new();
        results.find_all(|e| e.name == "FeatureId" || e.name == "ResourceId", &mut ids);
        for id in ids {
            let value = id
                .attribute("fid")
                .or_else(|| id.attribute("rid"))
                .with_context(|| format!("<{}> ohne fid/rid", id.name))?;
            summary.inserted_ids.push(value.to_string());
        }
    }

    Ok(summary)
}

/// Liest einen Zähler aus der Summary; fehlend = 0.
fn read_count(totals: &Element, name: &str) -> Result<u32> {
    match totals.child(name) {
        Some(element) => element
            .text()
            .parse::<u32>()
            .with_context(|| format!("{} ist keine Zahl: '{}'", name, element.text())),
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests;
