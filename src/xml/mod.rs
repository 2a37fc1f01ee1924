//! Transaction-Codec: WFS-T-Requests kodieren, Antworten dekodieren.
//!
//! Reine Funktionen ohne I/O. Intern arbeiten Writer und Parser mit
//! `anyhow`; an der Codec-Grenze werden Fehler zu `EditError`.

pub mod gml;
pub mod parser;
pub mod transaction;
pub mod tree;
pub mod writer;

pub use parser::{TransactionOperation, parse_transaction_request, parse_transaction_response};
pub use transaction::{TransactionKind, TransactionOutcome, TransactionRequest, TransactionSummary};
pub use writer::write_transaction;

use crate::shared::EditError;

/// WFS-Namespace (1.0 / 1.1).
pub const WFS_NS: &str = "http://www.opengis.net/wfs";
/// GML-Namespace (2 / 3.1).
pub const GML_NS: &str = "http://www.opengis.net/gml";
/// OGC-Filter-Namespace.
pub const OGC_NS: &str = "http://www.opengis.net/ogc";
/// OWS-Namespace der ExceptionReports.
pub const OWS_NS: &str = "http://www.opengis.net/ows";
/// OWS-1.1-Namespace (WFS 2.0).
pub const OWS_11_NS: &str = "http://www.opengis.net/ows/1.1";
/// Präfix, unter dem der Feature-Namespace im Request deklariert wird.
pub const FEATURE_PREFIX: &str = "feature";

/// Kodiert einen Request in den Request-Body.
pub fn encode(request: &TransactionRequest) -> Result<Vec<u8>, EditError> {
    write_transaction(request)
        .map(String::into_bytes)
        .map_err(|err| EditError::Encode(format!("{err:#}")))
}

/// Dekodiert einen Response-Body.
///
/// Weder ExceptionReport noch TransactionResponse ergibt
/// `EditError::MalformedResponse`.
pub fn decode(response: &[u8]) -> Result<TransactionOutcome, EditError> {
    let text = std::str::from_utf8(response)
        .map_err(|err| EditError::MalformedResponse(format!("Antwort ist kein UTF-8: {err}")))?;
    parse_transaction_response(text).map_err(|err| EditError::MalformedResponse(format!("{err:#}")))
}

pub(crate) fn escape(value: &str) -> String {
    quick_xml::escape::escape(value).into_owned()
}
