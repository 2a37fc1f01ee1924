//! Writer für WFS-1.1.0-Transaction-Requests.

use super::gml::write_geometry;
use super::transaction::{TransactionKind, TransactionRequest};
use super::{FEATURE_PREFIX, GML_NS, OGC_NS, WFS_NS, escape};
use crate::core::FeatureEdit;
use anyhow::{Result, bail};
use serde_json::Value;

const WFS_SCHEMA_LOCATION: &str =
    "http://www.opengis.net/wfs http://schemas.opengis.net/wfs/1.1.0/wfs.xsd";

/// Schreibt einen Transaction-Request als XML-Dokument.
///
/// Das Feature wird vorher auf die Layer-Konfiguration projiziert: Geometrie
/// unter `geometry_name`, ohne Bounding-Box-Pseudo-Property.
pub fn write_transaction(request: &TransactionRequest) -> Result<String> {
    let config = &request.config;
    let feature = request.feature.projected_for(config);

    if request.kind != TransactionKind::Insert && !feature.has_id() {
        bail!(
            "{:?} für Feature ohne ID auf {} nicht möglich",
            request.kind,
            config.feature_type
        );
    }

    check_name("Feature-Typ", &config.feature_type)?;
    if request.kind != TransactionKind::Delete {
        check_name("Geometrie-Attribut", &feature.geometry_name)?;
        for name in feature.properties.keys() {
            check_name("Property", name)?;
        }
    }

    let mut output = String::new();
    output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    output.push_str(&format!(
        "<wfs:Transaction service=\"WFS\" version=\"1.1.0\" xmlns:wfs=\"{}\" xmlns:gml=\"{}\" \
         xmlns:ogc=\"{}\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:schemaLocation=\"{}\" xmlns:{}=\"{}\">",
        WFS_NS,
        GML_NS,
        OGC_NS,
        WFS_SCHEMA_LOCATION,
        FEATURE_PREFIX,
        escape(&config.feature_ns)
    ));

    let type_name = format!("{}:{}", FEATURE_PREFIX, config.feature_type);
    let srs_name = config.srs_name.as_deref();

    match request.kind {
        TransactionKind::Insert => {
            output.push_str("<wfs:Insert>");
            output.push_str(&format!("<{}>", type_name));
            if let Some(ref geometry) = feature.geometry {
                output.push_str(&format!("<{}:{}>", FEATURE_PREFIX, feature.geometry_name));
                write_geometry(&mut output, geometry, srs_name);
                output.push_str(&format!("</{}:{}>", FEATURE_PREFIX, feature.geometry_name));
            }
            for (name, value) in &feature.properties {
                // null-Werte werden beim Insert nicht geschrieben
                if let Some(text) = property_text(value) {
                    output.push_str(&format!(
                        "<{prefix}:{name}>{text}</{prefix}:{name}>",
                        prefix = FEATURE_PREFIX,
                        name = name,
                        text = escape(&text)
                    ));
                }
            }
            output.push_str(&format!("</{}>", type_name));
            output.push_str("</wfs:Insert>");
        }
        TransactionKind::Update => {
            output.push_str(&format!("<wfs:Update typeName=\"{}\">", escape(&type_name)));
            if let Some(ref geometry) = feature.geometry {
                output.push_str("<wfs:Property>");
                output.push_str(&format!(
                    "<wfs:Name>{}</wfs:Name>",
                    escape(&feature.geometry_name)
                ));
                output.push_str("<wfs:Value>");
                write_geometry(&mut output, geometry, srs_name);
                output.push_str("</wfs:Value>");
                output.push_str("</wfs:Property>");
            }
            for (name, value) in &feature.properties {
                output.push_str("<wfs:Property>");
                output.push_str(&format!("<wfs:Name>{}</wfs:Name>", escape(name)));
                // Ohne <wfs:Value> setzt der Server das Attribut auf null
                if let Some(text) = property_text(value) {
                    output.push_str(&format!("<wfs:Value>{}</wfs:Value>", escape(&text)));
                }
                output.push_str("</wfs:Property>");
            }
            write_fid_filter(&mut output, &feature);
            output.push_str("</wfs:Update>");
        }
        TransactionKind::Delete => {
            output.push_str(&format!("<wfs:Delete typeName=\"{}\">", escape(&type_name)));
            write_fid_filter(&mut output, &feature);
            output.push_str("</wfs:Delete>");
        }
    }

    output.push_str("</wfs:Transaction>");
    Ok(output)
}

/// Prüft, ob `name` als Elementname ohne Präfix taugt (XML-NCName).
fn check_name(what: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    };
    if !valid {
        bail!("{} '{}' ist kein gültiger XML-Name", what, name);
    }
    Ok(())
}

fn write_fid_filter(output: &mut String, feature: &FeatureEdit) {
    output.push_str(&format!(
        "<ogc:Filter><ogc:FeatureId fid=\"{}\"/></ogc:Filter>",
        escape(&feature.id)
    ));
}

/// Textdarstellung eines Property-Werts; `None` für null.
fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        // Verschachtelte Werte gehen als JSON-Text raus
        other => Some(other.to_string()),
    }
}
