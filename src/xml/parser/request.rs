//! Liest kodierte Transaction-Requests zurück (Tests, Mock-Server, Logs).

use crate::core::{Geometry, Properties};
use crate::xml::WFS_NS;
use crate::xml::gml::{is_geometry, read_geometry};
use crate::xml::transaction::TransactionKind;
use crate::xml::tree::{Element, parse_document};
use anyhow::{Context, Result, bail};
use serde_json::Value;

/// Eine Operation aus einem Transaction-Dokument.
///
/// Property-Werte kommen als Text zurück; die Typinformation des Originals
/// steckt nicht im XML.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOperation {
    /// Insert, Update oder Delete
    pub kind: TransactionKind,
    /// Lokaler Name des Feature-Typs
    pub feature_type: String,
    /// Namespace-URI des Feature-Typs
    pub feature_ns: Option<String>,
    /// Feature-ID aus dem Filter (Update/Delete)
    pub fid: Option<String>,
    /// Attributname der Geometrie
    pub geometry_name: Option<String>,
    /// Geometrie
    pub geometry: Option<Geometry>,
    /// Uebrige Attribute
    pub properties: Properties,
}

impl TransactionOperation {
    fn new(kind: TransactionKind, feature_type: String, feature_ns: Option<String>) -> Self {
        Self {
            kind,
            feature_type,
            feature_ns,
            fid: None,
            geometry_name: None,
            geometry: None,
            properties: Properties::new(),
        }
    }
}

/// Parsed ein `wfs:Transaction`-Dokument in seine Operationen.
pub fn parse_transaction_request(xml: &str) -> Result<Vec<TransactionOperation>> {
    let root = parse_document(xml)?;
    if !root.is(WFS_NS, "Transaction") {
        bail!("Kein wfs:Transaction-Dokument: <{}>", root.name);
    }

    let scope = root.declarations.clone();
    let mut operations = Vec::new();

    for section in &root.children {
        let mut section_scope = scope.clone();
        section_scope.extend(section.declarations.iter().cloned());

        match section.name.as_str() {
            "Insert" => {
                for feature in &section.children {
                    operations.push(read_insert(feature)?);
                }
            }
            "Update" => {
                let (feature_type, feature_ns) = read_type_name(section, &section_scope)?;
                let mut op =
                    TransactionOperation::new(TransactionKind::Update, feature_type, feature_ns);
                for property in section.children_named("Property") {
                    read_update_property(property, &mut op)?;
                }
                op.fid = read_fid(section);
                operations.push(op);
            }
            "Delete" => {
                let (feature_type, feature_ns) = read_type_name(section, &section_scope)?;
                let mut op =
                    TransactionOperation::new(TransactionKind::Delete, feature_type, feature_ns);
                op.fid = read_fid(section);
                operations.push(op);
            }
            other => log::debug!("Unbekannter Transaction-Abschnitt <{}> ignoriert", other),
        }
    }

    Ok(operations)
}

fn read_insert(feature: &Element) -> Result<TransactionOperation> {
    let mut op = TransactionOperation::new(
        TransactionKind::Insert,
        feature.name.clone(),
        feature.namespace.clone(),
    );

    for attribute in &feature.children {
        match attribute.first_child() {
            Some(child) if is_geometry(child) => {
                op.geometry_name = Some(attribute.name.clone());
                op.geometry = Some(read_geometry(child).with_context(|| {
                    format!("Geometrie in <{}> unlesbar", attribute.name)
                })?);
            }
            _ => {
                op.properties.insert(
                    attribute.name.clone(),
                    Value::String(attribute.text().to_string()),
                );
            }
        }
    }

    Ok(op)
}

fn read_update_property(property: &Element, op: &mut TransactionOperation) -> Result<()> {
    let name = property
        .child("Name")
        .context("wfs:Property ohne wfs:Name")?
        .text()
        .to_string();
    // Präfix im Property-Namen ist erlaubt (feature:geom)
    let name = match name.split_once(':') {
        Some((_, local)) => local.to_string(),
        None => name,
    };

    match property.child("Value") {
        Some(value) => match value.first_child() {
            Some(child) if is_geometry(child) => {
                op.geometry = Some(read_geometry(child)?);
                op.geometry_name = Some(name);
            }
            _ => {
                op.properties
                    .insert(name, Value::String(value.text().to_string()));
            }
        },
        None => {
            op.properties.insert(name, Value::Null);
        }
    }
    Ok(())
}

/// Löst `typeName="präfix:Typ"` über die deklarierten Namespaces auf.
fn read_type_name(
    section: &Element,
    scope: &[(String, String)],
) -> Result<(String, Option<String>)> {
    let type_name = section
        .attribute("typeName")
        .with_context(|| format!("<{}> ohne typeName", section.name))?;

    let (prefix, local) = match type_name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", type_name),
    };
    let namespace = scope
        .iter()
        .rev()
        .find(|(declared, _)| declared == prefix)
        .map(|(_, uri)| uri.clone());

    Ok((local.to_string(), namespace))
}

fn read_fid(section: &Element) -> Option<String> {
    section
        .find(|e| e.name == "FeatureId" || e.name == "ResourceId")
        .and_then(|id| id.attribute("fid").or_else(|| id.attribute("rid")))
        .map(str::to_string)
}
