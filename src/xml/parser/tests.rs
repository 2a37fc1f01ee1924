use super::*;
use crate::core::{FeatureEdit, Geometry, GeometryType, LayerTransactionConfig};
use crate::xml::{TransactionKind, TransactionRequest, write_transaction};
use glam::DVec2;

fn parcels_config() -> LayerTransactionConfig {
    LayerTransactionConfig {
        feature_ns: "http://ex.org".into(),
        feature_type: "Parcels".into(),
        geometry_type: GeometryType::Polygon,
        geometry_name: "geom".into(),
        url: "http://svc/wfs".into(),
        srs_name: Some("EPSG:3857".into()),
    }
}

fn triangle() -> Geometry {
    Geometry::Polygon(vec![vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(4.0, 0.0),
        DVec2::new(2.0, 3.5),
        DVec2::new(0.0, 0.0),
    ]])
}

#[test]
fn test_parse_exception_report_extracts_text() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
    <ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows" version="1.0.0">
        <ows:Exception exceptionCode="InvalidParameterValue">
            <ows:ExceptionText>Feature type 'Parcels' unknown</ows:ExceptionText>
        </ows:Exception>
    </ows:ExceptionReport>"#;

    let outcome = parse_transaction_response(xml).unwrap();
    assert_eq!(
        outcome,
        TransactionOutcome::ServiceException {
            message: "Feature type 'Parcels' unknown".into()
        }
    );
}

#[test]
fn test_exception_text_in_foreign_namespace_is_not_accepted() {
    let xml = r#"<ExceptionReport xmlns:x="urn:other"><x:ExceptionText>nope</x:ExceptionText></ExceptionReport>"#;

    let err = parse_transaction_response(xml).expect_err("Parser sollte fehlschlagen");
    assert!(format!("{err:#}").contains("ows:ExceptionText"));
}

#[test]
fn test_parse_wfs11_transaction_response() {
    let xml = r#"
    <wfs:TransactionResponse xmlns:wfs="http://www.opengis.net/wfs" xmlns:ogc="http://www.opengis.net/ogc" version="1.1.0">
        <wfs:TransactionSummary>
            <wfs:totalInserted>2</wfs:totalInserted>
            <wfs:totalUpdated>0</wfs:totalUpdated>
            <wfs:totalDeleted>0</wfs:totalDeleted>
        </wfs:TransactionSummary>
        <wfs:TransactionResults/>
        <wfs:InsertResults>
            <wfs:Feature><ogc:FeatureId fid="Parcels.41"/></wfs:Feature>
            <wfs:Feature><ogc:FeatureId fid="Parcels.42"/></wfs:Feature>
        </wfs:InsertResults>
    </wfs:TransactionResponse>"#;

    let outcome = parse_transaction_response(xml).unwrap();
    let summary = outcome.summary().expect("Erfolg erwartet");
    assert_eq!(summary.total_inserted, 2);
    assert_eq!(summary.inserted_ids, vec!["Parcels.41", "Parcels.42"]);
}

#[test]
fn test_parse_wfs20_resource_ids() {
    let xml = r#"
    <wfs:TransactionResponse xmlns:wfs="http://www.opengis.net/wfs/2.0" xmlns:fes="http://www.opengis.net/fes/2.0" version="2.0.0">
        <wfs:TransactionSummary><wfs:totalInserted>1</wfs:totalInserted></wfs:TransactionSummary>
        <wfs:InsertResults><wfs:Feature><fes:ResourceId rid="new0"/></wfs:Feature></wfs:InsertResults>
    </wfs:TransactionResponse>"#;

    let summary = parse_transaction_response(xml).unwrap().summary().cloned().unwrap();
    assert_eq!(summary.inserted_ids, vec!["new0"]);
    assert_eq!(summary.total_updated, 0);
}

#[test]
fn test_unknown_root_is_an_error() {
    let xml = r#"<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs"/>"#;
    let err = parse_transaction_response(xml).expect_err("Parser sollte fehlschlagen");
    assert!(format!("{err:#}").contains("FeatureCollection"));
}

#[test]
fn test_non_numeric_count_is_an_error() {
    let xml = r#"<TransactionResponse><TransactionSummary><totalUpdated>eins</totalUpdated></TransactionSummary></TransactionResponse>"#;
    assert!(parse_transaction_response(xml).is_err());
}

#[test]
fn test_insert_request_renames_geometry_attribute() {
    let feature = FeatureEdit::new("the_geom", triangle()).with_property("name", "Nordfeld");
    let xml = write_transaction(&TransactionRequest::insert(feature, parcels_config())).unwrap();

    let ops = parse_transaction_request(&xml).unwrap();
    assert_eq!(ops.len(), 1);
    let op = &ops[0];
    assert_eq!(op.kind, TransactionKind::Insert);
    assert_eq!(op.feature_type, "Parcels");
    assert_eq!(op.feature_ns.as_deref(), Some("http://ex.org"));
    assert_eq!(op.geometry_name.as_deref(), Some("geom"));
    assert_eq!(op.geometry, Some(triangle()));
    assert_eq!(op.properties.get("name"), Some(&serde_json::Value::from("Nordfeld")));
    assert!(!op.properties.contains_key("the_geom"));
}

#[test]
fn test_update_request_carries_fid_and_null_properties() {
    let feature = FeatureEdit::new("geom", triangle())
        .with_id("Parcels.9")
        .with_property("owner", serde_json::Value::Null)
        .with_property("bbox", serde_json::json!([0, 0, 4, 3.5]));
    let xml = write_transaction(&TransactionRequest::update(feature, parcels_config())).unwrap();

    let ops = parse_transaction_request(&xml).unwrap();
    let op = &ops[0];
    assert_eq!(op.kind, TransactionKind::Update);
    assert_eq!(op.fid.as_deref(), Some("Parcels.9"));
    assert_eq!(op.feature_ns.as_deref(), Some("http://ex.org"));
    assert_eq!(op.geometry, Some(triangle()));
    assert_eq!(op.properties.get("owner"), Some(&serde_json::Value::Null));
    assert!(!op.properties.contains_key("bbox"));
}

#[test]
fn test_deeply_nested_response_is_rejected() {
    let depth = 200_000;
    let xml = format!(
        "<TransactionResponse><InsertResults>{}{}</InsertResults></TransactionResponse>",
        "<a>".repeat(depth),
        "</a>".repeat(depth)
    );

    let err = crate::xml::decode(xml.as_bytes()).expect_err("Verschachtelung über dem Limit");
    assert!(matches!(err, crate::shared::EditError::MalformedResponse(_)));
    assert!(parse_transaction_request(&xml).is_err());
}
