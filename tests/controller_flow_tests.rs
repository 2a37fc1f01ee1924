/// Integration-Tests für den Interaction-Controller gegen einen Mock-Dienst
mod common;

use common::{RecordingClient, WFS_URL, parcels_layer, wells_layer};
use glam::DVec2;
use serde_json::json;
use wfst_editor::app::{ArmState, DeleteOutcome, InsertOutcome, TransactionResult, UpdateOutcome};
use wfst_editor::core::{FeatureEdit, Geometry, GeometryType, Properties, VectorLayer};
use wfst_editor::xml::{TransactionKind, parse_transaction_request};
use wfst_editor::{EditError, InteractionController};

const INSERT_OK: &str = include_str!("fixtures/insert_response.xml");
const INSERT_RELOAD: &str = include_str!("fixtures/insert_reload_response.xml");
const UPDATE_OK: &str = include_str!("fixtures/update_response.xml");
const UPDATE_UNCONFIRMED: &str = include_str!("fixtures/update_unconfirmed_response.xml");
const DELETE_OK: &str = include_str!("fixtures/delete_response.xml");
const EXCEPTION: &str = include_str!("fixtures/exception_report.xml");

fn square(offset: f64) -> Geometry {
    Geometry::Polygon(vec![vec![
        DVec2::new(offset, offset),
        DVec2::new(offset + 10.0, offset),
        DVec2::new(offset + 10.0, offset + 10.0),
        DVec2::new(offset, offset + 10.0),
        DVec2::new(offset, offset),
    ]])
}

fn controller(client: RecordingClient) -> InteractionController<RecordingClient> {
    let mut controller = InteractionController::new(client);
    controller.add_layer(parcels_layer());
    controller.add_layer(wells_layer());
    controller
}

/// Persistiertes Feature, dessen Geometrie unter `geometry` liegt (nicht `geom`).
fn stored_parcel() -> FeatureEdit {
    FeatureEdit::new("geometry", square(0.0))
        .with_id("Parcels.7")
        .with_property("owner", "Gemeinde")
        .with_property("bbox", json!([0.0, 0.0, 10.0, 10.0]))
}

#[tokio::test]
async fn test_draw_end_assigns_server_id() {
    let mut controller = controller(RecordingClient::new().respond(INSERT_OK));
    controller.arm_draw("parcels").expect("parcels ist editierbar");

    let mut properties = Properties::new();
    properties.insert("owner".into(), json!("Gemeinde"));
    let outcome = controller
        .finish_draw(square(0.0), properties)
        .await
        .expect("Insert sollte gelingen");

    let InsertOutcome::Inserted { key, id } = outcome.clone() else {
        panic!("Unerwartetes Ergebnis: {outcome:?}");
    };
    assert_eq!(id, "42");
    let layer = controller.layer("parcels").unwrap();
    assert_eq!(layer.source.get(key).unwrap().id, "42");

    let sent = controller.client().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, WFS_URL);
    let ops = parse_transaction_request(&sent[0].body).expect("Request sollte parsen");
    assert_eq!(ops[0].kind, TransactionKind::Insert);
    assert_eq!(ops[0].feature_type, "Parcels");
    assert_eq!(ops[0].feature_ns.as_deref(), Some("http://ex.org"));
    assert_eq!(ops[0].geometry_name.as_deref(), Some("geom"));
    assert_eq!(ops[0].geometry, Some(square(0.0)));
    assert_eq!(ops[0].properties.get("owner"), Some(&json!("Gemeinde")));

    assert_eq!(
        controller.transaction_log().last().unwrap().result,
        TransactionResult::Applied
    );
}

#[tokio::test]
async fn test_reload_sentinel_clears_layer_cache() {
    let mut controller = controller(RecordingClient::new().respond(INSERT_RELOAD));
    controller
        .load_features("parcels", [stored_parcel()])
        .expect("Layer existiert");
    controller.arm_draw("parcels").unwrap();

    let outcome = controller.finish_draw(square(20.0), Properties::new()).await.unwrap();

    assert_eq!(
        outcome,
        InsertOutcome::ReloadRequested {
            layer_id: "parcels".into()
        }
    );
    let layer = controller.layer("parcels").unwrap();
    assert!(layer.source.is_empty());
    assert_eq!(layer.source.clear_count(), 1);
    // Draw bleibt aktiv
    assert_eq!(
        controller.arm_state(),
        &ArmState::Drawing {
            layer_id: "parcels".into()
        }
    );
}

#[tokio::test]
async fn test_update_on_deselect_renames_geometry_and_clears_dirty() {
    let mut controller = controller(RecordingClient::new().respond(UPDATE_OK));
    let keys = controller.load_features("parcels", [stored_parcel()]).unwrap();
    let key = keys[0];

    controller.arm_modify("parcels").unwrap();
    assert!(controller.select_feature(key).unwrap());
    assert!(controller.modify_geometry(key, square(5.0)).unwrap());
    assert!(controller.dirty().is_dirty("parcels", "Parcels.7"));
    assert!(controller.is_feature_dirty("parcels", key));
    assert!(!controller.is_feature_dirty("wells", key));

    let outcome = controller.deselect_feature(key).await.unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            key,
            id: "Parcels.7".into()
        }
    );
    assert!(!controller.dirty().is_dirty("parcels", "Parcels.7"));

    let ops = parse_transaction_request(&controller.client().sent()[0].body).unwrap();
    let op = &ops[0];
    assert_eq!(op.kind, TransactionKind::Update);
    assert_eq!(op.fid.as_deref(), Some("Parcels.7"));
    assert_eq!(op.geometry_name.as_deref(), Some("geom"));
    assert_eq!(op.geometry, Some(square(5.0)));
    assert!(!op.properties.contains_key("bbox"));
    assert!(!op.properties.contains_key("geometry"));

    // Live-Feature behält seinen Geometrie-Namen und die bbox
    let live = controller.layer("parcels").unwrap().source.get(key).unwrap();
    assert_eq!(live.geometry_name, "geometry");
    assert!(live.properties.contains_key("bbox"));
    assert!(!controller.is_feature_dirty("parcels", key));
}

#[tokio::test]
async fn test_clean_deselect_sends_nothing() {
    let mut controller = controller(RecordingClient::new());
    let key = controller.load_features("parcels", [stored_parcel()]).unwrap()[0];

    controller.arm_modify("parcels").unwrap();
    controller.select_feature(key).unwrap();
    let outcome = controller.deselect_feature(key).await.unwrap();

    assert_eq!(outcome, UpdateOutcome::Clean);
    assert_eq!(controller.client().sent_count(), 0);
}

#[tokio::test]
async fn test_unconfirmed_update_keeps_feature_dirty_until_flush() {
    let client = RecordingClient::new()
        .respond(UPDATE_UNCONFIRMED)
        .respond(EXCEPTION)
        .respond(UPDATE_OK);
    let mut controller = controller(client);
    let key = controller.load_features("parcels", [stored_parcel()]).unwrap()[0];

    controller.arm_modify("parcels").unwrap();
    controller.select_feature(key).unwrap();
    controller.modify_geometry(key, square(1.0)).unwrap();

    let outcome = controller.deselect_feature(key).await.unwrap();
    assert!(matches!(outcome, UpdateOutcome::Pending { .. }));
    assert!(controller.dirty().is_dirty("parcels", "Parcels.7"));

    // Zweiter Versuch: ExceptionReport, kein Fehler an den Aufrufer
    let results = controller.flush_dirty("parcels").await.unwrap();
    assert_eq!(results.len(), 1);
    match &results[0] {
        Ok(UpdateOutcome::Pending { reason, .. }) => {
            assert_eq!(reason, "Error performing insert: geometry is invalid")
        }
        other => panic!("Unerwartetes Ergebnis: {other:?}"),
    }

    let results = controller.flush_dirty("parcels").await.unwrap();
    assert!(matches!(results[0], Ok(UpdateOutcome::Updated { .. })));
    assert_eq!(controller.dirty().dirty_count(), 0);
    assert_eq!(controller.client().sent_count(), 3);
}

#[tokio::test]
async fn test_update_transport_failure_is_surfaced_and_stays_dirty() {
    let mut controller = controller(RecordingClient::new().fail(503, "Service Unavailable"));
    let key = controller.load_features("parcels", [stored_parcel()]).unwrap()[0];

    controller.arm_modify("parcels").unwrap();
    controller.select_feature(key).unwrap();
    controller.modify_geometry(key, square(2.0)).unwrap();

    let err = controller.deselect_feature(key).await.expect_err("503 erwartet");
    assert_eq!(err.to_string(), "Transport fehlgeschlagen: 503 Service Unavailable");
    assert!(controller.dirty().is_dirty("parcels", "Parcels.7"));
}

#[tokio::test]
async fn test_delete_with_two_selected_is_noop() {
    let mut controller = controller(RecordingClient::new());
    let keys = controller
        .load_features("parcels", [stored_parcel(), stored_parcel().with_id("Parcels.8")])
        .unwrap();

    controller.arm_modify("parcels").unwrap();
    controller.select_feature(keys[0]).unwrap();
    controller.select_feature(keys[1]).unwrap();

    let outcome = controller.delete_selected("parcels").await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Skipped { selected: 2 });
    assert_eq!(controller.client().sent_count(), 0);
    assert_eq!(controller.layer("parcels").unwrap().source.len(), 2);
}

#[tokio::test]
async fn test_delete_single_selected_removes_feature() {
    let mut controller = controller(RecordingClient::new().respond(DELETE_OK));
    let key = controller.load_features("parcels", [stored_parcel()]).unwrap()[0];

    controller.arm_modify("parcels").unwrap();
    controller.select_feature(key).unwrap();
    let outcome = controller.delete_selected("parcels").await.unwrap();

    assert_eq!(
        outcome,
        DeleteOutcome::Deleted {
            key,
            id: "Parcels.7".into()
        }
    );
    assert!(controller.layer("parcels").unwrap().source.is_empty());
    assert!(controller.interactions().select.is_empty());

    let ops = parse_transaction_request(&controller.client().sent()[0].body).unwrap();
    assert_eq!(ops[0].kind, TransactionKind::Delete);
    assert_eq!(ops[0].fid.as_deref(), Some("Parcels.7"));
}

#[tokio::test]
async fn test_unconfirmed_delete_fails_and_keeps_feature() {
    let mut controller = controller(RecordingClient::new().respond(UPDATE_OK));
    let key = controller.load_features("parcels", [stored_parcel()]).unwrap()[0];

    controller.arm_modify("parcels").unwrap();
    controller.select_feature(key).unwrap();
    let err = controller.delete_selected("parcels").await.expect_err("totalDeleted = 0");

    assert!(matches!(err, EditError::DeleteFailed(_)));
    assert_eq!(controller.layer("parcels").unwrap().source.len(), 1);
    assert!(controller.interactions().select.contains(key));
}

#[tokio::test]
async fn test_draw_transport_failure_deactivates() {
    let mut controller = controller(RecordingClient::new().fail(500, "Internal Server Error"));
    controller.arm_draw("wells").unwrap();

    let err = controller
        .finish_draw(Geometry::Point(DVec2::new(3.0, 4.0)), Properties::new())
        .await
        .expect_err("500 erwartet");

    assert_eq!(err.to_string(), "Transport fehlgeschlagen: 500 Internal Server Error");
    assert_eq!(controller.arm_state(), &ArmState::Idle);
    assert!(controller.layer("wells").unwrap().source.is_empty());
    assert!(matches!(
        controller.transaction_log().last().unwrap().result,
        TransactionResult::Failed(_)
    ));
}

#[tokio::test]
async fn test_draw_service_exception_is_reported_and_draw_stays_armed() {
    let mut controller = controller(RecordingClient::new().respond(EXCEPTION));
    controller.arm_draw("parcels").unwrap();

    let err = controller
        .finish_draw(square(0.0), Properties::new())
        .await
        .expect_err("ExceptionReport erwartet");

    assert_eq!(
        err,
        EditError::ServiceException {
            message: "Error performing insert: geometry is invalid".into()
        }
    );
    assert_eq!(
        controller.arm_state(),
        &ArmState::Drawing {
            layer_id: "parcels".into()
        }
    );
    assert!(controller.layer("parcels").unwrap().source.is_empty());
}

#[tokio::test]
async fn test_draw_with_wrong_geometry_type_sends_nothing() {
    let mut controller = controller(RecordingClient::new());
    controller.arm_draw("parcels").unwrap();

    let err = controller
        .finish_draw(Geometry::Point(DVec2::ZERO), Properties::new())
        .await
        .expect_err("Punkt auf Polygon-Layer");

    assert_eq!(
        err,
        EditError::GeometryMismatch {
            expected: GeometryType::Polygon,
            actual: GeometryType::Point
        }
    );
    assert_eq!(controller.client().sent_count(), 0);
}

#[tokio::test]
async fn test_arming_is_exclusive_and_draw_is_memoized() {
    let mut controller = controller(RecordingClient::new());

    controller.arm_draw("parcels").unwrap();
    controller.arm_modify("parcels").unwrap();
    controller.arm_draw("parcels").unwrap();
    controller.arm_draw("wells").unwrap();

    assert_eq!(controller.interactions().draw_count(), 2);
    assert_eq!(controller.interactions().active_interactions().len(), 1);
    assert_eq!(controller.current_layer(), Some("wells"));

    controller.teardown();
    assert_eq!(controller.arm_state(), &ArmState::Idle);
    assert_eq!(controller.interactions().draw_count(), 0);
}

#[tokio::test]
async fn test_non_editable_layer_cannot_be_armed() {
    let mut controller = controller(RecordingClient::new());
    let mut basemap = VectorLayer::editable("basemap", common::parcels_config());
    basemap.editable = false;
    controller.add_layer(basemap);

    assert_eq!(
        controller.arm_draw("basemap"),
        Err(EditError::LayerNotEditable("basemap".into()))
    );
    assert_eq!(
        controller.arm_modify("roads"),
        Err(EditError::UnknownLayer("roads".into()))
    );
}

#[tokio::test]
async fn test_select_without_modify_is_rejected() {
    let mut controller = controller(RecordingClient::new());
    let key = controller.load_features("parcels", [stored_parcel()]).unwrap()[0];

    assert_eq!(controller.select_feature(key), Err(EditError::NoActiveInteraction));
}

const PROXY_ERROR_PAGE: &str = "<html><body><h1>502 Bad Gateway</h1></body></html>";

#[tokio::test]
async fn test_malformed_insert_response_keeps_draw_armed() {
    let mut controller = controller(RecordingClient::new().respond(PROXY_ERROR_PAGE));
    controller.arm_draw("parcels").unwrap();

    let err = controller
        .finish_draw(square(0.0), Properties::new())
        .await
        .expect_err("HTML ist keine WFS-Antwort");

    assert!(matches!(err, EditError::MalformedResponse(_)));
    assert_eq!(
        controller.arm_state(),
        &ArmState::Drawing {
            layer_id: "parcels".into()
        }
    );
    assert!(controller.layer("parcels").unwrap().source.is_empty());
}

#[tokio::test]
async fn test_malformed_delete_response_is_delete_failure() {
    let mut controller = controller(RecordingClient::new().respond(PROXY_ERROR_PAGE));
    let key = controller.load_features("parcels", [stored_parcel()]).unwrap()[0];

    controller.arm_modify("parcels").unwrap();
    controller.select_feature(key).unwrap();
    let err = controller
        .delete_selected("parcels")
        .await
        .expect_err("HTML ist keine WFS-Antwort");

    assert!(matches!(err, EditError::DeleteFailed(_)));
    assert_eq!(controller.layer("parcels").unwrap().source.len(), 1);
    assert!(controller.interactions().select.contains(key));
}

#[tokio::test]
async fn test_malformed_update_response_keeps_feature_dirty() {
    let mut controller = controller(RecordingClient::new().respond(PROXY_ERROR_PAGE));
    let key = controller.load_features("parcels", [stored_parcel()]).unwrap()[0];

    controller.arm_modify("parcels").unwrap();
    controller.select_feature(key).unwrap();
    controller.modify_geometry(key, square(4.0)).unwrap();

    let err = controller
        .deselect_feature(key)
        .await
        .expect_err("HTML ist keine WFS-Antwort");

    assert!(matches!(err, EditError::MalformedResponse(_)));
    assert!(controller.dirty().is_dirty("parcels", "Parcels.7"));
}

#[tokio::test]
async fn test_same_feature_id_on_two_layers_does_not_share_dirty_state() {
    let mut controller = InteractionController::new(RecordingClient::new().respond(UPDATE_OK));
    controller.add_layer(VectorLayer::editable("a", common::parcels_config()));
    controller.add_layer(VectorLayer::editable("b", common::parcels_config()));
    let key_a = controller.load_features("a", [stored_parcel().with_id("1")]).unwrap()[0];
    let key_b = controller.load_features("b", [stored_parcel().with_id("1")]).unwrap()[0];

    controller.arm_modify("a").unwrap();
    controller.select_feature(key_a).unwrap();
    assert!(controller.modify_geometry(key_a, square(3.0)).unwrap());

    // Unveränderter Namensvetter auf Layer b
    controller.arm_modify("b").unwrap();
    controller.select_feature(key_b).unwrap();
    let outcome = controller.deselect_feature(key_b).await.unwrap();

    assert_eq!(outcome, UpdateOutcome::Clean);
    assert_eq!(controller.client().sent_count(), 0);
    assert!(controller.dirty().is_dirty("a", "1"));
    assert!(!controller.dirty().is_dirty("b", "1"));

    let results = controller.flush_dirty("a").await.unwrap();
    assert_eq!(
        results,
        vec![Ok(UpdateOutcome::Updated {
            key: key_a,
            id: "1".into()
        })]
    );
    assert_eq!(controller.dirty().dirty_count(), 0);
}
