#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{new_store, test_schema, text, LoggedEvent, RecordingLog};
use objsync_core::{
    DynRecord, ObjSyncError, Record, UpdateOptions, UpdateRequest, UpsertOutcome, UpsertUpdater,
    Value,
};

#[test]
fn test_workflow() {
    let mut store = new_store();
    let schema = test_schema();
    let log = RecordingLog::new();
    let upsert = UpsertUpdater::with_log(&schema, &log);
    let lookup = UpdateRequest::new().set("text", "hi");

    // creation: lookup + insert
    let defaults = UpdateRequest::new().set("slug", "leopard");
    let outcome: UpsertOutcome<DynRecord> = upsert
        .apply_or_create(&mut store, "FooModel", &lookup, &defaults, &UpdateOptions::default())
        .unwrap();
    assert!(outcome.created);
    assert_eq!(outcome.record.column("text"), &text("hi"));
    assert_eq!(outcome.record.column("slug"), &text("leopard"));
    assert_eq!(store.query_count(), 2);
    let pk = outcome.record.pk();

    // nothing new: lookup only
    store.reset_counts();
    let outcome: UpsertOutcome<DynRecord> = upsert
        .apply_or_create(&mut store, "FooModel", &lookup, &defaults, &UpdateOptions::default())
        .unwrap();
    assert!(!outcome.created);
    assert!(!outcome.changed);
    assert_eq!(outcome.record.pk(), pk);
    assert_eq!(outcome.record.column("slug"), &text("leopard"));
    assert_eq!(store.query_count(), 1);

    // new data: lookup + one update
    store.reset_counts();
    let defaults = UpdateRequest::new()
        .set("slug", "lemon")
        .set("decimal", "0.01");
    let outcome: UpsertOutcome<DynRecord> = upsert
        .apply_or_create(&mut store, "FooModel", &lookup, &defaults, &UpdateOptions::default())
        .unwrap();
    assert!(!outcome.created);
    assert!(outcome.changed);
    assert_eq!(outcome.record.column("text"), &text("hi"));
    assert_eq!(outcome.record.column("slug"), &text("lemon"));
    assert_eq!(outcome.record.column("decimal"), &text("0.01"));
    assert_eq!(store.query_count(), 2);
    assert_eq!(store.write_count(), 1);

    let events = log.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], LoggedEvent::Created { model, pk: Some(_) } if model == "FooModel"));
    match &events[1] {
        LoggedEvent::Updated { changes, .. } => {
            assert_eq!(changes.field_names(), vec!["slug", "decimal"]);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_changed_default_persists_only_that_field() {
    let mut store = new_store();
    let schema = test_schema();
    let log = RecordingLog::new();
    let upsert = UpsertUpdater::with_log(&schema, &log);
    let lookup = UpdateRequest::new().set("slug", "key");
    let defaults = UpdateRequest::new().set("text", "a").set("decimal", "1.5");

    let first: UpsertOutcome<DynRecord> = upsert
        .apply_or_create(&mut store, "FooModel", &lookup, &defaults, &UpdateOptions::default())
        .unwrap();
    store.reset_counts();

    let defaults = UpdateRequest::new().set("text", "b").set("decimal", "1.5");
    let second: UpsertOutcome<DynRecord> = upsert
        .apply_or_create(&mut store, "FooModel", &lookup, &defaults, &UpdateOptions::default())
        .unwrap();

    assert!(second.changed);
    assert_eq!(store.write_count(), 1);
    assert_eq!(log.updates().last().unwrap().field_names(), vec!["text"]);
    let stored = store.get("FooModel", &first.record.pk().unwrap()).unwrap();
    assert_eq!(stored.column("text"), &text("b"));
}

#[test]
fn test_ambiguous_lookup() {
    let mut store = new_store();
    let lookup = UpdateRequest::new().set("text", "dup");
    store.create("FooModel", &lookup).unwrap();
    store.create("FooModel", &lookup).unwrap();
    let schema = test_schema();

    let err = UpsertUpdater::new(&schema)
        .apply_or_create::<DynRecord, _>(
            &mut store,
            "FooModel",
            &lookup,
            &UpdateRequest::new(),
            &UpdateOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(err, ObjSyncError::MultipleRecords { count: 2, .. }));
}

#[test]
fn test_lookup_by_reference_identifier() {
    let mut store = new_store();
    let bar = common::create_bar(&mut store);
    let schema = test_schema();
    let upsert = UpsertUpdater::new(&schema);
    let lookup = UpdateRequest::new().set("foreignkey_id", bar.pk.clone());

    let first: UpsertOutcome<DynRecord> = upsert
        .apply_or_create(&mut store, "FooModel", &lookup, &UpdateRequest::new(), &UpdateOptions::default())
        .unwrap();
    assert!(first.created);
    assert_eq!(first.record.column("foreignkey"), &Value::Ref(bar.clone()));

    let lookup = UpdateRequest::new().set("foreignkey", bar);
    let second: UpsertOutcome<DynRecord> = upsert
        .apply_or_create(&mut store, "FooModel", &lookup, &UpdateRequest::new(), &UpdateOptions::default())
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.record.pk(), first.record.pk());
}
