//! Property-based tests for conditional updates.
//!
//! - No-op idempotence: re-applying a record's own values changes nothing
//!   and never reaches the store
//! - Change minimality: the written field set is exactly the dirty set

mod common;

use common::{create_foo, new_store, test_schema, RecordingLog};
use objsync_core::{UpdateOptions, UpdateRequest, Updater, Value};
use proptest::prelude::*;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn text_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::string::string_regex("[a-z0-9 ]{0,12}").unwrap())
}

fn decimal_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of((0u32..999, 0u32..100).prop_map(|(i, f)| format!("{}.{:02}", i, f)))
}

fn to_value(v: &Option<String>) -> Value {
    v.as_deref().map(Value::from).unwrap_or_default()
}

fn request(text: &Option<String>, slug: &Option<String>, decimal: &Option<String>) -> UpdateRequest {
    UpdateRequest::new()
        .set("text", to_value(text))
        .set("slug", to_value(slug))
        .set("decimal", to_value(decimal))
}

proptest! {
    #[test]
    fn reapplying_current_values_is_a_no_op(
        text in text_strategy(),
        slug in text_strategy(),
        decimal in decimal_strategy(),
    ) {
        let mut store = new_store();
        let initial = request(&text, &slug, &decimal);
        let mut foo = create_foo(&mut store, initial.clone());
        let before = foo.clone();
        let schema = test_schema();
        let log = RecordingLog::new();

        let changed = Updater::with_log(&schema, &log)
            .apply(&mut store, &mut foo, &initial, &UpdateOptions::default())
            .unwrap();

        prop_assert!(!changed);
        prop_assert_eq!(store.query_count(), 0);
        prop_assert!(log.events().is_empty());
        prop_assert_eq!(foo, before);
    }

    #[test]
    fn written_fields_are_exactly_the_dirty_fields(
        old in (text_strategy(), text_strategy(), decimal_strategy()),
        new in (text_strategy(), text_strategy(), decimal_strategy()),
    ) {
        let mut store = new_store();
        let mut foo = create_foo(&mut store, request(&old.0, &old.1, &old.2));
        let schema = test_schema();
        let log = RecordingLog::new();

        let changed = Updater::with_log(&schema, &log)
            .apply(&mut store, &mut foo, &request(&new.0, &new.1, &new.2), &UpdateOptions::default())
            .unwrap();

        let mut expected = Vec::new();
        if old.0 != new.0 {
            expected.push("text");
        }
        if old.1 != new.1 {
            expected.push("slug");
        }
        if old.2 != new.2 {
            expected.push("decimal");
        }

        prop_assert_eq!(changed, !expected.is_empty());
        prop_assert_eq!(store.write_count(), usize::from(changed));
        let written = log.updates().first().map(|c| c.field_names()).unwrap_or_default();
        prop_assert_eq!(written, expected);
    }
}
